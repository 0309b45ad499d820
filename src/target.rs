//! Target Annotation Value (§4.4): an immutable (value, tag-name, flags)
//! record describing a string that should be located and tagged in the
//! document. Order among a list of these is authoritative and is never
//! altered by the annotator.

/// Either a single probe string or an ordered list of alternative
/// sub-values belonging to one logical annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetValue {
    Single(String),
    Multiple(Vec<String>),
}

impl TargetValue {
    /// The individual probe strings to align, in order.
    pub(crate) fn probes(&self) -> Vec<&str> {
        match self {
            TargetValue::Single(s) => vec![s.as_str()],
            TargetValue::Multiple(values) => values.iter().map(String::as_str).collect(),
        }
    }
}

impl From<&str> for TargetValue {
    fn from(s: &str) -> Self {
        TargetValue::Single(s.to_string())
    }
}

impl From<String> for TargetValue {
    fn from(s: String) -> Self {
        TargetValue::Single(s)
    }
}

impl From<Vec<String>> for TargetValue {
    fn from(values: Vec<String>) -> Self {
        TargetValue::Multiple(values)
    }
}

impl From<Vec<&str>> for TargetValue {
    fn from(values: Vec<&str>) -> Self {
        TargetValue::Multiple(values.into_iter().map(str::to_string).collect())
    }
}

/// A (value, tag-name, flags) record describing text that should be located
/// and tagged in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetAnnotation {
    pub(crate) value: TargetValue,
    pub(crate) name: String,
    pub(crate) match_multiple: bool,
    pub(crate) bonding: bool,
}

impl TargetAnnotation {
    #[must_use]
    pub fn new(value: impl Into<TargetValue>, name: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            name: name.into(),
            match_multiple: false,
            bonding: false,
        }
    }

    /// Allow many document occurrences to be tagged by this one target.
    #[must_use]
    pub fn match_multiple(mut self, value: bool) -> Self {
        self.match_multiple = value;
        self
    }

    /// Mark this target as participating in a locality-group with other
    /// bonded targets sharing the same `name`.
    #[must_use]
    pub fn bonding(mut self, value: bool) -> Self {
        self.bonding = value;
        self
    }

    #[must_use]
    pub fn value(&self) -> &TargetValue {
        &self.value
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn is_match_multiple(&self) -> bool {
        self.match_multiple
    }

    #[must_use]
    pub fn is_bonding(&self) -> bool {
        self.bonding
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_value_target_defaults_to_no_flags() {
        let target = TargetAnnotation::new("this is matching", "TAG1");
        assert_eq!(target.value().probes(), vec!["this is matching"]);
        assert!(!target.is_match_multiple());
        assert!(!target.is_bonding());
    }

    #[test]
    fn multi_value_target_carries_each_probe_independently() {
        let target = TargetAnnotation::new(vec!["Jane Doe", "J. Doe"], "AUTHOR").bonding(true);
        assert_eq!(target.value().probes(), vec!["Jane Doe", "J. Doe"]);
        assert!(target.is_bonding());
    }
}
