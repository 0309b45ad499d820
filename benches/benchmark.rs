use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use matching_annotator::{Document, Line, MatchingAnnotator, TargetAnnotation, fuzzy_match};
use std::hint::black_box;

fn benchmark_fuzzy_match(c: &mut Criterion) {
    let a = "this is. matching indeed matching";
    let b = "this is matching";

    c.bench_function("fuzzy_match_short", |bencher| {
        bencher.iter(|| {
            let _ = fuzzy_match(black_box(a), black_box(b), None);
        });
    });
}

fn benchmark_fuzzy_match_long(c: &mut Criterion) {
    let a = "Lorem ipsum dolor sit amet, consectetur adipiscing elit. Vestibulum eros ipsum, tincidutn eu metus ut, commodo accumsan mi.";
    let b = "Lorem ipsum dolor sit amet consectetur adipiscing elit Vestibulum eros ipsum tincidunt eu metus ut commodo accumsan mi";

    c.bench_function("fuzzy_match_long", |bencher| {
        bencher.iter(|| {
            let _ = fuzzy_match(black_box(a), black_box(b), None);
        });
    });
}

fn sample_document() -> Document {
    Document::new(vec![
        Line::from_texts(["Title", ":", "A", "Study", "of", "Fuzzy", "Matching"]),
        Line::from_texts(["Authors", ":", "Jane", "Doe", ",", "John", "Smith"]),
        Line::from_texts(["Abstract", "This", "paper", "describes", "a", "system"]),
        Line::from_texts(["for", "matching", "ground", "truth", "values", "to", "tokens"]),
    ])
}

fn benchmark_annotate(c: &mut Criterion) {
    env_logger::init();

    let annotator = MatchingAnnotator::new(vec![
        TargetAnnotation::new("A Study of Fuzzy Matching", "TITLE"),
        TargetAnnotation::new(vec!["Jane Doe", "John Smith"], "AUTHOR").match_multiple(true),
        TargetAnnotation::new(
            "This paper describes a system for matching ground truth values to tokens",
            "ABSTRACT",
        ),
    ]);

    c.bench_function("annotate_small_document", |bencher| {
        bencher.iter(|| {
            let mut document = sample_document();
            let _ = annotator.annotate(black_box(&mut document));
        });
    });
}

fn benchmark_annotate_by_target_count(c: &mut Criterion) {
    let mut group = c.benchmark_group("annotate_by_target_count");

    for target_count in [1usize, 4, 8] {
        let targets: Vec<TargetAnnotation> = (0..target_count)
            .map(|i| TargetAnnotation::new("Jane Doe", format!("TAG{i}")))
            .collect();
        let annotator = MatchingAnnotator::new(targets);

        group.bench_with_input(
            BenchmarkId::new("targets", target_count),
            &target_count,
            |bencher, _| {
                bencher.iter(|| {
                    let mut document = sample_document();
                    let _ = annotator.annotate(black_box(&mut document));
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_fuzzy_match,
    benchmark_fuzzy_match_long,
    benchmark_annotate,
    benchmark_annotate_by_target_count
);
criterion_main!(benches);
