use adoc_engine::{Document, ParseOptions, parse_document};
use criterion::{Criterion, criterion_group, criterion_main};
mod common;

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parsing");
    group.sample_size(10);

    let content = common::generate_adoc_content(100);
    let options = ParseOptions::default();
    group.bench_function("document", |b| {
        b.iter(|| {
            let doc = parse_document(std::hint::black_box(&content), &options);
            std::hint::black_box(doc)
        });
    });

    let table = common::generate_table(200, 6);
    group.bench_function("table", |b| {
        b.iter(|| {
            let doc = parse_document(std::hint::black_box(&table), &options);
            std::hint::black_box(doc)
        });
    });

    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("rendering");
    group.sample_size(10);

    let doc = Document::parse(&common::generate_adoc_content(100)).unwrap();
    group.bench_function("html", |b| {
        b.iter(|| std::hint::black_box(doc.to_html()));
    });
    group.bench_function("roff", |b| {
        b.iter(|| std::hint::black_box(doc.to_roff()));
    });

    group.finish();
}

criterion_group!(benches, bench_parse, bench_render);
criterion_main!(benches);
