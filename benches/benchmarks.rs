//! Benchmarks for the pagination cascade

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use report_pager::pagination::finalize_numbering;
use report_pager::render::render_document;
use report_pager::{FixedMeasure, Paginator, ReportDocument, TextMetricsMeasure};

/// A primary section with `tables` variant tables of `rows` rows each, plus a
/// dedicated trailing section
fn report_json(tables: usize, rows: usize) -> String {
    let table_rows: Vec<String> = (0..rows)
        .map(|i| format!(r#"["GENE{i}", "c.{i}A>G", "p.Lys{i}Arg", "{}%"]"#, i % 100))
        .collect();
    let table = format!(
        r#"{{"kind": "table", "caption": {{"text": "Single nucleotide variants"}},
            "table": {{"head": ["Gene", "HGVS.c", "HGVS.p", "VAF"], "rows": [{}]}}}}"#,
        table_rows.join(",")
    );
    let tables: Vec<String> = (0..tables).map(|_| table.clone()).collect();

    format!(
        r#"{{"pages": [
            {{"role": "primary", "blocks": [
                {{"kind": "sectionTitle", "text": "1. Variants of clinical significance"}},
                {},
                {{"kind": "bottomFixed", "text": "Other biomarkers"}}
            ]}},
            {{"role": "section", "number": 2, "blocks": [
                {{"kind": "sectionTitle", "text": "2. Variants of unknown significance"}},
                {},
                {{"kind": "trailingInfo", "text": "Additional information"}}
            ]}}
        ]}}"#,
        tables.join(","),
        tables.join(",")
    )
}

fn bench_paginate_fixed(c: &mut Criterion) {
    let source = ReportDocument::from_json(&report_json(4, 60)).unwrap();
    let measure = FixedMeasure::new();
    let paginator = Paginator::default();

    c.bench_function("paginate_fixed_measure", |b| {
        b.iter_batched(
            || source.clone(),
            |mut doc| black_box(paginator.paginate(&mut doc, &measure)),
            BatchSize::SmallInput,
        );
    });
}

fn bench_paginate_text_metrics(c: &mut Criterion) {
    let source = ReportDocument::from_json(&report_json(4, 60)).unwrap();
    let measure = TextMetricsMeasure::default();
    let paginator = Paginator::default();

    c.bench_function("paginate_text_metrics", |b| {
        b.iter_batched(
            || source.clone(),
            |mut doc| black_box(paginator.paginate(&mut doc, &measure)),
            BatchSize::SmallInput,
        );
    });
}

fn bench_finalize_numbering(c: &mut Criterion) {
    let mut doc = ReportDocument::from_json(&report_json(6, 60)).unwrap();
    Paginator::default().paginate(&mut doc, &FixedMeasure::new());

    c.bench_function("finalize_numbering", |b| {
        b.iter(|| black_box(finalize_numbering(&mut doc)));
    });
}

fn bench_render_html(c: &mut Criterion) {
    let mut doc = ReportDocument::from_json(&report_json(4, 60)).unwrap();
    Paginator::default().paginate(&mut doc, &FixedMeasure::new());

    c.bench_function("render_html", |b| {
        b.iter(|| black_box(render_document(&doc)));
    });
}

criterion_group!(
    benches,
    bench_paginate_fixed,
    bench_paginate_text_metrics,
    bench_finalize_numbering,
    bench_render_html,
);
criterion_main!(benches);
