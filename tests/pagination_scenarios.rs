use pretty_assertions::assert_eq;
use report_pager::document::{BlockRole, PageRole};
use report_pager::layout::measure_page;
use report_pager::pagination::{finalize_numbering, split_page, Detector, Overflow, ReportSession, Trigger};
use report_pager::{BlockId, BlockKind, FixedMeasure, PaginateError, PaginationConfig, Paginator, ReportDocument};

fn paragraphs(texts: &[&str]) -> String {
    texts
        .iter()
        .map(|t| format!(r#"{{"kind": "paragraph", "text": "{t}"}}"#))
        .collect::<Vec<_>>()
        .join(",")
}

fn section_report(blocks: &str) -> ReportDocument {
    let json = format!(r#"{{"pages": [{{"role": "section", "number": 1, "blocks": [{blocks}]}}]}}"#);
    ReportDocument::from_json(&json).unwrap()
}

fn ids_on(doc: &ReportDocument, index: usize) -> Vec<BlockId> {
    let page = doc.page_order()[index];
    doc.page(page).unwrap().blocks().to_vec()
}

/// Visible text of every block per page
fn page_texts(doc: &ReportDocument) -> Vec<Vec<String>> {
    doc.pages()
        .map(|page| {
            page.blocks()
                .iter()
                .map(|&id| match &doc.block(id).unwrap().kind {
                    BlockKind::Paragraph { text } => text.clone(),
                    BlockKind::Table { caption, .. } => caption.as_ref().map(|c| c.text.clone()).unwrap_or_default(),
                    BlockKind::BareTable(_) => "<table>".to_string(),
                    other => other.title().map(|t| t.text.clone()).unwrap_or_default(),
                })
                .collect()
        })
        .collect()
}

fn data_rows(doc: &ReportDocument, id: BlockId) -> Vec<String> {
    let table = doc.block(id).unwrap().kind.table().unwrap();
    table.data_rows().iter().map(|row| row.cells[0].text.clone()).collect()
}

#[test]
fn three_blocks_at_capacity_900() {
    let mut doc = section_report(&paragraphs(&["one", "two", "three"]));
    let ids = ids_on(&doc, 0);
    let mut measure = FixedMeasure::new().with_frame_height(905.0);
    for &id in &ids {
        measure.set_block_height(id, 400.0);
    }

    let summary = Paginator::default().paginate(&mut doc, &measure);

    assert_eq!(summary.pages_created, 1);
    assert_eq!(page_texts(&doc), vec![vec!["one", "two"], vec!["three"]]);
}

#[test]
fn table_splits_at_row_five_with_deadline_300() {
    let rows: Vec<String> = (0..10).map(|i| format!(r#"["row{i}", "{i}"]"#)).collect();
    let blocks = format!(
        r#"{{"kind": "bareTable", "table": {{"head": ["Gene", "VAF"], "rows": [{}]}}}}"#,
        rows.join(",")
    );
    let mut doc = section_report(&blocks);
    let page = doc.page_order()[0];
    let ids = ids_on(&doc, 0);
    let mut measure = FixedMeasure::new().with_frame_height(305.0);
    measure.header_height = 40.0;
    measure.default_row_height = 50.0;
    let config = PaginationConfig::default();

    let geometry = measure_page(&doc, page, &measure).unwrap();
    let detection = Detector::new(&doc, &measure, &config)
        .detect(&ids, &geometry, 300.0, 0, None)
        .unwrap();
    assert_eq!(detection.overflow, Overflow::Split { index: 0, row: 5 });

    let outcome = split_page(&mut doc, page, 1, &ids, detection.overflow, &measure, &config).unwrap();
    let split = outcome.table.unwrap();
    assert_eq!(data_rows(&doc, ids[0]), vec!["row0", "row1", "row2", "row3", "row4"]);
    assert_eq!(data_rows(&doc, split.continuation), vec!["row5", "row6", "row7", "row8", "row9"]);

    let original = doc.block(ids[0]).unwrap().kind.table().unwrap().clone();
    let continuation = doc.block(split.continuation).unwrap().kind.table().unwrap().clone();
    assert_eq!(original.head, continuation.head);
    assert_eq!(original.column_count(), continuation.column_count());
    assert!(original.pinned_widths().is_some());
}

#[test]
fn full_run_conserves_table_rows() {
    let rows: Vec<String> = (0..10).map(|i| format!(r#"["row{i}"]"#)).collect();
    let blocks = format!(
        r#"{{"kind": "table", "caption": {{"text": "Single nucleotide variants"}}, "table": {{"head": ["Gene"], "rows": [{}]}}}}"#,
        rows.join(",")
    );
    let mut doc = section_report(&blocks);
    let mut measure = FixedMeasure::new().with_frame_height(305.0);
    measure.header_height = 40.0;
    measure.default_row_height = 50.0;
    measure.title_height = 0.0;

    let summary = Paginator::default().paginate(&mut doc, &measure);
    assert!(summary.is_complete());
    assert!(summary.tables_split >= 1);

    let fragments: Vec<BlockId> = doc
        .placed_blocks()
        .filter(|&id| doc.block(id).unwrap().kind.table().is_some())
        .collect();
    let total: usize = fragments.iter().map(|&id| data_rows(&doc, id).len()).sum();
    assert_eq!(total, 10);
    assert_eq!(data_rows(&doc, fragments[0]).len(), 5);

    let heads: Vec<_> = fragments
        .iter()
        .map(|&id| doc.block(id).unwrap().kind.table().unwrap().head.clone())
        .collect();
    assert!(heads.windows(2).all(|pair| pair[0] == pair[1]));

    // captions numbered 1..N in page order
    let n = fragments.len();
    let captions: Vec<String> = fragments
        .iter()
        .map(|&id| doc.block(id).unwrap().kind.title().unwrap().text.clone())
        .collect();
    let expected: Vec<String> = (1..=n)
        .map(|k| format!("Single nucleotide variants ({k}/{n})"))
        .collect();
    assert_eq!(captions, expected);

    // finalizing again changes nothing
    finalize_numbering(&mut doc);
    let again: Vec<String> = fragments
        .iter()
        .map(|&id| doc.block(id).unwrap().kind.title().unwrap().text.clone())
        .collect();
    assert_eq!(again, captions);
}

#[test]
fn oversized_first_block_is_force_kept() {
    let mut doc = section_report(&paragraphs(&["huge"]));
    let ids = ids_on(&doc, 0);
    let measure = FixedMeasure::new().with_block_height(ids[0], 5000.0);

    let summary = Paginator::default().paginate(&mut doc, &measure);

    assert!(summary.is_complete());
    assert_eq!(summary.pages_created, 0);
    assert_eq!(doc.page_count(), 1);
}

#[test]
fn cascade_preserves_block_count_and_order() {
    let names: Vec<String> = (0..30).map(|i| format!("p{i}")).collect();
    let refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let mut doc = section_report(&format!(
        r#"{{"kind": "sectionTitle", "text": "2. Variants of unknown significance"}},{}"#,
        paragraphs(&refs)
    ));
    let ids = ids_on(&doc, 0);
    let mut measure = FixedMeasure::new();
    for (i, &id) in ids.iter().enumerate() {
        measure.set_block_height(id, 60.0 + (i % 7) as f32 * 45.0);
    }

    let summary = Paginator::default().paginate(&mut doc, &measure);
    assert!(summary.is_complete());
    assert!(summary.pages_created >= 2);

    let original: Vec<BlockId> = doc
        .placed_blocks()
        .filter(|&id| !doc.block(id).unwrap().is_repeated())
        .collect();
    assert_eq!(original, ids);

    // every continuation opens with the repeated section title
    for page in doc.pages().skip(1) {
        let first = doc.block(page.blocks()[0]).unwrap();
        assert_eq!(first.repeat_of, Some(ids[0]));
        assert_eq!(first.kind.title().unwrap().anchor, None);
    }
}

#[test]
fn no_title_repeated_before_a_new_section() {
    let mut doc = section_report(
        r#"{"kind": "sectionTitle", "text": "A"},
           {"kind": "paragraph", "text": "long"},
           {"kind": "sectionTitle", "text": "B"},
           {"kind": "paragraph", "text": "tail"}"#,
    );
    let ids = ids_on(&doc, 0);
    let measure = FixedMeasure::new().with_block_height(ids[1], 900.0);

    Paginator::default().paginate(&mut doc, &measure);

    assert_eq!(page_texts(&doc), vec![vec!["A", "long"], vec!["B", "tail"]]);
}

const MERGE_REPORT: &str = r#"{"pages": [
    {"role": "primary", "blocks": [
        {"kind": "paragraph", "text": "patient"},
        {"kind": "sectionTitle", "text": "1. Variants of clinical significance", "anchor": "clinical-highlight"},
        {"kind": "paragraph", "text": "a"},
        {"kind": "paragraph", "text": "b"},
        {"kind": "paragraph", "text": "c"},
        {"kind": "bottomFixed", "text": "signature"}
    ]},
    {"role": "section", "number": 2, "blocks": [
        {"kind": "sectionTitle", "text": "2. Variants of unknown significance"},
        {"kind": "paragraph", "text": "d"},
        {"kind": "paragraph", "text": "e"},
        {"kind": "trailingInfo", "text": "Additional information"}
    ]},
    {"role": "static", "number": 3, "blocks": [{"kind": "paragraph", "text": "appendix"}]}
]}"#;

#[test]
fn trailing_info_lands_last_after_merge() {
    let mut doc = ReportDocument::from_json(MERGE_REPORT).unwrap();
    let primary = ids_on(&doc, 0);
    let section = ids_on(&doc, 1);
    let mut measure = FixedMeasure::new();
    measure.set_block_height(primary[3], 400.0);
    measure.set_block_height(primary[4], 400.0);
    measure.set_block_height(section[1], 500.0);
    measure.set_block_height(section[2], 500.0);

    let summary = Paginator::default().paginate(&mut doc, &measure);

    assert!(summary.merged);
    assert!(summary.is_complete());
    assert!(doc.first_page_with_role(PageRole::Section).is_none());

    let roles: Vec<PageRole> = doc.pages().map(|page| page.role).collect();
    assert_eq!(roles.last(), Some(&PageRole::Static));
    assert!(roles[1..roles.len() - 1].iter().all(|role| role.is_continuation()));

    let flow_tail = doc.page_order()[doc.page_count() - 2];
    let last = *doc.page(flow_tail).unwrap().blocks().last().unwrap();
    assert_eq!(doc.block(last).unwrap().role, BlockRole::TrailingInfo);

    // the static page is untouched
    assert_eq!(page_texts(&doc).last().unwrap(), &vec!["appendix".to_string()]);
}

#[test]
fn dedicated_section_overflows_without_merge() {
    let mut doc = ReportDocument::from_json(MERGE_REPORT).unwrap();
    let section = ids_on(&doc, 1);
    let mut measure = FixedMeasure::new();
    measure.set_block_height(section[1], 500.0);
    measure.set_block_height(section[2], 500.0);

    let summary = Paginator::default().paginate(&mut doc, &measure);

    assert!(!summary.merged);
    assert!(summary.is_complete());
    assert_eq!(summary.pages_created, 1);

    let roles: Vec<PageRole> = doc.pages().map(|page| page.role).collect();
    assert_eq!(
        roles,
        vec![PageRole::Primary, PageRole::Section, PageRole::Continuation, PageRole::Static]
    );
    assert_eq!(ids_on(&doc, 1), section[..2].to_vec());

    let continuation = ids_on(&doc, 2);
    assert_eq!(continuation.len(), 3);
    assert_eq!(doc.block(continuation[0]).unwrap().repeat_of, Some(section[0]));
    assert_eq!(continuation[1], section[2]);
    assert_eq!(continuation[2], section[3]);
    assert_eq!(doc.block(continuation[2]).unwrap().role, BlockRole::TrailingInfo);
}

#[test]
fn bare_table_split_carries_caption_to_next_page() {
    let rows: Vec<String> = (0..10).map(|i| format!(r#"["row{i}", "{i}"]"#)).collect();
    let mut doc = section_report(&format!(
        r#"{{"kind": "sectionTitle", "text": "2. Variants of unknown significance"}},
           {{"kind": "caption", "text": "Copy number variants", "anchor": "cnv"}},
           {{"kind": "bareTable", "table": {{"head": ["Gene", "Copies"], "rows": [{}]}}}}"#,
        rows.join(",")
    ));
    let ids = ids_on(&doc, 0);
    let mut measure = FixedMeasure::new().with_frame_height(305.0);
    measure.set_block_height(ids[0], 40.0);
    measure.set_block_height(ids[1], 20.0);
    measure.header_height = 40.0;
    measure.default_row_height = 50.0;

    let summary = Paginator::default().paginate(&mut doc, &measure);
    assert!(summary.is_complete());
    assert!(summary.tables_split >= 1);

    assert_eq!(ids_on(&doc, 0), ids);
    let first_caption = doc.block(ids[1]).unwrap().kind.title().unwrap();
    assert!(first_caption.text.starts_with("Copy number variants (1/"));
    assert_eq!(first_caption.anchor.as_deref(), Some("cnv"));

    let next = ids_on(&doc, 1);
    assert_eq!(next.len(), 3);

    let title = doc.block(next[0]).unwrap();
    assert_eq!(title.repeat_of, Some(ids[0]));
    assert!(title.kind.is_section_title());

    let caption = doc.block(next[1]).unwrap();
    assert!(caption.kind.is_caption());
    let caption = caption.kind.title().unwrap();
    assert!(caption.text.starts_with("Copy number variants (2/"));
    assert_eq!(caption.anchor, None);

    let head = doc.block(ids[2]).unwrap().kind.table().unwrap().head.clone();
    let continuation = doc.block(next[2]).unwrap().kind.table().unwrap();
    assert_eq!(continuation.head, head);
    assert!(continuation.pinned_widths().is_some());
    assert!(data_rows(&doc, next[2]).first().unwrap() != "row0");
}

#[test]
fn marker_block_bounds_primary_without_bottom_fixed() {
    let mut doc = ReportDocument::from_json(
        r#"{"pages": [{"role": "primary", "blocks": [
            {"kind": "sectionTitle", "text": "1. Variants of clinical significance"},
            {"kind": "paragraph", "text": "a"},
            {"kind": "paragraph", "text": "b"},
            {"kind": "paragraph", "text": "c"},
            {"kind": "container", "title": {"text": "Other Biomarkers"}, "text": "MSI stable"}
        ]}]}"#,
    )
    .unwrap();
    let ids = ids_on(&doc, 0);
    let mut measure = FixedMeasure::new();
    measure.set_block_height(ids[1], 300.0);
    measure.set_block_height(ids[2], 300.0);
    measure.set_block_height(ids[3], 300.0);

    let summary = Paginator::default().paginate(&mut doc, &measure);

    // the marker sits at 940: everything above it stays, beyond the 760 fallback
    assert!(summary.is_complete());
    assert_eq!(summary.pages_created, 0);
    assert_eq!(ids_on(&doc, 0), ids);
}

#[test]
fn completion_fires_once_on_abort() {
    let mut doc = section_report(&paragraphs(&["a", "b", "c", "d"]));
    let ids = ids_on(&doc, 0);
    let mut measure = FixedMeasure::new();
    for &id in &ids {
        measure.set_block_height(id, 2000.0);
    }
    let config = PaginationConfig {
        max_depth: 1,
        ..PaginationConfig::default()
    };
    let mut calls = 0;

    let summary = Paginator::new(config).paginate_with(&mut doc, &measure, |summary| {
        assert!(!summary.is_complete());
        calls += 1;
    });

    assert_eq!(calls, 1);
    assert!(matches!(summary.aborted, Some(PaginateError::DepthExceeded { depth: 2, limit: 1 })));
}

#[test]
fn missing_anchors_degrade_without_panicking() {
    let json = r#"{"pages": [
        {"role": "primary", "blocks": [{"kind": "paragraph", "text": "no marked title"}]},
        {"role": "section", "blocks": null}
    ]}"#;
    let mut doc = ReportDocument::from_json(json).unwrap();
    let mut calls = 0;

    let summary = Paginator::default().paginate_with(&mut doc, &FixedMeasure::new(), |_| calls += 1);

    assert_eq!(calls, 1);
    assert!(summary.is_complete());
    assert_eq!(doc.page_count(), 2);
}

#[test]
fn coalesced_triggers_run_once_more() {
    let doc = ReportDocument::from_json(MERGE_REPORT).unwrap();
    let mut session = ReportSession::new(Paginator::default(), FixedMeasure::new(), doc);

    session.request(Trigger::Load);
    session.step();
    session.request(Trigger::Resize);
    session.request(Trigger::BeforePrint);

    let mut completions = 0;
    session.run_until_idle(|_| completions += 1);
    assert_eq!(completions, 2);
    assert!(!session.is_busy());
}

#[test]
fn paginated_output_round_trips_through_json() {
    let mut doc = ReportDocument::from_json(MERGE_REPORT).unwrap();
    let primary = ids_on(&doc, 0);
    let measure = FixedMeasure::new().with_block_height(primary[4], 900.0);
    Paginator::default().paginate(&mut doc, &measure);

    let json = doc.to_input().to_json().unwrap();
    let reloaded = ReportDocument::from_json(&json).unwrap();
    assert_eq!(page_texts(&reloaded), page_texts(&doc));
}
