//! HTML emission of a paginated report

use crate::document::{Block, BlockId, BlockKind, BlockRole, Cell, Page, PageRole, ReportDocument, Table, Title};
use std::fmt::Write;

/// Escape text for element content and quoted attribute values
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Class list of a page frame
pub fn page_classes(page: &Page) -> String {
    match page.role {
        PageRole::Primary => format!("a4-page page-{}", page.number),
        PageRole::Section => "a4-page page-continued-1".to_string(),
        PageRole::Continuation => format!("a4-page page-clinical-continued page-num-{}", page.number),
        PageRole::Static => "a4-page".to_string(),
    }
}

/// Render every page in document order
pub fn render_document(doc: &ReportDocument) -> String {
    let mut out = String::new();
    for page in doc.pages() {
        render_page(doc, page, &mut out);
    }
    out
}

pub fn render_page(doc: &ReportDocument, page: &Page, out: &mut String) {
    let _ = writeln!(out, r#"<div class="{}" data-page="{}">"#, page_classes(page), page.id.0);
    out.push_str("<div class=\"page-border\">\n");
    if let Some(content) = &page.content {
        out.push_str("<div class=\"report-content\">\n");
        for &id in &content.blocks {
            match doc.block(id) {
                Some(block) => render_block(block, out),
                None => log::warn!("page {} references missing block {}", page.id, id),
            }
        }
        out.push_str("</div>\n");
    }
    out.push_str("</div>\n</div>\n");
}

fn render_block(block: &Block, out: &mut String) {
    match block.role {
        BlockRole::BottomFixed => return render_reserved("page-bottom-fixed", block, out),
        BlockRole::TrailingInfo => return render_reserved("additional-info", block, out),
        BlockRole::Flow => {}
    }

    match &block.kind {
        BlockKind::SectionTitle(title) => {
            let class = if block.is_repeated() {
                "result-title repeated-title"
            } else {
                "result-title"
            };
            render_title("h3", class, title, Some(block.id), out);
        }
        BlockKind::Caption(title) => render_title("h4", "variant-type", title, Some(block.id), out),
        BlockKind::Paragraph { text } => {
            let _ = writeln!(out, r#"<p data-block="{}">{}</p>"#, block.id.0, escape(text));
        }
        BlockKind::Table { caption, table } => {
            let _ = writeln!(out, r#"<div class="table-wrapper" data-block="{}">"#, block.id.0);
            if let Some(caption) = caption {
                render_title("h4", "variant-type", caption, None, out);
            }
            render_table(table, None, out);
            out.push_str("</div>\n");
        }
        BlockKind::BareTable(table) => render_table(table, Some(block.id), out),
        BlockKind::Container { title, text } => {
            let _ = writeln!(out, r#"<div class="section-block" data-block="{}">"#, block.id.0);
            if let Some(title) = title {
                render_title("h3", "section-title", title, None, out);
            }
            if !text.is_empty() {
                let _ = writeln!(out, "<p>{}</p>", escape(text));
            }
            out.push_str("</div>\n");
        }
    }
}

fn render_reserved(class: &str, block: &Block, out: &mut String) {
    let text = match &block.kind {
        BlockKind::Paragraph { text } => text.as_str(),
        other => other.title().map(|t| t.text.as_str()).unwrap_or_default(),
    };
    let _ = writeln!(out, r#"<div class="{}" data-block="{}">{}</div>"#, class, block.id.0, escape(text));
}

fn render_title(tag: &str, class: &str, title: &Title, block: Option<BlockId>, out: &mut String) {
    let _ = write!(out, r#"<{tag} class="{class}""#);
    if let Some(id) = block {
        let _ = write!(out, r#" data-block="{}""#, id.0);
    }
    if let Some(anchor) = &title.anchor {
        let _ = write!(out, r#" id="{}""#, escape(anchor));
    }
    if let Some(mark) = &title.split {
        let _ = write!(
            out,
            r#" data-split-group="{}" data-split-index="{}""#,
            escape(&mark.group),
            mark.index
        );
    }
    let _ = writeln!(out, ">{}</{tag}>", escape(&title.text));
}

fn render_table(table: &Table, block: Option<BlockId>, out: &mut String) {
    match block {
        Some(id) => {
            let _ = writeln!(out, r#"<table data-block="{}">"#, id.0);
        }
        None => out.push_str("<table>\n"),
    }
    if let Some(head) = &table.head {
        out.push_str("<thead>");
        render_row(&head.cells, "th", None, out);
        out.push_str("</thead>\n");
    }

    // Without a thead the first body row is the header
    out.push_str("<tbody>\n");
    for (i, row) in table.body.iter().enumerate() {
        let tag = if i == 0 && table.head.is_none() { "th" } else { "td" };
        render_row(&row.cells, tag, Some(row.id.0), out);
        out.push('\n');
    }
    out.push_str("</tbody>\n</table>\n");
}

fn render_row(cells: &[Cell], tag: &str, row: Option<u64>, out: &mut String) {
    match row {
        Some(id) => {
            let _ = write!(out, r#"<tr data-row="{id}">"#);
        }
        None => out.push_str("<tr>"),
    }
    for cell in cells {
        match cell.width {
            Some(width) => {
                let _ = write!(
                    out,
                    r#"<{tag} style="width:{width}px;min-width:{width}px">{}</{tag}>"#,
                    escape(&cell.text)
                );
            }
            None => {
                let _ = write!(out, "<{tag}>{}</{tag}>", escape(&cell.text));
            }
        }
    }
    out.push_str("</tr>");
}
