//! Splitter: turn an overflow verdict into the ordered set of blocks leaving a page

use crate::config::PaginationConfig;
use crate::document::{BlockId, BlockKind, BlockRole, PageId, ReportDocument};
use crate::error::{PaginateError, Result};
use crate::layout::Measure;
use crate::pagination::detect::Overflow;

/// A table divided at a row boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSplit {
    /// Original table, left on the source page
    pub original: BlockId,
    /// Copy carrying the remaining rows
    pub continuation: BlockId,
    /// Copy of the caption preceding a bare table
    pub caption: Option<BlockId>,
    pub kept_rows: usize,
    pub moved_rows: usize,
}

/// Blocks removed from the source page, in the order they must appear on the next one
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitOutcome {
    pub moved: Vec<BlockId>,
    pub table: Option<TableSplit>,
}

impl SplitOutcome {
    pub fn is_empty(&self) -> bool {
        self.moved.is_empty()
    }
}

/// Apply an overflow verdict to `page`.
///
/// Moved blocks are detached from the page but stay in the arena; the caller
/// places them on a continuation page.
pub fn split_page<M: Measure + ?Sized>(
    doc: &mut ReportDocument,
    page: PageId,
    page_number: u32,
    candidates: &[BlockId],
    overflow: Overflow,
    measure: &M,
    config: &PaginationConfig,
) -> Result<SplitOutcome> {
    match overflow {
        Overflow::Fits => Ok(SplitOutcome::default()),
        Overflow::MoveFrom(index) => {
            let moved = candidates.get(index..).unwrap_or_default().to_vec();
            doc.detach_blocks(page, &moved)?;
            Ok(SplitOutcome { moved, table: None })
        }
        Overflow::Split { index, row } => {
            let Some(&original) = candidates.get(index) else {
                log::warn!("split index {index} out of range for page {page}");
                return Ok(SplitOutcome::default());
            };
            let table = split_table(doc, page, page_number, original, row, measure, config)?;

            let rest = candidates.get(index + 1..).unwrap_or_default();
            doc.detach_blocks(page, rest)?;

            let mut moved = Vec::with_capacity(rest.len() + 2);
            moved.extend(table.caption);
            moved.push(table.continuation);
            moved.extend_from_slice(rest);
            Ok(SplitOutcome {
                moved,
                table: Some(table),
            })
        }
    }
}

/// Divide a table before data row `row`, duplicating its header.
///
/// Header widths are pinned from the measured columns before the copy is made,
/// so both fragments keep identical column geometry.
fn split_table<M: Measure + ?Sized>(
    doc: &mut ReportDocument,
    page: PageId,
    page_number: u32,
    original: BlockId,
    row: usize,
    measure: &M,
    config: &PaginationConfig,
) -> Result<TableSplit> {
    let widths = {
        let table = doc
            .require_block(original)?
            .kind
            .table()
            .ok_or(PaginateError::MissingBlock { block: original })?;
        measure.column_widths(table)
    };
    let header_row_id = doc.alloc_row_id();

    let block = doc
        .block_mut(original)
        .ok_or(PaginateError::MissingBlock { block: original })?;
    let (continuation_kind, kept_rows, moved_rows) = match &mut block.kind {
        BlockKind::Table { caption, table } => {
            table.pin_column_widths(&widths);
            let tail = table.split_off_rows(row, header_row_id);
            let copy = caption.as_mut().map(|caption| {
                caption.mark_split(page_number, config.group_key_len);
                let mut copy = caption.clone();
                copy.anchor = None;
                copy.mark_split(page_number + 1, config.group_key_len);
                copy
            });
            let counts = (table.data_row_count(), tail.data_row_count());
            (
                BlockKind::Table {
                    caption: copy,
                    table: tail,
                },
                counts.0,
                counts.1,
            )
        }
        BlockKind::BareTable(table) => {
            table.pin_column_widths(&widths);
            let tail = table.split_off_rows(row, header_row_id);
            let counts = (table.data_row_count(), tail.data_row_count());
            (BlockKind::BareTable(tail), counts.0, counts.1)
        }
        _ => return Err(PaginateError::MissingBlock { block: original }),
    };

    let caption = match continuation_kind {
        BlockKind::BareTable(_) => copy_preceding_caption(doc, page, original, page_number, config)?,
        _ => None,
    };
    let continuation = doc.insert_block(continuation_kind, BlockRole::Flow);

    log::debug!(
        "split table {} on page {}: {} rows kept, {} moved to {}",
        original,
        page,
        kept_rows,
        moved_rows,
        continuation
    );

    Ok(TableSplit {
        original,
        continuation,
        caption,
        kept_rows,
        moved_rows,
    })
}

/// For a bare table, find the caption sibling standing before it (within the
/// same section), mark it and make the copy that will head the continuation.
fn copy_preceding_caption(
    doc: &mut ReportDocument,
    page: PageId,
    table: BlockId,
    page_number: u32,
    config: &PaginationConfig,
) -> Result<Option<BlockId>> {
    let found = {
        let content = doc.content(page)?;
        let pos = content
            .position(table)
            .ok_or(PaginateError::MissingBlock { block: table })?;
        let mut found = None;
        for &id in content.blocks[..pos].iter().rev() {
            let kind = &doc.require_block(id)?.kind;
            if kind.is_caption() {
                found = Some(id);
                break;
            }
            if kind.is_section_title() {
                break;
            }
        }
        found
    };

    let Some(caption) = found else {
        return Ok(None);
    };

    if let Some(title) = doc.block_mut(caption).and_then(|b| b.kind.title_mut()) {
        title.mark_split(page_number, config.group_key_len);
    }
    let copy = doc.clone_block(caption)?;
    if let Some(title) = doc.block_mut(copy).and_then(|b| b.kind.title_mut()) {
        title.anchor = None;
        title.mark_split(page_number + 1, config.group_key_len);
    }
    Ok(Some(copy))
}
