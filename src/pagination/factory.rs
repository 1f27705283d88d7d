//! Continuation pages and the section titles repeated onto them

use crate::document::{BlockId, PageId, PageRole, ReportDocument};
use crate::error::Result;

/// Insert an empty continuation page right after `source`
pub fn create_continuation_page(doc: &mut ReportDocument, source: PageId, number: u32) -> Result<PageId> {
    let page = doc.insert_page_after(source, number, PageRole::Continuation)?;
    log::debug!("created continuation page {} (number {}) after {}", page, number, source);
    Ok(page)
}

/// Copy of the active section title to open a continuation page.
///
/// Returns `None` when there is no active title or when the first incoming
/// block opens a section of its own. The copy drops the per-instance anchor
/// and remembers which title it repeats.
pub fn repeat_title(
    doc: &mut ReportDocument,
    active_title: Option<BlockId>,
    incoming: &[BlockId],
) -> Result<Option<BlockId>> {
    let (Some(active), Some(&first)) = (active_title, incoming.first()) else {
        return Ok(None);
    };
    if doc.require_block(first)?.kind.opens_section() {
        log::debug!("block {} opens a section, no title repeated", first);
        return Ok(None);
    }

    let source = doc.require_block(active)?.repeat_of.unwrap_or(active);
    let copy = doc.clone_block(active)?;
    if let Some(block) = doc.block_mut(copy) {
        block.repeat_of = Some(source);
        if let Some(title) = block.kind.title_mut() {
            title.anchor = None;
        }
    }
    Ok(Some(copy))
}

/// Fill a fresh continuation page: repeated title first, then the moved blocks in order
pub fn fill_continuation(
    doc: &mut ReportDocument,
    page: PageId,
    active_title: Option<BlockId>,
    moved: &[BlockId],
) -> Result<Option<BlockId>> {
    let repeated = repeat_title(doc, active_title, moved)?;
    if let Some(title) = repeated {
        doc.append_blocks(page, &[title])?;
    }
    doc.append_blocks(page, moved)?;
    Ok(repeated)
}
