//! Second-phase setup: the dedicated section page either joins the primary
//! flow or paginates on its own, with its trailing info block held aside

use crate::config::PaginationConfig;
use crate::document::{BlockId, BlockRole, PageId, PageRole, ReportDocument};
use crate::error::{PaginateError, Result};
use crate::pagination::cascade::{Deadline, PendingPage};

/// A prepared section cascade
#[derive(Debug, Clone, PartialEq)]
pub struct SectionPass {
    pub start: PendingPage,
    /// Trailing info block detached from the section page
    pub trailing: Option<BlockId>,
    /// The trailing block is re-attached at the end of the run of continuation
    /// pages following this page
    pub tail_anchor: PageId,
    pub merged: bool,
}

/// Move the dedicated section's content onto the last page of the primary
/// flow and remove the emptied section page.
///
/// Every lookup happens before the first mutation, so a structural failure
/// leaves the document untouched.
pub fn merge_into_flow(
    doc: &mut ReportDocument,
    primary: PageId,
    active_title: Option<BlockId>,
    config: &PaginationConfig,
) -> Result<SectionPass> {
    let section = doc
        .first_page_with_role(PageRole::Section)
        .ok_or(PaginateError::MissingPage { role: PageRole::Section })?;
    let target = doc.flow_tail(primary);
    doc.content(section)?;
    let number = doc
        .page(target)
        .map(|page| page.number)
        .ok_or(PaginateError::UnknownPage { page: target })?;
    doc.content(target)?;

    let trailing = detach_trailing(doc, section)?;
    let moved = doc.content(section)?.blocks.clone();
    doc.detach_blocks(section, &moved)?;
    doc.append_blocks(target, &moved)?;
    doc.remove_page(section);

    log::info!(
        "merged {} blocks from section page {} into flow page {}",
        moved.len(),
        section,
        target
    );

    let start = PendingPage::new(
        target,
        number,
        Deadline::Frame {
            margin: config.section_margin,
        },
    )
    .with_active_title(active_title);

    Ok(SectionPass {
        start,
        trailing,
        tail_anchor: primary,
        merged: true,
    })
}

/// Paginate the dedicated section page in place.
///
/// The initial active title is the section's leading title, if it has one.
pub fn prepare_section_pass(doc: &mut ReportDocument, config: &PaginationConfig) -> Result<SectionPass> {
    let section = doc
        .first_page_with_role(PageRole::Section)
        .ok_or(PaginateError::MissingPage { role: PageRole::Section })?;
    let number = doc
        .page(section)
        .map(|page| page.number)
        .ok_or(PaginateError::UnknownPage { page: section })?;
    doc.content(section)?;

    let trailing = detach_trailing(doc, section)?;
    let active_title = match doc.flow_blocks(section)?.first() {
        Some(&first) if doc.require_block(first)?.kind.is_section_title() => Some(first),
        _ => None,
    };

    let start = PendingPage::new(
        section,
        number,
        Deadline::Frame {
            margin: config.section_margin,
        },
    )
    .with_active_title(active_title);

    Ok(SectionPass {
        start,
        trailing,
        tail_anchor: section,
        merged: false,
    })
}

fn detach_trailing(doc: &mut ReportDocument, page: PageId) -> Result<Option<BlockId>> {
    let Some(id) = doc.find_role(page, BlockRole::TrailingInfo) else {
        return Ok(None);
    };
    doc.detach_blocks(page, &[id])?;
    Ok(Some(id))
}

/// Place the trailing block last on the final page of the flow starting at `anchor`
pub fn reattach_trailing(doc: &mut ReportDocument, trailing: BlockId, anchor: PageId) -> Result<PageId> {
    let tail = doc.flow_tail(anchor);
    doc.append_blocks(tail, &[trailing])?;
    log::debug!("trailing block {} placed on page {}", trailing, tail);
    Ok(tail)
}
