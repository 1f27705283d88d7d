//! First-phase setup: paginate the primary page below its marked section title

use crate::config::PaginationConfig;
use crate::document::{BlockId, BlockRole, PageId, PageRole, ReportDocument};
use crate::error::{PaginateError, Result};
use crate::pagination::cascade::{Deadline, PendingPage};

/// Locate the primary page and the section title that anchors its cascade
pub fn prepare_primary_pass(doc: &ReportDocument, config: &PaginationConfig) -> Result<PendingPage> {
    let primary = doc
        .first_page_with_role(PageRole::Primary)
        .ok_or(PaginateError::MissingPage { role: PageRole::Primary })?;
    let number = doc
        .page(primary)
        .map(|page| page.number)
        .ok_or(PaginateError::UnknownPage { page: primary })?;

    let (title, candidates, marker) = section_candidates(doc, primary, config)?;
    log::debug!(
        "primary pass on page {}: title {}, {} candidates",
        primary,
        title,
        candidates.len()
    );
    if let Some(marker) = marker {
        log::debug!("primary section bounded by marker block {marker}");
    }

    Ok(PendingPage::new(
        primary,
        number,
        Deadline::BottomFixed {
            marker,
            fallback_margin: config.primary_fallback_margin,
        },
    )
    .with_active_title(Some(title))
    .with_candidates(candidates))
}

/// The marked section title and the flow blocks after it, up to the
/// bottom-fixed block. Without a bottom-fixed block, the first flow block
/// matching a deadline marker ends the candidates and is returned as the
/// section's lower bound.
fn section_candidates(
    doc: &ReportDocument,
    page: PageId,
    config: &PaginationConfig,
) -> Result<(BlockId, Vec<BlockId>, Option<BlockId>)> {
    let content = doc.content(page)?;

    let position = content.blocks.iter().position(|&id| {
        doc.block(id)
            .filter(|block| block.kind.is_section_title())
            .and_then(|block| block.kind.title())
            .map(|title| {
                config
                    .section_markers
                    .iter()
                    .any(|marker| title.matches_marker(marker))
            })
            .unwrap_or(false)
    });
    let Some(position) = position else {
        return Err(PaginateError::MissingSectionTitle {
            markers: config.section_markers.clone(),
        });
    };

    let has_bottom_fixed = content
        .blocks
        .iter()
        .filter_map(|&id| doc.block(id))
        .any(|block| block.role == BlockRole::BottomFixed);

    let mut candidates = Vec::new();
    let mut marker = None;
    for &id in &content.blocks[position + 1..] {
        let block = doc.require_block(id)?;
        match block.role {
            BlockRole::BottomFixed => break,
            BlockRole::Flow => {
                let is_marker = !has_bottom_fixed
                    && config
                        .deadline_markers
                        .iter()
                        .any(|text| block.kind.contains_text(text));
                if is_marker {
                    marker = Some(id);
                    break;
                }
                candidates.push(id);
            }
            BlockRole::TrailingInfo => {}
        }
    }

    Ok((content.blocks[position], candidates, marker))
}
