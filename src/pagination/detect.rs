//! Overflow detection: find the first block crossing a page's deadline

use crate::config::PaginationConfig;
use crate::document::{Block, BlockId, ReportDocument, Table};
use crate::error::{PaginateError, Result};
use crate::layout::{BlockBox, Measure, PageGeometry};

/// What to do about a page's content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overflow {
    /// Everything fits
    Fits,
    /// Move the candidate at this index, and everything after it, to a new page
    MoveFrom(usize),
    /// Split the table at `index` before data row `row`
    Split { index: usize, row: usize },
}

/// Detector verdict plus the section title in effect at the overflow point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detection {
    pub overflow: Overflow,
    pub active_title: Option<BlockId>,
}

/// Walks a page's candidates in order against measured geometry
pub struct Detector<'a, M: ?Sized> {
    pub doc: &'a ReportDocument,
    pub measure: &'a M,
    pub config: &'a PaginationConfig,
}

impl<'a, M: Measure + ?Sized> Detector<'a, M> {
    pub fn new(doc: &'a ReportDocument, measure: &'a M, config: &'a PaginationConfig) -> Self {
        Self { doc, measure, config }
    }

    /// Find the first candidate crossing `deadline`.
    ///
    /// Candidates before `anchor` are titles repeated onto this page; the
    /// candidate at `anchor` is the first one a whole-block move may not
    /// relocate, so every page keeps at least one block of its own.
    pub fn detect(
        &self,
        candidates: &[BlockId],
        geometry: &PageGeometry,
        deadline: f32,
        anchor: usize,
        mut active_title: Option<BlockId>,
    ) -> Result<Detection> {
        let limit = deadline - self.config.overflow_margin;

        for (index, &id) in candidates.iter().enumerate() {
            let block = self.doc.require_block(id)?;
            if block.kind.is_section_title() {
                active_title = Some(id);
            }

            let bbox = geometry
                .get(id)
                .ok_or(PaginateError::MissingBlock { block: id })?;
            if bbox.bottom() <= limit {
                continue;
            }

            log::debug!(
                "block {} at index {} overflows: bottom {} > limit {}",
                id,
                index,
                bbox.bottom(),
                limit
            );

            let overflow = match block.kind.table() {
                Some(table) => self.table_overflow(index, bbox, block, table, deadline, candidates.len(), anchor),
                None => move_whole(index, candidates.len(), anchor),
            };
            return Ok(Detection {
                overflow,
                active_title,
            });
        }

        Ok(Detection {
            overflow: Overflow::Fits,
            active_title,
        })
    }

    fn table_overflow(
        &self,
        index: usize,
        bbox: &BlockBox,
        block: &Block,
        table: &Table,
        deadline: f32,
        len: usize,
        anchor: usize,
    ) -> Overflow {
        let limit = deadline - self.config.overflow_margin;
        let caption_height = block
            .kind
            .inner_caption()
            .map(|caption| self.measure.title_height(caption))
            .unwrap_or(0.0);

        if bbox.top + caption_height > limit {
            log::debug!("caption of block {} crosses the deadline", block.id);
            return move_whole(index, len, anchor);
        }

        let header_height = if table.has_header() {
            self.measure.header_height(table)
        } else {
            self.config.default_header_height
        };

        let available = deadline - (bbox.top + caption_height);
        if available < header_height * self.config.header_space_factor {
            log::debug!(
                "block {}: {} below caption, header needs {}",
                block.id,
                available,
                header_height
            );
            return move_whole(index, len, anchor);
        }

        let mut bottom = bbox.top + caption_height + header_height;
        let crossing = table.data_rows().iter().position(|row| {
            bottom += self.measure.row_height(table, row);
            bottom > deadline
        });

        match crossing {
            Some(row) if row > 0 => {
                log::debug!("block {}: split before data row {}", block.id, row);
                Overflow::Split { index, row }
            }
            _ => move_whole(index, len, anchor),
        }
    }
}

/// Relocate the block at `index`, unless it is the page's first movable block,
/// in which case it stays and the next block moves instead
fn move_whole(index: usize, len: usize, anchor: usize) -> Overflow {
    if index > anchor {
        return Overflow::MoveFrom(index);
    }
    let keep = index.max(anchor);
    if keep + 1 < len {
        log::debug!("keeping first block at index {keep} despite overflow");
        Overflow::MoveFrom(keep + 1)
    } else {
        Overflow::Fits
    }
}
