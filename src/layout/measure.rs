//! Measurement seam between the pagination cascade and a layout engine

use crate::document::{Block, BlockId, BlockKind, BlockRole, Page, PageId, ReportDocument, Row, RowId, Table, Title};
use crate::error::{PaginateError, Result};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// Source of element geometry.
///
/// In the browser this is backed by committed layout through host callbacks
/// (`wasm::HostMeasure`); elsewhere by an estimator. Heights are in layout units.
pub trait Measure {
    /// Height of a block as it renders inside a content region
    fn block_height(&self, block: &Block) -> f32;

    /// Height of a caption inside a table wrapper
    fn title_height(&self, title: &Title) -> f32;

    /// Height of the table's header (explicit group or implicit first row)
    fn header_height(&self, table: &Table) -> f32;

    /// Height of one body row of `table`
    fn row_height(&self, table: &Table, row: &Row) -> f32;

    /// Rendered width of each column
    fn column_widths(&self, table: &Table) -> SmallVec<[f32; 8]>;

    /// Height of the page's bordered frame
    fn frame_height(&self, page: &Page) -> f32;

    /// Y offset at which the content region starts within the frame
    fn content_top(&self, _page: &Page) -> f32 {
        0.0
    }
}

/// Position of one block inside its page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockBox {
    pub id: BlockId,
    pub top: f32,
    pub height: f32,
}

impl BlockBox {
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

/// Measured layout of one page
#[derive(Debug, Clone, PartialEq)]
pub struct PageGeometry {
    pub frame_height: f32,
    /// Flow and trailing blocks, stacked in content order
    pub boxes: Vec<BlockBox>,
    /// Top of the bottom-fixed block, pinned to the frame bottom
    pub bottom_fixed_top: Option<f32>,
}

impl PageGeometry {
    pub fn get(&self, id: BlockId) -> Option<&BlockBox> {
        self.boxes.iter().find(|b| b.id == id)
    }

    /// Bottom of the last stacked block
    pub fn content_bottom(&self) -> f32 {
        self.boxes.last().map(BlockBox::bottom).unwrap_or(0.0)
    }
}

/// Lay a page's content out top to bottom
pub fn measure_page<M: Measure + ?Sized>(doc: &ReportDocument, page: PageId, measure: &M) -> Result<PageGeometry> {
    let page_ref = doc.page(page).ok_or(PaginateError::UnknownPage { page })?;
    let content = doc.content(page)?;
    let frame_height = measure.frame_height(page_ref);

    let mut y = measure.content_top(page_ref);
    let mut boxes = Vec::with_capacity(content.blocks.len());
    let mut bottom_fixed_top = None;

    for &id in &content.blocks {
        let block = doc.require_block(id)?;
        let height = measure.block_height(block);
        if block.role == BlockRole::BottomFixed {
            bottom_fixed_top.get_or_insert(frame_height - height);
            continue;
        }
        boxes.push(BlockBox { id, top: y, height });
        y += height;
    }

    Ok(PageGeometry {
        frame_height,
        boxes,
        bottom_fixed_top,
    })
}

/// Explicit geometry: per-block and per-row heights with uniform defaults.
///
/// Table blocks without an explicit height are measured from their parts, so
/// they keep reporting correct heights after being split.
#[derive(Debug, Clone)]
pub struct FixedMeasure {
    block_heights: FxHashMap<BlockId, f32>,
    row_heights: FxHashMap<RowId, f32>,
    frame_heights: FxHashMap<PageId, f32>,
    pub default_block_height: f32,
    pub default_row_height: f32,
    pub header_height: f32,
    pub title_height: f32,
    pub frame_height: f32,
    pub content_top: f32,
    pub column_width: f32,
}

impl Default for FixedMeasure {
    fn default() -> Self {
        Self {
            block_heights: FxHashMap::default(),
            row_heights: FxHashMap::default(),
            frame_heights: FxHashMap::default(),
            default_block_height: 40.0,
            default_row_height: 30.0,
            header_height: 30.0,
            title_height: 24.0,
            frame_height: 960.0,
            content_top: 0.0,
            column_width: 100.0,
        }
    }
}

impl FixedMeasure {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_block_height(mut self, id: BlockId, height: f32) -> Self {
        self.block_heights.insert(id, height);
        self
    }

    pub fn with_row_height(mut self, id: RowId, height: f32) -> Self {
        self.row_heights.insert(id, height);
        self
    }

    pub fn with_frame_height(mut self, height: f32) -> Self {
        self.frame_height = height;
        self
    }

    pub fn with_page_frame_height(mut self, page: PageId, height: f32) -> Self {
        self.frame_heights.insert(page, height);
        self
    }

    pub fn set_block_height(&mut self, id: BlockId, height: f32) {
        self.block_heights.insert(id, height);
    }

    fn table_height(&self, table: &Table) -> f32 {
        let rows: f32 = table.data_rows().iter().map(|row| self.row_height(table, row)).sum();
        self.header_height(table) + rows
    }
}

impl Measure for FixedMeasure {
    fn block_height(&self, block: &Block) -> f32 {
        if let Some(height) = self.block_heights.get(&block.id) {
            return *height;
        }
        match &block.kind {
            BlockKind::Table { caption, table } => {
                caption.as_ref().map(|c| self.title_height(c)).unwrap_or(0.0) + self.table_height(table)
            }
            BlockKind::BareTable(table) => self.table_height(table),
            _ => self.default_block_height,
        }
    }

    fn title_height(&self, _title: &Title) -> f32 {
        self.title_height
    }

    fn header_height(&self, table: &Table) -> f32 {
        if table.head.is_some() {
            return self.header_height;
        }
        table
            .body
            .first()
            .map(|row| self.row_height(table, row))
            .unwrap_or(0.0)
    }

    fn row_height(&self, _table: &Table, row: &Row) -> f32 {
        self.row_heights
            .get(&row.id)
            .copied()
            .unwrap_or(self.default_row_height)
    }

    fn column_widths(&self, table: &Table) -> SmallVec<[f32; 8]> {
        table
            .pinned_widths()
            .unwrap_or_else(|| SmallVec::from_elem(self.column_width, table.column_count()))
    }

    fn frame_height(&self, page: &Page) -> f32 {
        self.frame_heights
            .get(&page.id)
            .copied()
            .unwrap_or(self.frame_height)
    }

    fn content_top(&self, _page: &Page) -> f32 {
        self.content_top
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{BlockKind, PageRole, ReportDocument};

    fn para(text: &str) -> BlockKind {
        BlockKind::Paragraph {
            text: text.to_string(),
        }
    }

    #[test]
    fn test_blocks_stack_from_content_top() {
        let mut doc = ReportDocument::new();
        let page = doc.push_page(1, PageRole::Primary);
        let a = doc.push_block(page, para("a"), BlockRole::Flow).unwrap();
        let b = doc.push_block(page, para("b"), BlockRole::Flow).unwrap();

        let mut measure = FixedMeasure::new().with_block_height(a, 100.0).with_block_height(b, 50.0);
        measure.content_top = 20.0;

        let geometry = measure_page(&doc, page, &measure).unwrap();
        assert_eq!(geometry.get(a).unwrap().top, 20.0);
        assert_eq!(geometry.get(b).unwrap().top, 120.0);
        assert_eq!(geometry.content_bottom(), 170.0);
        assert_eq!(geometry.bottom_fixed_top, None);
    }

    #[test]
    fn test_bottom_fixed_pins_to_frame_bottom() {
        let mut doc = ReportDocument::new();
        let page = doc.push_page(1, PageRole::Primary);
        let a = doc.push_block(page, para("a"), BlockRole::Flow).unwrap();
        let fixed = doc.push_block(page, para("footer"), BlockRole::BottomFixed).unwrap();
        let measure = FixedMeasure::new()
            .with_frame_height(900.0)
            .with_block_height(fixed, 150.0);

        let geometry = measure_page(&doc, page, &measure).unwrap();
        assert_eq!(geometry.bottom_fixed_top, Some(750.0));
        assert_eq!(geometry.boxes.len(), 1);
        assert_eq!(geometry.boxes[0].id, a);
    }

    #[test]
    fn test_table_height_from_parts() {
        let json = r#"{"pages": [{"role": "primary", "blocks": [
            {"kind": "table", "caption": {"text": "SNV"}, "table": {"head": ["a"], "rows": [["1"], ["2"], ["3"]]}},
            {"kind": "bareTable", "table": {"rows": [["h"], ["1"], ["2"]]}}
        ]}]}"#;
        let doc = ReportDocument::from_json(json).unwrap();
        let page = doc.page_order()[0];
        let ids = doc.page(page).unwrap().blocks().to_vec();
        let measure = FixedMeasure::new();

        // caption 24 + header 30 + 3 rows of 30
        assert_eq!(measure.block_height(doc.block(ids[0]).unwrap()), 144.0);
        // implicit header row 30 + 2 data rows of 30
        assert_eq!(measure.block_height(doc.block(ids[1]).unwrap()), 90.0);
    }

    #[test]
    fn test_hollow_page_fails_measurement() {
        let mut doc = ReportDocument::new();
        let page = doc.push_hollow_page(1, PageRole::Section);
        let err = measure_page(&doc, page, &FixedMeasure::new()).unwrap_err();
        assert!(err.is_structural());
    }
}
