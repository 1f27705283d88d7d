//! Height estimation from font metrics, for hosts without a layout engine

use crate::document::{Block, BlockKind, Page, Row, Table, Title};
use crate::layout::font::FontMetrics;
use crate::layout::measure::Measure;
use smallvec::SmallVec;
use unicode_linebreak::{linebreaks, BreakOpportunity};
use unicode_segmentation::UnicodeSegmentation;

/// Estimates rendered heights by wrapping text at Unicode break opportunities
#[derive(Debug, Clone)]
pub struct TextMetricsMeasure {
    pub font: FontMetrics,
    /// Height of each page's bordered frame
    pub frame_height: f32,
    /// Width of the content region
    pub content_width: f32,
    /// Offset of the content region within the frame
    pub content_top: f32,
    /// Vertical gap after each block
    pub block_spacing: f32,
    /// Padding around the text of each table cell
    pub cell_padding: f32,
    /// Size of section titles relative to body text
    pub section_scale: f32,
    /// Size of captions relative to body text
    pub caption_scale: f32,
}

impl Default for TextMetricsMeasure {
    fn default() -> Self {
        Self {
            font: FontMetrics::default(),
            frame_height: 960.0,
            content_width: 680.0,
            content_top: 40.0,
            block_spacing: 12.0,
            cell_padding: 4.0,
            section_scale: 1.4,
            caption_scale: 1.2,
        }
    }
}

impl TextMetricsMeasure {
    pub fn new(font: FontMetrics, frame_height: f32, content_width: f32) -> Self {
        Self {
            font,
            frame_height,
            content_width,
            ..Self::default()
        }
    }

    /// Count the lines `text` wraps into within `max_width`
    pub fn line_count(&self, text: &str, max_width: f32, font: &FontMetrics) -> usize {
        if text.is_empty() {
            return 1;
        }

        let max_width = max_width.max(font.default_width);
        let mut lines = 1;
        let mut x: f32 = 0.0;
        let mut start = 0;

        for (end, opportunity) in linebreaks(text) {
            let segment = &text[start..end];
            start = end;

            let visible = segment.trim_end();
            let visible_width = font.text_width(visible);

            if x > 0.0 && x + visible_width > max_width {
                lines += 1;
                x = 0.0;
            }

            if visible_width > max_width {
                // no break opportunity inside the segment: wrap between graphemes
                for grapheme in visible.graphemes(true) {
                    let w = font.grapheme_width(grapheme);
                    if x > 0.0 && x + w > max_width {
                        lines += 1;
                        x = 0.0;
                    }
                    x += w;
                }
                x += font.text_width(&segment[visible.len()..]);
            } else {
                x += font.text_width(segment);
            }

            if opportunity == BreakOpportunity::Mandatory && end < text.len() {
                lines += 1;
                x = 0.0;
            }
        }

        lines
    }

    fn text_height(&self, text: &str, font: &FontMetrics) -> f32 {
        self.line_count(text, self.content_width, font) as f32 * font.line_height
    }

    fn section_height(&self, title: &Title) -> f32 {
        self.text_height(&title.text, &self.font.scaled(self.section_scale))
    }

    fn table_height(&self, table: &Table) -> f32 {
        let rows: f32 = table
            .data_rows()
            .iter()
            .map(|row| self.row_height(table, row))
            .sum();
        let header = if table.has_header() {
            self.header_height(table)
        } else {
            0.0
        };
        header + rows
    }

    fn cells_height<'a>(&self, table: &Table, texts: impl Iterator<Item = &'a str>) -> f32 {
        let widths = self.column_widths(table);
        let lines = texts
            .enumerate()
            .map(|(col, text)| {
                let width = widths.get(col).copied().unwrap_or(self.content_width);
                self.line_count(text, width - 2.0 * self.cell_padding, &self.font)
            })
            .max()
            .unwrap_or(1);
        lines as f32 * self.font.line_height + 2.0 * self.cell_padding
    }
}

impl Measure for TextMetricsMeasure {
    fn block_height(&self, block: &Block) -> f32 {
        let content = match &block.kind {
            BlockKind::SectionTitle(title) => self.section_height(title),
            BlockKind::Caption(title) => self.title_height(title),
            BlockKind::Paragraph { text } => self.text_height(text, &self.font),
            BlockKind::Table { caption, table } => {
                caption.as_ref().map(|c| self.title_height(c)).unwrap_or(0.0) + self.table_height(table)
            }
            BlockKind::BareTable(table) => self.table_height(table),
            BlockKind::Container { title, text } => {
                let title = title.as_ref().map(|t| self.section_height(t)).unwrap_or(0.0);
                let body = if text.is_empty() {
                    0.0
                } else {
                    self.text_height(text, &self.font)
                };
                title + body
            }
        };
        content + self.block_spacing
    }

    fn title_height(&self, title: &Title) -> f32 {
        self.text_height(&title.text, &self.font.scaled(self.caption_scale))
    }

    fn header_height(&self, table: &Table) -> f32 {
        match table.header_cells() {
            Some(cells) => self.cells_height(table, cells.iter().map(|c| c.text.as_str())),
            None => 0.0,
        }
    }

    fn row_height(&self, table: &Table, row: &Row) -> f32 {
        self.cells_height(table, row.cells.iter().map(|c| c.text.as_str()))
    }

    fn column_widths(&self, table: &Table) -> SmallVec<[f32; 8]> {
        if let Some(pinned) = table.pinned_widths() {
            return pinned;
        }
        let columns = table.column_count().max(1);
        SmallVec::from_elem(self.content_width / columns as f32, columns)
    }

    fn frame_height(&self, _page: &Page) -> f32 {
        self.frame_height
    }

    fn content_top(&self, _page: &Page) -> f32 {
        self.content_top
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{BlockId, Cell, HeaderRow, RowId};
    use smallvec::smallvec;

    fn fixed_font() -> FontMetrics {
        FontMetrics::new(10.0, vec![8.0; 128], 8.0)
    }

    fn measure() -> TextMetricsMeasure {
        TextMetricsMeasure {
            block_spacing: 0.0,
            cell_padding: 0.0,
            ..TextMetricsMeasure::new(fixed_font(), 960.0, 40.0)
        }
    }

    #[test]
    fn test_empty_text_is_one_line() {
        let m = measure();
        assert_eq!(m.line_count("", 40.0, &m.font), 1);
    }

    #[test]
    fn test_wrap_at_spaces() {
        let m = measure();
        // With 8px per char, 40px width = 5 chars per line
        assert_eq!(m.line_count("Hello", 40.0, &m.font), 1);
        assert_eq!(m.line_count("Hello World", 40.0, &m.font), 2);
    }

    #[test]
    fn test_explicit_newline() {
        let m = measure();
        assert_eq!(m.line_count("Hi\nthere", 1000.0, &m.font), 2);
    }

    #[test]
    fn test_long_word_breaks_between_graphemes() {
        let m = measure();
        assert_eq!(m.line_count("abcdefghijkl", 40.0, &m.font), 3);
    }

    #[test]
    fn test_paragraph_height() {
        let m = measure();
        let block = Block::new(
            BlockId(0),
            BlockKind::Paragraph {
                text: "Hello World".to_string(),
            },
        );
        assert_eq!(m.block_height(&block), 20.0);
    }

    #[test]
    fn test_row_height_uses_tallest_cell() {
        let mut m = measure();
        m.content_width = 80.0;
        let table = Table {
            head: Some(HeaderRow {
                cells: smallvec![Cell::new("A"), Cell::new("B")],
            }),
            body: vec![Row {
                id: RowId(0),
                cells: smallvec![Cell::new("x"), Cell::new("abcdefghijkl")],
            }],
        };

        assert_eq!(m.column_widths(&table).as_slice(), &[40.0, 40.0]);
        assert_eq!(m.header_height(&table), 10.0);
        assert_eq!(m.row_height(&table, &table.body[0]), 30.0);
    }
}
