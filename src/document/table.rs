//! Table structure and row-boundary splitting

use smallvec::SmallVec;
use std::fmt;

/// Unique identifier for a table row
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowId(pub u64);

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A table cell
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Cell {
    pub text: String,
    /// Explicit width constraint, set once the column geometry has been pinned
    pub width: Option<f32>,
}

impl Cell {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            width: None,
        }
    }
}

pub type Cells = SmallVec<[Cell; 8]>;

/// A table row
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub id: RowId,
    pub cells: Cells,
}

/// Explicit header row group
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HeaderRow {
    pub cells: Cells,
}

/// A table: an optional header group followed by body rows.
///
/// Without a header group the first body row acts as the header.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub head: Option<HeaderRow>,
    pub body: Vec<Row>,
}

impl Table {
    /// Index of the first data row in `body`
    pub fn data_start(&self) -> usize {
        if self.head.is_some() {
            0
        } else {
            self.body.len().min(1)
        }
    }

    /// Rows holding data, excluding an implicit header row
    pub fn data_rows(&self) -> &[Row] {
        &self.body[self.data_start()..]
    }

    pub fn data_row_count(&self) -> usize {
        self.body.len() - self.data_start()
    }

    /// Whether any header (explicit group or implicit first row) exists
    pub fn has_header(&self) -> bool {
        self.head.is_some() || !self.body.is_empty()
    }

    pub fn column_count(&self) -> usize {
        let header = self.header_cells().map(|cells| cells.len()).unwrap_or(0);
        self.body
            .iter()
            .map(|row| row.cells.len())
            .max()
            .unwrap_or(0)
            .max(header)
    }

    /// Cells of the effective header row
    pub fn header_cells(&self) -> Option<&Cells> {
        match &self.head {
            Some(head) => Some(&head.cells),
            None => self.body.first().map(|row| &row.cells),
        }
    }

    fn header_cells_mut(&mut self) -> Option<&mut Cells> {
        match &mut self.head {
            Some(head) => Some(&mut head.cells),
            None => self.body.first_mut().map(|row| &mut row.cells),
        }
    }

    /// Column widths pinned on the header, if every header cell carries one
    pub fn pinned_widths(&self) -> Option<SmallVec<[f32; 8]>> {
        let cells = self.header_cells()?;
        if cells.is_empty() {
            return None;
        }
        cells.iter().map(|cell| cell.width).collect()
    }

    /// Copy measured widths onto the header cells as explicit constraints
    pub fn pin_column_widths(&mut self, widths: &[f32]) {
        if let Some(cells) = self.header_cells_mut() {
            for (cell, width) in cells.iter_mut().zip(widths) {
                cell.width = Some(*width);
            }
        }
    }

    /// Split after `split_row` data rows.
    ///
    /// `self` keeps its header and the first `split_row` data rows. The returned
    /// table carries a copy of the header and the remaining data rows. An
    /// implicit header row is copied under `header_row_id` so the two tables never
    /// share a row identity.
    pub fn split_off_rows(&mut self, split_row: usize, header_row_id: RowId) -> Table {
        let start = self.data_start();
        let at = (start + split_row).min(self.body.len());
        let tail = self.body.split_off(at);

        let mut body = Vec::with_capacity(tail.len() + start);
        if start > 0 {
            if let Some(header) = self.body.first() {
                body.push(Row {
                    id: header_row_id,
                    cells: header.cells.clone(),
                });
            }
        }
        body.extend(tail);

        Table {
            head: self.head.clone(),
            body,
        }
    }
}
