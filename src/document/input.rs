//! Serializable report description, used both to load a report and to export
//! the paginated result

use crate::document::{
    Block, BlockKind, BlockRole, Cell, Cells, HeaderRow, PageRole, ReportDocument, Row, SplitMark,
    Table, Title,
};
use crate::error::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportInput {
    pub pages: Vec<PageInput>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInput {
    pub role: PageRole,
    /// Defaults to the 1-based page position
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<u32>,
    /// `None` models a page rendered without its content region
    pub blocks: Option<Vec<BlockInput>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum BlockInput {
    SectionTitle(TitleInput),
    Caption(TitleInput),
    Paragraph {
        text: String,
    },
    Table {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<TitleInput>,
        table: TableInput,
    },
    BareTable {
        table: TableInput,
    },
    Container {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<TitleInput>,
        #[serde(default)]
        text: String,
    },
    BottomFixed {
        #[serde(default)]
        text: String,
    },
    TrailingInfo {
        #[serde(default)]
        text: String,
    },
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleInput {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split_group: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split_index: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableInput {
    /// Explicit header row group; without it the first row is the header
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head: Option<Vec<String>>,
    #[serde(default)]
    pub rows: Vec<Vec<String>>,
    /// Pinned header column widths
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widths: Option<Vec<f32>>,
}

impl From<TitleInput> for Title {
    fn from(input: TitleInput) -> Self {
        let split = match (input.split_group, input.split_index) {
            (Some(group), Some(index)) => Some(SplitMark { group, index }),
            _ => None,
        };
        Title {
            text: input.text,
            anchor: input.anchor,
            split,
        }
    }
}

impl From<&Title> for TitleInput {
    fn from(title: &Title) -> Self {
        TitleInput {
            text: title.text.clone(),
            anchor: title.anchor.clone(),
            split_group: title.split.as_ref().map(|mark| mark.group.clone()),
            split_index: title.split.as_ref().map(|mark| mark.index),
        }
    }
}

fn cells(texts: Vec<String>) -> Cells {
    texts.into_iter().map(Cell::new).collect()
}

impl TableInput {
    fn into_table(self, doc: &mut ReportDocument) -> Table {
        let body = self
            .rows
            .into_iter()
            .map(|row| Row {
                id: doc.alloc_row_id(),
                cells: cells(row),
            })
            .collect();

        let mut table = Table {
            head: self.head.map(|head| HeaderRow { cells: cells(head) }),
            body,
        };
        if let Some(widths) = self.widths {
            table.pin_column_widths(&widths);
        }
        table
    }

    fn from_table(table: &Table) -> Self {
        let texts = |cells: &Cells| -> Vec<String> { cells.iter().map(|cell| cell.text.clone()).collect() };
        TableInput {
            head: table.head.as_ref().map(|head| texts(&head.cells)),
            rows: table.body.iter().map(|row| texts(&row.cells)).collect(),
            widths: table.pinned_widths().map(|widths| widths.into_vec()),
        }
    }
}

impl BlockInput {
    fn into_parts(self, doc: &mut ReportDocument) -> (BlockKind, BlockRole) {
        match self {
            BlockInput::SectionTitle(title) => (BlockKind::SectionTitle(title.into()), BlockRole::Flow),
            BlockInput::Caption(title) => (BlockKind::Caption(title.into()), BlockRole::Flow),
            BlockInput::Paragraph { text } => (BlockKind::Paragraph { text }, BlockRole::Flow),
            BlockInput::Table { caption, table } => (
                BlockKind::Table {
                    caption: caption.map(Title::from),
                    table: table.into_table(doc),
                },
                BlockRole::Flow,
            ),
            BlockInput::BareTable { table } => (BlockKind::BareTable(table.into_table(doc)), BlockRole::Flow),
            BlockInput::Container { title, text } => (
                BlockKind::Container {
                    title: title.map(Title::from),
                    text,
                },
                BlockRole::Flow,
            ),
            BlockInput::BottomFixed { text } => (BlockKind::Paragraph { text }, BlockRole::BottomFixed),
            BlockInput::TrailingInfo { text } => (BlockKind::Paragraph { text }, BlockRole::TrailingInfo),
        }
    }

    fn from_block(block: &Block) -> Self {
        match (&block.kind, block.role) {
            (BlockKind::Paragraph { text }, BlockRole::BottomFixed) => BlockInput::BottomFixed { text: text.clone() },
            (BlockKind::Paragraph { text }, BlockRole::TrailingInfo) => BlockInput::TrailingInfo { text: text.clone() },
            (BlockKind::SectionTitle(title), _) => BlockInput::SectionTitle(title.into()),
            (BlockKind::Caption(title), _) => BlockInput::Caption(title.into()),
            (BlockKind::Paragraph { text }, _) => BlockInput::Paragraph { text: text.clone() },
            (BlockKind::Table { caption, table }, _) => BlockInput::Table {
                caption: caption.as_ref().map(TitleInput::from),
                table: TableInput::from_table(table),
            },
            (BlockKind::BareTable(table), _) => BlockInput::BareTable {
                table: TableInput::from_table(table),
            },
            (BlockKind::Container { title, text }, _) => BlockInput::Container {
                title: title.as_ref().map(TitleInput::from),
                text: text.clone(),
            },
        }
    }
}

impl ReportInput {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl ReportDocument {
    /// Build the arena from a report description
    pub fn from_input(input: ReportInput) -> Result<Self> {
        let mut doc = ReportDocument::new();
        for (idx, page_input) in input.pages.into_iter().enumerate() {
            let number = page_input.number.unwrap_or(idx as u32 + 1);
            let Some(blocks) = page_input.blocks else {
                doc.push_hollow_page(number, page_input.role);
                continue;
            };

            let page = doc.push_page(number, page_input.role);
            for block in blocks {
                let (kind, role) = block.into_parts(&mut doc);
                doc.push_block(page, kind, role)?;
            }
        }
        Ok(doc)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_input(ReportInput::from_json(json)?)
    }

    /// Describe the current page layout
    pub fn to_input(&self) -> ReportInput {
        let pages = self
            .pages()
            .map(|page| PageInput {
                role: page.role,
                number: Some(page.number),
                blocks: page.content.as_ref().map(|content| {
                    content
                        .blocks
                        .iter()
                        .filter_map(|id| self.block(*id))
                        .map(BlockInput::from_block)
                        .collect()
                }),
            })
            .collect();
        ReportInput { pages }
    }
}
