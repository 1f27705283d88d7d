//! Page containers

use crate::document::BlockId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PageId(pub u64);

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a page is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PageRole {
    /// First report page, hosts the primary section
    Primary,
    /// Server-rendered page dedicated to the trailing section
    Section,
    /// Page synthesized to hold overflow
    Continuation,
    /// Any other page; left untouched
    Static,
}

impl PageRole {
    pub fn is_continuation(&self) -> bool {
        matches!(self, PageRole::Continuation)
    }
}

/// Ordered content of a page frame
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContentRegion {
    pub blocks: Vec<BlockId>,
}

impl ContentRegion {
    pub fn position(&self, block: BlockId) -> Option<usize> {
        self.blocks.iter().position(|&id| id == block)
    }
}

/// A fixed-height printable page
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub id: PageId,
    /// Ordinal shown in page classes and used for split indices
    pub number: u32,
    pub role: PageRole,
    /// Missing when the page was rendered without its content region
    pub content: Option<ContentRegion>,
}

impl Page {
    pub fn new(id: PageId, number: u32, role: PageRole) -> Self {
        Self {
            id,
            number,
            role,
            content: Some(ContentRegion::default()),
        }
    }

    pub fn blocks(&self) -> &[BlockId] {
        self.content
            .as_ref()
            .map(|content| content.blocks.as_slice())
            .unwrap_or(&[])
    }
}
