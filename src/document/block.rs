//! Block-level content elements

use crate::document::table::Table;
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;
use unicode_segmentation::UnicodeSegmentation;

/// Unique identifier for a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockId(pub u64);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Matches every `(i/N)` numbering suffix, with the whitespace before it
fn split_suffix() -> &'static Regex {
    static SUFFIX: OnceLock<Regex> = OnceLock::new();
    SUFFIX.get_or_init(|| Regex::new(r"\s*\(\d+/\d+\)").expect("suffix pattern is valid"))
}

/// Remove any `(i/N)` suffix from a title text
pub fn strip_split_suffix(text: &str) -> String {
    split_suffix().replace_all(text, "").into_owned()
}

/// Membership of a title in a split group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitMark {
    /// Key shared by all fragments of one logical title
    pub group: String,
    /// Sequence index assigned when the fragment was created
    pub index: u32,
}

/// A heading or caption
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Title {
    pub text: String,
    /// Per-instance identifier, never duplicated by clones placed on other pages
    pub anchor: Option<String>,
    pub split: Option<SplitMark>,
}

impl Title {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            anchor: None,
            split: None,
        }
    }

    pub fn with_anchor(mut self, anchor: impl Into<String>) -> Self {
        self.anchor = Some(anchor.into());
        self
    }

    /// Text without any numbering suffix
    pub fn base_text(&self) -> String {
        strip_split_suffix(&self.text).trim().to_string()
    }

    /// Derive the split-group key from the visible text
    pub fn derive_group_key(&self, key_len: usize) -> String {
        self.base_text().graphemes(true).take(key_len).collect()
    }

    /// Record this title as fragment `index` of its split group.
    ///
    /// A title that already belongs to a group keeps that group.
    pub fn mark_split(&mut self, index: u32, key_len: usize) {
        let group = match self.split.take() {
            Some(mark) => mark.group,
            None => self.derive_group_key(key_len),
        };
        self.split = Some(SplitMark { group, index });
    }

    /// Does the title text or anchor contain `marker`?
    pub fn matches_marker(&self, marker: &str) -> bool {
        self.text.contains(marker)
            || self
                .anchor
                .as_deref()
                .map(|anchor| anchor.contains(marker))
                .unwrap_or(false)
    }
}

/// Coarse classification used by the overflow detector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockClass {
    Title,
    TableContainer,
    Generic,
}

/// The kind of block element
#[derive(Debug, Clone, PartialEq)]
pub enum BlockKind {
    /// Main section heading
    SectionTitle(Title),
    /// Table title standing as its own sibling before a bare table
    Caption(Title),
    /// Plain text paragraph
    Paragraph { text: String },
    /// Wrapper holding an optional caption and a table
    Table { caption: Option<Title>, table: Table },
    /// The table element itself as a direct child of the content region
    BareTable(Table),
    /// Generic container; a leading title makes it open a new section
    Container { title: Option<Title>, text: String },
}

impl BlockKind {
    pub fn class(&self) -> BlockClass {
        match self {
            BlockKind::SectionTitle(_) | BlockKind::Caption(_) => BlockClass::Title,
            BlockKind::Table { .. } | BlockKind::BareTable(_) => BlockClass::TableContainer,
            BlockKind::Paragraph { .. } | BlockKind::Container { .. } => BlockClass::Generic,
        }
    }

    /// Check if this block starts a new section
    pub fn opens_section(&self) -> bool {
        matches!(
            self,
            BlockKind::SectionTitle(_) | BlockKind::Container { title: Some(_), .. }
        )
    }

    pub fn is_section_title(&self) -> bool {
        matches!(self, BlockKind::SectionTitle(_))
    }

    pub fn is_caption(&self) -> bool {
        matches!(self, BlockKind::Caption(_))
    }

    /// Table carried by this block, if any
    pub fn table(&self) -> Option<&Table> {
        match self {
            BlockKind::Table { table, .. } | BlockKind::BareTable(table) => Some(table),
            _ => None,
        }
    }

    pub fn table_mut(&mut self) -> Option<&mut Table> {
        match self {
            BlockKind::Table { table, .. } | BlockKind::BareTable(table) => Some(table),
            _ => None,
        }
    }

    /// Caption contained inside a table wrapper
    pub fn inner_caption(&self) -> Option<&Title> {
        match self {
            BlockKind::Table { caption, .. } => caption.as_ref(),
            _ => None,
        }
    }

    /// The title this block displays, wherever it sits
    pub fn title(&self) -> Option<&Title> {
        match self {
            BlockKind::SectionTitle(title) | BlockKind::Caption(title) => Some(title),
            BlockKind::Table { caption, .. } => caption.as_ref(),
            BlockKind::Container { title, .. } => title.as_ref(),
            BlockKind::Paragraph { .. } | BlockKind::BareTable(_) => None,
        }
    }

    /// Does any visible text of this block contain `needle`?
    pub fn contains_text(&self, needle: &str) -> bool {
        let body = match self {
            BlockKind::Paragraph { text } | BlockKind::Container { text, .. } => text.contains(needle),
            _ => false,
        };
        body || self.title().map(|title| title.text.contains(needle)).unwrap_or(false)
    }

    pub fn title_mut(&mut self) -> Option<&mut Title> {
        match self {
            BlockKind::SectionTitle(title) | BlockKind::Caption(title) => Some(title),
            BlockKind::Table { caption, .. } => caption.as_mut(),
            BlockKind::Container { title, .. } => title.as_mut(),
            BlockKind::Paragraph { .. } | BlockKind::BareTable(_) => None,
        }
    }
}

/// Placement role of a block within its page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlockRole {
    /// Ordinary reflowable content
    #[default]
    Flow,
    /// Pinned to the page bottom; never reflowed, bounds the usable height
    BottomFixed,
    /// Reserved closing block that must sit at the end of the flow
    TrailingInfo,
}

/// A block in the report arena
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub id: BlockId,
    pub kind: BlockKind,
    pub role: BlockRole,
    /// Title this block was repeated from on a continuation page
    pub repeat_of: Option<BlockId>,
}

impl Block {
    pub fn new(id: BlockId, kind: BlockKind) -> Self {
        Self {
            id,
            kind,
            role: BlockRole::Flow,
            repeat_of: None,
        }
    }

    pub fn with_role(mut self, role: BlockRole) -> Self {
        self.role = role;
        self
    }

    pub fn is_flow(&self) -> bool {
        self.role == BlockRole::Flow
    }

    pub fn is_repeated(&self) -> bool {
        self.repeat_of.is_some()
    }
}
