//! Report model: an arena of pages and blocks

mod block;
mod input;
mod page;
mod table;

pub use block::{strip_split_suffix, Block, BlockClass, BlockId, BlockKind, BlockRole, SplitMark, Title};
pub use input::{BlockInput, PageInput, ReportInput, TableInput, TitleInput};
pub use page::{ContentRegion, Page, PageId, PageRole};
pub use table::{Cell, Cells, HeaderRow, Row, RowId, Table};

use crate::error::{PaginateError, Result};
use rustc_hash::FxHashMap;

/// The report being paginated.
///
/// Pages and blocks live in id-indexed maps; page order and per-page content
/// order are explicit vectors. Moving a block between pages only rewrites those
/// vectors, so a block keeps its identity wherever it lands.
#[derive(Debug, Clone, Default)]
pub struct ReportDocument {
    pages: FxHashMap<PageId, Page>,
    order: Vec<PageId>,
    blocks: FxHashMap<BlockId, Block>,
    next_page_id: u64,
    next_block_id: u64,
    next_row_id: u64,
    /// Monotonic version counter
    version: u64,
}

impl ReportDocument {
    /// Create a new empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the document version
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn page_count(&self) -> usize {
        self.order.len()
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    fn touch(&mut self) {
        self.version += 1;
    }

    fn alloc_page_id(&mut self) -> PageId {
        let id = PageId(self.next_page_id);
        self.next_page_id += 1;
        id
    }

    fn alloc_block_id(&mut self) -> BlockId {
        let id = BlockId(self.next_block_id);
        self.next_block_id += 1;
        id
    }

    /// Reserve a fresh row identity
    pub fn alloc_row_id(&mut self) -> RowId {
        let id = RowId(self.next_row_id);
        self.next_row_id += 1;
        id
    }

    /// Append a page at the end of the document
    pub fn push_page(&mut self, number: u32, role: PageRole) -> PageId {
        let id = self.alloc_page_id();
        self.pages.insert(id, Page::new(id, number, role));
        self.order.push(id);
        self.touch();
        id
    }

    /// Append a page without a content region
    pub fn push_hollow_page(&mut self, number: u32, role: PageRole) -> PageId {
        let id = self.push_page(number, role);
        if let Some(page) = self.pages.get_mut(&id) {
            page.content = None;
        }
        id
    }

    /// Insert a page immediately after `after` in document order
    pub fn insert_page_after(&mut self, after: PageId, number: u32, role: PageRole) -> Result<PageId> {
        let pos = self
            .order
            .iter()
            .position(|&id| id == after)
            .ok_or(PaginateError::UnknownPage { page: after })?;

        let id = self.alloc_page_id();
        self.pages.insert(id, Page::new(id, number, role));
        self.order.insert(pos + 1, id);
        self.touch();
        Ok(id)
    }

    /// Remove a page; its blocks stay in the arena
    pub fn remove_page(&mut self, id: PageId) -> Option<Page> {
        let page = self.pages.remove(&id)?;
        self.order.retain(|&p| p != id);
        self.touch();
        Some(page)
    }

    pub fn page(&self, id: PageId) -> Option<&Page> {
        self.pages.get(&id)
    }

    pub fn page_mut(&mut self, id: PageId) -> Option<&mut Page> {
        self.pages.get_mut(&id)
    }

    /// Pages in document order
    pub fn pages(&self) -> impl Iterator<Item = &Page> + '_ {
        self.order.iter().filter_map(move |id| self.pages.get(id))
    }

    pub fn page_order(&self) -> &[PageId] {
        &self.order
    }

    pub fn next_page(&self, id: PageId) -> Option<PageId> {
        let pos = self.order.iter().position(|&p| p == id)?;
        self.order.get(pos + 1).copied()
    }

    pub fn first_page_with_role(&self, role: PageRole) -> Option<PageId> {
        self.pages().find(|page| page.role == role).map(|page| page.id)
    }

    /// Last page of the run of continuation pages directly following `start`
    pub fn flow_tail(&self, start: PageId) -> PageId {
        let mut tail = start;
        while let Some(next) = self.next_page(tail) {
            match self.pages.get(&next) {
                Some(page) if page.role.is_continuation() => tail = next,
                _ => break,
            }
        }
        tail
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(&id)
    }

    pub fn block_mut(&mut self, id: BlockId) -> Option<&mut Block> {
        self.blocks.get_mut(&id)
    }

    /// Look up a block, reporting absence as a structural error
    pub fn require_block(&self, id: BlockId) -> Result<&Block> {
        self.blocks
            .get(&id)
            .ok_or(PaginateError::MissingBlock { block: id })
    }

    /// Add a block to the arena without placing it on a page
    pub fn insert_block(&mut self, kind: BlockKind, role: BlockRole) -> BlockId {
        let id = self.alloc_block_id();
        self.blocks.insert(id, Block::new(id, kind).with_role(role));
        id
    }

    /// Add a block at the end of a page's content
    pub fn push_block(&mut self, page: PageId, kind: BlockKind, role: BlockRole) -> Result<BlockId> {
        let id = self.insert_block(kind, role);
        self.content_mut(page)?.blocks.push(id);
        self.touch();
        Ok(id)
    }

    /// Copy a block under a fresh identity, with fresh row identities.
    ///
    /// The copy is not placed on any page.
    pub fn clone_block(&mut self, id: BlockId) -> Result<BlockId> {
        let mut copy = self.require_block(id)?.clone();
        if let Some(table) = copy.kind.table_mut() {
            for row in &mut table.body {
                row.id = self.alloc_row_id();
            }
        }
        let new_id = self.alloc_block_id();
        copy.id = new_id;
        copy.repeat_of = None;
        self.blocks.insert(new_id, copy);
        Ok(new_id)
    }

    pub fn content(&self, page: PageId) -> Result<&ContentRegion> {
        self.pages
            .get(&page)
            .and_then(|p| p.content.as_ref())
            .ok_or(PaginateError::MissingContent { page })
    }

    pub fn content_mut(&mut self, page: PageId) -> Result<&mut ContentRegion> {
        self.pages
            .get_mut(&page)
            .and_then(|p| p.content.as_mut())
            .ok_or(PaginateError::MissingContent { page })
    }

    /// Reflow candidates of a page: its flow blocks in order
    pub fn flow_blocks(&self, page: PageId) -> Result<Vec<BlockId>> {
        Ok(self
            .content(page)?
            .blocks
            .iter()
            .copied()
            .filter(|id| self.blocks.get(id).map(Block::is_flow).unwrap_or(false))
            .collect())
    }

    /// Remove the given blocks from a page's content, keeping them in the arena
    pub fn detach_blocks(&mut self, page: PageId, ids: &[BlockId]) -> Result<()> {
        let content = self.content_mut(page)?;
        content.blocks.retain(|id| !ids.contains(id));
        self.touch();
        Ok(())
    }

    /// Append blocks, in order, at the end of a page's content
    pub fn append_blocks(&mut self, page: PageId, ids: &[BlockId]) -> Result<()> {
        let content = self.content_mut(page)?;
        content.blocks.extend_from_slice(ids);
        self.touch();
        Ok(())
    }

    /// Insert a block into a page's content right after `after`
    pub fn insert_block_after(&mut self, page: PageId, after: BlockId, id: BlockId) -> Result<()> {
        let content = self.content_mut(page)?;
        let pos = content
            .position(after)
            .ok_or(PaginateError::MissingBlock { block: after })?;
        content.blocks.insert(pos + 1, id);
        self.touch();
        Ok(())
    }

    /// First block with the given role on a page
    pub fn find_role(&self, page: PageId, role: BlockRole) -> Option<BlockId> {
        self.page(page)?
            .blocks()
            .iter()
            .copied()
            .find(|id| self.blocks.get(id).map(|b| b.role == role).unwrap_or(false))
    }

    /// Placed blocks in document order
    pub fn placed_blocks(&self) -> impl Iterator<Item = BlockId> + '_ {
        self.pages().flat_map(|page| page.blocks().iter().copied())
    }

    /// Page currently holding a block
    pub fn page_of(&self, block: BlockId) -> Option<PageId> {
        self.pages()
            .find(|page| page.blocks().contains(&block))
            .map(|page| page.id)
    }
}
