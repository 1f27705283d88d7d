//! Error taxonomy for the pagination engine

use crate::document::{BlockId, PageId, PageRole};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PaginateError {
    #[error("no page with role {role:?} in document")]
    MissingPage { role: PageRole },

    #[error("page {page} is not part of the document")]
    UnknownPage { page: PageId },

    #[error("page {page} has no content region")]
    MissingContent { page: PageId },

    #[error("no section title matching any of {markers:?}")]
    MissingSectionTitle { markers: Vec<String> },

    #[error("block {block} not found")]
    MissingBlock { block: BlockId },

    #[error("recursion depth {depth} exceeded limit {limit}")]
    DepthExceeded { depth: u32, limit: u32 },

    #[error("pagination run was already aborted")]
    Aborted,

    #[error("invalid report json: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    #[error("invalid configuration: {message}")]
    Config { message: String },
}

impl PaginateError {
    /// An expected anchor element is absent from the document
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            PaginateError::MissingPage { .. }
                | PaginateError::UnknownPage { .. }
                | PaginateError::MissingContent { .. }
                | PaginateError::MissingSectionTitle { .. }
                | PaginateError::MissingBlock { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, PaginateError>;
