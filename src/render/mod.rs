//! Render output: HTML for the paginated report

mod html;

pub use html::{escape, page_classes, render_document, render_page};
