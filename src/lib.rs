//! Quotation editor: seed a document, edit it field by field, and export a
//! paginated, print-ready rendition through Typst.
//!
//! Data flows one way on every edit:
//!
//! ```text
//! editor (new Document) ──► totals ──► paginate ──► render ──► typst
//! ```

pub mod clients;
pub mod editor;
pub mod error;
pub mod form;
pub mod format;
pub mod model;
pub mod paginate;
pub mod preview;
pub mod render;
pub mod settings;
pub mod totals;

pub use error::{QuoteError, Result};
pub use model::Document;
