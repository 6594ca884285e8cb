//! # docmerge-ooxml
//!
//! Mail-merge-style editing of Word (docx) packages.
//!
//! This crate opens an OOXML wordprocessing package, substitutes `${key}`
//! placeholders in the document body with literal text or spliced XML
//! fragments, merges style definitions into the style sheet, and writes
//! the package back without disturbing any other entry.
//!
//! ## Example
//!
//! ```no_run
//! use docmerge_ooxml::{SpliceOutcome, Template};
//!
//! let mut template = Template::open("invoice-template.docx")?;
//! template.set_value("customer", "ACME Corp.");
//! if template.set_paragraph_xml("items", "<w:tbl><w:tr><w:tc><w:p/></w:tc></w:tr></w:tbl>")?
//!     == SpliceOutcome::NoMatch
//! {
//!     eprintln!("no paragraph carries ${{items}}");
//! }
//! template.save("invoice.docx")?;
//! # Ok::<(), docmerge_ooxml::TemplateError>(())
//! ```

pub mod archive;
mod body;
pub mod dom;
pub mod error;
mod styles;
pub mod template;

pub use archive::{Package, DOCUMENT_PART, STYLES_PART};
pub use error::{Result, TemplateError};
pub use template::{SpliceOutcome, Template};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
