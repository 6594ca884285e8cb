//! Template façade: open a docx package, substitute placeholders, save
//!
//! A [`Template`] owns the opened package and the two parts the engine
//! edits, `word/document.xml` and `word/styles.xml`, as in-memory text.
//! Mutating operations rewrite the in-memory parts only; nothing touches
//! the package container until [`Template::save`].
//!
//! # Example
//!
//! ```no_run
//! use docmerge_ooxml::Template;
//!
//! let mut template = Template::open("letter-template.docx")?;
//! template.set_value("name", "Ada Lovelace");
//! let outcome = template.set_paragraph_xml("table", "<w:tbl><w:tr><w:tc><w:p/></w:tc></w:tr></w:tbl>")?;
//! assert!(outcome.applied());
//! template.save("letter.docx")?;
//! # Ok::<(), docmerge_ooxml::TemplateError>(())
//! ```

use std::io::{Read, Seek};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::archive::{Package, DOCUMENT_PART, STYLES_PART};
use crate::body;
use crate::error::{Result, TemplateError};
use crate::styles;

/// Result of a structural edit whose required document shape may be absent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "NoMatch means the document was left unchanged"]
pub enum SpliceOutcome {
    /// The edit was applied
    Applied,
    /// The required shape (body, matching paragraph, section-properties
    /// block) was absent; the document is unchanged
    NoMatch,
}

impl SpliceOutcome {
    pub fn applied(self) -> bool {
        matches!(self, SpliceOutcome::Applied)
    }
}

/// An opened docx package with its editable parts
#[derive(Debug)]
pub struct Template {
    package: Package,
    document_xml: String,
    styles_xml: String,
}

impl Template {
    /// Open a docx file and extract its editable parts
    ///
    /// Fails if the package is not a readable zip archive or lacks either
    /// `word/document.xml` or `word/styles.xml`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_package(Package::open(path)?)
    }

    /// Open a docx package from any reader that implements Read + Seek
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        Self::from_package(Package::from_reader(reader)?)
    }

    fn from_package(package: Package) -> Result<Self> {
        let document_xml = package.part_string(DOCUMENT_PART)?;
        let styles_xml = package.part_string(STYLES_PART)?;
        Ok(Self {
            package,
            document_xml,
            styles_xml,
        })
    }

    /// Current text of the document body part
    pub fn document_xml(&self) -> &str {
        &self.document_xml
    }

    /// Current text of the style-sheet part
    pub fn styles_xml(&self) -> &str {
        &self.styles_xml
    }

    /// Replace every occurrence of the placeholder with literal text.
    ///
    /// The replacement is inserted verbatim: characters special to XML
    /// (`<`, `&`, ...) are NOT escaped here, so callers must pre-escape
    /// replacement text unless they intend to inject markup. An absent
    /// placeholder leaves the part unchanged.
    pub fn set_value(&mut self, key: &str, value: &str) {
        let token = normalize_key(key);
        self.document_xml = self.document_xml.replace(&token, value);
    }

    /// Replace the first paragraph containing the placeholder with an XML
    /// fragment.
    ///
    /// The whole `w:p` element whose descendant text contains the token is
    /// swapped for the fragment's first element. Later paragraphs with the
    /// same placeholder are untouched; call repeatedly (or fall back to
    /// [`Template::set_value`]) to handle duplicates. Returns
    /// [`SpliceOutcome::NoMatch`] when the document has no body or no
    /// paragraph matches, and [`TemplateError::MalformedFragment`] when
    /// the fragment is empty or does not parse.
    pub fn set_paragraph_xml(&mut self, key: &str, fragment: &str) -> Result<SpliceOutcome> {
        let token = normalize_key(key);
        match body::splice_paragraph(&self.document_xml, &token, fragment)? {
            Some(updated) => {
                self.document_xml = updated;
                Ok(SpliceOutcome::Applied)
            }
            None => Ok(SpliceOutcome::NoMatch),
        }
    }

    /// Insert an XML fragment at the end of the body, immediately before
    /// the trailing section-properties block.
    ///
    /// Assumes the document has exactly one document-level `w:sectPr`, at
    /// the end of the body (the shape Word produces). The fragment has its
    /// line breaks stripped and is spliced in textually; the
    /// section-properties block itself is left byte-for-byte intact.
    pub fn append_body_xml(&mut self, fragment: &str) -> SpliceOutcome {
        match body::insert_before_section_props(&self.document_xml, fragment) {
            Some(updated) => {
                self.document_xml = updated;
                SpliceOutcome::Applied
            }
            None => SpliceOutcome::NoMatch,
        }
    }

    /// Append the style definitions found in the fragment to the style
    /// sheet, returning how many were imported.
    ///
    /// Accepts a bare fragment of `w:style` elements or a complete
    /// `w:styles` document. Definitions are not de-duplicated by id.
    pub fn append_style_xml(&mut self, fragment: &str) -> Result<usize> {
        let (updated, count) = styles::merge_styles(&self.styles_xml, fragment)?;
        self.styles_xml = updated;
        Ok(count)
    }

    /// Write the edited parts back into the package and finalize it at
    /// `dest`, replacing any existing file.
    ///
    /// The package is streamed to a temporary file next to the destination
    /// and atomically renamed over it; on any failure the temporary file
    /// is removed.
    pub fn save<P: AsRef<Path>>(self, dest: P) -> Result<()> {
        let dest = dest.as_ref();
        let Template {
            mut package,
            document_xml,
            styles_xml,
        } = self;
        package.set(DOCUMENT_PART, document_xml.into_bytes());
        package.set(STYLES_PART, styles_xml.into_bytes());

        let dir = match dest.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)?;
        package.write_to(tmp.as_file_mut())?;
        tmp.persist(dest)
            .map_err(|e| TemplateError::Io(e.error))?;
        Ok(())
    }
}

/// Canonicalize a placeholder key into its `${key}` token form.
///
/// Keys already in token form pass through unchanged; no validation is
/// applied to the key's characters.
fn normalize_key(key: &str) -> String {
    if key.starts_with("${") && key.ends_with('}') {
        key.to_string()
    } else {
        format!("${{{key}}}")
    }
}
