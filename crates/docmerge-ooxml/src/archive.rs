//! Package container handling for docx files
//!
//! A docx file is a ZIP archive of XML parts and resources. The whole
//! archive is materialized in memory so parts can be swapped out and the
//! package rewritten without touching the source file. Entries keep their
//! original archive order, which lets untouched entries round-trip in place.

use std::fs::File;
use std::io::{Read, Seek, Write};
use std::path::Path;

use zip::read::ZipArchive;
use zip::write::{SimpleFileOptions, ZipWriter};
use zip::CompressionMethod;

use crate::error::{Result, TemplateError};

/// Entry name of the main document body part
pub const DOCUMENT_PART: &str = "word/document.xml";

/// Entry name of the style-sheet part
pub const STYLES_PART: &str = "word/styles.xml";

/// An unpacked docx package
#[derive(Debug)]
pub struct Package {
    /// All file entries in original archive order
    entries: Vec<(String, Vec<u8>)>,
}

impl Package {
    /// Open and unpack a docx file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Create from any reader that implements Read + Seek
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;
        let mut entries = Vec::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let name = file.name().to_string();

            // Skip directory markers
            if name.ends_with('/') {
                continue;
            }

            let mut contents = Vec::new();
            file.read_to_end(&mut contents)?;
            entries.push((name, contents));
        }

        Ok(Self { entries })
    }

    /// Get an entry's contents by name
    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, contents)| contents.as_slice())
    }

    /// Get a required part as a UTF-8 string
    pub fn part_string(&self, name: &str) -> Result<String> {
        let bytes = self
            .get(name)
            .ok_or_else(|| TemplateError::MissingPart(name.to_string()))?;
        Ok(std::str::from_utf8(bytes)?.to_string())
    }

    /// Overwrite an entry in place, or append a new one at the end
    pub fn set(&mut self, name: &str, contents: Vec<u8>) {
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some((_, slot)) => *slot = contents,
            None => self.entries.push((name.to_string(), contents)),
        }
    }

    /// Check if an entry exists in the package
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    /// List all entry names in archive order
    pub fn entry_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Write the package to a file
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        self.write_to(file)
    }

    /// Write the package to any writer
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<()> {
        let mut zip = ZipWriter::new(writer);
        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for (name, contents) in &self.entries {
            zip.start_file(name.as_str(), options)?;
            zip.write_all(contents)?;
        }

        zip.finish()?;
        Ok(())
    }
}
