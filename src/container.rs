//! ZIP package abstraction for PPTX files.
//!
//! [`Package`] wraps the archive and hands out parts lazily: nothing is
//! decompressed until a part is requested. Relationship tables and core
//! properties are decoded through the generic XML tree in [`crate::xml`].

use crate::error::{Error, Result};
use crate::model::Metadata;
use crate::xml::{self, XmlElement};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::Path;

/// An entry of the archive directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Path inside the archive, forward-slash separated
    pub path: String,
    pub is_dir: bool,
    /// Uncompressed size in bytes
    pub size: u64,
}

/// A relationship entry from a .rels part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Relationship ID (e.g., "rId1")
    pub id: String,
    /// Relationship type URI
    pub rel_type: String,
    /// Target path as written (relative, absolute or a URL)
    pub target: String,
    /// Whether the target is external to the package
    pub external: bool,
}

impl Relationship {
    /// Whether the relationship type ends with the given short name
    /// (e.g., "image", "slideLayout"), regardless of the schema namespace.
    pub fn is_type(&self, short: &str) -> bool {
        self.rel_type.rsplit('/').next() == Some(short)
    }
}

/// Relationships of one part.
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    /// Map from relationship ID to relationship data
    pub by_id: HashMap<String, Relationship>,
}

impl Relationships {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a relationship by ID.
    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.by_id.get(id)
    }

    /// Relationships whose type has the given short name, ordered by id.
    ///
    /// Strict and transitional OOXML use different namespaces for the same
    /// relationship types, so callers match on the last path segment.
    pub fn all_of(&self, short: &str) -> Vec<&Relationship> {
        let mut found: Vec<&Relationship> =
            self.by_id.values().filter(|r| r.is_type(short)).collect();
        found.sort_by(|a, b| a.id.cmp(&b.id));
        found
    }

    /// First relationship whose type has the given short name.
    pub fn first_of(&self, short: &str) -> Option<&Relationship> {
        self.all_of(short).into_iter().next()
    }

    pub fn add(&mut self, rel: Relationship) {
        self.by_id.insert(rel.id.clone(), rel);
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Decode a relationships part.
    pub fn parse(content: &str) -> Result<Self> {
        let mut rels = Relationships::new();
        if content.trim().is_empty() {
            return Ok(rels);
        }

        let root = xml::decode(content)?;
        for node in root.children_named("Relationship") {
            let Some(id) = node.attr("Id") else {
                continue;
            };
            rels.add(Relationship {
                id: id.to_string(),
                rel_type: node.attr("Type").unwrap_or_default().to_string(),
                target: node.attr("Target").unwrap_or_default().to_string(),
                external: node
                    .attr("TargetMode")
                    .is_some_and(|m| m.eq_ignore_ascii_case("external")),
            });
        }
        Ok(rels)
    }
}

/// Path of the relationships part that belongs to `part_path`.
pub fn relationships_path(part_path: &str) -> String {
    if part_path.is_empty() || part_path == "/" {
        return "_rels/.rels".to_string();
    }
    match part_path.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part_path),
    }
}

/// Resolve a relationship target relative to the part that owns it.
pub fn resolve_path(base: &str, target: &str) -> String {
    if let Some(stripped) = target.strip_prefix('/') {
        return stripped.to_string();
    }

    let mut segments: Vec<&str> = match base.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').filter(|s| !s.is_empty()).collect(),
        None => Vec::new(),
    };
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

/// Fix the XML declaration after converting a UTF-16 part to a Rust string.
fn fix_xml_encoding_declaration(content: String) -> String {
    if !content.starts_with("<?xml") {
        return content;
    }
    let Some(end) = content.find("?>") else {
        return content;
    };
    let (decl, rest) = content.split_at(end + 2);
    let fixed = decl
        .replace("\"UTF-16\"", "\"UTF-8\"")
        .replace("'UTF-16'", "'UTF-8'")
        .replace("\"utf-16\"", "\"UTF-8\"")
        .replace("'utf-16'", "'UTF-8'");
    format!("{}{}", fixed, rest)
}

fn decode_utf16(bytes: &[u8], little_endian: bool) -> Result<String> {
    let units = bytes.chunks_exact(2).map(|pair| {
        if little_endian {
            u16::from_le_bytes([pair[0], pair[1]])
        } else {
            u16::from_be_bytes([pair[0], pair[1]])
        }
    });
    char::decode_utf16(units)
        .collect::<std::result::Result<String, _>>()
        .map_err(|e| Error::InvalidData(format!("invalid UTF-16: {}", e)))
}

/// Decode XML part bytes, honoring UTF-8 and UTF-16 byte order marks.
///
/// Parts without a BOM are read as UTF-8; if that fails and the byte
/// pattern looks like UTF-16 text, UTF-16 is tried before a lossy UTF-8
/// conversion.
pub fn decode_xml_bytes(bytes: &[u8]) -> Result<String> {
    match bytes {
        [0xEF, 0xBB, 0xBF, rest @ ..] => String::from_utf8(rest.to_vec())
            .map_err(|e| Error::InvalidData(format!("invalid UTF-8: {}", e))),
        [0xFF, 0xFE, rest @ ..] => decode_utf16(rest, true).map(fix_xml_encoding_declaration),
        [0xFE, 0xFF, rest @ ..] => decode_utf16(rest, false).map(fix_xml_encoding_declaration),
        _ => match std::str::from_utf8(bytes) {
            Ok(s) => Ok(s.to_string()),
            Err(_) if bytes.len() >= 4 && bytes[1] == 0 && bytes[3] == 0 => {
                decode_utf16(bytes, true).map(fix_xml_encoding_declaration)
            }
            Err(_) if bytes.len() >= 4 && bytes[0] == 0 && bytes[2] == 0 => {
                decode_utf16(bytes, false).map(fix_xml_encoding_declaration)
            }
            Err(_) => Ok(String::from_utf8_lossy(bytes).into_owned()),
        },
    }
}

/// A PPTX package over an in-memory ZIP archive.
pub struct Package {
    archive: RefCell<zip::ZipArchive<Cursor<Vec<u8>>>>,
}

impl Package {
    /// Open a package from a file path.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use pptxdom::container::Package;
    ///
    /// let package = Package::open("deck.pptx")?;
    /// assert!(package.exists("ppt/presentation.xml"));
    /// # Ok::<(), pptxdom::Error>(())
    /// ```
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let mut reader = BufReader::new(file);
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(data)
    }

    /// Create a package from bytes. Fails with [`Error::PackageCorrupt`]
    /// when the bytes are not a ZIP archive.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let archive = zip::ZipArchive::new(Cursor::new(data))
            .map_err(|e| Error::PackageCorrupt(e.to_string()))?;
        Ok(Self {
            archive: RefCell::new(archive),
        })
    }

    /// Directory listing, without decompressing anything.
    pub fn list_entries(&self) -> Vec<Entry> {
        let mut archive = self.archive.borrow_mut();
        (0..archive.len())
            .filter_map(|i| {
                let file = archive.by_index_raw(i).ok()?;
                Some(Entry {
                    path: file.name().to_string(),
                    is_dir: file.is_dir(),
                    size: file.size(),
                })
            })
            .collect()
    }

    /// Files (not directories) whose path starts with `prefix`.
    pub fn entries_under(&self, prefix: &str) -> Vec<Entry> {
        self.list_entries()
            .into_iter()
            .filter(|e| !e.is_dir && e.path.starts_with(prefix))
            .collect()
    }

    /// Check if a part exists.
    pub fn exists(&self, path: &str) -> bool {
        self.archive.borrow().index_for_name(path).is_some()
    }

    /// Read the raw bytes of a part.
    pub fn read(&self, path: &str) -> Result<Vec<u8>> {
        let mut archive = self.archive.borrow_mut();
        let mut file = archive.by_name(path).map_err(|e| match e {
            zip::result::ZipError::FileNotFound => Error::PartNotFound(path.to_string()),
            other => Error::from(other),
        })?;
        let mut data = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut data)?;
        Ok(data)
    }

    /// Read a part as text, handling UTF-8/UTF-16 byte order marks.
    pub fn read_xml(&self, path: &str) -> Result<String> {
        let bytes = self.read(path)?;
        decode_xml_bytes(&bytes)
    }

    /// Read a part and decode it into the generic XML tree.
    pub fn read_tree(&self, path: &str) -> Result<XmlElement> {
        xml::decode(&self.read_xml(path)?)
    }

    /// Relationships of a part. A missing `.rels` part yields an empty
    /// table; a malformed one is an error.
    pub fn read_relationships(&self, part_path: &str) -> Result<Relationships> {
        let rels_path = relationships_path(part_path);
        match self.read_xml(&rels_path) {
            Ok(content) => Relationships::parse(&content),
            Err(Error::PartNotFound(_)) => Ok(Relationships::new()),
            Err(e) => Err(e),
        }
    }

    /// Core properties from `docProps/core.xml`; defaults when absent or
    /// unreadable.
    pub fn core_metadata(&self) -> Metadata {
        let Ok(root) = self.read_tree("docProps/core.xml") else {
            return Metadata::default();
        };

        let text_of = |name: &str| {
            root.child(name)
                .map(|n| n.text().trim().to_string())
                .filter(|t| !t.is_empty())
        };

        Metadata {
            title: text_of("title"),
            author: text_of("creator"),
            subject: text_of("subject"),
            description: text_of("description"),
            keywords: text_of("keywords")
                .map(|k| {
                    k.split([',', ';'])
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            created: text_of("created"),
            modified: text_of("modified"),
            last_modified_by: text_of("lastModifiedBy"),
        }
    }
}

impl std::fmt::Debug for Package {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Package")
            .field("entries", &self.archive.borrow().len())
            .finish()
    }
}
