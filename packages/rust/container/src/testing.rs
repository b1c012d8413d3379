//! Synthetic container writer for tests.
//!
//! Enabled inside this crate's own tests and, for other crates, through the
//! `test-support` feature.

use std::collections::{BTreeMap, BTreeSet};
use std::io::{Cursor, Write};
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use helpbook_shared::{HelpBookError, Result};

use crate::archive::{FILE_STORAGE_ENTITY, TOC_ENTITY, zip_error};
use crate::reader::RESERVED_MARKER;

const BLOCK_HEADER_LEN: usize = 31;
const NAME_ATTRIBUTES_LEN: usize = 20;
const NAME_TERMINATOR_LEN: usize = 4;
const DEFAULT_BLOCK_SIZE: i32 = 0x200;

/// Builds `.hbk` bytes in the layout [`ContainerReader`](crate::ContainerReader) expects.
#[derive(Debug, Clone)]
pub struct ContainerBuilder {
    entities: Vec<(String, Vec<u8>)>,
    toc: Option<Vec<u8>>,
    pages: BTreeMap<String, Vec<u8>>,
    corrupt: BTreeSet<String>,
    reserved: i32,
}

impl Default for ContainerBuilder {
    fn default() -> Self {
        Self {
            entities: Vec::new(),
            toc: None,
            pages: BTreeMap::new(),
            corrupt: BTreeSet::new(),
            reserved: RESERVED_MARKER,
        }
    }
}

impl ContainerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity stored verbatim.
    pub fn raw_entity(mut self, name: impl Into<String>, body: Vec<u8>) -> Self {
        self.entities.push((name.into(), body));
        self
    }

    /// TOC text, zip-packed into the TOC entity.
    pub fn toc(mut self, text: impl Into<Vec<u8>>) -> Self {
        self.toc = Some(text.into());
        self
    }

    /// Html page stored in the file-storage archive.
    pub fn page(mut self, path: impl Into<String>, html: impl Into<Vec<u8>>) -> Self {
        self.pages.insert(path.into(), html.into());
        self
    }

    /// Damage the compressed bytes of a page's entry so reading it fails.
    pub fn corrupt_page(mut self, path: impl Into<String>) -> Self {
        self.corrupt.insert(path.into());
        self
    }

    /// Override the reserved field written into every index record.
    pub fn reserved_marker(mut self, value: i32) -> Self {
        self.reserved = value;
        self
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut entities = self.entities.clone();
        if let Some(toc) = &self.toc {
            entities.push((TOC_ENTITY.into(), zip_entries([("toc", toc.as_slice())])?));
        }
        if self.toc.is_some() || !self.pages.is_empty() {
            let pages = self.pages.iter().map(|(p, h)| (p.as_str(), h.as_slice()));
            let mut storage = zip_entries(pages)?;
            for path in &self.corrupt {
                corrupt_entry(&mut storage, path)?;
            }
            entities.push((FILE_STORAGE_ENTITY.into(), storage));
        }

        let names: Vec<Vec<u8>> = entities
            .iter()
            .map(|(name, _)| name.encode_utf16().flat_map(u16::to_le_bytes).collect())
            .collect();

        // Lay out name and body blocks after the index block.
        let index_len = entities.len() * 12;
        let mut offset = 16 + BLOCK_HEADER_LEN + index_len;
        let mut addresses = Vec::with_capacity(entities.len());
        for ((_, body), name) in entities.iter().zip(&names) {
            let header = offset;
            offset += BLOCK_HEADER_LEN + NAME_ATTRIBUTES_LEN + name.len() + NAME_TERMINATOR_LEN;
            let body_address = offset;
            offset += BLOCK_HEADER_LEN + body.len();
            addresses.push((address(header)?, address(body_address)?));
        }

        let mut out = Vec::with_capacity(offset);
        for word in [RESERVED_MARKER, DEFAULT_BLOCK_SIZE, 0, 0] {
            push_i32(&mut out, word);
        }

        out.extend(block_header(index_len, index_len));
        for (header, body) in &addresses {
            push_i32(&mut out, *header);
            push_i32(&mut out, *body);
            push_i32(&mut out, self.reserved);
        }

        for ((_, body), name) in entities.iter().zip(&names) {
            let len = NAME_ATTRIBUTES_LEN + name.len() + NAME_TERMINATOR_LEN;
            out.extend(block_header(len, len));
            out.extend([0u8; NAME_ATTRIBUTES_LEN]);
            out.extend_from_slice(name);
            out.extend([0u8; NAME_TERMINATOR_LEN]);

            out.extend(block_header(body.len(), body.len()));
            out.extend_from_slice(body);
        }

        Ok(out)
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_bytes()?).map_err(|e| HelpBookError::io(path, e))
    }
}

fn block_header(payload: usize, block: usize) -> Vec<u8> {
    format!(
        "\r\n{payload:08x} {block:08x} {:08x} \r\n",
        RESERVED_MARKER
    )
    .into_bytes()
}

fn push_i32(out: &mut Vec<u8>, value: i32) {
    let mut word = [0u8; 4];
    LittleEndian::write_i32(&mut word, value);
    out.extend_from_slice(&word);
}

fn address(offset: usize) -> Result<i32> {
    i32::try_from(offset).map_err(|_| HelpBookError::format("synthetic container too large"))
}

fn zip_entries<'a>(entries: impl IntoIterator<Item = (&'a str, &'a [u8])>) -> Result<Vec<u8>> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, data) in entries {
        writer.start_file(name, options).map_err(zip_error)?;
        writer
            .write_all(data)
            .map_err(|e| HelpBookError::io(name, e))?;
    }
    Ok(writer.finish().map_err(zip_error)?.into_inner())
}

const LOCAL_HEADER_SIGNATURE: &[u8] = b"PK\x03\x04";
const LOCAL_HEADER_LEN: usize = 30;

/// Invert the compressed data of entry `name`, located through its local header.
fn corrupt_entry(zip: &mut [u8], name: &str) -> Result<()> {
    let needle = name.as_bytes();
    let header = (LOCAL_HEADER_LEN..zip.len())
        .filter(|&at| zip[at..].starts_with(needle))
        .map(|at| at - LOCAL_HEADER_LEN)
        .find(|&start| {
            zip[start..].starts_with(LOCAL_HEADER_SIGNATURE)
                && usize::from(LittleEndian::read_u16(&zip[start + 26..])) == needle.len()
        })
        .ok_or_else(|| HelpBookError::load(format!("no local header for '{name}'")))?;

    let compressed = LittleEndian::read_u32(&zip[header + 18..]) as usize;
    let extra = usize::from(LittleEndian::read_u16(&zip[header + 28..]));
    let data = header + LOCAL_HEADER_LEN + needle.len() + extra;
    let end = (data + compressed).min(zip.len());
    for byte in &mut zip[data..end] {
        *byte ^= 0xFF;
    }
    Ok(())
}
