//! Memory-mapped container reader and entity index.

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use encoding_rs::UTF_16LE;
use memmap2::Mmap;
use tracing::{debug, info, instrument};

use helpbook_shared::{HelpBookError, Result};

use crate::cursor::{ByteCursor, HEX_LENGTH_WIDTH};

/// Marker stored in the third field of every index record.
pub const RESERVED_MARKER: i32 = i32::MAX;

/// Size of the file header preceding the first block.
const FILE_HEADER_LEN: usize = 16;
/// Line break opening every block header.
const BLOCK_PREFIX_LEN: usize = 2;
/// Next-block address field plus the closing line break.
const BLOCK_TAIL_LEN: usize = HEX_LENGTH_WIDTH + 2;
/// Fixed-size attributes stored before an entity name.
const NAME_ATTRIBUTES_LEN: usize = 20;
/// Attribute bytes plus the trailing terminator counted in a name length.
const NAME_OVERHEAD: usize = NAME_ATTRIBUTES_LEN + 4;
const INDEX_RECORD_LEN: usize = 12;

/// Read-only view of one `.hbk` container.
pub struct ContainerReader {
    path: PathBuf,
    map: Mmap,
    index: HashMap<String, usize>,
}

impl std::fmt::Debug for ContainerReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContainerReader")
            .field("path", &self.path)
            .field("len", &self.map.len())
            .field("entities", &self.index.len())
            .finish()
    }
}

impl ContainerReader {
    /// Map the file and build its entity index.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(HelpBookError::load(format!(
                "container not found: {}",
                path.display()
            )));
        }

        let file = File::open(path).map_err(|e| HelpBookError::io(path, e))?;
        // SAFETY: the mapping is read-only and lives as long as the reader.
        let map = unsafe { Mmap::map(&file) }.map_err(|e| HelpBookError::io(path, e))?;

        let index = read_index(&map)?;
        info!(entities = index.len(), bytes = map.len(), "container opened");

        Ok(Self {
            path: path.to_path_buf(),
            map,
            index,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Payload of the named entity, `None` when the index has no such name.
    pub fn entity(&self, name: &str) -> Result<Option<&[u8]>> {
        match self.index.get(name) {
            Some(&address) => read_body(&self.map, address).map(Some),
            None => Ok(None),
        }
    }

    /// Like [`entity`](Self::entity), but an absent entity is a load error.
    pub fn require_entity(&self, name: &str) -> Result<&[u8]> {
        self.entity(name)?
            .ok_or_else(|| HelpBookError::load(format!("container has no '{name}' entity")))
    }

    /// Indexed entity names, sorted.
    pub fn entity_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.index.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// Parse the index block into `name -> body address`.
pub(crate) fn read_index(data: &[u8]) -> Result<HashMap<String, usize>> {
    let mut cursor = ByteCursor::new(data);
    cursor.skip(FILE_HEADER_LEN)?;
    cursor.skip(BLOCK_PREFIX_LEN)?;
    let payload_size = cursor.read_hex_length()?;
    let block_size = cursor.read_hex_length()?;
    cursor.skip(BLOCK_TAIL_LEN)?;

    if payload_size % INDEX_RECORD_LEN != 0 {
        return Err(HelpBookError::format(format!(
            "index payload of {payload_size} bytes is not a whole number of records"
        )));
    }
    debug!(payload_size, block_size, "index block header");

    let mut records = ByteCursor::new(cursor.read_bytes(payload_size)?);
    let mut index = HashMap::with_capacity(payload_size / INDEX_RECORD_LEN);
    while records.remaining() > 0 {
        let header_address = to_address(records.read_i32_le()?, "header")?;
        let body_address = to_address(records.read_i32_le()?, "body")?;
        let reserved = records.read_i32_le()?;
        if reserved != RESERVED_MARKER {
            return Err(HelpBookError::format(format!(
                "index record at {} has reserved field {reserved:#x}",
                records.position() - INDEX_RECORD_LEN
            )));
        }

        let name = read_name(data, header_address)?;
        debug!(%name, body_address, "entity indexed");
        index.insert(name, body_address);
    }

    Ok(index)
}

fn read_name(data: &[u8], address: usize) -> Result<String> {
    let mut cursor = ByteCursor::new(data);
    cursor.seek(address)?;
    cursor.skip(BLOCK_PREFIX_LEN)?;
    let length = cursor.read_hex_length()?;
    cursor.skip(2 * HEX_LENGTH_WIDTH + 2 + NAME_ATTRIBUTES_LEN)?;

    let name_len = length.checked_sub(NAME_OVERHEAD).ok_or_else(|| {
        HelpBookError::format(format!("name header at {address} has length {length}"))
    })?;
    let (name, _) = UTF_16LE.decode_without_bom_handling(cursor.read_bytes(name_len)?);
    Ok(name.trim_end_matches('\0').to_string())
}

fn read_body(data: &[u8], address: usize) -> Result<&[u8]> {
    let mut cursor = ByteCursor::new(data);
    cursor.seek(address)?;
    cursor.skip(BLOCK_PREFIX_LEN)?;
    let length = cursor.read_hex_length()?;
    cursor.skip(2 * HEX_LENGTH_WIDTH + 2)?;
    cursor.read_bytes(length)
}

fn to_address(raw: i32, what: &str) -> Result<usize> {
    usize::try_from(raw)
        .map_err(|_| HelpBookError::format(format!("negative {what} address {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ContainerBuilder;

    fn sample() -> ContainerBuilder {
        ContainerBuilder::new()
            .raw_entity("PackBlock", b"toc bytes".to_vec())
            .raw_entity("FileStorage", b"storage bytes".to_vec())
    }

    #[test]
    fn index_maps_names_to_bodies() {
        let bytes = sample().to_bytes().unwrap();
        let index = read_index(&bytes).unwrap();
        assert_eq!(index.len(), 2);
        assert_eq!(read_body(&bytes, index["PackBlock"]).unwrap(), b"toc bytes");
        assert_eq!(
            read_body(&bytes, index["FileStorage"]).unwrap(),
            b"storage bytes"
        );
    }

    #[test]
    fn open_reads_entities_from_disk() {
        let file = tempfile::NamedTempFile::new().unwrap();
        sample().write_to(file.path()).unwrap();

        let reader = ContainerReader::open(file.path()).unwrap();
        assert_eq!(reader.entity_names(), ["FileStorage", "PackBlock"]);
        assert_eq!(reader.entity("PackBlock").unwrap(), Some(&b"toc bytes"[..]));
        assert!(reader.entity("Missing").unwrap().is_none());
        assert!(matches!(
            reader.require_entity("Missing").unwrap_err(),
            HelpBookError::Load { .. }
        ));
    }

    #[test]
    fn reopening_is_stable() {
        let file = tempfile::NamedTempFile::new().unwrap();
        sample().write_to(file.path()).unwrap();

        let first = ContainerReader::open(file.path()).unwrap();
        let second = ContainerReader::open(file.path()).unwrap();
        assert_eq!(first.entity_names(), second.entity_names());
        assert_eq!(
            first.entity("FileStorage").unwrap(),
            second.entity("FileStorage").unwrap()
        );
        assert_eq!(
            first.entity("FileStorage").unwrap(),
            first.entity("FileStorage").unwrap()
        );
    }

    #[test]
    fn bad_reserved_marker_is_fatal() {
        let bytes = sample().reserved_marker(0).to_bytes().unwrap();
        let err = read_index(&bytes).unwrap_err();
        assert!(matches!(err, HelpBookError::Format { .. }));
        assert!(err.is_fatal_for_container());
    }

    #[test]
    fn truncated_container_is_a_format_error() {
        let bytes = sample().to_bytes().unwrap();
        let err = read_index(&bytes[..40]).unwrap_err();
        assert!(matches!(err, HelpBookError::Format { .. }));
    }

    #[test]
    fn missing_file_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ContainerReader::open(dir.path().join("absent.hbk")).unwrap_err();
        assert!(matches!(err, HelpBookError::Load { .. }));
    }
}
