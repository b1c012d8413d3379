//! Zip-packed TOC and file-storage entities of a container.

use std::io::{Cursor, Read};
use std::path::Path;

use tracing::{debug, info, instrument};
use zip::ZipArchive;
use zip::result::ZipError;

use helpbook_shared::{HelpBookError, Result};
use helpbook_toc::{Page, PageTree, parse_page_tree};

use crate::reader::ContainerReader;

/// Entity holding the zip-packed table of contents.
pub const TOC_ENTITY: &str = "PackBlock";
/// Entity holding the zip archive of html pages.
pub const FILE_STORAGE_ENTITY: &str = "FileStorage";

pub(crate) fn zip_error(e: ZipError) -> HelpBookError {
    HelpBookError::Decompression(e.to_string())
}

/// An opened help book: the container plus its decoded page tree.
#[derive(Debug)]
pub struct HelpBookArchive {
    reader: ContainerReader,
    tree: PageTree,
}

impl HelpBookArchive {
    /// Open a container and decode its table of contents.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_reader(ContainerReader::open(path)?)
    }

    pub fn from_reader(reader: ContainerReader) -> Result<Self> {
        let packed = reader.require_entity(TOC_ENTITY)?;
        let toc = unpack_single(packed)?;
        debug!(packed = packed.len(), unpacked = toc.len(), "TOC unpacked");

        let tree = parse_page_tree(&toc)?;
        info!(roots = tree.roots.len(), pages = tree.len(), "page tree loaded");
        Ok(Self { reader, tree })
    }

    pub fn reader(&self) -> &ContainerReader {
        &self.reader
    }

    pub fn page_tree(&self) -> &PageTree {
        &self.tree
    }

    /// Run `f` against the file-storage archive.
    ///
    /// The archive reads straight from the mapped entity and is dropped when
    /// `f` returns, whether it succeeded or not.
    pub fn with_file_storage<T>(
        &self,
        f: impl FnOnce(&mut FileStorage<'_>) -> Result<T>,
    ) -> Result<T> {
        let bytes = self.reader.require_entity(FILE_STORAGE_ENTITY)?;
        let archive = ZipArchive::new(Cursor::new(bytes)).map_err(zip_error)?;
        let mut storage = FileStorage { archive };
        f(&mut storage)
    }
}

/// Decompress the only entry of a packed blob.
fn unpack_single(packed: &[u8]) -> Result<Vec<u8>> {
    let mut archive = ZipArchive::new(Cursor::new(packed)).map_err(zip_error)?;
    if archive.is_empty() {
        return Err(HelpBookError::Decompression(
            "packed TOC has no entries".into(),
        ));
    }
    let mut entry = archive.by_index(0).map_err(zip_error)?;
    let mut out = Vec::with_capacity(entry.size() as usize);
    entry
        .read_to_end(&mut out)
        .map_err(|e| HelpBookError::Decompression(e.to_string()))?;
    Ok(out)
}

// ---------------------------------------------------------------------------
// File storage
// ---------------------------------------------------------------------------

/// Html pages of a help book, addressed by archive path.
pub struct FileStorage<'a> {
    archive: ZipArchive<Cursor<&'a [u8]>>,
}

impl FileStorage<'_> {
    pub fn len(&self) -> usize {
        self.archive.len()
    }

    pub fn is_empty(&self) -> bool {
        self.archive.is_empty()
    }

    pub fn contains(&self, path: &str) -> bool {
        normalize(path).is_ok_and(|name| self.archive.index_for_name(name).is_some())
    }

    /// Streaming reader over one entry. A leading `/` is ignored.
    ///
    /// A damaged entry is an [`Extraction`](HelpBookError::Extraction) error
    /// scoped to that page; the rest of the archive stays readable.
    pub fn entry(&mut self, path: &str) -> Result<impl Read + '_> {
        let name = normalize(path)?;
        self.archive.by_name(name).map_err(|e| match e {
            ZipError::FileNotFound => {
                HelpBookError::load(format!("archive has no entry '{name}'"))
            }
            other => HelpBookError::extraction(format!("entry '{name}': {other}")),
        })
    }

    /// Whole entry decoded as UTF-8 (BOM removed, malformed bytes replaced).
    pub fn read_to_string(&mut self, path: &str) -> Result<String> {
        let mut bytes = Vec::new();
        self.entry(path)?
            .read_to_end(&mut bytes)
            .map_err(|e| HelpBookError::extraction(format!("entry '{path}': {e}")))?;
        let (text, _, _) = encoding_rs::UTF_8.decode(&bytes);
        Ok(text.into_owned())
    }

    /// Html of a content page.
    pub fn read_page(&mut self, page: &Page) -> Result<String> {
        if !page.has_content() {
            return Err(HelpBookError::load(format!(
                "page '{}' has no html path",
                page.title.display()
            )));
        }
        self.read_to_string(&page.path)
    }
}

fn normalize(path: &str) -> Result<&str> {
    let name = path.trim().trim_start_matches('/');
    if name.is_empty() {
        return Err(HelpBookError::load("blank archive path"));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ContainerBuilder;

    const TOC: &str = r#"{2,
{1,0,1,2,{0,0,{0,0,{"ru","Глобальный контекст"},{"en","Global context"}},"objects/Global context.html"}},
{2,1,0,{0,0,{0,0,{"ru","Сообщить"},{"en","Message"}},"/objects/Global context/Message.html"}}
}"#;

    fn open(builder: ContainerBuilder) -> (tempfile::NamedTempFile, HelpBookArchive) {
        let file = tempfile::NamedTempFile::new().unwrap();
        builder.write_to(file.path()).unwrap();
        let archive = HelpBookArchive::open(file.path()).unwrap();
        (file, archive)
    }

    #[test]
    fn decodes_toc_and_reads_pages() {
        let (_file, book) = open(
            ContainerBuilder::new()
                .toc(TOC)
                .page("objects/Global context/Message.html", "<p>hello</p>"),
        );
        assert_eq!(book.page_tree().len(), 2);

        let message = &book.page_tree().roots[0].children[0];
        let html = book
            .with_file_storage(|storage| {
                assert_eq!(storage.len(), 1);
                assert!(storage.contains("/objects/Global context/Message.html"));
                storage.read_page(message)
            })
            .unwrap();
        assert_eq!(html, "<p>hello</p>");
    }

    #[test]
    fn missing_and_blank_paths_are_load_errors() {
        let (_file, book) = open(ContainerBuilder::new().toc(TOC).page("a.html", "a"));
        book.with_file_storage(|storage| {
            assert!(matches!(
                storage.read_to_string("b.html").unwrap_err(),
                HelpBookError::Load { .. }
            ));
            assert!(matches!(
                storage.read_to_string(" / ").unwrap_err(),
                HelpBookError::Load { .. }
            ));
            let group = Page::default();
            assert!(storage.read_page(&group).is_err());
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn byte_order_mark_is_dropped() {
        let (_file, book) =
            open(ContainerBuilder::new().toc(TOC).page("a.html", "\u{feff}<p>x</p>"));
        let html = book
            .with_file_storage(|storage| storage.read_to_string("a.html"))
            .unwrap();
        assert_eq!(html, "<p>x</p>");
    }

    #[test]
    fn damaged_entry_fails_only_that_entry() {
        let (_file, book) = open(
            ContainerBuilder::new()
                .toc(TOC)
                .page("a.html", "<p>первая страница</p>".repeat(20))
                .page("b.html", "<p>вторая страница</p>".repeat(20))
                .corrupt_page("a.html"),
        );
        book.with_file_storage(|storage| {
            let err = storage.read_to_string("a.html").unwrap_err();
            assert!(matches!(err, HelpBookError::Extraction { .. }), "{err}");
            assert!(!err.is_fatal_for_container());
            assert!(storage.read_to_string("b.html")?.starts_with("<p>вторая"));
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn missing_toc_entity_is_a_load_error() {
        let file = tempfile::NamedTempFile::new().unwrap();
        ContainerBuilder::new()
            .raw_entity("FileStorage", Vec::new())
            .write_to(file.path())
            .unwrap();
        let err = HelpBookArchive::open(file.path()).unwrap_err();
        assert!(matches!(err, HelpBookError::Load { .. }));
    }

    #[test]
    fn unpacked_toc_must_be_a_zip() {
        let file = tempfile::NamedTempFile::new().unwrap();
        ContainerBuilder::new()
            .raw_entity(TOC_ENTITY, b"not a zip".to_vec())
            .write_to(file.path())
            .unwrap();
        let err = HelpBookArchive::open(file.path()).unwrap_err();
        assert!(err.is_fatal_for_container());
    }
}
