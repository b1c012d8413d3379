//! Read session over one help book: container → page tree → domain records.

use std::path::Path;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info, instrument, warn};

use helpbook_container::{FileStorage, HelpBookArchive};
use helpbook_extract::{
    BlockExtractor, ConstructorParser, EnumParser, EnumValueParser, MethodParser, ObjectParser,
    PageKind, PageParser, PageRecord, PropertyParser, parse_page,
};
use helpbook_shared::{
    EnumInfo, ExtractOptions, HelpBookError, MethodInfo, ObjectInfo, PropertyInfo, Result,
};
use helpbook_toc::{MemberGroup, Page, PageTree, RootPages, classify, drill_down, is_catalog_page};

use crate::locate::find_container;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Methods and properties of the global context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GlobalContextInfo {
    pub methods: Vec<MethodInfo>,
    pub properties: Vec<PropertyInfo>,
}

/// A page that was skipped because it could not be extracted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageFailure {
    pub path: String,
    pub title: String,
    pub error: String,
}

/// Everything extracted from one help book.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Extraction {
    pub global_context: GlobalContextInfo,
    pub enums: Vec<EnumInfo>,
    pub types: Vec<ObjectInfo>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<PageFailure>,
}

/// Counts reported when an extraction completes.
#[derive(Debug, Clone)]
pub struct ExtractionSummary {
    pub methods: usize,
    pub properties: usize,
    pub enums: usize,
    pub types: usize,
    pub failures: usize,
    pub elapsed: Duration,
}

impl Extraction {
    fn summary(&self, elapsed: Duration) -> ExtractionSummary {
        ExtractionSummary {
            methods: self.global_context.methods.len(),
            properties: self.global_context.properties.len(),
            enums: self.enums.len(),
            types: self.types.len(),
            failures: self.failures.len(),
            elapsed,
        }
    }
}

/// Progress callback for reporting extraction status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each page is parsed.
    fn page_parsed(&self, path: &str, current: usize, total: usize);
    /// Called when a page is skipped.
    fn page_failed(&self, path: &str, error: &HelpBookError);
    /// Called when the extraction completes.
    fn done(&self, summary: &ExtractionSummary);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn page_parsed(&self, _path: &str, _current: usize, _total: usize) {}
    fn page_failed(&self, _path: &str, _error: &HelpBookError) {}
    fn done(&self, _summary: &ExtractionSummary) {}
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// An opened help book.
#[derive(Debug)]
pub struct HelpBook {
    archive: HelpBookArchive,
    options: ExtractOptions,
}

impl HelpBook {
    /// Open a container file.
    pub fn open(path: impl AsRef<Path>, options: ExtractOptions) -> Result<Self> {
        Ok(Self {
            archive: HelpBookArchive::open(path)?,
            options,
        })
    }

    /// Find `file_name` under an installation directory and open it.
    pub fn locate(install_dir: &Path, file_name: &str, options: ExtractOptions) -> Result<Self> {
        let path = find_container(install_dir, file_name)?;
        Self::open(path, options)
    }

    pub fn archive(&self) -> &HelpBookArchive {
        &self.archive
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    pub fn page_tree(&self) -> &PageTree {
        self.archive.page_tree()
    }

    pub fn root_pages(&self) -> Result<RootPages<'_>> {
        classify(&self.page_tree().roots)
    }

    /// Extract a single page by archive path.
    #[instrument(skip(self))]
    pub fn parse_page(&self, path: &str, kind: PageKind) -> Result<PageRecord> {
        let html = self
            .archive
            .with_file_storage(|storage| storage.read_to_string(path))?;
        parse_page(&mut BlockExtractor::new(), &html, kind)
    }

    /// Methods and properties of the global context. Any failure aborts.
    #[instrument(skip_all)]
    pub fn read_global_context(&self, progress: &dyn ProgressReporter) -> Result<GlobalContextInfo> {
        let roots = self.root_pages()?;
        progress.phase("Reading global context");

        let strict = ExtractOptions {
            skip_failed_pages: false,
            ..self.options.clone()
        };
        self.archive.with_file_storage(|storage| {
            let total = members_in(roots.global_context, &GLOBAL_GROUPS);
            let mut run = Run::new(storage, &strict, progress, total);
            run.global_context(roots.global_context)
        })
    }

    /// Every enumeration with its values.
    #[instrument(skip_all)]
    pub fn read_enums(&self, progress: &dyn ProgressReporter) -> Result<(Vec<EnumInfo>, Vec<PageFailure>)> {
        let roots = self.root_pages()?;
        progress.phase("Reading enumerations");

        self.archive.with_file_storage(|storage| {
            let total = roots
                .enum_catalogs
                .iter()
                .copied()
                .flat_map(entries_of)
                .map(enum_pages)
                .sum();
            let mut run = Run::new(storage, &self.options, progress, total);
            let enums = run.enums(&roots.enum_catalogs)?;
            Ok((enums, run.failures))
        })
    }

    /// Every type with its members.
    #[instrument(skip_all)]
    pub fn read_types(&self, progress: &dyn ProgressReporter) -> Result<(Vec<ObjectInfo>, Vec<PageFailure>)> {
        let roots = self.root_pages()?;
        progress.phase("Reading types");

        self.archive.with_file_storage(|storage| {
            let total = roots
                .type_catalogs
                .iter()
                .copied()
                .flat_map(entries_of)
                .map(object_pages)
                .sum();
            let mut run = Run::new(storage, &self.options, progress, total);
            let types = run.types(&roots.type_catalogs)?;
            Ok((types, run.failures))
        })
    }

    /// Run every enabled phase.
    #[instrument(skip_all, fields(path = %self.archive.reader().path().display()))]
    pub fn extract(&self, progress: &dyn ProgressReporter) -> Result<Extraction> {
        let start = Instant::now();
        let mut extraction = Extraction {
            global_context: self.read_global_context(progress)?,
            ..Extraction::default()
        };

        if self.options.include_enums {
            let (enums, failures) = self.read_enums(progress)?;
            extraction.enums = enums;
            extraction.failures.extend(failures);
        }
        if self.options.include_types {
            let (types, failures) = self.read_types(progress)?;
            extraction.types = types;
            extraction.failures.extend(failures);
        }

        let summary = extraction.summary(start.elapsed());
        info!(
            methods = summary.methods,
            properties = summary.properties,
            enums = summary.enums,
            types = summary.types,
            failures = summary.failures,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "extraction complete"
        );
        progress.done(&summary);
        Ok(extraction)
    }
}

/// Member groups read below the global context.
const GLOBAL_GROUPS: [MemberGroup; 2] = [MemberGroup::Methods, MemberGroup::Properties];
/// Member groups read below an object.
const OBJECT_GROUPS: [MemberGroup; 3] = [
    MemberGroup::Methods,
    MemberGroup::Properties,
    MemberGroup::Constructors,
];

/// Member pages below `page` in the given groups.
fn members_in(page: &Page, groups: &[MemberGroup]) -> usize {
    page.children
        .iter()
        .filter(|group| MemberGroup::of(group).is_some_and(|g| groups.contains(&g)))
        .map(|group| drill_down(group).count())
        .sum()
}

/// An enum page and its values.
fn enum_pages(page: &Page) -> usize {
    1 + drill_down(page).count()
}

/// An object page and its members.
fn object_pages(page: &Page) -> usize {
    1 + members_in(page, &OBJECT_GROUPS)
}

/// Pages an object or enum root stands for: itself when it has content and
/// is not an index page, otherwise its content descendants.
fn entries_of(root: &Page) -> Vec<&Page> {
    if root.has_content() && !is_catalog_page(root) {
        vec![root]
    } else {
        drill_down(root).collect()
    }
}

// ---------------------------------------------------------------------------
// One phase over the file storage
// ---------------------------------------------------------------------------

struct Run<'s, 'a> {
    storage: &'s mut FileStorage<'a>,
    extractor: BlockExtractor,
    options: &'s ExtractOptions,
    progress: &'s dyn ProgressReporter,
    failures: Vec<PageFailure>,
    done: usize,
    total: usize,
}

impl<'s, 'a> Run<'s, 'a> {
    fn new(
        storage: &'s mut FileStorage<'a>,
        options: &'s ExtractOptions,
        progress: &'s dyn ProgressReporter,
        total: usize,
    ) -> Self {
        Self {
            storage,
            extractor: BlockExtractor::new(),
            options,
            progress,
            failures: Vec::new(),
            done: 0,
            total,
        }
    }

    /// Parse one page, applying the skip policy. `Ok(None)` means skipped.
    fn parse<P: PageParser>(&mut self, page: &Page, parser: P) -> Result<Option<P::Output>> {
        let result = self
            .storage
            .read_page(page)
            .and_then(|html| self.extractor.extract(&html, parser));
        self.done += 1;

        match result {
            Ok(record) => {
                debug!(path = %page.path, "page parsed");
                self.progress.page_parsed(&page.path, self.done, self.total);
                Ok(Some(record))
            }
            Err(e) if self.options.skip_failed_pages && !e.is_fatal_for_container() => {
                warn!(path = %page.path, error = %e, "page skipped");
                self.progress.page_failed(&page.path, &e);
                self.failures.push(PageFailure {
                    path: page.path.clone(),
                    title: page.title.display().to_string(),
                    error: e.to_string(),
                });
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn members<P: PageParser + Default>(&mut self, group: &Page) -> Result<Vec<P::Output>> {
        let mut out = Vec::new();
        for page in drill_down(group) {
            if let Some(record) = self.parse(page, P::default())? {
                out.push(record);
            }
        }
        Ok(out)
    }

    fn global_context(&mut self, root: &Page) -> Result<GlobalContextInfo> {
        let mut info = GlobalContextInfo::default();
        for group in &root.children {
            match MemberGroup::of(group) {
                Some(MemberGroup::Methods) => info.methods.extend(self.members::<MethodParser>(group)?),
                Some(MemberGroup::Properties) => {
                    info.properties.extend(self.members::<PropertyParser>(group)?);
                }
                other => debug!(title = group.title.display(), ?other, "global context group skipped"),
            }
        }
        Ok(info)
    }

    fn enums(&mut self, catalogs: &[&Page]) -> Result<Vec<EnumInfo>> {
        let mut enums = Vec::new();
        for catalog in catalogs {
            for page in entries_of(catalog) {
                let Some(mut info) = self.parse(page, EnumParser::default())? else {
                    self.done += enum_pages(page) - 1;
                    continue;
                };
                info.values = self.members::<EnumValueParser>(page)?;
                enums.push(info);
            }
        }
        Ok(enums)
    }

    fn types(&mut self, catalogs: &[&Page]) -> Result<Vec<ObjectInfo>> {
        let mut types = Vec::new();
        for catalog in catalogs {
            for page in entries_of(catalog) {
                let Some(mut info) = self.parse(page, ObjectParser::default())? else {
                    self.done += object_pages(page) - 1;
                    continue;
                };
                for group in &page.children {
                    match MemberGroup::of(group) {
                        Some(MemberGroup::Methods) => {
                            info.methods = Some(self.members::<MethodParser>(group)?);
                        }
                        Some(MemberGroup::Properties) => {
                            info.properties = Some(self.members::<PropertyParser>(group)?);
                        }
                        Some(MemberGroup::Constructors) => {
                            info.constructors = Some(self.members::<ConstructorParser>(group)?);
                        }
                        other => debug!(
                            object = page.title.display(),
                            group = group.title.display(),
                            ?other,
                            "object group skipped"
                        ),
                    }
                }
                types.push(info);
            }
        }
        Ok(types)
    }
}
