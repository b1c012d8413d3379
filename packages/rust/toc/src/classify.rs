//! Root classification and lazy catalog traversal.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use helpbook_shared::{HelpBookError, Result};

use crate::page::Page;

/// Html path fragment identifying the global-context root.
pub const GLOBAL_CONTEXT_MARKER: &str = "Global context";

/// Root titles that hold enumerations rather than types, as (ru, en).
pub const ENUM_CATALOG_TITLES: [(&str, &str); 2] = [
    ("Системные перечисления", "System enumerations"),
    ("Системные наборы значений", "System value sets"),
];

static CATALOG_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"catalog\d+\.html$").expect("valid regex"));

/// Whether the page is a pure index page (`.../catalogNNN.html`).
pub fn is_catalog_page(page: &Page) -> bool {
    CATALOG_PATH.is_match(&page.path)
}

fn is_enum_catalog(page: &Page) -> bool {
    ENUM_CATALOG_TITLES
        .iter()
        .any(|(ru, en)| page.title.ru == *ru || page.title.en == *en)
}

// ---------------------------------------------------------------------------
// Root pages
// ---------------------------------------------------------------------------

/// Top-level roots partitioned by what they document.
#[derive(Debug, Clone)]
pub struct RootPages<'a> {
    pub global_context: &'a Page,
    pub enum_catalogs: Vec<&'a Page>,
    pub type_catalogs: Vec<&'a Page>,
}

/// Partition the tree's roots.
///
/// The first root whose path carries [`GLOBAL_CONTEXT_MARKER`] is the global
/// context; enum catalogs are matched by title; everything else is a type
/// catalog. A tree without a global context is a load error.
pub fn classify(roots: &[Page]) -> Result<RootPages<'_>> {
    let mut global_context = None;
    let mut enum_catalogs = Vec::new();
    let mut type_catalogs = Vec::new();

    for root in roots {
        if global_context.is_none() && root.path.contains(GLOBAL_CONTEXT_MARKER) {
            global_context = Some(root);
        } else if is_enum_catalog(root) {
            enum_catalogs.push(root);
        } else {
            type_catalogs.push(root);
        }
    }

    let global_context = global_context
        .ok_or_else(|| HelpBookError::load("no global context page among TOC roots"))?;

    debug!(
        enums = enum_catalogs.len(),
        types = type_catalogs.len(),
        "roots classified"
    );

    Ok(RootPages {
        global_context,
        enum_catalogs,
        type_catalogs,
    })
}

// ---------------------------------------------------------------------------
// Traversal
// ---------------------------------------------------------------------------

/// Lazily yield the content pages below `page`.
///
/// Index pages and grouping pages (empty path with children) are descended
/// into and never yielded. Empty-path leaves are skipped. Every other
/// descendant is yielded in TOC order, without descending further.
pub fn drill_down(page: &Page) -> impl Iterator<Item = &Page> {
    let mut stack: Vec<&Page> = page.children.iter().rev().collect();
    std::iter::from_fn(move || {
        while let Some(next) = stack.pop() {
            if is_catalog_page(next) || (!next.has_content() && !next.children.is_empty()) {
                stack.extend(next.children.iter().rev());
                continue;
            }
            if next.has_content() {
                return Some(next);
            }
        }
        None
    })
}

/// Member grouping page kinds found below an object or the global context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberGroup {
    Properties,
    Methods,
    Constructors,
    Events,
}

impl MemberGroup {
    pub fn from_title(title: &str) -> Option<Self> {
        match title.trim() {
            "Свойства" | "Properties" => Some(Self::Properties),
            "Методы" | "Methods" => Some(Self::Methods),
            "Конструкторы" | "Constructors" => Some(Self::Constructors),
            "События" | "Events" => Some(Self::Events),
            _ => None,
        }
    }

    /// Group of a page, judged by either title.
    pub fn of(page: &Page) -> Option<Self> {
        Self::from_title(&page.title.ru).or_else(|| Self::from_title(&page.title.en))
    }
}
