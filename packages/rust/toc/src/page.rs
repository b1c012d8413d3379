//! Page tree assembled from TOC chunks.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, instrument, warn};

use helpbook_shared::{HelpBookError, Result};

use crate::parser::{Chunk, NameObject, parse_chunks};

/// Id of the synthetic root every top-level chunk hangs from.
pub const ROOT_ID: u32 = 0;

/// UTF-8 byte-order mark.
const BOM: &[u8] = b"\xEF\xBB\xBF";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Bilingual page title.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageTitle {
    pub en: String,
    pub ru: String,
}

impl PageTitle {
    /// Build a title from the chunk's name objects.
    ///
    /// One name is an English-only title. With two names the first is Russian
    /// and the second English; the language tags are not consulted.
    pub fn from_names(names: &[NameObject]) -> Self {
        match names {
            [] => Self::default(),
            [only] => Self {
                en: only.name.clone(),
                ru: String::new(),
            },
            [ru, en, ..] => Self {
                en: en.name.clone(),
                ru: ru.name.clone(),
            },
        }
    }

    /// Either title equals `candidate`.
    pub fn matches(&self, candidate: &str) -> bool {
        self.en == candidate || self.ru == candidate
    }

    /// Preferred display text (Russian when present).
    pub fn display(&self) -> &str {
        if self.ru.is_empty() { &self.en } else { &self.ru }
    }
}

/// One node of the documentation tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Page {
    pub title: PageTitle,
    /// Archive-relative html path; empty for pure grouping nodes.
    pub path: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Page>,
}

impl Page {
    pub fn has_content(&self) -> bool {
        !self.path.is_empty()
    }

    /// Depth-first walk over this page and all descendants.
    pub fn walk(&self) -> impl Iterator<Item = &Page> {
        let mut stack = vec![self];
        std::iter::from_fn(move || {
            let page = stack.pop()?;
            stack.extend(page.children.iter().rev());
            Some(page)
        })
    }
}

/// The full page hierarchy of one container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageTree {
    pub roots: Vec<Page>,
}

impl Drop for PageTree {
    /// Tear the tree down level by level; deep TOCs would overflow the
    /// stack under the default recursive drop.
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.roots);
        while let Some(mut page) = pending.pop() {
            pending.append(&mut page.children);
        }
    }
}

impl PageTree {
    /// Total number of pages in the tree.
    pub fn len(&self) -> usize {
        self.roots.iter().map(|root| root.walk().count()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Find the first page with the given html path (leading `/` ignored).
    pub fn find_by_path(&self, path: &str) -> Option<&Page> {
        let wanted = path.trim_start_matches('/');
        self.roots
            .iter()
            .flat_map(|root| root.walk())
            .find(|page| page.path.trim_start_matches('/') == wanted)
    }
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

/// Parse decompressed TOC bytes into a page tree.
#[instrument(skip_all, fields(bytes = bytes.len()))]
pub fn parse_page_tree(bytes: &[u8]) -> Result<PageTree> {
    let bytes = bytes.strip_prefix(BOM).unwrap_or(bytes);
    let text = std::str::from_utf8(bytes)
        .map_err(|e| HelpBookError::toc(format!("TOC is not valid UTF-8: {e}"), e.valid_up_to()))?;

    let chunks = parse_chunks(text)?;
    let declared = chunks.declared_count();
    let chunks = chunks.collect::<Result<Vec<_>>>()?;

    if declared != chunks.len() as i64 {
        debug!(declared, parsed = chunks.len(), "TOC chunk count differs from header");
    }

    let tree = build_tree(chunks)?;
    debug!(roots = tree.roots.len(), pages = tree.len(), "page tree built");
    Ok(tree)
}

/// Link chunks into a tree under the synthetic root.
///
/// Children keep the order in which their chunks appear in the TOC.
pub fn build_tree(chunks: Vec<Chunk>) -> Result<PageTree> {
    let mut children_of: HashMap<u32, Vec<u32>> = HashMap::new();
    let mut by_id: HashMap<u32, Chunk> = HashMap::with_capacity(chunks.len());

    for chunk in chunks {
        if chunk.id == ROOT_ID {
            return Err(HelpBookError::toc("chunk uses the reserved root id 0", 0));
        }
        children_of.entry(chunk.parent_id).or_default().push(chunk.id);
        if by_id.insert(chunk.id, chunk).is_some() {
            return Err(HelpBookError::toc("duplicate chunk id", 0));
        }
    }

    for chunk in by_id.values() {
        let linked = children_of.get(&chunk.id).map_or(0, Vec::len);
        if linked != chunk.child_ids.len() {
            debug!(
                id = chunk.id,
                declared = chunk.child_ids.len(),
                linked,
                "chunk child list differs from parent links"
            );
        }
    }

    let root_ids = children_of.remove(&ROOT_ID).unwrap_or_default();
    let roots = assemble(root_ids, &mut by_id, &mut children_of)?;

    if !by_id.is_empty() {
        warn!(orphans = by_id.len(), "TOC chunks unreachable from the root were dropped");
    }

    Ok(PageTree { roots })
}

/// Build the pages below the synthetic root without recursing.
///
/// A pre-order walk lays pages out flat, each child after its parent, so
/// attaching them in reverse order finishes every subtree before its parent.
fn assemble(
    root_ids: Vec<u32>,
    by_id: &mut HashMap<u32, Chunk>,
    children_of: &mut HashMap<u32, Vec<u32>>,
) -> Result<Vec<Page>> {
    let mut nodes: Vec<(Page, Option<usize>)> = Vec::with_capacity(by_id.len());
    let mut stack: Vec<(u32, Option<usize>)> =
        root_ids.into_iter().rev().map(|id| (id, None)).collect();

    while let Some((id, parent)) = stack.pop() {
        // Removing on visit makes a cycle surface as a missing chunk.
        let chunk = by_id
            .remove(&id)
            .ok_or_else(|| HelpBookError::toc(format!("chunk {id} is part of a cycle"), 0))?;

        let slot = nodes.len();
        nodes.push((
            Page {
                title: PageTitle::from_names(&chunk.properties.names),
                path: chunk.properties.html_path,
                children: Vec::new(),
            },
            parent,
        ));
        if let Some(child_ids) = children_of.remove(&id) {
            stack.extend(child_ids.into_iter().rev().map(|child| (child, Some(slot))));
        }
    }

    let mut roots = Vec::new();
    for slot in (0..nodes.len()).rev() {
        let (mut page, parent) = std::mem::take(&mut nodes[slot]);
        page.children.reverse();
        match parent {
            Some(parent) => nodes[parent].0.children.push(page),
            None => roots.push(page),
        }
    }
    roots.reverse();
    Ok(roots)
}
