//! Parsed PDF documents
//!
//! [`Document`] wraps a `lopdf::Document` and adds the page-tree plumbing the
//! operations need: flattening inherited page attributes and rebuilding the
//! page tree from an arbitrary list of page objects.

use crate::error::{PdfToolsError, Result};
use lopdf::{Dictionary, Object, ObjectId};
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, instrument};

/// Page attributes a page may inherit from its ancestors in the page tree
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guard against malformed, cyclic `/Parent` chains
const MAX_TREE_DEPTH: usize = 64;

/// An opened PDF document
#[derive(Debug, Clone)]
pub struct Document {
    inner: lopdf::Document,
}

impl Document {
    /// Open a PDF from disk
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let inner = lopdf::Document::load(path.as_ref())?;
        debug!(pages = inner.get_pages().len(), "PDF loaded");
        Ok(Self { inner })
    }

    /// Parse a PDF held in memory
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let inner = lopdf::Document::load_mem(data)?;
        debug!(pages = inner.get_pages().len(), "PDF loaded from bytes");
        Ok(Self { inner })
    }

    pub fn page_count(&self) -> usize {
        self.inner.get_pages().len()
    }

    /// Page object ids in document order
    pub fn page_ids(&self) -> Vec<ObjectId> {
        self.inner.get_pages().into_values().collect()
    }

    /// Page dictionary for a 0-based page index
    pub fn page(&self, index: usize) -> Result<&Dictionary> {
        let id = self.page_id(index)?;
        Ok(self.inner.get_dictionary(id)?)
    }

    /// Effective `/Rotate` of a page, following inheritance
    pub fn page_rotation(&self, index: usize) -> Result<i64> {
        self.rotation_of(self.page_id(index)?)
    }

    /// Effective `/MediaBox` of a page, following inheritance
    pub fn page_media_box(&self, index: usize) -> Result<Option<Vec<f32>>> {
        self.media_box_of(self.page_id(index)?)
    }

    /// Effective `/Rotate` of the page object `id`. Use with [`Document::page_ids`]
    /// when walking every page.
    pub fn rotation_of(&self, id: ObjectId) -> Result<i64> {
        Ok(self
            .inherited_value(id, b"Rotate")?
            .and_then(|value| value.as_i64().ok())
            .unwrap_or(0))
    }

    pub fn media_box_of(&self, id: ObjectId) -> Result<Option<Vec<f32>>> {
        let Some(Object::Array(values)) = self.inherited_value(id, b"MediaBox")? else {
            return Ok(None);
        };
        Ok(Some(values.iter().filter_map(as_number).collect()))
    }

    pub fn write_to(&mut self, writer: &mut impl std::io::Write) -> Result<()> {
        self.inner.save_to(writer)?;
        Ok(())
    }

    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        self.write_to(&mut output)?;
        Ok(output)
    }

    pub fn save(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.inner.save(path.as_ref())?;
        Ok(())
    }

    pub fn inner(&self) -> &lopdf::Document {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut lopdf::Document {
        &mut self.inner
    }

    pub fn into_inner(self) -> lopdf::Document {
        self.inner
    }

    pub(crate) fn page_id(&self, index: usize) -> Result<ObjectId> {
        let pages = self.inner.get_pages();
        let page_count = pages.len();
        u32::try_from(index + 1)
            .ok()
            .and_then(|number| pages.get(&number).copied())
            .ok_or_else(|| {
                PdfToolsError::Codec(format!(
                    "page index {index} out of bounds (document has {page_count} pages)"
                ))
            })
    }

    /// Copy inherited attributes onto every page so pages can be re-parented
    /// without changing how they render. Returns page ids in document order.
    pub(crate) fn flatten_pages(&mut self) -> Result<Vec<ObjectId>> {
        let ids = self.page_ids();
        for &id in &ids {
            let inherited = self.missing_inherited_attributes(id)?;
            if inherited.is_empty() {
                continue;
            }
            let page = self.inner.get_dictionary_mut(id)?;
            for (key, value) in inherited {
                page.set(key, value);
            }
        }
        Ok(ids)
    }

    /// Replace the page tree with a single root listing `pages` in order.
    ///
    /// Pages must already be flattened. A page id listed more than once is
    /// cloned into a new object for every repeat, so each page object keeps
    /// exactly one parent.
    pub(crate) fn rebuild_page_tree(&mut self, pages: &[ObjectId]) -> Result<()> {
        let root_id = self.pages_root_id()?;
        let mut seen = HashSet::new();
        let mut kids = Vec::with_capacity(pages.len());

        for &id in pages {
            let page_id = if seen.insert(id) {
                id
            } else {
                let copy = self.inner.get_dictionary(id)?.clone();
                self.inner.add_object(Object::Dictionary(copy))
            };
            self.inner
                .get_dictionary_mut(page_id)?
                .set("Parent", Object::Reference(root_id));
            kids.push(Object::Reference(page_id));
        }

        let root = self.inner.get_dictionary_mut(root_id)?;
        for key in INHERITABLE_KEYS {
            root.remove(key);
        }
        root.remove(b"Parent");
        root.set("Type", Object::Name(b"Pages".to_vec()));
        root.set("Count", Object::Integer(kids.len() as i64));
        root.set("Kids", Object::Array(kids));

        let pruned = self.inner.prune_objects();
        debug!(pages = pages.len(), pruned = pruned.len(), "Page tree rebuilt");
        Ok(())
    }

    pub(crate) fn pages_root_id(&self) -> Result<ObjectId> {
        let catalog = self.inner.catalog()?;
        Ok(catalog.get(b"Pages")?.as_reference()?)
    }

    fn missing_inherited_attributes(&self, page_id: ObjectId) -> Result<Vec<(Vec<u8>, Object)>> {
        let page = self.inner.get_dictionary(page_id)?;
        let mut missing: Vec<&[u8]> = INHERITABLE_KEYS
            .iter()
            .copied()
            .filter(|key| !page.has(key))
            .collect();
        let mut found = Vec::new();
        let mut parent = parent_of(page);
        let mut depth = 0;

        while let Some(id) = parent {
            if missing.is_empty() || depth >= MAX_TREE_DEPTH {
                break;
            }
            let Ok(node) = self.inner.get_dictionary(id) else {
                break;
            };
            missing.retain(|key| match node.get(key) {
                Ok(value) => {
                    found.push((key.to_vec(), value.clone()));
                    false
                }
                Err(_) => true,
            });
            parent = parent_of(node);
            depth += 1;
        }

        Ok(found)
    }

    pub(crate) fn inherited_value(&self, page_id: ObjectId, key: &[u8]) -> Result<Option<Object>> {
        let mut node = self.inner.get_dictionary(page_id)?;
        for _ in 0..MAX_TREE_DEPTH {
            if let Ok(value) = node.get(key) {
                return Ok(Some(self.resolve(value).clone()));
            }
            match parent_of(node).and_then(|id| self.inner.get_dictionary(id).ok()) {
                Some(parent) => node = parent,
                None => break,
            }
        }
        Ok(None)
    }

    fn resolve<'a>(&'a self, value: &'a Object) -> &'a Object {
        match value {
            Object::Reference(id) => self.inner.get_object(*id).unwrap_or(value),
            other => other,
        }
    }
}

impl From<lopdf::Document> for Document {
    fn from(inner: lopdf::Document) -> Self {
        Self { inner }
    }
}

fn parent_of(node: &Dictionary) -> Option<ObjectId> {
    node.get(b"Parent").and_then(Object::as_reference).ok()
}

fn as_number(value: &Object) -> Option<f32> {
    match value {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}
