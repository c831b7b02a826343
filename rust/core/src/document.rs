// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Model document access
//!
//! [`ModelDocument`] is the read-only seam between the converter and whatever
//! holds the loaded model. [`InMemoryDocument`] is the bundled implementation.

use crate::error::{Error, Result};
use crate::model::{ElementId, GeometryElement, SourceElement};
use rustc_hash::FxHashMap;
use std::collections::hash_map::Entry;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Amount of geometric detail requested from the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(rename_all = "snake_case"))]
pub enum DetailLevel {
    Coarse,
    Medium,
    #[default]
    Fine,
}

/// Options for geometry retrieval
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeometryOptions {
    pub detail_level: DetailLevel,
    /// Include helper geometry that is not rendered in views
    pub include_non_visible: bool,
}

impl Default for GeometryOptions {
    fn default() -> Self {
        Self {
            detail_level: DetailLevel::Fine,
            include_non_visible: false,
        }
    }
}

/// Read-only view of a loaded model
///
/// Implementations must be shareable across threads: geometry of independent
/// elements may be retrieved concurrently.
pub trait ModelDocument: Sync {
    /// All elements, element types included, in document order
    fn elements(&self) -> Vec<SourceElement>;

    /// Geometry of one element.
    ///
    /// `Ok(None)` means the element has no geometry representation.
    fn geometry(&self, id: &ElementId, options: &GeometryOptions)
        -> Result<Option<GeometryElement>>;
}

/// Element record of an [`InMemoryDocument`]
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DocumentElement {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub element: SourceElement,
    #[cfg_attr(feature = "serde", serde(default))]
    pub geometry: Option<GeometryElement>,
}

/// Model held entirely in memory
///
/// Element ids are unique; records are indexed by id.
#[derive(Debug, Clone, Default)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "DocumentFile")
)]
pub struct InMemoryDocument {
    pub title: Option<String>,
    elements: Vec<DocumentElement>,
    #[cfg_attr(feature = "serde", serde(skip))]
    index: FxHashMap<ElementId, usize>,
}

/// On-disk shape of an [`InMemoryDocument`]
#[cfg(feature = "serde")]
#[derive(Deserialize)]
struct DocumentFile {
    #[serde(default)]
    title: Option<String>,
    elements: Vec<DocumentElement>,
}

#[cfg(feature = "serde")]
impl TryFrom<DocumentFile> for InMemoryDocument {
    type Error = Error;

    fn try_from(file: DocumentFile) -> Result<Self> {
        let mut document = InMemoryDocument {
            title: file.title,
            elements: Vec::with_capacity(file.elements.len()),
            index: FxHashMap::default(),
        };
        for record in file.elements {
            document.insert(record)?;
        }
        Ok(document)
    }
}

impl InMemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a placed element
    pub fn add_element(
        &mut self,
        id: impl Into<String>,
        geometry: Option<GeometryElement>,
    ) -> Result<()> {
        self.insert(DocumentElement {
            element: SourceElement::new(id),
            geometry,
        })
    }

    /// Add an element type; the walker never visits these
    pub fn add_element_type(
        &mut self,
        id: impl Into<String>,
        geometry: Option<GeometryElement>,
    ) -> Result<()> {
        let mut element = SourceElement::new(id);
        element.is_element_type = true;
        self.insert(DocumentElement { element, geometry })
    }

    fn insert(&mut self, record: DocumentElement) -> Result<()> {
        match self.index.entry(record.element.id.clone()) {
            Entry::Occupied(_) => Err(Error::DuplicateElement(record.element.id.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(self.elements.len());
                self.elements.push(record);
                Ok(())
            }
        }
    }

    /// Element records in insertion order
    pub fn records(&self) -> &[DocumentElement] {
        &self.elements
    }

    pub fn get(&self, id: &ElementId) -> Option<&DocumentElement> {
        self.index.get(id).map(|&i| &self.elements[i])
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl ModelDocument for InMemoryDocument {
    fn elements(&self) -> Vec<SourceElement> {
        self.elements.iter().map(|e| e.element.clone()).collect()
    }

    // Stored geometry is already at the finest level; detail_level is accepted
    // for interface compatibility and does not coarsen anything.
    fn geometry(
        &self,
        id: &ElementId,
        options: &GeometryOptions,
    ) -> Result<Option<GeometryElement>> {
        let record = self
            .get(id)
            .ok_or_else(|| Error::ElementNotFound(id.to_string()))?;

        Ok(record.geometry.as_ref().map(|geometry| {
            if options.include_non_visible {
                geometry.clone()
            } else {
                geometry.visible_only()
            }
        }))
    }
}
