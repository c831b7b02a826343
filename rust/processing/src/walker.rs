// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Element walking
//!
//! Visits every placed element of a document and retrieves its geometry.
//! Element types are never visited. A failed retrieval drops that element
//! and the walk continues.

use bim2gltf_core::{ElementId, GeometryElement, GeometryOptions, ModelDocument, SourceElement};

/// Counters kept while walking
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    /// Placed elements visited
    pub elements: usize,
    pub element_types_skipped: usize,
    pub retrieval_failures: usize,
    /// Elements whose retrieval returned no geometry
    pub without_geometry: usize,
}

/// Lazy iterator of `(element id, geometry)` pairs
pub struct SceneWalker<'a, D: ModelDocument + ?Sized> {
    document: &'a D,
    options: GeometryOptions,
    elements: std::vec::IntoIter<SourceElement>,
    stats: WalkStats,
}

impl<'a, D: ModelDocument + ?Sized> SceneWalker<'a, D> {
    pub fn new(document: &'a D, options: GeometryOptions) -> Self {
        Self {
            document,
            options,
            elements: document.elements().into_iter(),
            stats: WalkStats::default(),
        }
    }

    pub fn stats(&self) -> WalkStats {
        self.stats
    }
}

impl<D: ModelDocument + ?Sized> Iterator for SceneWalker<'_, D> {
    type Item = (ElementId, Option<GeometryElement>);

    fn next(&mut self) -> Option<Self::Item> {
        for element in self.elements.by_ref() {
            if element.is_element_type {
                self.stats.element_types_skipped += 1;
                continue;
            }
            self.stats.elements += 1;

            match self.document.geometry(&element.id, &self.options) {
                Ok(Some(geometry)) => return Some((element.id, Some(geometry))),
                Ok(None) => {
                    self.stats.without_geometry += 1;
                    return Some((element.id, None));
                }
                Err(e) => {
                    self.stats.retrieval_failures += 1;
                    tracing::debug!(element = %element.id, error = %e, "Skipping element: geometry retrieval failed");
                }
            }
        }
        None
    }
}
