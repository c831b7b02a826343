// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # BIM2glTF Core
//!
//! Source-side data model for converting building models to glTF.
//!
//! - [`ModelDocument`]: read-only access to a loaded model's elements and geometry
//! - [`GeometryNode`]: closed set of geometry kinds (instance, solid, mesh, other)
//! - [`InMemoryDocument`]: a model held in memory, loadable from JSON with the
//!   `serde` feature
//!
//! Coordinates are double precision in the source convention (right-handed, Z-up).
//!
//! ## Feature Flags
//!
//! - `serde`: Enable (de)serialization of the document model

pub mod document;
pub mod error;
pub mod model;

pub use document::{DetailLevel, DocumentElement, GeometryOptions, InMemoryDocument, ModelDocument};
pub use error::{Error, Result};
pub use model::{
    ElementId, Face, GeometryElement, GeometryItem, GeometryNode, InstanceReference, Placement,
    RawMesh, Solid, SourceElement, Xyz,
};
