//! Samr is a data model for structured adaptive mesh refinement (SAMR). A
//! mesh is a hierarchy of refinement levels, each a union of rectangular
//! boxes in integer index space. Every box is mapped to a region of
//! coordinate space by a geometry, and carries the arrays of the field
//! variables defined on it, including halo cells for stencil operations.
//! The crate establishes and checks the structure; it does not contain
//! solvers or inter-level transfer operators.

pub mod block;
pub mod checkpoint;
pub mod config;
pub mod error;
pub mod field;
pub mod geometry;
pub mod index_space;
pub mod level;
pub mod mesh;
pub mod variable;

pub use block::MeshBlock;
pub use checkpoint::CheckpointFormat;
pub use config::MeshConfig;
pub use error::{Error, Result};
pub use field::{FieldArray, VariableData};
pub use geometry::{CartesianGeometry, Geometry};
pub use index_space::{Factor, IndexSpace};
pub use level::MeshLevel;
pub use mesh::{Mesh, MeshId};
pub use variable::{Location, MeshVariable, Precision, StencilWidth, VariableId, VariableSpec};
