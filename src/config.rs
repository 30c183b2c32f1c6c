use serde::{Deserialize, Serialize};
use crate::error::Result;
use crate::geometry::Geometry;
use crate::index_space::IndexSpace;
use crate::mesh::Mesh;
use crate::variable::{MeshVariable, StencilWidth, VariableSpec};




/**
 * A declarative description of a mesh: its domain, any finer levels, and the
 * variables to create on it. Anything serde can read is a valid source.
 */
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeshConfig {
    pub domain: Vec<IndexSpace>,
    pub geometry: Geometry,

    #[serde(default = "default_contiguous")]
    pub stores_vectors_contiguously: bool,

    #[serde(default)]
    pub levels: Vec<LevelConfig>,

    #[serde(default)]
    pub variables: Vec<VariableConfig>,
}




/**
 * A level above the coarsest one. `geometry` maps `boxes[0]`.
 */
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    pub boxes: Vec<IndexSpace>,
    pub geometry: Geometry,
}




/**
 * A variable to create on the mesh. Location and precision are given by
 * name (`"cell"`, `"node"`, `"face"`; `"single"`, `"double"`). Omitting
 * `level_numbers` registers the variable on every level.
 */
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VariableConfig {
    #[serde(default = "default_location")]
    pub location: String,

    #[serde(default = "default_stencil_width")]
    pub max_stencil_width: StencilWidth,

    #[serde(default = "default_depth")]
    pub depth: usize,

    #[serde(default = "default_precision")]
    pub precision: String,

    #[serde(default)]
    pub level_numbers: Option<Vec<usize>>,
}

fn default_contiguous() -> bool {
    true
}

fn default_location() -> String {
    "node".to_string()
}

fn default_stencil_width() -> StencilWidth {
    StencilWidth::Uniform(0)
}

fn default_depth() -> usize {
    1
}

fn default_precision() -> String {
    "double".to_string()
}

impl Default for VariableConfig {
    fn default() -> Self {
        Self {
            location: default_location(),
            max_stencil_width: default_stencil_width(),
            depth: default_depth(),
            precision: default_precision(),
            level_numbers: None,
        }
    }
}




// ============================================================================
impl VariableConfig {

    /**
     * Resolve the location and precision names into a `VariableSpec`.
     */
    pub fn spec(&self) -> Result<VariableSpec> {
        Ok(VariableSpec {
            location: self.location.parse()?,
            max_stencil_width: self.max_stencil_width.clone(),
            depth: self.depth,
            precision: self.precision.parse()?,
        })
    }
}




// ============================================================================
impl MeshConfig {

    /**
     * Build the mesh, add its levels in order, then create its variables in
     * order. Returns the mesh and the created variables.
     */
    pub fn build(&self) -> Result<(Mesh, Vec<MeshVariable>)> {
        let specs = self
            .variables
            .iter()
            .map(VariableConfig::spec)
            .collect::<Result<Vec<_>>>()?;

        let mut mesh = Mesh::with_vector_layout(
            self.domain.clone(),
            self.geometry.clone(),
            self.stores_vectors_contiguously)?;

        for level in &self.levels {
            mesh.add_level(&level.boxes, &level.geometry)?;
        }

        let variables = self
            .variables
            .iter()
            .zip(specs)
            .map(|(config, spec)| mesh.create_variable(spec, config.level_numbers.as_deref()))
            .collect::<Result<Vec<_>>>()?;

        Ok((mesh, variables))
    }
}
