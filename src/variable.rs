use core::fmt;
use core::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use serde::{Deserialize, Serialize};
use crate::block::MeshBlock;
use crate::error::{Error, Result};
use crate::field::VariableData;
use crate::geometry::Geometry;
use crate::index_space::IndexSpace;
use crate::mesh::{Mesh, MeshId};




/**
 * Where the values of a variable sit relative to a mesh cell.
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Cell,
    Node,
    Face,
}




/**
 * Floating point precision of a variable's storage.
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Precision {
    Single,
    Double,
}




/**
 * Halo width needed by the stencils that read a variable: either the same
 * number of cells on every axis, or one value per axis.
 */
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StencilWidth {
    Uniform(usize),
    PerAxis(Vec<usize>),
}




/**
 * Opaque identity of a variable, issued once when the variable is created.
 * Block storage is keyed on this token, so two variables with identical
 * descriptions still get independent arrays.
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VariableId(u64);

static NEXT_VARIABLE_ID: AtomicU64 = AtomicU64::new(0);

impl VariableId {
    fn next() -> Self {
        VariableId(NEXT_VARIABLE_ID.fetch_add(1, Ordering::Relaxed))
    }
}




/**
 * The storage attributes requested for a new variable. The defaults give a
 * scalar, double-precision, node-centered variable with no halo.
 */
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VariableSpec {
    pub location: Location,
    pub max_stencil_width: StencilWidth,
    pub depth: usize,
    pub precision: Precision,
}

impl Default for VariableSpec {
    fn default() -> Self {
        Self {
            location: Location::Node,
            max_stencil_width: StencilWidth::Uniform(0),
            depth: 1,
            precision: Precision::Double,
        }
    }
}

impl VariableSpec {

    pub fn location(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    pub fn max_stencil_width<W: Into<StencilWidth>>(mut self, width: W) -> Self {
        self.max_stencil_width = width.into();
        self
    }

    pub fn depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    pub fn precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }
}




/**
 * Describes one field defined on a mesh: where its values sit in a cell, how
 * wide a halo its stencils need, how many components it has, and its
 * floating point precision. A variable holds no values itself; each block it
 * is registered on owns the backing arrays.
 *
 * A variable refers back to the mesh that created it by `MeshId` only. The
 * handle is used to validate that a variable is paired with its own mesh; it
 * does not keep the mesh alive.
 */
#[derive(Clone, Debug)]
pub struct MeshVariable {
    id: VariableId,
    mesh: MeshId,
    location: Location,
    max_stencil_width: Vec<usize>,
    depth: usize,
    precision: Precision,
}




// ============================================================================
impl MeshVariable {


    /**
     * Create a variable bound to `mesh`. The variable is not registered on
     * any level; use `Mesh::create_variable` to create and register in one
     * step.
     */
    pub fn new(mesh: &Mesh, spec: VariableSpec) -> Result<Self> {
        Self::bound_to(mesh.id(), mesh.num_dimensions(), spec)
    }


    pub(crate) fn bound_to(mesh: MeshId, num_dimensions: usize, spec: VariableSpec) -> Result<Self> {
        let max_stencil_width = match spec.max_stencil_width {
            StencilWidth::Uniform(w) => vec![w; num_dimensions],
            StencilWidth::PerAxis(w) => {
                if w.len() != num_dimensions {
                    return Err(Error::invalid_argument(format!(
                        "'max_stencil_width' should have one component per dimension of the Mesh ({} != {})",
                        w.len(),
                        num_dimensions)))
                }
                w
            }
        };
        if spec.depth == 0 {
            return Err(Error::invalid_argument("'depth' should be a positive integer"))
        }
        Ok(Self {
            id: VariableId::next(),
            mesh,
            location: spec.location,
            max_stencil_width,
            depth: spec.depth,
            precision: spec.precision,
        })
    }


    pub fn id(&self) -> VariableId {
        self.id
    }

    pub fn mesh_id(&self) -> MeshId {
        self.mesh
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn max_stencil_width(&self) -> &[usize] {
        &self.max_stencil_width
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn precision(&self) -> Precision {
        self.precision
    }

    pub fn num_dimensions(&self) -> usize {
        self.max_stencil_width.len()
    }

    /**
     * Return the attributes this variable was created with, with the stencil
     * width expanded to one value per axis.
     */
    pub fn spec(&self) -> VariableSpec {
        VariableSpec {
            location: self.location,
            max_stencil_width: StencilWidth::PerAxis(self.max_stencil_width.clone()),
            depth: self.depth,
            precision: self.precision,
        }
    }


    /**
     * Return the shapes of the arrays backing this variable on a block
     * covering `space`. Cell variables span the box plus the halo on each
     * side; node variables have one more point than cells along every axis.
     * Face variables have one array per axis `a`, shaped like the cell array
     * with one extra point along `a`. A component axis of length `depth` is
     * appended (contiguous vectors) or prepended (one slab per component)
     * when `depth > 1`.
     */
    pub fn data_shape(&self, space: &IndexSpace, stores_vectors_contiguously: bool) -> Vec<Vec<usize>> {
        let cells: Vec<usize> = space
            .shape()
            .iter()
            .zip(&self.max_stencil_width)
            .map(|(n, w)| n + 2 * w)
            .collect();

        let spatial: Vec<Vec<usize>> = match self.location {
            Location::Cell => vec![cells],
            Location::Node => vec![cells.iter().map(|n| n + 1).collect()],
            Location::Face => (0..cells.len())
                .map(|axis| {
                    let mut shape = cells.clone();
                    shape[axis] += 1;
                    shape
                })
                .collect(),
        };

        spatial
            .into_iter()
            .map(|mut shape| {
                if self.depth > 1 {
                    if stores_vectors_contiguously {
                        shape.push(self.depth)
                    } else {
                        shape.insert(0, self.depth)
                    }
                }
                shape
            })
            .collect()
    }


    /**
     * Return the index space of `block`, grown by this variable's stencil
     * width on both sides of every axis if `with_halo` is true.
     */
    pub fn index_space(&self, block: &MeshBlock, with_halo: bool) -> Result<IndexSpace> {
        if with_halo {
            block.index_space().grow(&self.max_stencil_width).map_err(|_| {
                Error::invalid_argument(format!(
                    "'block' should have the same number of dimensions as the variable ({} != {})",
                    block.num_dimensions(),
                    self.num_dimensions()))
            })
        } else {
            Ok(block.index_space().clone())
        }
    }

    pub fn geometry<'a>(&self, block: &'a MeshBlock) -> &'a Geometry {
        block.geometry()
    }

    pub fn data<'a>(&self, block: &'a MeshBlock) -> Result<&'a VariableData> {
        block.data(self)
    }

    pub fn data_mut<'a>(&self, block: &'a mut MeshBlock) -> Result<&'a mut VariableData> {
        block.data_mut(self)
    }


    /**
     * Like `index_space`, for the only block of a single-block mesh.
     */
    pub fn box_in(&self, mesh: &Mesh, with_halo: bool) -> Result<IndexSpace> {
        self.index_space(self.sole_block(mesh)?, with_halo)
    }

    /**
     * Like `geometry`, for the only block of a single-block mesh.
     */
    pub fn geometry_in<'a>(&self, mesh: &'a Mesh) -> Result<&'a Geometry> {
        Ok(self.sole_block(mesh)?.geometry())
    }

    /**
     * Like `data`, for the only block of a single-block mesh.
     */
    pub fn data_in<'a>(&self, mesh: &'a Mesh) -> Result<&'a VariableData> {
        self.sole_block(mesh)?.data(self)
    }

    pub fn data_in_mut<'a>(&self, mesh: &'a mut Mesh) -> Result<&'a mut VariableData> {
        self.check_owner(mesh)?;
        mesh.data_mut(self)
    }

    fn sole_block<'a>(&self, mesh: &'a Mesh) -> Result<&'a MeshBlock> {
        self.check_owner(mesh)?;

        if !mesh.is_single_block() {
            return Err(Error::invalid_argument(
                "'block' should be specified unless the Mesh is single-block"))
        }
        mesh.block().map_err(|e| Error::invalid_argument(e.message()))
    }

    fn check_owner(&self, mesh: &Mesh) -> Result<()> {
        if mesh.id() != self.mesh {
            return Err(Error::invalid_argument("'mesh' is not the Mesh this variable was created on"))
        }
        Ok(())
    }
}




// ============================================================================
impl PartialEq for MeshVariable {
    fn eq(&self, other: &Self) -> bool {
        self.mesh == other.mesh &&
        self.location == other.location &&
        self.max_stencil_width == other.max_stencil_width &&
        self.depth == other.depth &&
        self.precision == other.precision
    }
}

impl fmt::Display for MeshVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MeshVariable(location={}, max_stencil_width={:?}, depth={}, precision={})",
            self.location,
            self.max_stencil_width,
            self.depth,
            self.precision)
    }
}




// ============================================================================
impl From<usize> for StencilWidth {
    fn from(width: usize) -> Self {
        StencilWidth::Uniform(width)
    }
}

impl From<Vec<usize>> for StencilWidth {
    fn from(width: Vec<usize>) -> Self {
        StencilWidth::PerAxis(width)
    }
}

impl<const N: usize> From<[usize; N]> for StencilWidth {
    fn from(width: [usize; N]) -> Self {
        StencilWidth::PerAxis(width.to_vec())
    }
}

impl Precision {
    pub fn size_in_bytes(self) -> usize {
        match self {
            Precision::Single => 4,
            Precision::Double => 8,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Cell => write!(f, "cell"),
            Location::Node => write!(f, "node"),
            Location::Face => write!(f, "face"),
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Precision::Single => write!(f, "single"),
            Precision::Double => write!(f, "double"),
        }
    }
}

impl FromStr for Location {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "cell" => Ok(Location::Cell),
            "node" => Ok(Location::Node),
            "face" => Ok(Location::Face),
            _ => Err(Error::invalid_argument(format!(
                "'location' should be one of 'cell', 'node', or 'face' (got '{}')", s))),
        }
    }
}

impl FromStr for Precision {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "single" => Ok(Precision::Single),
            "double" => Ok(Precision::Double),
            _ => Err(Error::invalid_argument(format!(
                "'precision' should be 'single' or 'double' (got '{}')", s))),
        }
    }
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::{Location, MeshVariable, Precision, StencilWidth, VariableSpec};
    use crate::geometry::CartesianGeometry;
    use crate::index_space::IndexSpace;
    use crate::mesh::Mesh;

    fn b(lower: &[i64], upper: &[i64]) -> IndexSpace {
        IndexSpace::new(lower, upper).unwrap()
    }

    fn single_block_mesh() -> Mesh {
        let domain = vec![b(&[0, 0], &[9, 9])];
        let geometry = CartesianGeometry::new(vec![0.0, 0.0], vec![1.0, 1.0]).unwrap();
        Mesh::new(domain, geometry.into()).unwrap()
    }

    fn variable(mesh: &Mesh, spec: VariableSpec) -> MeshVariable {
        MeshVariable::new(mesh, spec).unwrap()
    }

    #[test]
    fn defaults_match_a_scalar_node_variable() {
        let mesh = single_block_mesh();
        let v = variable(&mesh, VariableSpec::default());
        assert_eq!(v.location(), Location::Node);
        assert_eq!(v.max_stencil_width(), &[0, 0]);
        assert_eq!(v.depth(), 1);
        assert_eq!(v.precision(), Precision::Double);
        assert_eq!(v.mesh_id(), mesh.id());
    }

    #[test]
    fn uniform_stencil_width_is_broadcast() {
        let mesh = single_block_mesh();
        let v = variable(&mesh, VariableSpec::default().max_stencil_width(2usize));
        assert_eq!(v.max_stencil_width(), &[2, 2]);
        assert_eq!(v.spec().max_stencil_width, StencilWidth::PerAxis(vec![2, 2]));
    }

    #[test]
    fn invalid_attributes_are_rejected() {
        let mesh = single_block_mesh();

        let error = MeshVariable::new(&mesh, VariableSpec::default().max_stencil_width([1usize, 2, 3])).unwrap_err();
        assert!(error.message().starts_with("'max_stencil_width' should have one component per dimension"));

        let error = MeshVariable::new(&mesh, VariableSpec::default().depth(0)).unwrap_err();
        assert_eq!(error.message(), "'depth' should be a positive integer");
    }

    #[test]
    fn location_and_precision_parse_from_strings() {
        assert_eq!("CELL".parse::<Location>().unwrap(), Location::Cell);
        assert_eq!("face".parse::<Location>().unwrap(), Location::Face);
        assert_eq!("single".parse::<Precision>().unwrap(), Precision::Single);
        assert!("edge".parse::<Location>().unwrap_err().message().starts_with("'location' should be one of"));
        assert!("half".parse::<Precision>().unwrap_err().message().starts_with("'precision' should be"));
        assert_eq!(Precision::Single.size_in_bytes(), 4);
    }

    #[test]
    fn equality_ignores_identity() {
        let mesh = single_block_mesh();
        let other = single_block_mesh();
        let a = variable(&mesh, VariableSpec::default());
        let b = variable(&mesh, VariableSpec::default());
        let c = variable(&other, VariableSpec::default());
        assert_eq!(a, b);
        assert_ne!(a.id(), b.id());
        assert_ne!(a, c);
        assert_ne!(a, variable(&mesh, VariableSpec::default().depth(2)));
    }

    #[test]
    fn data_shape_for_each_location() {
        let mesh = single_block_mesh();
        let space = b(&[0, 0], &[9, 4]);

        let cell = variable(&mesh, VariableSpec::default().location(Location::Cell));
        assert_eq!(cell.data_shape(&space, true), vec![vec![10, 5]]);

        let node = variable(&mesh, VariableSpec::default().max_stencil_width(1usize));
        assert_eq!(node.data_shape(&space, true), vec![vec![13, 8]]);

        let face = variable(&mesh, VariableSpec::default().location(Location::Face).max_stencil_width([2usize, 0]));
        assert_eq!(face.data_shape(&space, true), vec![vec![15, 5], vec![14, 6]]);
    }

    #[test]
    fn data_shape_places_component_axis_by_layout() {
        let mesh = single_block_mesh();
        let space = b(&[0, 0], &[9, 9]);
        let spec = VariableSpec::default().location(Location::Cell).depth(3);
        let v = variable(&mesh, spec);
        assert_eq!(v.data_shape(&space, true), vec![vec![10, 10, 3]]);
        assert_eq!(v.data_shape(&space, false), vec![vec![3, 10, 10]]);

        let face = variable(&mesh, VariableSpec::default().location(Location::Face).depth(2));
        assert_eq!(face.data_shape(&space, true), vec![vec![11, 10, 2], vec![10, 11, 2]]);
        assert_eq!(face.data_shape(&space, false), vec![vec![2, 11, 10], vec![2, 10, 11]]);
    }

    #[test]
    fn halo_box_is_grown_by_stencil_width() {
        let mut mesh = single_block_mesh();
        let v = mesh.create_variable(VariableSpec::default().max_stencil_width([2usize, 1]), None).unwrap();
        let block = mesh.block().unwrap();
        assert_eq!(v.index_space(block, false).unwrap(), b(&[0, 0], &[9, 9]));
        assert_eq!(v.index_space(block, true).unwrap(), b(&[-2, -1], &[11, 10]));
        assert_eq!(v.box_in(&mesh, true).unwrap(), b(&[-2, -1], &[11, 10]));
        assert_eq!(v.geometry_in(&mesh).unwrap(), block.geometry());
    }

    #[test]
    fn block_omitted_forms_require_owner_and_single_block() {
        let mut mesh = single_block_mesh();
        let v = mesh.create_variable(VariableSpec::default(), None).unwrap();
        assert_eq!(v.data_in(&mesh).unwrap().array().unwrap().shape(), &[11, 11]);

        let other = single_block_mesh();
        let error = v.data_in(&other).unwrap_err();
        assert_eq!(error.message(), "'mesh' is not the Mesh this variable was created on");

        let domain = vec![
            b(&[0, 0], &[9, 9]),
            b(&[10, 0], &[19, 9]),
        ];
        let geometry = CartesianGeometry::new(vec![0.0, 0.0], vec![1.0, 1.0]).unwrap();
        let mut multi = Mesh::new(domain, geometry.into()).unwrap();
        let u = multi.create_variable(VariableSpec::default(), None).unwrap();
        let error = u.data_in(&multi).unwrap_err();
        assert_eq!(error.message(), "'block' should be specified unless the Mesh is single-block");
        assert!(u.data(&multi.levels()[0].blocks()[1]).is_ok());
    }

    #[test]
    fn display_lists_attributes() {
        let mesh = single_block_mesh();
        let v = variable(&mesh, VariableSpec::default().location(Location::Cell).precision(Precision::Single));
        assert_eq!(v.to_string(), "MeshVariable(location=cell, max_stencil_width=[0, 0], depth=1, precision=single)");
    }
}
