use core::convert::TryFrom;
use core::fmt;
use serde::{Deserialize, Serialize};
use crate::error::{Error, Result};
use crate::index_space::IndexSpace;




/**
 * A mapping from the index space of a box to a region of coordinate space.
 * The set of mappings is closed; each operation dispatches on the variant
 * with an exhaustive match, so blocks and levels never need to know which
 * kind of geometry they hold.
 */
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    Cartesian(CartesianGeometry),
}




/**
 * A rectangular region of Cartesian coordinate space. Boxes mapped onto it
 * get a grid that is uniform along each axis.
 */
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Extent")]
pub struct CartesianGeometry {
    x_lower: Vec<f64>,
    x_upper: Vec<f64>,
}

#[derive(Deserialize)]
struct Extent {
    x_lower: Vec<f64>,
    x_upper: Vec<f64>,
}

impl TryFrom<Extent> for CartesianGeometry {
    type Error = Error;

    fn try_from(extent: Extent) -> Result<Self> {
        Self::new(extent.x_lower, extent.x_upper)
    }
}




// ============================================================================
impl CartesianGeometry {

    pub fn new<L, U>(x_lower: L, x_upper: U) -> Result<Self>
    where
        L: Into<Vec<f64>>,
        U: Into<Vec<f64>>,
    {
        let x_lower = x_lower.into();
        let x_upper = x_upper.into();

        if x_lower.is_empty() {
            return Err(Error::invalid_argument("'x_lower' should not be empty"))
        }
        if x_lower.len() != x_upper.len() {
            return Err(Error::invalid_argument(
                "'x_lower' and 'x_upper' should have the same number of components"))
        }
        if x_lower.iter().chain(&x_upper).any(|x| !x.is_finite()) {
            return Err(Error::invalid_argument(
                "'x_lower' and 'x_upper' should contain only finite values"))
        }
        if x_lower.iter().zip(&x_upper).any(|(l, u)| u <= l) {
            return Err(Error::invalid_argument(
                "'x_upper' should be greater than 'x_lower' along all axes"))
        }
        Ok(Self { x_lower, x_upper })
    }

    pub fn x_lower(&self) -> &[f64] {
        &self.x_lower
    }

    pub fn x_upper(&self) -> &[f64] {
        &self.x_upper
    }

    pub fn num_dimensions(&self) -> usize {
        self.x_lower.len()
    }

    /**
     * Return the extent of the region along each axis.
     */
    pub fn shape(&self) -> Vec<f64> {
        self.x_lower.iter().zip(&self.x_upper).map(|(l, u)| u - l).collect()
    }

    /**
     * Return the grid spacing implied by mapping this region onto the index
     * shape of `space`.
     */
    pub fn compute_dx(&self, space: &IndexSpace) -> Result<Vec<f64>> {
        self.check_dimensions(space, "box")?;

        Ok(self.shape()
            .iter()
            .zip(space.shape())
            .map(|(length, n)| length / n as f64)
            .collect())
    }

    /**
     * Return the geometry of the region covered by `space`, assuming that
     * `reference` maps exactly onto this region. `space` may lie inside,
     * outside, or across the reference box.
     */
    pub fn compute_geometry(&self, reference: &IndexSpace, space: &IndexSpace) -> Result<Self> {
        self.check_dimensions(reference, "reference_box")?;
        self.check_dimensions(space, "box")?;

        let dx = self.compute_dx(reference)?;
        let x_lower: Vec<_> = (0..self.num_dimensions())
            .map(|i| self.x_lower[i] + dx[i] * (space.lower()[i] as f64 - reference.lower()[i] as f64))
            .collect();
        let x_upper: Vec<_> = (0..self.num_dimensions())
            .map(|i| self.x_upper[i] + dx[i] * (space.upper()[i] as f64 - reference.upper()[i] as f64))
            .collect();
        Self::new(x_lower, x_upper)
    }

    /**
     * Return the coordinates of the center of cell `index` of `space`, where
     * `space` maps onto this region.
     */
    pub fn cell_center(&self, space: &IndexSpace, index: &[i64]) -> Result<Vec<f64>> {
        self.coordinate(space, index, 0.5)
    }

    /**
     * Return the coordinates of node `index` of `space` (the lower corner of
     * cell `index`).
     */
    pub fn node_coordinate(&self, space: &IndexSpace, index: &[i64]) -> Result<Vec<f64>> {
        self.coordinate(space, index, 0.0)
    }

    fn coordinate(&self, space: &IndexSpace, index: &[i64], offset: f64) -> Result<Vec<f64>> {
        if index.len() != self.num_dimensions() {
            return Err(Error::invalid_argument(
                "'index' should have one component per dimension of the geometry"))
        }
        let dx = self.compute_dx(space)?;

        Ok((0..self.num_dimensions())
            .map(|i| self.x_lower[i] + dx[i] * (index[i] as f64 - space.lower()[i] as f64 + offset))
            .collect())
    }

    fn check_dimensions(&self, space: &IndexSpace, name: &str) -> Result<()> {
        if space.num_dimensions() != self.num_dimensions() {
            return Err(Error::invalid_argument(format!(
                "'{}' should have the same number of dimensions as the geometry ({} != {})",
                name,
                space.num_dimensions(),
                self.num_dimensions())))
        }
        Ok(())
    }
}




// ============================================================================
impl Geometry {

    pub fn num_dimensions(&self) -> usize {
        match self {
            Geometry::Cartesian(g) => g.num_dimensions(),
        }
    }

    pub fn compute_dx(&self, space: &IndexSpace) -> Result<Vec<f64>> {
        match self {
            Geometry::Cartesian(g) => g.compute_dx(space),
        }
    }

    pub fn compute_geometry(&self, reference: &IndexSpace, space: &IndexSpace) -> Result<Self> {
        match self {
            Geometry::Cartesian(g) => g.compute_geometry(reference, space).map(Geometry::Cartesian),
        }
    }

    pub fn cell_center(&self, space: &IndexSpace, index: &[i64]) -> Result<Vec<f64>> {
        match self {
            Geometry::Cartesian(g) => g.cell_center(space, index),
        }
    }

    pub fn node_coordinate(&self, space: &IndexSpace, index: &[i64]) -> Result<Vec<f64>> {
        match self {
            Geometry::Cartesian(g) => g.node_coordinate(space, index),
        }
    }

    pub fn as_cartesian(&self) -> Option<&CartesianGeometry> {
        match self {
            Geometry::Cartesian(g) => Some(g),
        }
    }
}

impl From<CartesianGeometry> for Geometry {
    fn from(geometry: CartesianGeometry) -> Self {
        Geometry::Cartesian(geometry)
    }
}




// ============================================================================
impl fmt::Display for CartesianGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CartesianGeometry({:?}, {:?})", self.x_lower, self.x_upper)
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Geometry::Cartesian(g) => g.fmt(f),
        }
    }
}
