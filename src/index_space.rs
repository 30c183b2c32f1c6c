use core::convert::TryFrom;
use core::fmt;
use serde::{Deserialize, Serialize};
use crate::error::{Error, Result};




/**
 * Represents a rectangular region in a discrete index space of any
 * dimensionality. Both corners are inclusive: the box `[0, 9]` along an axis
 * covers ten cells. The index type is signed 64-bit integer.
 */
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Corners")]
pub struct IndexSpace {
    lower: Vec<i64>,
    upper: Vec<i64>,
}




/**
 * Unvalidated corner pair, used to route deserialized boxes through
 * `IndexSpace::new`.
 */
#[derive(Deserialize)]
struct Corners {
    lower: Vec<i64>,
    upper: Vec<i64>,
}

impl TryFrom<Corners> for IndexSpace {
    type Error = Error;

    fn try_from(corners: Corners) -> Result<Self> {
        Self::new(corners.lower, corners.upper)
    }
}




/**
 * A refinement or coarsening factor: either one value applied on every axis,
 * or one value per axis.
 */
#[derive(Clone, Debug, PartialEq)]
pub enum Factor {
    Uniform(i64),
    PerAxis(Vec<i64>),
}

impl From<i64> for Factor {
    fn from(factor: i64) -> Self {
        Factor::Uniform(factor)
    }
}

impl From<Vec<i64>> for Factor {
    fn from(factor: Vec<i64>) -> Self {
        Factor::PerAxis(factor)
    }
}

impl From<&[i64]> for Factor {
    fn from(factor: &[i64]) -> Self {
        Factor::PerAxis(factor.to_vec())
    }
}

impl<const N: usize> From<[i64; N]> for Factor {
    fn from(factor: [i64; N]) -> Self {
        Factor::PerAxis(factor.to_vec())
    }
}

impl Factor {

    /**
     * Expand the factor to one positive value per axis.
     */
    fn per_axis(&self, num_dimensions: usize) -> Result<Vec<i64>> {
        let factor = match self {
            Factor::Uniform(f) => vec![*f; num_dimensions],
            Factor::PerAxis(f) => {
                if f.is_empty() {
                    return Err(Error::invalid_argument("'factor' should not be empty"))
                }
                if f.len() != num_dimensions {
                    return Err(Error::invalid_argument(
                        "'factor' should have one component per dimension of the boxes in 'boxes'"))
                }
                f.clone()
            }
        };
        if factor.iter().any(|&f| f <= 0) {
            return Err(Error::invalid_argument("'factor' should contain only positive values"))
        }
        Ok(factor)
    }
}




// ============================================================================
impl IndexSpace {


    /**
     * Create a box from its lower and upper (inclusive) corners.
     */
    pub fn new<L, U>(lower: L, upper: U) -> Result<Self>
    where
        L: Into<Vec<i64>>,
        U: Into<Vec<i64>>,
    {
        let lower = lower.into();
        let upper = upper.into();

        if lower.is_empty() {
            return Err(Error::invalid_argument("'lower' should not be empty"))
        }
        if upper.is_empty() {
            return Err(Error::invalid_argument("'upper' should not be empty"))
        }
        if lower.len() != upper.len() {
            return Err(Error::invalid_argument(
                "'lower' and 'upper' should have the same number of components"))
        }
        if lower.iter().zip(&upper).any(|(l, u)| u < l) {
            return Err(Error::invalid_argument(
                "'upper' should be greater than or equal to 'lower' along all axes"))
        }
        if lower.iter().zip(&upper).any(|(l, u)| u.checked_sub(*l).and_then(|d| d.checked_add(1)).is_none()) {
            return Err(Error::invalid_argument(
                "the number of cells along each axis should be representable as a 64-bit integer"))
        }
        Ok(Self { lower, upper })
    }


    /**
     * Create a box from real-valued corners, as they might arrive from a
     * loosely typed source. Every value must be an integer within the range
     * of `i64`.
     */
    pub fn from_real_corners(lower: &[f64], upper: &[f64]) -> Result<Self> {
        fn to_integers(values: &[f64], name: &str) -> Result<Vec<i64>> {
            if values.iter().any(|x| !x.is_finite() || x.fract() != 0.0) {
                return Err(Error::invalid_argument(
                    format!("'{}' should contain only integer values", name)))
            }
            // i64::MAX as f64 rounds up to 2^63, which is out of range
            if values.iter().any(|&x| x < i64::MIN as f64 || x >= i64::MAX as f64) {
                return Err(Error::invalid_argument(
                    format!("'{}' should contain only values representable as 64-bit integers", name)))
            }
            Ok(values.iter().map(|&x| x as i64).collect())
        }
        Self::new(to_integers(lower, "lower")?, to_integers(upper, "upper")?)
    }


    /**
     * Return the lower corner (inclusive).
     */
    pub fn lower(&self) -> &[i64] {
        &self.lower
    }


    /**
     * Return the upper corner (inclusive).
     */
    pub fn upper(&self) -> &[i64] {
        &self.upper
    }


    pub fn num_dimensions(&self) -> usize {
        self.lower.len()
    }


    /**
     * Return the number of cells on each axis.
     */
    pub fn shape(&self) -> Vec<usize> {
        self.lower
            .iter()
            .zip(&self.upper)
            .map(|(l, u)| (u - l + 1) as usize)
            .collect()
    }


    /**
     * Return the number of cells in this box.
     */
    pub fn size(&self) -> usize {
        self.shape().iter().product()
    }


    /**
     * Determine whether this box contains the given index.
     */
    pub fn contains(&self, index: &[i64]) -> bool {
        index.len() == self.num_dimensions() &&
        index.iter().zip(self.lower.iter().zip(&self.upper)).all(|(i, (l, u))| l <= i && i <= u)
    }


    /**
     * Return the overlap of this box with another one, if they overlap.
     */
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        if other.num_dimensions() != self.num_dimensions() {
            return None
        }
        let lower: Vec<_> = self.lower.iter().zip(&other.lower).map(|(a, b)| *a.max(b)).collect();
        let upper: Vec<_> = self.upper.iter().zip(&other.upper).map(|(a, b)| *a.min(b)).collect();
        Self::new(lower, upper).ok()
    }


    /**
     * Expand this box by the given number of cells on both sides of each
     * axis.
     */
    pub fn grow(&self, widths: &[usize]) -> Result<Self> {
        if widths.len() != self.num_dimensions() {
            return Err(Error::invalid_argument(
                "'widths' should have one component per dimension of the box"))
        }
        let overflow = || Error::invalid_argument("'widths' should not grow the box beyond the range of 64-bit indexes");
        let mut lower = Vec::with_capacity(widths.len());
        let mut upper = Vec::with_capacity(widths.len());

        for ((l, u), w) in self.lower.iter().zip(&self.upper).zip(widths) {
            let w = i64::try_from(*w).map_err(|_| overflow())?;
            lower.push(l.checked_sub(w).ok_or_else(overflow)?);
            upper.push(u.checked_add(w).ok_or_else(overflow)?);
        }
        Self::new(lower, upper).map_err(|_| overflow())
    }


    /**
     * Refine this box: each cell becomes `factor` cells along each axis.
     */
    pub fn refine<F: Into<Factor>>(&self, factor: F) -> Result<Self> {
        let factor = factor.into().per_axis(self.num_dimensions())?;
        self.refine_by(&factor)
    }


    /**
     * Coarsen this box with floor division. Not an exact inverse of `refine`
     * for boxes whose corners are not aligned to the factor.
     */
    pub fn coarsen<F: Into<Factor>>(&self, factor: F) -> Result<Self> {
        let factor = factor.into().per_axis(self.num_dimensions())?;
        Ok(self.coarsen_unchecked(&factor))
    }


    /**
     * Return the linear offset for the given index, in a row-major memory
     * buffer aligned with the lower corner of this box.
     */
    pub fn row_major_offset(&self, index: &[i64]) -> Option<usize> {
        if !self.contains(index) {
            return None
        }
        let shape = self.shape();
        Some(index
            .iter()
            .zip(&self.lower)
            .zip(&shape)
            .fold(0, |offset, ((i, l), n)| offset * n + (i - l) as usize))
    }


    /**
     * Return an iterator which traverses the box in row-major order (C-like;
     * the final index increases fastest).
     */
    pub fn iter(&self) -> impl Iterator<Item = Vec<i64>> + '_ {
        let mut next = Some(self.lower.clone());

        core::iter::from_fn(move || {
            let current = next.take()?;
            let mut index = current.clone();

            for axis in (0..index.len()).rev() {
                if index[axis] < self.upper[axis] {
                    index[axis] += 1;
                    next = Some(index);
                    break
                }
                index[axis] = self.lower[axis];
            }
            Some(current)
        })
    }


    /**
     * Compute the smallest box containing all of the given boxes. A single
     * box is its own bounding box.
     */
    pub fn compute_bounding_box(boxes: &[IndexSpace]) -> Result<IndexSpace> {
        let num_dimensions = Self::common_dimensions(boxes)?;
        let mut lower = vec![i64::MAX; num_dimensions];
        let mut upper = vec![i64::MIN; num_dimensions];

        for b in boxes {
            for axis in 0..num_dimensions {
                lower[axis] = lower[axis].min(b.lower[axis]);
                upper[axis] = upper[axis].max(b.upper[axis]);
            }
        }
        Self::new(lower, upper)
    }

    pub fn bounding_box_of(space: &IndexSpace) -> IndexSpace {
        space.clone()
    }


    /**
     * Refine every box in a list by the same factor.
     */
    pub fn refine_boxes<F: Into<Factor>>(boxes: &[IndexSpace], factor: F) -> Result<Vec<IndexSpace>> {
        let factor = factor.into().per_axis(Self::common_dimensions(boxes)?)?;
        boxes.iter().map(|b| b.refine_by(&factor)).collect()
    }


    /**
     * Coarsen every box in a list by the same factor.
     */
    pub fn coarsen_boxes<F: Into<Factor>>(boxes: &[IndexSpace], factor: F) -> Result<Vec<IndexSpace>> {
        let factor = factor.into().per_axis(Self::common_dimensions(boxes)?)?;
        Ok(boxes.iter().map(|b| b.coarsen_unchecked(&factor)).collect())
    }


    fn refine_by(&self, factor: &[i64]) -> Result<Self> {
        let overflow = || Error::invalid_argument("'factor' should not refine the box beyond the range of 64-bit indexes");
        let mut lower = Vec::with_capacity(factor.len());
        let mut upper = Vec::with_capacity(factor.len());

        for ((l, u), f) in self.lower.iter().zip(&self.upper).zip(factor) {
            lower.push(l.checked_mul(*f).ok_or_else(overflow)?);
            upper.push(u
                .checked_add(1)
                .and_then(|u| u.checked_mul(*f))
                .and_then(|u| u.checked_sub(1))
                .ok_or_else(overflow)?);
        }
        Self::new(lower, upper).map_err(|_| overflow())
    }

    fn coarsen_unchecked(&self, factor: &[i64]) -> Self {
        Self {
            lower: self.lower.iter().zip(factor).map(|(l, f)| l.div_euclid(*f)).collect(),
            upper: self.upper.iter().zip(factor).map(|(u, f)| u.div_euclid(*f)).collect(),
        }
    }

    fn common_dimensions(boxes: &[IndexSpace]) -> Result<usize> {
        let first = boxes
            .first()
            .ok_or_else(|| Error::invalid_argument("'boxes' should not be empty"))?;

        if boxes.iter().any(|b| b.num_dimensions() != first.num_dimensions()) {
            return Err(Error::invalid_argument(
                "all boxes in 'boxes' should have the same number of dimensions"))
        }
        Ok(first.num_dimensions())
    }
}




// ============================================================================
impl fmt::Display for IndexSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Box({:?}, {:?})", self.lower, self.upper)
    }
}
