use ndarray::{ArrayD, IxDyn};
use num_traits::Float;
use serde::{Deserialize, Serialize};
use crate::error::{Error, Result};
use crate::variable::{Location, Precision};




/**
 * An n-dimensional array of field values, in either single or double
 * precision. The array shape includes halo cells and, for multi-component
 * variables, the component axis.
 */
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum FieldArray {
    Single(ArrayD<f32>),
    Double(ArrayD<f64>),
}




/**
 * Floating point types that can back a `FieldArray`.
 */
pub trait Scalar: Float + Send + Sync + 'static {
    const PRECISION: Precision;

    fn view(array: &FieldArray) -> Option<&ArrayD<Self>>;

    fn view_mut(array: &mut FieldArray) -> Option<&mut ArrayD<Self>>;
}

impl Scalar for f32 {
    const PRECISION: Precision = Precision::Single;

    fn view(array: &FieldArray) -> Option<&ArrayD<Self>> {
        match array {
            FieldArray::Single(a) => Some(a),
            FieldArray::Double(_) => None,
        }
    }

    fn view_mut(array: &mut FieldArray) -> Option<&mut ArrayD<Self>> {
        match array {
            FieldArray::Single(a) => Some(a),
            FieldArray::Double(_) => None,
        }
    }
}

impl Scalar for f64 {
    const PRECISION: Precision = Precision::Double;

    fn view(array: &FieldArray) -> Option<&ArrayD<Self>> {
        match array {
            FieldArray::Double(a) => Some(a),
            FieldArray::Single(_) => None,
        }
    }

    fn view_mut(array: &mut FieldArray) -> Option<&mut ArrayD<Self>> {
        match array {
            FieldArray::Double(a) => Some(a),
            FieldArray::Single(_) => None,
        }
    }
}




// ============================================================================
impl FieldArray {

    /**
     * Allocate a zero-filled array of the given precision and shape.
     */
    pub fn zeros(precision: Precision, shape: &[usize]) -> Self {
        match precision {
            Precision::Single => FieldArray::Single(ArrayD::zeros(IxDyn(shape))),
            Precision::Double => FieldArray::Double(ArrayD::zeros(IxDyn(shape))),
        }
    }

    pub fn precision(&self) -> Precision {
        match self {
            FieldArray::Single(_) => Precision::Single,
            FieldArray::Double(_) => Precision::Double,
        }
    }

    pub fn shape(&self) -> &[usize] {
        match self {
            FieldArray::Single(a) => a.shape(),
            FieldArray::Double(a) => a.shape(),
        }
    }

    pub fn len(&self) -> usize {
        self.shape().iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /**
     * Return a typed reference to the array. Fails if `T` does not match the
     * precision the array was allocated with.
     */
    pub fn array<T: Scalar>(&self) -> Result<&ArrayD<T>> {
        let precision = self.precision();
        T::view(self).ok_or_else(|| precision_mismatch(T::PRECISION, precision))
    }

    pub fn array_mut<T: Scalar>(&mut self) -> Result<&mut ArrayD<T>> {
        let precision = self.precision();
        T::view_mut(self).ok_or_else(move || precision_mismatch(T::PRECISION, precision))
    }

    /**
     * Overwrite every element with `value`, converted to the array's
     * precision.
     */
    pub fn fill(&mut self, value: f64) {
        match self {
            FieldArray::Single(a) => a.fill(value as f32),
            FieldArray::Double(a) => a.fill(value),
        }
    }
}

fn precision_mismatch(requested: Precision, actual: Precision) -> Error {
    Error::invalid_argument(format!(
        "requested {} precision access to an array stored in {} precision",
        requested,
        actual))
}




/**
 * The storage of one variable on one block: a single array for cell and node
 * variables, or one array per face orientation (indexed by the face-normal
 * axis) for face variables.
 */
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VariableData {
    location: Location,
    arrays: Vec<FieldArray>,
}




// ============================================================================
impl VariableData {

    pub(crate) fn zeros(location: Location, precision: Precision, shapes: &[Vec<usize>]) -> Self {
        Self {
            location,
            arrays: shapes.iter().map(|shape| FieldArray::zeros(precision, shape)).collect(),
        }
    }

    pub fn location(&self) -> Location {
        self.location
    }

    /**
     * Return all backing arrays. Cell and node variables have exactly one.
     */
    pub fn arrays(&self) -> &[FieldArray] {
        &self.arrays
    }

    pub fn arrays_mut(&mut self) -> &mut [FieldArray] {
        &mut self.arrays
    }

    /**
     * Return the single array of a cell or node variable.
     */
    pub fn array(&self) -> Result<&FieldArray> {
        match self.location {
            Location::Face => Err(face_needs_axis()),
            _ => self.arrays.first().ok_or_else(no_arrays),
        }
    }

    pub fn array_mut(&mut self) -> Result<&mut FieldArray> {
        match self.location {
            Location::Face => Err(face_needs_axis()),
            _ => self.arrays.first_mut().ok_or_else(no_arrays),
        }
    }

    /**
     * Return the array of a face variable for faces normal to `axis`.
     */
    pub fn face(&self, axis: usize) -> Result<&FieldArray> {
        self.check_face_axis(axis)?;
        Ok(&self.arrays[axis])
    }

    pub fn face_mut(&mut self, axis: usize) -> Result<&mut FieldArray> {
        self.check_face_axis(axis)?;
        Ok(&mut self.arrays[axis])
    }

    fn check_face_axis(&self, axis: usize) -> Result<()> {
        if self.location != Location::Face {
            return Err(Error::invalid_argument(format!(
                "'axis' is only meaningful for face variables, not {} variables",
                self.location)))
        }
        if axis >= self.arrays.len() {
            return Err(Error::invalid_argument(format!(
                "'axis' should be less than the number of dimensions ({} >= {})",
                axis,
                self.arrays.len())))
        }
        Ok(())
    }
}

fn face_needs_axis() -> Error {
    Error::invalid_argument("face variables store one array per axis; use 'face(axis)'")
}

fn no_arrays() -> Error {
    Error::invalid_state("variable data holds no arrays")
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::{FieldArray, VariableData};
    use crate::variable::{Location, Precision};

    #[test]
    fn zeros_have_requested_precision_and_shape() {
        let array = FieldArray::zeros(Precision::Single, &[3, 4]);
        assert_eq!(array.precision(), Precision::Single);
        assert_eq!(array.shape(), &[3, 4]);
        assert_eq!(array.len(), 12);
        assert!(array.array::<f32>().unwrap().iter().all(|&x| x == 0.0));
    }

    #[test]
    fn typed_access_checks_precision() {
        let mut array = FieldArray::zeros(Precision::Double, &[2]);
        array.array_mut::<f64>().unwrap()[[1]] = 4.5;
        assert_eq!(array.array::<f64>().unwrap()[[1]], 4.5);

        let error = array.array::<f32>().unwrap_err();
        assert_eq!(error.message(), "requested single precision access to an array stored in double precision");
    }

    #[test]
    fn face_data_is_indexed_by_axis() {
        let shapes = vec![vec![3, 2], vec![2, 3]];
        let mut data = VariableData::zeros(Location::Face, Precision::Double, &shapes);
        assert!(data.array().is_err());
        assert_eq!(data.face(1).unwrap().shape(), &[2, 3]);
        assert!(data.face(2).is_err());

        data.face_mut(0).unwrap().fill(1.0);
        assert!(data.face(0).unwrap().array::<f64>().unwrap().iter().all(|&x| x == 1.0));
        assert!(data.face(1).unwrap().array::<f64>().unwrap().iter().all(|&x| x == 0.0));
    }

    #[test]
    fn cell_data_rejects_face_access() {
        let data = VariableData::zeros(Location::Cell, Precision::Single, &[vec![4]]);
        assert_eq!(data.arrays().len(), 1);
        assert!(data.array().is_ok());
        assert!(data.face(0).is_err());
    }

    #[test]
    fn data_without_arrays_is_an_error() {
        let mut bytes = Vec::new();
        ciborium::ser::into_writer(&VariableData::zeros(Location::Node, Precision::Double, &[]), &mut bytes).unwrap();
        let mut data: VariableData = ciborium::de::from_reader(bytes.as_slice()).unwrap();

        assert_eq!(data.array().unwrap_err().message(), "variable data holds no arrays");
        assert!(data.array_mut().is_err());
    }
}
