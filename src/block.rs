use std::collections::BTreeMap;
use log::debug;
use crate::error::{Error, Result};
use crate::field::VariableData;
use crate::geometry::Geometry;
use crate::index_space::IndexSpace;
use crate::variable::{MeshVariable, VariableId};




/**
 * One box of a mesh level, together with its coordinate mapping and the
 * arrays backing every variable registered on it. The box and geometry are
 * fixed at construction; variables can be added but never removed.
 */
#[derive(Clone, Debug)]
pub struct MeshBlock {
    index_space: IndexSpace,
    geometry: Geometry,
    stores_vectors_contiguously: bool,
    variables: Vec<MeshVariable>,
    data: BTreeMap<VariableId, VariableData>,
}




// ============================================================================
impl MeshBlock {


    pub fn new(index_space: IndexSpace, geometry: Geometry, stores_vectors_contiguously: bool) -> Result<Self> {
        if index_space.num_dimensions() != geometry.num_dimensions() {
            return Err(Error::invalid_argument(format!(
                "'box' and 'geometry' should have the same number of dimensions ({} != {})",
                index_space.num_dimensions(),
                geometry.num_dimensions())))
        }
        Ok(Self {
            index_space,
            geometry,
            stores_vectors_contiguously,
            variables: Vec::new(),
            data: BTreeMap::new(),
        })
    }


    /**
     * Register a variable on this block and allocate zeroed storage for it.
     * Adding a variable that is already registered does nothing.
     */
    pub fn add_variable(&mut self, variable: &MeshVariable) -> Result<()> {
        if variable.num_dimensions() != self.num_dimensions() {
            return Err(Error::invalid_argument(format!(
                "'variable' should have the same number of dimensions as the block ({} != {})",
                variable.num_dimensions(),
                self.num_dimensions())))
        }
        if self.has_variable(variable) {
            return Ok(())
        }
        let shapes = variable.data_shape(&self.index_space, self.stores_vectors_contiguously);

        debug!("allocate {} on {} with shapes {:?}", variable, self.index_space, shapes);

        self.data.insert(variable.id(), VariableData::zeros(variable.location(), variable.precision(), &shapes));
        self.variables.push(variable.clone());
        Ok(())
    }

    pub fn has_variable(&self, variable: &MeshVariable) -> bool {
        self.data.contains_key(&variable.id())
    }

    pub fn data(&self, variable: &MeshVariable) -> Result<&VariableData> {
        self.data.get(&variable.id()).ok_or_else(|| not_registered(variable, &self.index_space))
    }

    pub fn data_mut(&mut self, variable: &MeshVariable) -> Result<&mut VariableData> {
        let index_space = &self.index_space;
        self.data.get_mut(&variable.id()).ok_or_else(|| not_registered(variable, index_space))
    }

    /**
     * Return the storage of every registered variable, keyed by variable
     * identity.
     */
    pub fn data_all(&self) -> &BTreeMap<VariableId, VariableData> {
        &self.data
    }

    pub fn index_space(&self) -> &IndexSpace {
        &self.index_space
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn num_dimensions(&self) -> usize {
        self.index_space.num_dimensions()
    }

    /**
     * Return the variables registered on this block, in registration order.
     */
    pub fn variables(&self) -> &[MeshVariable] {
        &self.variables
    }

    pub fn stores_vectors_contiguously(&self) -> bool {
        self.stores_vectors_contiguously
    }
}

fn not_registered(variable: &MeshVariable, index_space: &IndexSpace) -> Error {
    Error::not_found(format!("{} is not registered on the block {}", variable, index_space))
}
