use core::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use log::info;
use rayon::prelude::*;
use crate::block::MeshBlock;
use crate::error::{Error, Result};
use crate::field::VariableData;
use crate::geometry::Geometry;
use crate::index_space::IndexSpace;
use crate::level::MeshLevel;
use crate::variable::{MeshVariable, VariableSpec};




/**
 * Identifies a `Mesh` for the lifetime of the process. Variables carry the
 * id of the mesh that created them instead of a reference to it.
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MeshId(u64);

static NEXT_MESH_ID: AtomicU64 = AtomicU64::new(0);

impl MeshId {
    fn next() -> Self {
        MeshId(NEXT_MESH_ID.fetch_add(1, Ordering::Relaxed))
    }
}




/**
 * A hierarchy of mesh levels over a fixed domain. Level 0 covers the domain
 * boxes and can never be removed; finer levels are appended and removed at
 * the end. Every variable created on the mesh is recorded here, and has
 * storage on each block of every level it was registered on.
 */
#[derive(Debug)]
pub struct Mesh {
    id: MeshId,
    domain: Vec<IndexSpace>,
    bounding_box: IndexSpace,
    geometry: Geometry,
    stores_vectors_contiguously: bool,
    levels: Vec<MeshLevel>,
    variables: Vec<MeshVariable>,
}




// ============================================================================
impl Mesh {


    /**
     * Create a single-level mesh over `domain`, where `first_box_geometry`
     * is the coordinate mapping of `domain[0]`. Multi-component variables
     * store their components contiguously.
     */
    pub fn new(domain: Vec<IndexSpace>, first_box_geometry: Geometry) -> Result<Self> {
        Self::with_vector_layout(domain, first_box_geometry, true)
    }


    /**
     * Like `new`, but choose whether the component axis of multi-component
     * variables is the last (contiguous) or first axis of their arrays.
     */
    pub fn with_vector_layout(
        domain: Vec<IndexSpace>,
        first_box_geometry: Geometry,
        stores_vectors_contiguously: bool) -> Result<Self>
    {
        let first = domain.first().ok_or_else(|| Error::invalid_argument("'domain' should not be empty"))?;
        let bounding_box = IndexSpace::compute_bounding_box(&domain).map_err(|_| {
            Error::invalid_argument("all boxes in 'domain' should have the same number of dimensions")
        })?;

        if first_box_geometry.num_dimensions() != first.num_dimensions() {
            return Err(Error::invalid_argument(format!(
                "'first_box_geometry' should have the same number of dimensions as the boxes in 'domain' ({} != {})",
                first_box_geometry.num_dimensions(),
                first.num_dimensions())))
        }

        let geometry = first_box_geometry.compute_geometry(first, &bounding_box)?;
        let coarsest = MeshLevel::new(0, &domain, &first_box_geometry, stores_vectors_contiguously)?;

        let mesh = Self {
            id: MeshId::next(),
            domain,
            bounding_box,
            geometry,
            stores_vectors_contiguously,
            levels: vec![coarsest],
            variables: Vec::new(),
        };
        info!("created {}", mesh);
        Ok(mesh)
    }


    /**
     * Create a variable on this mesh and allocate its storage on every block
     * of the levels named in `level_numbers`, or of every level if `None`.
     * Nothing is modified if any argument is invalid.
     */
    pub fn create_variable(&mut self, spec: VariableSpec, level_numbers: Option<&[usize]>) -> Result<MeshVariable> {
        let level_numbers: Vec<usize> = match level_numbers {
            None => (0..self.num_levels()).collect(),
            Some(numbers) => {
                if numbers.is_empty() {
                    return Err(Error::invalid_argument("'level_numbers' should not be empty"))
                }
                if numbers.iter().any(|&n| n >= self.num_levels()) {
                    return Err(Error::invalid_argument(
                        "'level_numbers' should only contain values less than number of levels in the Mesh"))
                }
                numbers.to_vec()
            }
        };

        self.create_variable_on(spec, &level_numbers)
    }


    /**
     * Create a variable and register it on the given levels, which are
     * assumed to exist. An empty list records the variable on the mesh
     * without allocating storage anywhere.
     */
    pub(crate) fn create_variable_on(&mut self, spec: VariableSpec, level_numbers: &[usize]) -> Result<MeshVariable> {
        let variable = MeshVariable::bound_to(self.id, self.num_dimensions(), spec)?;

        for &n in level_numbers {
            self.levels[n].add_variable(&variable)?;
        }
        info!("created {} on levels {:?}", variable, level_numbers);

        self.variables.push(variable.clone());
        Ok(variable)
    }


    /**
     * Append a level built from `boxes`, where `first_box_geometry` maps
     * `boxes[0]`. Every variable of the mesh is allocated on the new level.
     */
    pub fn add_level(&mut self, boxes: &[IndexSpace], first_box_geometry: &Geometry) -> Result<&MeshLevel> {
        if first_box_geometry.num_dimensions() != self.num_dimensions() {
            return Err(Error::invalid_argument(format!(
                "'first_box_geometry' should have the same number of dimensions as the Mesh ({} != {})",
                first_box_geometry.num_dimensions(),
                self.num_dimensions())))
        }
        let mut level = MeshLevel::new(self.num_levels(), boxes, first_box_geometry, self.stores_vectors_contiguously)?;

        for variable in &self.variables {
            level.add_variable(variable)?;
        }
        info!("added level {} with {} blocks", level.level_number(), level.num_blocks());

        self.levels.push(level);
        Ok(&self.levels[self.levels.len() - 1])
    }


    /**
     * Remove and return the finest level. The coarsest level cannot be
     * removed.
     */
    pub fn remove_level(&mut self) -> Result<MeshLevel> {
        if self.levels.len() == 1 {
            return Err(Error::invalid_state("The coarsest MeshLevel cannot be removed from Mesh"))
        }
        let level = self.levels.pop().ok_or_else(|| Error::invalid_state("Mesh has no levels"))?;
        info!("removed level {}", level.level_number());
        Ok(level)
    }


    /**
     * Return the storage of `variable` on the only block of a single-block
     * mesh.
     */
    pub fn data(&self, variable: &MeshVariable) -> Result<&VariableData> {
        self.single_block_for_data()?;
        self.levels[0].blocks()[0].data(variable)
    }

    pub fn data_mut(&mut self, variable: &MeshVariable) -> Result<&mut VariableData> {
        self.single_block_for_data()?;
        self.levels[0].blocks_mut()[0].data_mut(variable)
    }

    fn single_block_for_data(&self) -> Result<()> {
        if !self.is_single_block() {
            return Err(Error::invalid_argument(
                "'data' without a block is only available on a single-block Mesh"))
        }
        Ok(())
    }

    /**
     * Return the blocks of a single-level mesh.
     */
    pub fn blocks(&self) -> Result<&[MeshBlock]> {
        if !self.is_single_level() {
            return Err(Error::invalid_state("'blocks' is only available on a single-level Mesh"))
        }
        Ok(self.levels[0].blocks())
    }

    /**
     * Return the block of a single-block mesh.
     */
    pub fn block(&self) -> Result<&MeshBlock> {
        if !self.is_single_block() {
            return Err(Error::invalid_state("'block' is only available on a single-block Mesh"))
        }
        Ok(&self.levels[0].blocks()[0])
    }

    pub fn id(&self) -> MeshId {
        self.id
    }

    pub fn domain(&self) -> &[IndexSpace] {
        &self.domain
    }

    pub fn bounding_box(&self) -> &IndexSpace {
        &self.bounding_box
    }

    /**
     * Return the coordinate mapping of the bounding box of the domain.
     */
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn num_dimensions(&self) -> usize {
        self.bounding_box.num_dimensions()
    }

    pub fn levels(&self) -> &[MeshLevel] {
        &self.levels
    }

    pub fn level(&self, level_number: usize) -> Result<&MeshLevel> {
        let num_levels = self.num_levels();
        self.levels.get(level_number).ok_or_else(|| no_such_level(level_number, num_levels))
    }

    pub fn level_mut(&mut self, level_number: usize) -> Result<&mut MeshLevel> {
        let num_levels = self.num_levels();
        self.levels.get_mut(level_number).ok_or_else(|| no_such_level(level_number, num_levels))
    }

    pub fn num_levels(&self) -> usize {
        self.levels.len()
    }

    /**
     * Return the total number of blocks over all levels.
     */
    pub fn num_blocks(&self) -> usize {
        self.levels.iter().map(MeshLevel::num_blocks).sum()
    }

    pub fn variables(&self) -> &[MeshVariable] {
        &self.variables
    }

    pub fn is_single_level(&self) -> bool {
        self.levels.len() == 1
    }

    pub fn is_single_block(&self) -> bool {
        self.is_single_level() && self.domain.len() == 1
    }

    pub fn stores_vectors_contiguously(&self) -> bool {
        self.stores_vectors_contiguously
    }

    /**
     * Return a parallel iterator over the blocks of every level.
     */
    pub fn par_blocks_mut(&mut self) -> impl ParallelIterator<Item = &mut MeshBlock> + '_ {
        self.levels.par_iter_mut().flat_map(|level| level.par_blocks_mut())
    }
}

fn no_such_level(level_number: usize, num_levels: usize) -> Error {
    Error::invalid_argument(format!(
        "'level_number' should be less than the number of levels in the Mesh ({} >= {})",
        level_number,
        num_levels))
}




// ============================================================================
impl fmt::Display for Mesh {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let domain: Vec<String> = self.domain.iter().map(|b| b.to_string()).collect();
        write!(
            f,
            "Mesh(domain=[{}], levels={}, variables={}, single_level={}, single_block={})",
            domain.join(", "),
            self.num_levels(),
            self.variables.len(),
            self.is_single_level(),
            self.is_single_block())
    }
}
