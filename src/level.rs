use log::debug;
use rayon::prelude::*;
use crate::block::MeshBlock;
use crate::error::{Error, Result};
use crate::geometry::Geometry;
use crate::index_space::IndexSpace;
use crate::variable::MeshVariable;




/**
 * The blocks making up one refinement level of a mesh. The first box of the
 * level maps onto the geometry the level was built with; every other block
 * gets the geometry that mapping implies for its box.
 */
#[derive(Clone, Debug)]
pub struct MeshLevel {
    level_number: usize,
    blocks: Vec<MeshBlock>,
    variables: Vec<MeshVariable>,
}




// ============================================================================
impl MeshLevel {


    /**
     * Build a level with one block per box. Block `i` gets the geometry of
     * `boxes[i]` computed from `first_box_geometry`, which maps onto
     * `boxes[0]`.
     */
    pub fn new(
        level_number: usize,
        boxes: &[IndexSpace],
        first_box_geometry: &Geometry,
        stores_vectors_contiguously: bool) -> Result<Self>
    {
        let first = boxes.first().ok_or_else(|| Error::invalid_argument("'boxes' should not be empty"))?;

        for space in boxes {
            if space.num_dimensions() != first_box_geometry.num_dimensions() {
                return Err(Error::invalid_argument(format!(
                    "all boxes in 'boxes' should have the same number of dimensions as 'first_box_geometry' ({} != {})",
                    space.num_dimensions(),
                    first_box_geometry.num_dimensions())))
            }
        }

        let blocks = boxes
            .iter()
            .enumerate()
            .map(|(i, space)| {
                let geometry = if i == 0 {
                    first_box_geometry.clone()
                } else {
                    first_box_geometry.compute_geometry(first, space)?
                };
                MeshBlock::new(space.clone(), geometry, stores_vectors_contiguously)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            level_number,
            blocks,
            variables: Vec::new(),
        })
    }


    /**
     * Register a variable on this level and allocate its storage on every
     * block. The blocks are visited in parallel; storage exists on all of
     * them when this returns. Registering the same variable again does
     * nothing.
     */
    pub fn add_variable(&mut self, variable: &MeshVariable) -> Result<()> {
        if variable.num_dimensions() != self.num_dimensions() {
            return Err(Error::invalid_argument(format!(
                "'variable' should have the same number of dimensions as the level ({} != {})",
                variable.num_dimensions(),
                self.num_dimensions())))
        }
        if !self.has_variable(variable) {
            debug!("register {} on level {}", variable, self.level_number);
            self.variables.push(variable.clone());
        }
        self.blocks.par_iter_mut().try_for_each(|block| block.add_variable(variable))
    }

    pub fn has_variable(&self, variable: &MeshVariable) -> bool {
        self.variables.iter().any(|v| v.id() == variable.id())
    }

    pub fn level_number(&self) -> usize {
        self.level_number
    }

    pub fn num_dimensions(&self) -> usize {
        self.blocks[0].num_dimensions()
    }

    pub fn blocks(&self) -> &[MeshBlock] {
        &self.blocks
    }

    pub fn blocks_mut(&mut self) -> &mut [MeshBlock] {
        &mut self.blocks
    }

    /**
     * Return a parallel iterator over the blocks of this level, for kernels
     * that update each block independently.
     */
    pub fn par_blocks_mut(&mut self) -> rayon::slice::IterMut<'_, MeshBlock> {
        self.blocks.par_iter_mut()
    }

    pub fn block(&self, index: usize) -> Result<&MeshBlock> {
        self.blocks.get(index).ok_or_else(|| Error::invalid_argument(format!(
            "'index' should be less than the number of blocks on level {} ({} >= {})",
            self.level_number,
            index,
            self.blocks.len())))
    }

    pub fn num_blocks(&self) -> usize {
        self.blocks.len()
    }

    /**
     * Return the boxes of this level's blocks, in block order.
     */
    pub fn boxes(&self) -> Vec<IndexSpace> {
        self.blocks.iter().map(|block| block.index_space().clone()).collect()
    }

    pub fn variables(&self) -> &[MeshVariable] {
        &self.variables
    }
}




// ============================================================================
#[cfg(test)]
mod test {

    use rayon::prelude::*;
    use super::MeshLevel;
    use crate::geometry::{CartesianGeometry, Geometry};
    use crate::index_space::IndexSpace;
    use crate::mesh::Mesh;
    use crate::variable::{Location, MeshVariable, VariableSpec};

    fn b(lower: &[i64], upper: &[i64]) -> IndexSpace {
        IndexSpace::new(lower, upper).unwrap()
    }

    fn g(x_lower: &[f64], x_upper: &[f64]) -> Geometry {
        CartesianGeometry::new(x_lower, x_upper).unwrap().into()
    }

    fn boxes() -> Vec<IndexSpace> {
        vec![
            b(&[0, 0], &[9, 9]),
            b(&[10, 5], &[19, 14]),
            b(&[0, 10], &[4, 14]),
        ]
    }

    #[test]
    fn blocks_get_propagated_geometry() {
        let level = MeshLevel::new(0, &boxes(), &g(&[0.0, 0.0], &[1.0, 1.0]), true).unwrap();
        assert_eq!(level.level_number(), 0);
        assert_eq!(level.num_blocks(), 3);
        assert_eq!(level.boxes(), boxes());
        assert_eq!(level.blocks()[0].geometry(), &g(&[0.0, 0.0], &[1.0, 1.0]));
        assert_eq!(level.blocks()[1].geometry(), &g(&[1.0, 0.5], &[2.0, 1.5]));
        assert_eq!(level.blocks()[2].geometry(), &g(&[0.0, 1.0], &[0.5, 1.5]));
    }

    #[test]
    fn invalid_boxes_are_rejected() {
        let geometry = g(&[0.0, 0.0], &[1.0, 1.0]);
        let error = MeshLevel::new(0, &[], &geometry, true).unwrap_err();
        assert_eq!(error.message(), "'boxes' should not be empty");

        let error = MeshLevel::new(0, &[b(&[0, 0], &[9, 9]), b(&[0], &[9])], &geometry, true).unwrap_err();
        assert!(error.message().starts_with("all boxes in 'boxes' should have the same number of dimensions"));
    }

    #[test]
    fn add_variable_reaches_every_block_once() {
        let mesh = Mesh::new(vec![b(&[0, 0], &[9, 9])], g(&[0.0, 0.0], &[1.0, 1.0])).unwrap();
        let v = MeshVariable::new(&mesh, VariableSpec::default().location(Location::Cell).max_stencil_width(1usize)).unwrap();
        let mut level = MeshLevel::new(0, &boxes(), &g(&[0.0, 0.0], &[1.0, 1.0]), true).unwrap();

        level.add_variable(&v).unwrap();
        level.add_variable(&v).unwrap();

        assert_eq!(level.variables().len(), 1);
        assert!(level.has_variable(&v));
        for block in level.blocks() {
            assert_eq!(block.variables().len(), 1);
            let shape: Vec<usize> = block.index_space().shape().iter().map(|n| n + 2).collect();
            assert_eq!(block.data(&v).unwrap().array().unwrap().shape(), shape.as_slice());
        }
    }

    #[test]
    fn par_blocks_mut_visits_every_block() {
        let mesh = Mesh::new(vec![b(&[0, 0], &[9, 9])], g(&[0.0, 0.0], &[1.0, 1.0])).unwrap();
        let v = MeshVariable::new(&mesh, VariableSpec::default().location(Location::Cell)).unwrap();
        let mut level = MeshLevel::new(0, &boxes(), &g(&[0.0, 0.0], &[1.0, 1.0]), true).unwrap();
        level.add_variable(&v).unwrap();

        level.par_blocks_mut().for_each(|block| {
            let size = block.index_space().size() as f64;
            block.data_mut(&v).unwrap().array_mut().unwrap().fill(size);
        });

        let totals: Vec<f64> = level
            .blocks()
            .iter()
            .map(|block| block.data(&v).unwrap().array().unwrap().array::<f64>().unwrap().sum())
            .collect();
        assert_eq!(totals, vec![10000.0, 10000.0, 625.0]);
    }

    #[test]
    fn block_index_is_checked() {
        let level = MeshLevel::new(2, &boxes(), &g(&[0.0, 0.0], &[1.0, 1.0]), true).unwrap();
        assert!(level.block(2).is_ok());
        assert!(level.block(3).is_err());
    }
}
