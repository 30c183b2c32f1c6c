use std::borrow::Cow;
use std::io::{Read, Write};
use log::info;
use serde::{Deserialize, Serialize};
use crate::error::{Error, Result};
use crate::field::VariableData;
use crate::geometry::Geometry;
use crate::index_space::IndexSpace;
use crate::mesh::Mesh;
use crate::variable::VariableSpec;




/**
 * Binary encodings a mesh checkpoint can be written in.
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckpointFormat {
    Cbor,
    MessagePack,
}




/**
 * Everything needed to rebuild a mesh: its level structure, its variables
 * in creation order, and the contents of every block array. Level 0's boxes
 * are the mesh domain.
 */
#[derive(Serialize, Deserialize)]
struct MeshRecord<'a> {
    stores_vectors_contiguously: bool,
    levels: Vec<LevelRecord<'a>>,
    variables: Vec<VariableRecord>,
}

#[derive(Serialize, Deserialize)]
struct LevelRecord<'a> {
    boxes: Vec<IndexSpace>,
    first_box_geometry: Geometry,
    blocks: Vec<BlockRecord<'a>>,
}

#[derive(Serialize, Deserialize)]
struct VariableRecord {
    spec: VariableSpec,
    level_numbers: Vec<usize>,
}

/**
 * Block storage as pairs of (variable index, data), where the index is the
 * variable's position in `MeshRecord::variables`.
 */
#[derive(Serialize, Deserialize)]
struct BlockRecord<'a> {
    data: Vec<(usize, Cow<'a, VariableData>)>,
}




// ============================================================================
impl<'a> MeshRecord<'a> {

    fn from_mesh(mesh: &'a Mesh) -> Self {
        let levels = mesh
            .levels()
            .iter()
            .map(|level| LevelRecord {
                boxes: level.boxes(),
                first_box_geometry: level.blocks()[0].geometry().clone(),
                blocks: level
                    .blocks()
                    .iter()
                    .map(|block| BlockRecord {
                        data: mesh
                            .variables()
                            .iter()
                            .enumerate()
                            .filter_map(|(i, v)| block.data(v).ok().map(|d| (i, Cow::Borrowed(d))))
                            .collect(),
                    })
                    .collect(),
            })
            .collect();

        let variables = mesh
            .variables()
            .iter()
            .map(|v| VariableRecord {
                spec: v.spec(),
                level_numbers: mesh
                    .levels()
                    .iter()
                    .filter(|level| level.has_variable(v))
                    .map(|level| level.level_number())
                    .collect(),
            })
            .collect();

        Self {
            stores_vectors_contiguously: mesh.stores_vectors_contiguously(),
            levels,
            variables,
        }
    }

    fn into_mesh(self) -> Result<Mesh> {
        let mut levels = self.levels.into_iter();
        let coarsest = levels
            .next()
            .ok_or_else(|| Error::invalid_argument("checkpoint should contain at least one level"))?;

        let mut mesh = Mesh::with_vector_layout(
            coarsest.boxes,
            coarsest.first_box_geometry,
            self.stores_vectors_contiguously)?;
        let mut block_records = vec![coarsest.blocks];

        for level in levels {
            mesh.add_level(&level.boxes, &level.first_box_geometry)?;
            block_records.push(level.blocks);
        }

        let mut variables = Vec::with_capacity(self.variables.len());

        for record in self.variables {
            if record.level_numbers.iter().any(|&n| n >= mesh.num_levels()) {
                return Err(Error::invalid_argument(
                    "checkpoint variable is registered on a level the checkpoint does not contain"))
            }
            variables.push(mesh.create_variable_on(record.spec, &record.level_numbers)?);
        }

        for (level_number, blocks) in block_records.into_iter().enumerate() {
            let level = mesh.level_mut(level_number)?;

            if blocks.len() != level.num_blocks() {
                return Err(Error::invalid_argument(format!(
                    "checkpoint level {} should have {} blocks (found {})",
                    level_number,
                    level.num_blocks(),
                    blocks.len())))
            }
            for (block, record) in level.blocks_mut().iter_mut().zip(blocks) {
                for (index, data) in record.data {
                    let variable = variables.get(index).ok_or_else(|| {
                        Error::invalid_argument(format!("checkpoint refers to unknown variable {}", index))
                    })?;
                    let data = data.into_owned();
                    let target = block.data_mut(variable)?;

                    if !same_layout(target, &data) {
                        return Err(Error::invalid_argument(format!(
                            "checkpoint data for {} does not match its allocated layout",
                            variable)))
                    }
                    *target = data;
                }
            }
        }
        Ok(mesh)
    }
}

fn same_layout(a: &VariableData, b: &VariableData) -> bool {
    a.location() == b.location() &&
    a.arrays().len() == b.arrays().len() &&
    a.arrays().iter().zip(b.arrays()).all(|(x, y)| x.precision() == y.precision() && x.shape() == y.shape())
}




// ============================================================================
impl Mesh {


    /**
     * Write the complete state of this mesh, including every array value,
     * to `writer`.
     */
    pub fn write_checkpoint<W: Write>(&self, mut writer: W, format: CheckpointFormat) -> Result<()> {
        let record = MeshRecord::from_mesh(self);

        match format {
            CheckpointFormat::Cbor => {
                ciborium::ser::into_writer(&record, &mut writer)
                    .map_err(|e| Error::checkpoint(format!("{:?}", e)))?
            }
            CheckpointFormat::MessagePack => {
                rmp_serde::encode::write_named(&mut writer, &record)
                    .map_err(|e| Error::checkpoint(format!("{}", e)))?
            }
        }
        info!("wrote {:?} checkpoint of {}", format, self);
        Ok(())
    }


    /**
     * Rebuild a mesh from a checkpoint written by `write_checkpoint`. The
     * restored mesh and its variables get fresh identities; variable order
     * and array contents are preserved.
     */
    pub fn read_checkpoint<R: Read>(reader: R, format: CheckpointFormat) -> Result<Mesh> {
        let record: MeshRecord = match format {
            CheckpointFormat::Cbor => {
                ciborium::de::from_reader(reader)
                    .map_err(|e| Error::checkpoint(format!("{:?}", e)))?
            }
            CheckpointFormat::MessagePack => {
                rmp_serde::decode::from_read(reader)
                    .map_err(|e| Error::checkpoint(format!("{}", e)))?
            }
        };
        let mesh = record.into_mesh()?;
        info!("read {:?} checkpoint of {}", format, mesh);
        Ok(mesh)
    }
}
