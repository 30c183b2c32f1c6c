use samr::{CartesianGeometry, CheckpointFormat, Error, Geometry, IndexSpace, Location, Mesh, Precision, VariableSpec};

fn b(lower: &[i64], upper: &[i64]) -> IndexSpace {
    IndexSpace::new(lower, upper).unwrap()
}

fn g(x_lower: &[f64], x_upper: &[f64]) -> Geometry {
    CartesianGeometry::new(x_lower, x_upper).unwrap().into()
}

/**
 * Two levels, a vector variable on both and a single-precision face variable
 * on the fine level only, with every array filled with distinct values.
 */
fn populated_mesh() -> Mesh {
    let domain = vec![b(&[0, 0], &[7, 7]), b(&[8, 0], &[15, 7])];
    let mut mesh = Mesh::with_vector_layout(domain, g(&[0.0, 0.0], &[0.5, 1.0]), false).unwrap();
    mesh.add_level(&[b(&[4, 4], &[11, 11])], &g(&[0.125, 0.25], &[0.375, 0.75])).unwrap();

    let u = mesh.create_variable(VariableSpec::default().location(Location::Cell).depth(2).max_stencil_width(1usize), None).unwrap();
    let f = mesh.create_variable(
        VariableSpec::default().location(Location::Face).precision(Precision::Single),
        Some(&[1])).unwrap();

    let mut seed = 0.0;
    for level in 0..mesh.num_levels() {
        for block in mesh.level_mut(level).unwrap().blocks_mut() {
            for variable in [&u, &f].iter() {
                if let Ok(data) = block.data_mut(variable) {
                    for array in data.arrays_mut() {
                        seed += 1.0;
                        array.fill(seed / 3.0);
                    }
                }
            }
        }
    }
    mesh
}

fn assert_same_structure(a: &Mesh, b: &Mesh) {
    assert_eq!(a.domain(), b.domain());
    assert_eq!(a.bounding_box(), b.bounding_box());
    assert_eq!(a.geometry(), b.geometry());
    assert_eq!(a.num_levels(), b.num_levels());
    assert_eq!(a.stores_vectors_contiguously(), b.stores_vectors_contiguously());
    assert_eq!(a.variables().len(), b.variables().len());

    for (x, y) in a.variables().iter().zip(b.variables()) {
        assert_eq!(x.spec(), y.spec());
        assert_ne!(x.id(), y.id());
        assert_eq!(y.mesh_id(), b.id());
    }
    for (p, q) in a.levels().iter().zip(b.levels()) {
        assert_eq!(p.boxes(), q.boxes());

        for (s, t) in p.blocks().iter().zip(q.blocks()) {
            assert_eq!(s.geometry(), t.geometry());

            for (x, y) in a.variables().iter().zip(b.variables()) {
                assert_eq!(s.data(x).ok(), t.data(y).ok());
            }
        }
    }
}




#[test]
fn cbor_checkpoint_restores_the_mesh() {
    let mesh = populated_mesh();
    let mut bytes = Vec::new();
    mesh.write_checkpoint(&mut bytes, CheckpointFormat::Cbor).unwrap();

    let restored = Mesh::read_checkpoint(bytes.as_slice(), CheckpointFormat::Cbor).unwrap();
    assert_same_structure(&mesh, &restored);
}

#[test]
fn message_pack_checkpoint_restores_the_mesh() {
    let mesh = populated_mesh();
    let mut bytes = Vec::new();
    mesh.write_checkpoint(&mut bytes, CheckpointFormat::MessagePack).unwrap();

    let restored = Mesh::read_checkpoint(bytes.as_slice(), CheckpointFormat::MessagePack).unwrap();
    assert_same_structure(&mesh, &restored);
}

#[test]
fn variables_without_storage_survive_a_checkpoint() {
    let mut mesh = populated_mesh();
    mesh.remove_level().unwrap();

    let mut bytes = Vec::new();
    mesh.write_checkpoint(&mut bytes, CheckpointFormat::Cbor).unwrap();
    let restored = Mesh::read_checkpoint(bytes.as_slice(), CheckpointFormat::Cbor).unwrap();

    assert_eq!(restored.num_levels(), 1);
    assert_eq!(restored.variables().len(), 2);
    assert!(!restored.level(0).unwrap().has_variable(&restored.variables()[1]));
    assert_same_structure(&mesh, &restored);
}

#[test]
fn truncated_checkpoint_is_rejected() {
    let mesh = populated_mesh();
    let mut bytes = Vec::new();
    mesh.write_checkpoint(&mut bytes, CheckpointFormat::Cbor).unwrap();
    bytes.truncate(bytes.len() / 2);

    let error = Mesh::read_checkpoint(bytes.as_slice(), CheckpointFormat::Cbor).unwrap_err();
    assert!(matches!(error, Error::Checkpoint(_)));
}
