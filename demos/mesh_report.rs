use clap::Parser;
use log::{info, LevelFilter};
use simple_logger::SimpleLogger;
use samr::{CartesianGeometry, CheckpointFormat, IndexSpace, MeshConfig, StencilWidth};
use samr::config::{LevelConfig, VariableConfig};

#[derive(Debug, Parser)]
#[clap(version = "1.0", author = "J. Zrake <jzrake@clemson.edu>")]
struct Opts {
    #[clap(short = 'n', long, default_value = "64")]
    domain_size: i64,

    #[clap(short = 'b', long, default_value = "2")]
    blocks_per_side: i64,

    #[clap(short = 'r', long, default_value = "2")]
    refinement_factor: i64,

    #[clap(short = 'd', long, default_value = "1")]
    depth: usize,

    #[clap(long, default_value = "cell")]
    location: String,

    #[clap(long, default_value = "info")]
    log_level: LevelFilter,

    #[clap(short = 'o', long)]
    checkpoint: Option<String>,
}




// ============================================================================
fn config(opts: &Opts) -> Result<MeshConfig, Box<dyn std::error::Error>> {
    if opts.blocks_per_side <= 0 {
        return Err("'blocks_per_side' should be a positive integer".into())
    }
    let m = opts.blocks_per_side;
    let k = opts.domain_size / m;

    let domain = (0..m)
        .flat_map(|i| (0..m).map(move |j| (i, j)))
        .map(|(i, j)| IndexSpace::new(vec![i * k, j * k], vec![(i + 1) * k - 1, (j + 1) * k - 1]))
        .collect::<Result<Vec<_>, _>>()?;

    let first_box_extent = 1.0 / m as f64;
    let geometry = CartesianGeometry::new(vec![0.0, 0.0], vec![first_box_extent; 2])?;
    let refined = IndexSpace::refine_boxes(&domain[..1], opts.refinement_factor)?;

    Ok(MeshConfig {
        domain,
        geometry: geometry.clone().into(),
        stores_vectors_contiguously: true,
        levels: vec![LevelConfig {
            boxes: refined,
            geometry: geometry.into(),
        }],
        variables: vec![VariableConfig {
            location: opts.location.clone(),
            max_stencil_width: StencilWidth::Uniform(2),
            depth: opts.depth,
            ..VariableConfig::default()
        }],
    })
}




// ============================================================================
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let opts = Opts::parse();

    SimpleLogger::new().with_level(opts.log_level).init()?;
    info!("{:?}", opts);

    let (mesh, variables) = config(&opts)?.build()?;

    info!("{}", mesh);
    info!("bounding box ... {}", mesh.bounding_box());
    info!("geometry ....... {}", mesh.geometry());

    for level in mesh.levels() {
        info!("level {} has {} blocks", level.level_number(), level.num_blocks());

        for block in level.blocks() {
            let bytes: usize = variables
                .iter()
                .filter_map(|v| block.data(v).ok())
                .flat_map(|data| data.arrays())
                .map(|array| array.len() * array.precision().size_in_bytes())
                .sum();
            info!(
                "    {} -> {} dx={:?} ({} bytes)",
                block.index_space(),
                block.geometry(),
                block.geometry().compute_dx(block.index_space())?,
                bytes);
        }
    }

    for variable in &variables {
        info!("{} with halo box {}", variable, variable.index_space(&mesh.levels()[0].blocks()[0], true)?);
    }

    if let Some(path) = &opts.checkpoint {
        let file = std::fs::File::create(path)?;
        let buffer = std::io::BufWriter::new(file);
        mesh.write_checkpoint(buffer, CheckpointFormat::Cbor)?;
        info!("wrote checkpoint to {}", path);
    }
    Ok(())
}




// ============================================================================
#[cfg(test)]
mod test {

    use clap::Parser;
    use super::{config, Opts};

    #[test]
    fn default_options_build_a_tiled_mesh() {
        let (mesh, variables) = config(&Opts::parse_from(["mesh_report"])).unwrap().build().unwrap();
        assert_eq!(mesh.levels()[0].num_blocks(), 4);
        assert_eq!(mesh.num_levels(), 2);
        assert_eq!(variables.len(), 1);
    }

    #[test]
    fn zero_blocks_per_side_is_rejected() {
        let error = config(&Opts::parse_from(["mesh_report", "-b", "0"])).unwrap_err();
        assert_eq!(error.to_string(), "'blocks_per_side' should be a positive integer");
    }
}
