//! Moon Map Generator
//!
//! Generates a cratered map and writes it as a binary map file.
//!
//! ```text
//! moon_map <output.hmap> [generator.json] [terrain.json]
//! ```
//!
//! Set `RUST_LOG=debug` for per-step output.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use harvest_moon_engine::persist::save_map;
use harvest_moon_engine::terrain::{MeshBuffers, ObjectCatalog, RandomMap};
use harvest_moon_engine::{MapFileError, RandomMapConfig, TerrainConfig};

fn run(args: &[String]) -> Result<(), MapFileError> {
    let output = PathBuf::from(&args[0]);
    let generator = match args.get(1) {
        Some(path) => RandomMapConfig::load(Path::new(path))?,
        None => RandomMapConfig::default(),
    };
    let terrain = match args.get(2) {
        Some(path) => TerrainConfig::load(Path::new(path))?,
        None => TerrainConfig::default(),
    };

    let mut random_map = RandomMap::new(generator);
    let map = random_map.generate_with(ObjectCatalog::default(), &terrain);

    let mut surface = MeshBuffers::new();
    map.build_surface_mesh(&mut surface);
    log::info!(
        "[moon_map] Surface mesh: {} parts, {} vertices, {} triangles",
        surface.parts.len(),
        surface.vertex_count(),
        surface.primitive_count()
    );

    save_map(&output, &map)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        eprintln!("usage: moon_map <output.hmap> [generator.json] [terrain.json]");
        return ExitCode::FAILURE;
    }

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("[moon_map] {e}");
            ExitCode::FAILURE
        }
    }
}
