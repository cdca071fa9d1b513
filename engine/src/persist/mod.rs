//! Persistence Module
//!
//! Binary map files.

pub mod map_file;

pub use map_file::{
    MAP_MAGIC, MAP_VERSION, MapHeader, decode_map, encode_map, load_map, load_map_with, read_map,
    save_map, write_map,
};
