//! Map File Save/Load (.hmap)
//!
//! Binary layout: fixed 16-byte header | vertex heights | object codes.
//!
//! ```text
//! [MapHeader 16 bytes]  magic "HMAP", version, width, height (u32 LE each)
//! [heights: (width+1)*(height+1) * i32 LE, row-major]
//! [objects: width*height * u8, row-major]
//! ```
//!
//! Only self-consistency is checked on load: header, array lengths, and
//! object codes against the catalog. The slope invariant is trusted.

use std::io::{Read, Write};
use std::path::Path;

use bytemuck::{Pod, Zeroable};

use crate::config::TerrainConfig;
use crate::error::MapFileError;
use crate::terrain::{GameMap, HeightField, ObjectCatalog, ObjectLayer};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Magic bytes identifying a map file.
pub const MAP_MAGIC: [u8; 4] = *b"HMAP";

/// Current file format version.
pub const MAP_VERSION: u32 = 1;

/// Size of the header in bytes.
const HEADER_SIZE: usize = 16;

// ============================================================================
// HEADER
// ============================================================================

/// Fixed-size binary header. Integer fields are stored little-endian.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct MapHeader {
    /// Magic bytes: always `b"HMAP"`.
    pub magic: [u8; 4],
    pub version: u32,
    /// Cells along the column axis.
    pub width: u32,
    /// Cells along the row axis.
    pub height: u32,
}

static_assertions::assert_eq_size!(MapHeader, [u8; HEADER_SIZE]);

impl MapHeader {
    fn new(width: u32, height: u32) -> Self {
        Self {
            magic: MAP_MAGIC,
            version: MAP_VERSION.to_le(),
            width: width.to_le(),
            height: height.to_le(),
        }
    }
}

// ============================================================================
// ENCODE / DECODE
// ============================================================================

/// Serialize a map into the binary layout.
pub fn encode_map(map: &GameMap) -> Vec<u8> {
    let heights = map.field().heights();
    let objects = map.objects().objects();

    let mut out = Vec::with_capacity(HEADER_SIZE + heights.len() * 4 + objects.len());
    out.extend_from_slice(bytemuck::bytes_of(&MapHeader::new(map.width(), map.height())));
    for h in heights {
        out.extend_from_slice(&h.to_le_bytes());
    }
    out.extend_from_slice(objects);
    out
}

/// Rebuild a map from the binary layout.
pub fn decode_map(
    data: &[u8],
    catalog: ObjectCatalog,
    config: &TerrainConfig,
) -> Result<GameMap, MapFileError> {
    if data.len() < HEADER_SIZE {
        return Err(MapFileError::Truncated {
            expected: HEADER_SIZE,
            found: data.len(),
        });
    }

    let header: MapHeader = bytemuck::pod_read_unaligned(&data[..HEADER_SIZE]);
    if header.magic != MAP_MAGIC {
        return Err(MapFileError::InvalidMagic);
    }
    let version = u32::from_le(header.version);
    if version != MAP_VERSION {
        return Err(MapFileError::UnsupportedVersion(version));
    }
    let width = u32::from_le(header.width);
    let height = u32::from_le(header.height);

    // Dimensions come straight from the file; a size that overflows can
    // never be satisfied by the data, so it is reported as truncation.
    let (heights_end, objects_end) =
        body_layout(width, height).ok_or(MapFileError::Truncated {
            expected: usize::MAX,
            found: data.len(),
        })?;
    if data.len() < objects_end {
        return Err(MapFileError::Truncated {
            expected: objects_end,
            found: data.len(),
        });
    }
    if data.len() > objects_end {
        log::warn!(
            "[MapFile] Ignoring {} trailing bytes after a {}x{} map",
            data.len() - objects_end,
            width,
            height
        );
    }

    let heights: Vec<i32> = data[HEADER_SIZE..heights_end]
        .chunks_exact(4)
        .map(|b| i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect();
    let field = HeightField::from_heights(width, height, heights).ok_or_else(|| {
        crate::error::TerrainError::invalid_argument("height array does not match dimensions")
    })?;
    let objects = ObjectLayer::from_objects(
        width,
        height,
        &catalog,
        data[heights_end..objects_end].to_vec(),
    )?;

    Ok(GameMap::from_parts(field, objects, catalog, config)?)
}

/// End offsets of the height array and the object array.
fn body_layout(width: u32, height: u32) -> Option<(usize, usize)> {
    let width = usize::try_from(width).ok()?;
    let height = usize::try_from(height).ok()?;
    let vertex_count = width.checked_add(1)?.checked_mul(height.checked_add(1)?)?;
    let cell_count = width.checked_mul(height)?;
    let heights_end = vertex_count.checked_mul(4)?.checked_add(HEADER_SIZE)?;
    let objects_end = heights_end.checked_add(cell_count)?;
    Some((heights_end, objects_end))
}

// ============================================================================
// STREAMS AND FILES
// ============================================================================

pub fn write_map<W: Write>(target: &mut W, map: &GameMap) -> Result<(), MapFileError> {
    target.write_all(&encode_map(map))?;
    Ok(())
}

pub fn read_map<R: Read>(
    source: &mut R,
    catalog: ObjectCatalog,
    config: &TerrainConfig,
) -> Result<GameMap, MapFileError> {
    let mut data = Vec::new();
    source.read_to_end(&mut data)?;
    decode_map(&data, catalog, config)
}

/// Write a map file to disk, creating parent directories.
pub fn save_map(path: &Path, map: &GameMap) -> Result<(), MapFileError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::fs::File::create(path)?;
    write_map(&mut file, map)?;
    log::info!(
        "[MapFile] Saved {}x{} map to {}",
        map.width(),
        map.height(),
        path.display()
    );
    Ok(())
}

/// Read a map file with the default catalog and terrain configuration.
pub fn load_map(path: &Path) -> Result<GameMap, MapFileError> {
    load_map_with(path, ObjectCatalog::default(), &TerrainConfig::default())
}

pub fn load_map_with(
    path: &Path,
    catalog: ObjectCatalog,
    config: &TerrainConfig,
) -> Result<GameMap, MapFileError> {
    let data = std::fs::read(path)?;
    let map = decode_map(&data, catalog, config)?;
    log::info!(
        "[MapFile] Loaded {}x{} map from {}",
        map.width(),
        map.height(),
        path.display()
    );
    Ok(map)
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_map() -> GameMap {
        let mut map = GameMap::new(5, 3, 2);
        map.raise(1, 1, 4);
        map.lower(3, 5, 0);
        map.update_control_points();
        map.place_object(0, 3, 3).unwrap();
        map
    }

    fn decode(data: &[u8]) -> Result<GameMap, MapFileError> {
        decode_map(data, ObjectCatalog::default(), &TerrainConfig::default())
    }

    #[test]
    fn test_header_size() {
        assert_eq!(std::mem::size_of::<MapHeader>(), 16);
    }

    #[test]
    fn test_layout() {
        let map = sample_map();
        let data = encode_map(&map);

        assert_eq!(data.len(), 16 + 6 * 4 * 4 + 5 * 3);
        assert_eq!(&data[0..4], b"HMAP");
        assert_eq!(&data[4..8], &1u32.to_le_bytes());
        assert_eq!(&data[8..12], &5u32.to_le_bytes());
        assert_eq!(&data[12..16], &3u32.to_le_bytes());
        // First height is vertex (0, 0).
        assert_eq!(&data[16..20], &map.height_at(0, 0).to_le_bytes());
        // Object for cell (0, 3) follows the 96 bytes of heights.
        assert_eq!(data[16 + 96 + 3], 3);
    }

    #[test]
    fn test_round_trip_in_memory() {
        let map = sample_map();
        let loaded = decode(&encode_map(&map)).unwrap();

        assert_eq!(loaded.field().heights(), map.field().heights());
        assert_eq!(loaded.objects().objects(), map.objects().objects());
        assert!(loaded.is_current());
    }

    #[test]
    fn test_round_trip_on_disk() {
        let dir = std::env::temp_dir().join("hmap_test_round_trip");
        let _ = std::fs::create_dir_all(&dir);
        let path = dir.join("moon.hmap");

        let map = sample_map();
        save_map(&path, &map).unwrap();
        let loaded = load_map(&path).unwrap();
        assert_eq!(loaded.field().heights(), map.field().heights());
        assert_eq!(loaded.objects().objects(), map.objects().objects());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_invalid_magic() {
        let mut bad = [0u8; 16];
        bad[0..4].copy_from_slice(b"NOPE");
        match decode(&bad) {
            Err(MapFileError::InvalidMagic) => {}
            other => panic!("expected InvalidMagic, got {other:?}"),
        }
    }

    #[test]
    fn test_unsupported_version() {
        let mut header = MapHeader::zeroed();
        header.magic = MAP_MAGIC;
        header.version = 99u32.to_le();
        match decode(bytemuck::bytes_of(&header)) {
            Err(MapFileError::UnsupportedVersion(99)) => {}
            other => panic!("expected UnsupportedVersion(99), got {other:?}"),
        }
    }

    #[test]
    fn test_truncated() {
        let data = encode_map(&sample_map());
        match decode(&data[..10]) {
            Err(MapFileError::Truncated { expected: 16, found: 10 }) => {}
            other => panic!("expected Truncated header, got {other:?}"),
        }
        match decode(&data[..data.len() - 1]) {
            Err(MapFileError::Truncated { .. }) => {}
            other => panic!("expected Truncated body, got {other:?}"),
        }
    }

    #[test]
    fn test_huge_dimensions_rejected_without_overflow() {
        let header = MapHeader::new(u32::MAX, u32::MAX);
        match decode(bytemuck::bytes_of(&header)) {
            Err(MapFileError::Truncated { found: 16, .. }) => {}
            other => panic!("expected Truncated, got {other:?}"),
        }

        let header = MapHeader::new(u32::MAX, 0);
        match decode(bytemuck::bytes_of(&header)) {
            Err(MapFileError::Truncated { found: 16, .. }) => {}
            other => panic!("expected Truncated, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_object_code_rejected() {
        let mut data = encode_map(&sample_map());
        let last = data.len() - 1;
        data[last] = 250;
        match decode(&data) {
            Err(MapFileError::Terrain(_)) => {}
            other => panic!("expected Terrain error, got {other:?}"),
        }
    }
}
