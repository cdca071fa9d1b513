//! Error Types
//!
//! Terrain editing itself never fails: out-of-range edits are silent no-ops
//! and a raycast miss is `None`. Only object placement and map file I/O
//! surface errors to the caller.

/// Errors raised by object placement and terrain construction.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TerrainError {
    /// An object code outside the catalog, or mismatched layer dimensions.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Cell coordinates outside the `width x height` cell grid.
    #[error("cell ({row}, {column}) is outside the map")]
    CellOutOfBounds { row: i32, column: i32 },

    /// Objects can only stand on cells whose four corners share an elevation.
    #[error("cell ({row}, {column}) is not flat")]
    CellNotFlat { row: i32, column: i32 },

    /// The cell already holds an object.
    #[error("cell ({row}, {column}) is occupied by object {object_id}")]
    CellOccupied {
        row: i32,
        column: i32,
        object_id: u8,
    },
}

impl TerrainError {
    pub fn invalid_argument<T: ToString>(msg: T) -> Self {
        TerrainError::InvalidArgument(msg.to_string())
    }
}

/// Errors that can occur during map file save/load.
#[derive(thiserror::Error, Debug)]
pub enum MapFileError {
    /// Data ended before the header or one of the arrays was complete.
    #[error("map file truncated: expected {expected} bytes, found {found}")]
    Truncated { expected: usize, found: usize },

    /// Magic bytes do not match `b"HMAP"`.
    #[error("invalid magic bytes (expected HMAP)")]
    InvalidMagic,

    /// File version is not supported.
    #[error("unsupported map file version: {0}")]
    UnsupportedVersion(u32),

    /// Decoded contents were rejected by the terrain model.
    #[error("invalid map contents: {0}")]
    Terrain(#[from] TerrainError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias for placement and construction.
pub type TerrainResult<T> = Result<T, TerrainError>;
