//! Object Layer
//!
//! One placeable decoration per terrain cell, stored as small integer codes
//! into an [`ObjectCatalog`]. Code 0 is always "no object".

use crate::error::{TerrainError, TerrainResult};

/// Ordered list of external asset identifiers, indexed by object code.
///
/// Index 0 is reserved for "no object"; the core only ever stores the codes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectCatalog {
    kinds: Vec<String>,
}

impl Default for ObjectCatalog {
    fn default() -> Self {
        Self::new(["rock", "boulder", "crystal", "habitat", "antenna", "solar_panel"])
    }
}

impl ObjectCatalog {
    /// Build a catalog from the placeable kinds; the "none" entry is prepended.
    pub fn new<I, S>(kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut all = vec![String::from("none")];
        all.extend(kinds.into_iter().map(Into::into));
        Self { kinds: all }
    }

    /// Parse a JSON array of asset identifiers, e.g. `["rock", "crystal"]`.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let kinds: Vec<String> = serde_json::from_str(json)?;
        Ok(Self::new(kinds))
    }

    /// Number of codes, including the reserved 0.
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Always false: the "none" entry is present in every catalog.
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Asset identifier for `object_id`; `None` for 0 and unknown codes.
    pub fn asset(&self, object_id: u8) -> Option<&str> {
        match object_id {
            0 => None,
            id => self.kinds.get(id as usize).map(String::as_str),
        }
    }

    /// Code for an asset identifier.
    pub fn id_of(&self, asset: &str) -> Option<u8> {
        self.kinds
            .iter()
            .skip(1)
            .position(|k| k == asset)
            .and_then(|p| u8::try_from(p + 1).ok())
    }

    pub fn contains(&self, object_id: u8) -> bool {
        (object_id as usize) < self.kinds.len()
    }
}

/// Per-cell object codes, `width * height` entries in row-major order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectLayer {
    width: u32,
    height: u32,
    kind_count: usize,
    objects: Vec<u8>,
}

impl ObjectLayer {
    /// Empty layer for a `width x height` cell grid accepting codes below
    /// `catalog.len()`.
    pub fn new(width: u32, height: u32, catalog: &ObjectCatalog) -> Self {
        Self {
            width,
            height,
            kind_count: catalog.len(),
            objects: vec![0; width as usize * height as usize],
        }
    }

    /// Rebuild a layer from a row-major code array, validating every code.
    pub fn from_objects(
        width: u32,
        height: u32,
        catalog: &ObjectCatalog,
        objects: Vec<u8>,
    ) -> TerrainResult<Self> {
        let expected = width as usize * height as usize;
        if objects.len() != expected {
            return Err(TerrainError::invalid_argument(format!(
                "object layer holds {} cells, expected {expected}",
                objects.len()
            )));
        }
        if let Some(&bad) = objects.iter().find(|&&id| !catalog.contains(id)) {
            return Err(unknown_kind(bad, catalog.len()));
        }
        Ok(Self {
            width,
            height,
            kind_count: catalog.len(),
            objects,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major object codes.
    pub fn objects(&self) -> &[u8] {
        &self.objects
    }

    /// Overwrite cell `(row, column)` with `object_id`. Last write wins; no
    /// occupancy check happens here.
    pub fn set_object(&mut self, row: u32, column: u32, object_id: u8) -> TerrainResult<()> {
        if object_id as usize >= self.kind_count {
            return Err(unknown_kind(object_id, self.kind_count));
        }
        let idx = self.index(row, column);
        self.objects[idx] = object_id;
        Ok(())
    }

    /// Object code at cell `(row, column)`. Panics outside the grid.
    pub fn object_id(&self, row: u32, column: u32) -> u8 {
        self.objects[self.index(row, column)]
    }

    pub fn clear(&mut self, row: u32, column: u32) {
        let idx = self.index(row, column);
        self.objects[idx] = 0;
    }

    /// Number of cells holding an object.
    pub fn occupied_count(&self) -> usize {
        self.objects.iter().filter(|&&id| id != 0).count()
    }

    fn index(&self, row: u32, column: u32) -> usize {
        row as usize * self.width as usize + column as usize
    }
}

fn unknown_kind(object_id: u8, kind_count: usize) -> TerrainError {
    TerrainError::invalid_argument(format!(
        "object code {object_id} is outside the catalog of {kind_count} kinds"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_reserves_none() {
        let catalog = ObjectCatalog::default();
        assert_eq!(catalog.asset(0), None);
        assert_eq!(catalog.asset(1), Some("rock"));
        assert_eq!(catalog.id_of("crystal"), Some(3));
        assert_eq!(catalog.id_of("none"), None);
        assert!(catalog.contains(6));
        assert!(!catalog.contains(7));
    }

    #[test]
    fn test_catalog_from_json() {
        let catalog = ObjectCatalog::from_json_str(r#"["lander", "flag"]"#).unwrap();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.asset(2), Some("flag"));
    }

    #[test]
    fn test_set_object_last_write_wins() {
        let catalog = ObjectCatalog::default();
        let mut layer = ObjectLayer::new(4, 3, &catalog);

        layer.set_object(2, 3, 1).unwrap();
        layer.set_object(2, 3, 4).unwrap();

        assert_eq!(layer.object_id(2, 3), 4);
        assert_eq!(layer.objects()[2 * 4 + 3], 4);
        assert_eq!(layer.occupied_count(), 1);
    }

    #[test]
    fn test_set_object_rejects_unknown_code() {
        let catalog = ObjectCatalog::new(["rock"]);
        let mut layer = ObjectLayer::new(2, 2, &catalog);

        match layer.set_object(0, 0, 2) {
            Err(TerrainError::InvalidArgument(msg)) => assert!(msg.contains("code 2")),
            other => panic!("expected InvalidArgument, got {other:?}"),
        }
        assert_eq!(layer.object_id(0, 0), 0);
    }

    #[test]
    fn test_from_objects_validates_codes_and_length() {
        let catalog = ObjectCatalog::new(["rock"]);
        assert!(ObjectLayer::from_objects(2, 1, &catalog, vec![0, 1]).is_ok());
        assert!(ObjectLayer::from_objects(2, 1, &catalog, vec![0, 9]).is_err());
        assert!(ObjectLayer::from_objects(2, 1, &catalog, vec![0]).is_err());
    }
}
