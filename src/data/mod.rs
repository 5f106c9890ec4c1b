use std::fs;
use std::io::Cursor;
use std::path::Path;

use bincode::ErrorKind;
use log::debug;
use thiserror::Error;

use crate::capsule::catalog::CapsuleCatalog;
use crate::geo::radius::validate_radius;
use crate::geo::GeoError;

/// zstd level for cache snapshots; they are written rarely and read often.
pub const CACHE_COMPRESSION_LEVEL: i32 = 19;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("capsule cache I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("capsule cache encoding failed: {0}")]
    Serialize(#[from] Box<ErrorKind>),
    #[error("capsule cache is not a valid zstd frame: {0}")]
    Compression(#[source] std::io::Error),
    #[error("cached capsule {id} is invalid: {source}")]
    Invalid {
        id: String,
        #[source]
        source: GeoError,
    },
}

pub fn serialize_catalog(catalog: &CapsuleCatalog) -> Result<Vec<u8>, CacheError> {
    let encoded = bincode::serialize(catalog)?;
    let mut cursor = Cursor::new(encoded);
    zstd::stream::encode_all(&mut cursor, CACHE_COMPRESSION_LEVEL)
        .map_err(CacheError::Compression)
}

/// Decodes a snapshot and rebuilds the catalog's indices. Locations are
/// validated while decoding; radii are checked afterwards.
pub fn deserialize_catalog(bytes: &[u8]) -> Result<CapsuleCatalog, CacheError> {
    let mut cursor = Cursor::new(bytes);
    let decoded = zstd::stream::decode_all(&mut cursor).map_err(CacheError::Compression)?;
    let mut catalog: CapsuleCatalog = bincode::deserialize(&decoded)?;
    for capsule in catalog.capsules() {
        validate_radius(capsule.radius_m).map_err(|source| CacheError::Invalid {
            id: capsule.id.clone(),
            source,
        })?;
    }
    catalog.rebuild_indices();
    Ok(catalog)
}

pub fn write_catalog_to_file<P: AsRef<Path>>(
    catalog: &CapsuleCatalog,
    path: P,
) -> Result<(), CacheError> {
    let bytes = serialize_catalog(catalog)?;
    debug!("writing {} bytes to {}", bytes.len(), path.as_ref().display());
    fs::write(path, bytes)?;
    Ok(())
}

pub fn read_catalog_from_file<P: AsRef<Path>>(path: P) -> Result<CapsuleCatalog, CacheError> {
    let bytes = fs::read(&path)?;
    debug!("read {} bytes from {}", bytes.len(), path.as_ref().display());
    deserialize_catalog(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capsule::mock::{generate_mock_capsules, DEFAULT_DEMO_LOCATION};
    use crate::capsule::model::CapsuleDraft;
    use crate::GeoPoint;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn demo_catalog() -> CapsuleCatalog {
        let mut rng = StdRng::seed_from_u64(17);
        let capsules =
            generate_mock_capsules(&DEFAULT_DEMO_LOCATION, 8, 1_700_000_000, &mut rng).unwrap();
        CapsuleCatalog::new(capsules)
    }

    #[test]
    fn decoded_catalog_answers_queries() {
        let catalog = demo_catalog();
        let bytes = serialize_catalog(&catalog).unwrap();
        let restored = deserialize_catalog(&bytes).unwrap();

        assert_eq!(restored.capsules(), catalog.capsules());
        assert_eq!(restored.index_of_id("capsule-3"), Some(2));
        let spot = catalog.capsules()[4].location;
        assert_eq!(restored.unlocked_for(&spot, 0), catalog.unlocked_for(&spot, 0));
    }

    #[test]
    fn rejects_garbage() {
        let err = deserialize_catalog(b"not a zstd frame").unwrap_err();
        assert!(matches!(err, CacheError::Compression(_)));
        assert!(err.to_string().starts_with("capsule cache is not a valid zstd frame"));
    }

    #[test]
    fn rejects_negative_radius() {
        let mut capsule = CapsuleDraft {
            title: "bad".into(),
            text: "x".into(),
            ..CapsuleDraft::default()
        }
        .into_capsule("bad", GeoPoint::new(0.0, 0.0).unwrap(), "t", 0)
        .unwrap();
        capsule.radius_m = -5.0;
        let bytes = serialize_catalog(&CapsuleCatalog::new(vec![capsule])).unwrap();
        let err = deserialize_catalog(&bytes).unwrap_err();
        assert!(matches!(err, CacheError::Invalid { .. }));
        assert!(err.to_string().contains("cached capsule bad is invalid"));
    }

    #[test]
    fn file_round_trip() {
        let catalog = demo_catalog();
        let file = tempfile::NamedTempFile::new().unwrap();
        write_catalog_to_file(&catalog, file.path()).unwrap();
        let restored = read_catalog_from_file(file.path()).unwrap();
        assert_eq!(restored.len(), catalog.len());
    }
}
