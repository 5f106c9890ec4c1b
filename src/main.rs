use std::env;

use lambda_runtime::{service_fn, Error, LambdaEvent};
use locus_engine::capsule::mock::{generate_mock_capsules, DEFAULT_DEMO_LOCATION};
use locus_engine::capsule::{current_epoch_seconds, CapsuleCatalog, CapsuleHit};
use locus_engine::data::read_catalog_from_file;
use locus_engine::geo::GeoError;
use locus_engine::{distance_meters, is_within_radius, random_point_in_radius, GeoPoint};
use log::{info, warn};
use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Names a capsule cache file to serve instead of the demo catalog.
const CACHE_PATH_VAR: &str = "LOCUS_CAPSULE_CACHE";
const DEMO_SEED: u64 = 0x10c5;
const DEMO_CAPSULES: usize = 12;

static CATALOG: Lazy<CapsuleCatalog> = Lazy::new(|| load_catalog(env::var(CACHE_PATH_VAR).ok()));

/// Reads the cache at `path`, falling back to the seeded demo catalog when no
/// path is given or the cache cannot be read.
fn load_catalog(path: Option<String>) -> CapsuleCatalog {
    if let Some(path) = path {
        match read_catalog_from_file(&path) {
            Ok(catalog) => {
                info!("Loaded {} capsules from {}", catalog.len(), path);
                return catalog;
            }
            Err(err) => {
                warn!("Failed to load capsule cache {}: {}; using demo capsules", path, err)
            }
        }
    }
    let mut rng = StdRng::seed_from_u64(DEMO_SEED);
    let now = current_epoch_seconds();
    match generate_mock_capsules(&DEFAULT_DEMO_LOCATION, DEMO_CAPSULES, now, &mut rng) {
        Ok(capsules) => CapsuleCatalog::new(capsules),
        Err(err) => {
            warn!("Failed to generate demo capsules: {}", err);
            CapsuleCatalog::new(Vec::new())
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum EngineRequest {
    Distance {
        from: GeoPoint,
        to: GeoPoint,
    },
    WithinRadius {
        user: GeoPoint,
        target: GeoPoint,
        radius_m: f64,
    },
    RandomPoint {
        center: GeoPoint,
        radius_m: f64,
        #[serde(default)]
        seed: Option<u64>,
    },
    Nearby {
        user: GeoPoint,
        radius_m: f64,
        count: usize,
    },
    Unlocked {
        user: GeoPoint,
    },
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum EngineResponse {
    Distance {
        meters: f64,
    },
    WithinRadius {
        within: bool,
        meters: f64,
    },
    RandomPoint {
        point: GeoPoint,
    },
    Nearby {
        capsules: Vec<CapsuleResult>,
    },
    Unlocked {
        capsules: Vec<CapsuleResult>,
    },
    Error {
        message: String,
    },
}

#[derive(Debug, Serialize)]
struct CapsuleResult {
    id: String,
    title: String,
    distance_m: f64,
}

fn capsule_results(catalog: &CapsuleCatalog, hits: Vec<CapsuleHit>) -> Vec<CapsuleResult> {
    hits.into_iter()
        .map(|hit| {
            let c = &catalog.capsules()[hit.index];
            CapsuleResult {
                id: c.id.clone(),
                title: c.title.clone(),
                distance_m: hit.distance_m,
            }
        })
        .collect()
}

fn respond(req: EngineRequest) -> Result<EngineResponse, GeoError> {
    match req {
        EngineRequest::Distance { from, to } => Ok(EngineResponse::Distance {
            meters: distance_meters(&from, &to),
        }),
        EngineRequest::WithinRadius { user, target, radius_m } => Ok(EngineResponse::WithinRadius {
            within: is_within_radius(&user, &target, radius_m)?,
            meters: distance_meters(&user, &target),
        }),
        EngineRequest::RandomPoint { center, radius_m, seed } => {
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };
            let point = random_point_in_radius(&center, radius_m, &mut rng)?;
            Ok(EngineResponse::RandomPoint { point })
        }
        EngineRequest::Nearby { user, radius_m, count } => {
            let catalog = &*CATALOG;
            let hits = catalog.nearest_within(&user, radius_m, count)?;
            Ok(EngineResponse::Nearby {
                capsules: capsule_results(catalog, hits),
            })
        }
        EngineRequest::Unlocked { user } => {
            let catalog = &*CATALOG;
            let hits = catalog.unlocked_for(&user, current_epoch_seconds());
            Ok(EngineResponse::Unlocked {
                capsules: capsule_results(catalog, hits),
            })
        }
    }
}

async fn handler(event: LambdaEvent<EngineRequest>) -> Result<EngineResponse, Error> {
    Ok(respond(event.payload).unwrap_or_else(|err| EngineResponse::Error {
        message: err.to_string(),
    }))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    let func = service_fn(handler);
    lambda_runtime::run(func).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use locus_engine::data::write_catalog_to_file;

    fn request(json: &str) -> EngineRequest {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn distance_request() {
        let req = request(
            r#"{"kind":"distance","from":{"lat":0.0,"lng":0.0},"to":{"lat":0.0,"lng":1.0}}"#,
        );
        match respond(req).unwrap() {
            EngineResponse::Distance { meters } => assert!((meters - 111_195.0).abs() < 1.0),
            other => panic!("unexpected response {other:?}"),
        }
    }

    #[test]
    fn bad_radius_is_an_error_response() {
        let req = request(
            r#"{"kind":"within_radius","user":{"lat":0.0,"lng":0.0},
                "target":{"lat":0.0,"lng":0.0},"radius_m":-1.0}"#,
        );
        assert!(matches!(respond(req), Err(GeoError::InvalidRadius(_))));
    }

    #[test]
    fn seeded_random_point_is_reproducible() {
        let json = r#"{"kind":"random_point","center":{"lat":10.0,"lng":10.0},
            "radius_m":250.0,"seed":7}"#;
        let a = serde_json::to_string(&respond(request(json)).unwrap()).unwrap();
        let b = serde_json::to_string(&respond(request(json)).unwrap()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn unlocked_at_a_demo_capsule_includes_it() {
        let spot = CATALOG.capsules()[0].location;
        match respond(EngineRequest::Unlocked { user: spot }).unwrap() {
            EngineResponse::Unlocked { capsules } => {
                assert!(capsules.iter().any(|c| c.id == "capsule-1"));
            }
            other => panic!("unexpected response {other:?}"),
        }
    }

    #[test]
    fn nearby_request_lists_demo_capsules_nearest_first() {
        let req = request(
            r#"{"kind":"nearby","user":{"lat":37.7749,"lng":-122.4194},
                "radius_m":1000.0,"count":5}"#,
        );
        let capsules = match respond(req).unwrap() {
            EngineResponse::Nearby { capsules } => capsules,
            other => panic!("unexpected response {other:?}"),
        };
        assert_eq!(capsules.len(), 5);
        assert!(capsules.iter().all(|c| CATALOG.get(&c.id).is_some()));
        assert!(capsules.windows(2).all(|w| w[0].distance_m <= w[1].distance_m));

        let all = respond(EngineRequest::Nearby {
            user: DEFAULT_DEMO_LOCATION,
            radius_m: 1_000.0,
            count: 100,
        })
        .unwrap();
        match all {
            EngineResponse::Nearby { capsules: all } => {
                assert_eq!(all.len(), CATALOG.len());
                let first: Vec<&str> = all.iter().take(5).map(|c| c.id.as_str()).collect();
                let truncated: Vec<&str> = capsules.iter().map(|c| c.id.as_str()).collect();
                assert_eq!(first, truncated);
            }
            other => panic!("unexpected response {other:?}"),
        }
    }

    #[test]
    fn load_catalog_reads_cache_file() {
        let mut rng = StdRng::seed_from_u64(3);
        let capsules = generate_mock_capsules(&DEFAULT_DEMO_LOCATION, 3, 0, &mut rng).unwrap();
        let file = tempfile::NamedTempFile::new().unwrap();
        write_catalog_to_file(&CapsuleCatalog::new(capsules), file.path()).unwrap();

        let catalog = load_catalog(Some(file.path().display().to_string()));
        assert_eq!(catalog.len(), 3);
        assert!(catalog.get("capsule-3").is_some());
    }

    #[test]
    fn load_catalog_falls_back_to_demo_capsules() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.bin");

        let catalog = load_catalog(Some(missing.display().to_string()));
        assert_eq!(catalog.len(), DEMO_CAPSULES);
        assert!(catalog.get("capsule-1").is_some());

        assert_eq!(load_catalog(None).len(), DEMO_CAPSULES);
    }
}
