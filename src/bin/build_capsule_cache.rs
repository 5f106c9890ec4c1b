use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use locus_engine::capsule::mock::{generate_mock_capsules, DEFAULT_DEMO_LOCATION, MOCK_SPREAD_M};
use locus_engine::capsule::{current_epoch_seconds, CapsuleCatalog};
use locus_engine::data::write_catalog_to_file;
use locus_engine::GeoPoint;
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

const DEFAULT_COUNT: usize = 25;

#[derive(Debug, Serialize)]
struct CacheMetadata {
    center: GeoPoint,
    spread_m: f64,
    capsules: usize,
    seed: Option<u64>,
    generated_at_epoch: u64,
}

/// Usage: build_capsule_cache [COUNT] [SEED]
fn main() -> Result<()> {
    env_logger::init();

    let mut args = env::args().skip(1);
    let count = match args.next() {
        Some(raw) => raw.parse().with_context(|| format!("invalid capsule count {raw:?}"))?,
        None => DEFAULT_COUNT,
    };
    let seed: Option<u64> = args
        .next()
        .map(|raw| raw.parse().with_context(|| format!("invalid seed {raw:?}")))
        .transpose()?;

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let now = current_epoch_seconds();
    let capsules = generate_mock_capsules(&DEFAULT_DEMO_LOCATION, count, now, &mut rng)
        .context("failed to generate demo capsules")?;
    let catalog = CapsuleCatalog::new(capsules);

    let output_dir = PathBuf::from("data");
    fs::create_dir_all(&output_dir).context("failed to create data output directory")?;
    let cache_path = output_dir.join("capsules.bin");
    write_catalog_to_file(&catalog, &cache_path)
        .with_context(|| format!("failed to write cache to {}", cache_path.display()))?;

    let metadata = CacheMetadata {
        center: DEFAULT_DEMO_LOCATION,
        spread_m: MOCK_SPREAD_M,
        capsules: catalog.len(),
        seed,
        generated_at_epoch: now,
    };
    let metadata_path = output_dir.join("capsules.meta.json");
    let metadata_json = serde_json::to_vec_pretty(&metadata)?;
    fs::write(&metadata_path, metadata_json)
        .with_context(|| format!("failed to write metadata to {}", metadata_path.display()))?;

    info!(
        "Wrote capsule cache to {} ({} capsules)",
        cache_path.display(),
        metadata.capsules
    );

    Ok(())
}
