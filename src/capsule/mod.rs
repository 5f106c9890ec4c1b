pub mod catalog;
pub mod mock;
pub mod model;

use std::time::{SystemTime, UNIX_EPOCH};

pub use catalog::{CapsuleCatalog, CapsuleHit};
pub use model::{Capsule, CapsuleContent, CapsuleDraft, ContentKind};

/// Seconds since the Unix epoch, or 0 if the clock is before it.
pub fn current_epoch_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
