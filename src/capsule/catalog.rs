use std::collections::HashMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::capsule::model::Capsule;
use crate::geo::radius::validate_radius;
use crate::geo::GeoError;
use crate::spatial::kd_tree::KDTree;
use crate::GeoPoint;

/// A capsule matched by a location query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CapsuleHit {
    pub index: usize,
    pub distance_m: f64,
}

/// In-memory set of capsules with an id index and a spatial index.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CapsuleCatalog {
    capsules: Vec<Capsule>,
    #[serde(skip)]
    id_index: HashMap<String, usize>,
    #[serde(skip)]
    tree: KDTree,
    #[serde(skip)]
    max_radius_m: f64,
}

impl CapsuleCatalog {
    /// Builds a catalog; when ids repeat, the later capsule wins.
    pub fn new(capsules: Vec<Capsule>) -> Self {
        let mut unique: Vec<Capsule> = Vec::with_capacity(capsules.len());
        let mut seen: HashMap<String, usize> = HashMap::new();
        for capsule in capsules {
            match seen.get(&capsule.id) {
                Some(&idx) => unique[idx] = capsule,
                None => {
                    seen.insert(capsule.id.clone(), unique.len());
                    unique.push(capsule);
                }
            }
        }

        let mut catalog = CapsuleCatalog {
            capsules: unique,
            id_index: HashMap::new(),
            tree: KDTree::default(),
            max_radius_m: 0.0,
        };
        catalog.rebuild_indices();
        catalog
    }

    pub fn len(&self) -> usize {
        self.capsules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.capsules.is_empty()
    }

    pub fn capsules(&self) -> &[Capsule] {
        &self.capsules
    }

    pub fn index_of_id(&self, id: &str) -> Option<usize> {
        self.id_index.get(id).copied()
    }

    pub fn get(&self, id: &str) -> Option<&Capsule> {
        self.index_of_id(id).map(|idx| &self.capsules[idx])
    }

    /// Adds a capsule, returning the one it replaced if the id was taken.
    pub fn insert(&mut self, capsule: Capsule) -> Option<Capsule> {
        let previous = match self.index_of_id(&capsule.id) {
            Some(idx) => Some(std::mem::replace(&mut self.capsules[idx], capsule)),
            None => {
                self.capsules.push(capsule);
                None
            }
        };
        self.rebuild_indices();
        previous
    }

    /// Up to `n` capsules within `radius_m` of `user`, nearest first.
    pub fn nearest_within(
        &self,
        user: &GeoPoint,
        radius_m: f64,
        n: usize,
    ) -> Result<Vec<CapsuleHit>, GeoError> {
        let radius_m = validate_radius(radius_m)?;
        Ok(self
            .tree
            .nearest_n_within_radius(user, radius_m, n)
            .into_iter()
            .map(|(index, distance_m)| CapsuleHit { index, distance_m })
            .collect())
    }

    /// Capsules whose own radius contains `user` and that have not expired
    /// at `now`, nearest first.
    pub fn unlocked_for(&self, user: &GeoPoint, now: u64) -> Vec<CapsuleHit> {
        if self.is_empty() {
            return Vec::new();
        }
        self.tree
            .nearest_n_within_radius(user, self.max_radius_m, usize::MAX)
            .into_iter()
            .filter(|&(idx, d)| {
                let capsule = &self.capsules[idx];
                d <= capsule.radius_m && !capsule.is_expired(now)
            })
            .map(|(index, distance_m)| CapsuleHit { index, distance_m })
            .collect()
    }

    pub fn rebuild_indices(&mut self) {
        self.id_index = self
            .capsules
            .iter()
            .enumerate()
            .map(|(idx, capsule)| (capsule.id.clone(), idx))
            .collect();
        let locations: Vec<GeoPoint> = self.capsules.iter().map(|c| c.location).collect();
        self.tree = KDTree::build(&locations);
        self.max_radius_m = self
            .capsules
            .iter()
            .map(|c| c.radius_m)
            .filter(|r| r.is_finite())
            .fold(0.0, f64::max);
        debug!(
            "indexed {} capsules (largest radius {} m)",
            self.capsules.len(),
            self.max_radius_m
        );
    }
}
