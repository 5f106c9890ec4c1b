use serde::{Deserialize, Serialize};

use crate::geo::distance::distance_meters;
use crate::geo::radius::{is_within_radius, validate_radius};
use crate::geo::GeoError;
use crate::GeoPoint;

pub const MIN_CAPSULE_RADIUS_M: f64 = 10.0;
pub const MAX_CAPSULE_RADIUS_M: f64 = 200.0;
pub const DEFAULT_CAPSULE_RADIUS_M: f64 = 50.0;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Text,
    Image,
    Audio,
    Video,
    Link,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CapsuleContent {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: ContentKind,
    pub value: String,
    #[serde(default)]
    pub caption: Option<String>,
}

/// A location-tagged note that opens once a visitor is within `radius_m`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Capsule {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Epoch seconds.
    pub created_at: u64,
    #[serde(default)]
    pub expires_at: Option<u64>,
    pub location: GeoPoint,
    pub radius_m: f64,
    pub content: Vec<CapsuleContent>,
    pub created_by: String,
    pub is_public: bool,
    pub tags: Vec<String>,
}

impl Capsule {
    pub fn distance_from(&self, user: &GeoPoint) -> f64 {
        distance_meters(user, &self.location)
    }

    pub fn is_unlocked_for(&self, user: &GeoPoint) -> Result<bool, GeoError> {
        is_within_radius(user, &self.location, self.radius_m)
    }

    pub fn is_expired(&self, now: u64) -> bool {
        self.expires_at.is_some_and(|expires_at| now >= expires_at)
    }
}

/// What a visitor fills in before dropping a capsule at their location.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CapsuleDraft {
    pub title: String,
    pub description: String,
    pub radius_m: f64,
    /// Free text appended as a trailing text item unless blank.
    pub text: String,
    pub content: Vec<CapsuleContent>,
}

impl Default for CapsuleDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            radius_m: DEFAULT_CAPSULE_RADIUS_M,
            text: String::new(),
            content: Vec::new(),
        }
    }
}

impl CapsuleDraft {
    pub fn into_capsule(
        self,
        id: impl Into<String>,
        location: GeoPoint,
        created_by: impl Into<String>,
        now: u64,
    ) -> Result<Capsule, GeoError> {
        if self.title.trim().is_empty() {
            return Err(GeoError::InvalidCapsule("title must not be blank".into()));
        }
        let radius_m = validate_radius(self.radius_m)?;
        if !(MIN_CAPSULE_RADIUS_M..=MAX_CAPSULE_RADIUS_M).contains(&radius_m) {
            return Err(GeoError::InvalidCapsule(format!(
                "radius {radius_m} m outside {MIN_CAPSULE_RADIUS_M}..={MAX_CAPSULE_RADIUS_M} m"
            )));
        }

        let id = id.into();
        let mut content = self.content;
        if !self.text.trim().is_empty() {
            content.push(CapsuleContent {
                id: format!("{id}-text"),
                kind: ContentKind::Text,
                value: self.text,
                caption: None,
            });
        }
        if content.is_empty() {
            return Err(GeoError::InvalidCapsule(
                "capsule needs text or at least one content item".into(),
            ));
        }

        Ok(Capsule {
            id,
            title: self.title,
            description: self.description,
            created_at: now,
            expires_at: None,
            location,
            radius_m,
            content,
            created_by: created_by.into(),
            is_public: true,
            tags: Vec::new(),
        })
    }
}
