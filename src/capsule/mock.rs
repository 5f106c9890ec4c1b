//! Demo capsules scattered around a center point.

use crate::capsule::model::{Capsule, CapsuleContent, ContentKind};
use crate::geo::sampler::{random_point_in_radius, RandomSource};
use crate::geo::GeoError;
use crate::GeoPoint;

/// Where the demo pretends the visitor is standing (San Francisco).
pub const DEFAULT_DEMO_LOCATION: GeoPoint = GeoPoint {
    latitude: 37.7749,
    longitude: -122.4194,
};

/// Demo capsules are placed within this distance of the center.
pub const MOCK_SPREAD_M: f64 = 500.0;

const MOCK_MAX_AGE_SECS: f64 = 30.0 * 24.0 * 60.0 * 60.0;

const DESCRIPTIONS: [&str; 5] = [
    "A memory waiting to be dug up.",
    "A snapshot of campus life.",
    "Notes from people who walked this path before you.",
    "A message left for whoever comes next.",
    "Reflections from an earlier term.",
];

const MESSAGES: [&str; 5] = [
    "People used to meet here the night before finals. Good luck on yours!",
    "There is a real capsule buried somewhere nearby. Look for the marker.",
    "The best coffee around is in the engineering building, not the main cafe.",
    "Stop for a minute and enjoy the view. It helped us during exam season.",
    "We were here through the lockdown. Strange times, but we made it.",
];

const AUTHORS: [&str; 5] = [
    "AlumniFromThe90s",
    "ClassOf2023",
    "CampusHistorian",
    "ProfessorEmeritus",
    "GraduateResearcher",
];

/// Generates `count` public capsules within [`MOCK_SPREAD_M`] of `center`,
/// each with a 20 to 99 m unlock radius and a creation time in the 30 days
/// before `now`.
pub fn generate_mock_capsules<R: RandomSource + ?Sized>(
    center: &GeoPoint,
    count: usize,
    now: u64,
    rng: &mut R,
) -> Result<Vec<Capsule>, GeoError> {
    let mut capsules = Vec::with_capacity(count);

    for i in 0..count {
        let location = random_point_in_radius(center, MOCK_SPREAD_M, rng)?;
        let age = (rng.next_unit()? * MOCK_MAX_AGE_SECS) as u64;
        let radius_m = 20.0 + (rng.next_unit()? * 80.0).floor();
        let n = i + 1;

        capsules.push(Capsule {
            id: format!("capsule-{n}"),
            title: format!("Time Capsule {n}"),
            description: DESCRIPTIONS[i % DESCRIPTIONS.len()].to_string(),
            created_at: now.saturating_sub(age),
            expires_at: None,
            location,
            radius_m,
            content: vec![
                CapsuleContent {
                    id: format!("content-{i}-1"),
                    kind: ContentKind::Text,
                    value: MESSAGES[i % MESSAGES.len()].to_string(),
                    caption: None,
                },
                CapsuleContent {
                    id: format!("content-{i}-2"),
                    kind: ContentKind::Image,
                    value: format!("https://picsum.photos/seed/capsule{i}/300/200"),
                    caption: Some("A memory from this location".to_string()),
                },
            ],
            created_by: AUTHORS[i % AUTHORS.len()].to_string(),
            is_public: true,
            tags: vec!["campus".into(), "history".into(), "student life".into()],
        });
    }

    Ok(capsules)
}
