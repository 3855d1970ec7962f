//! Distance helpers used to resolve "closest display to an actor".

use ordered_float::OrderedFloat;

use crate::types::Vec3;

/// Euclidean distance between two points.
#[must_use]
pub fn distance(a: Vec3, b: Vec3) -> f32 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    let dz = a.z - b.z;
    (dx * dx + dy * dy + dz * dz).sqrt()
}

/// Pick the candidate closest to `origin` that lies strictly within
/// `threshold` world units.
///
/// Returns the candidate's key together with its distance. Ties keep the
/// first candidate in iteration order.
pub fn nearest_within<K, I>(origin: Vec3, candidates: I, threshold: f32) -> Option<(K, f32)>
where
    I: IntoIterator<Item = (K, Vec3)>,
{
    candidates
        .into_iter()
        .map(|(key, position)| (key, distance(origin, position)))
        .filter(|(_, d)| *d < threshold)
        .min_by_key(|(_, d)| OrderedFloat(*d))
}
