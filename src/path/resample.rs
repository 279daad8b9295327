//! Arc-length resampling of polylines.

use crate::core::WorldPoint;

/// Total polyline length
pub fn path_length(path: &[WorldPoint]) -> f32 {
    if path.len() < 2 {
        return 0.0;
    }

    path.windows(2).map(|w| w[0].distance(&w[1])).sum()
}

/// Resample `path` to waypoints `spacing` apart along its arc length.
///
/// The first waypoint is kept, new points are interpolated at every multiple
/// of `spacing`, and the output always ends on the last input waypoint
/// (merged into the final sample when the two coincide).
///
/// Resampling an already resampled path at the same spacing reproduces it
/// exactly when every vertex of the input falls on a sample. Elsewhere the
/// chord across a bend is shorter than the arc it replaces, so later samples
/// shift along the path by a small fraction of `spacing` per bend.
///
/// Paths with fewer than two points, and non-positive spacing, are returned
/// unchanged.
pub fn normalize(path: &[WorldPoint], spacing: f32) -> Vec<WorldPoint> {
    if path.len() < 2 || !spacing.is_finite() || spacing <= 0.0 {
        return path.to_vec();
    }

    // Slack for float error in the accumulated arc length
    let eps = spacing * 1e-4;

    let mut result = vec![path[0]];
    let mut travelled = 0.0f32;
    // Sample k sits at k * spacing; computed per sample so error does not accumulate
    let mut k = 1u32;

    for w in path.windows(2) {
        let segment = w[0].distance(&w[1]);
        if segment <= 0.0 {
            continue;
        }

        loop {
            let target = k as f32 * spacing;
            if target > travelled + segment + eps {
                break;
            }
            let t = ((target - travelled) / segment).clamp(0.0, 1.0);
            result.push(w[0].lerp(&w[1], t));
            k += 1;
        }

        travelled += segment;
    }

    let Some(&end) = path.last() else {
        return result;
    };
    let n = result.len();
    match result.last_mut() {
        Some(last) if n > 1 && last.distance(&end) <= eps => *last = end,
        _ => result.push(end),
    }
    result
}
