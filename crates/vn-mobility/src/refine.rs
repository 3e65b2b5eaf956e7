//! Splicing a refined path into the one being followed.

use vn_core::Vec3;

/// Turns shallower than this (degrees) count as "already heading the right
/// way" when picking the splice point.
pub const SPLICE_ANGLE_DEG: f32 = 10.0;

/// Build the path to follow after a refinement.
///
/// `refined` runs from (near) `pos` towards `new_target`.  The splice
/// point starts at the closest approach to `pos` (walking forward while
/// the distance does not grow), then moves to the first later point where
/// the direction from `pos` and the next refined segment differ by less
/// than [`SPLICE_ANGLE_DEG`].  The result is
/// `[pos] + refined[splice..last] + [new_target, last]`.
pub fn merge_refined(pos: Vec3, refined: &[Vec3], new_target: Vec3) -> Vec<Vec3> {
    let Some(&last) = refined.last() else {
        return vec![pos, new_target];
    };
    let n = refined.len();

    let mut start = 0;
    let mut best = pos.distance_squared(refined[0]);
    for (i, p) in refined.iter().enumerate().skip(1) {
        let d = pos.distance_squared(*p);
        if d > best {
            break;
        }
        best = d;
        start = i;
    }

    let shallow = SPLICE_ANGLE_DEG.to_radians();
    if let Some(i) = (start + 1..n.saturating_sub(1))
        .find(|&i| (refined[i] - pos).angle_between(refined[i + 1] - refined[i]) < shallow)
    {
        start = i;
    }

    let mut merged = Vec::with_capacity(n - start + 2);
    merged.push(pos);
    merged.extend_from_slice(&refined[start..n - 1]);
    merged.push(new_target);
    merged.push(last);
    merged
}
