//! Box collision response
//!
//! Detection is the plain slab test on tick-granularity world boxes
//! ([`AABB::intersects`]). Response pushes one box out of another along the
//! axis of least penetration.

use crate::foundation::math::Vec3;
use crate::scene::aabb::AABB;
use crate::scene::graph::{NodeRef, Scene, SceneError};

/// Minimum translation that moves `a` out of `b`
///
/// Zero when the boxes do not intersect. Ties between axes resolve to the
/// lowest axis (X before Y before Z).
pub fn collision_response(a: &AABB, b: &AABB) -> Vec3 {
    if !a.intersects(b) {
        return Vec3::zeros();
    }

    let mut best = Vec3::zeros();
    let mut best_depth = f32::INFINITY;
    for axis in 0..3 {
        let push_positive = b.max[axis] - a.min[axis];
        let push_negative = a.max[axis] - b.min[axis];
        let (depth, signed) = if push_positive < push_negative {
            (push_positive, push_positive)
        } else {
            (push_negative, -push_negative)
        };
        if depth < best_depth {
            best_depth = depth;
            best = Vec3::zeros();
            best[axis] = signed;
        }
    }
    best
}

/// Push `subject` out of every other node it overlaps
///
/// Boxes are the ones computed at the last tick, so every response is taken
/// against the subject's box as it was before this call. Returns the number
/// of contacts.
pub fn resolve_penetrations<'a>(
    scene: &mut Scene,
    subject: impl Into<NodeRef<'a>>,
) -> Result<usize, SceneError> {
    let subject = scene.resolve(subject.into())?;
    let subject_box = *scene
        .node(subject)
        .ok_or_else(|| SceneError::NodeNotFound(format!("{subject:?}")))?
        .aabb();

    let responses: Vec<Vec3> = scene
        .aabbs()
        .filter(|(key, aabb)| *key != subject && subject_box.intersects(aabb))
        .map(|(_, aabb)| collision_response(&subject_box, aabb))
        .collect();

    for response in &responses {
        scene.move_node(subject, *response)?;
    }
    if !responses.is_empty() {
        log::trace!("Resolved {} contacts for {:?}", responses.len(), subject);
    }
    Ok(responses.len())
}
