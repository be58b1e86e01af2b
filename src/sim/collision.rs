//! Overlap tests for axis-aligned boxes
//!
//! Everything in the world is an axis-aligned rectangle, so collision
//! detection reduces to interval overlap on both axes.

use glam::Vec2;

use crate::consts::OFFSCREEN_MARGIN;
use crate::sim::state::{Cup, FallingObject};

/// Axis-aligned bounding-box overlap test. Touching edges do not count.
#[inline]
pub fn aabb_overlap(a_pos: Vec2, a_size: Vec2, b_pos: Vec2, b_size: Vec2) -> bool {
    a_pos.x < b_pos.x + b_size.x
        && a_pos.x + a_size.x > b_pos.x
        && a_pos.y < b_pos.y + b_size.y
        && a_pos.y + a_size.y > b_pos.y
}

/// Does a falling object overlap the cup this tick?
#[inline]
pub fn hits_cup(object: &FallingObject, cup: &Cup) -> bool {
    aabb_overlap(object.pos, object.size, cup.pos, cup.size)
}

/// Has the object fallen past the visible area (plus recycle margin)?
#[inline]
pub fn past_bottom(object: &FallingObject, surface_height: f32) -> bool {
    object.pos.y > surface_height + OFFSCREEN_MARGIN
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::ObjectKind;

    fn object_at(x: f32, y: f32) -> FallingObject {
        FallingObject {
            pos: Vec2::new(x, y),
            vel: Vec2::ZERO,
            size: Vec2::new(64.0, 64.0),
            kind: ObjectKind::Snack,
        }
    }

    fn cup_at(x: f32, y: f32) -> Cup {
        Cup {
            pos: Vec2::new(x, y),
            size: Vec2::new(128.0, 160.0),
        }
    }

    #[test]
    fn test_overlap_hit() {
        let obj = object_at(100.0, 450.0);
        let cup = cup_at(80.0, 420.0);
        assert!(hits_cup(&obj, &cup));
    }

    #[test]
    fn test_overlap_miss_horizontal() {
        let obj = object_at(300.0, 450.0);
        let cup = cup_at(80.0, 420.0);
        assert!(!hits_cup(&obj, &cup));
    }

    #[test]
    fn test_touching_edges_do_not_hit() {
        // Object's right edge exactly at the cup's left edge
        let obj = object_at(16.0, 450.0);
        let cup = cup_at(80.0, 420.0);
        assert!(!hits_cup(&obj, &cup));
    }

    #[test]
    fn test_one_pixel_overlap_hits() {
        let obj = object_at(17.0, 450.0);
        let cup = cup_at(80.0, 420.0);
        assert!(hits_cup(&obj, &cup));
    }

    #[test]
    fn test_past_bottom_boundary() {
        let height = 600.0;
        assert!(!past_bottom(&object_at(0.0, 600.0), height));
        assert!(!past_bottom(&object_at(0.0, 700.0), height));
        assert!(past_bottom(&object_at(0.0, 700.1), height));
    }
}
