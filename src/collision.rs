//! Collision queries between entity groups.
//!
//! The resolver only reports overlaps.  Deciding what a hit means (points,
//! damage, deactivation) is the caller's job.

use std::collections::BTreeMap;

use crate::entities::{Entity, EntityId, Rect};

/// For every active member of `group_a`, the ids of the active members of
/// `group_b` whose bounds overlap it, in `group_b` iteration order.
/// Members of `group_a` with no overlaps are left out of the map.
pub fn group_collisions<'a, 'b, A, B>(
    group_a: impl IntoIterator<Item = &'a A>,
    group_b: impl IntoIterator<Item = &'b B>,
) -> BTreeMap<EntityId, Vec<EntityId>>
where
    A: Entity + 'a,
    B: Entity + 'b,
{
    let targets: Vec<(EntityId, Rect)> = group_b
        .into_iter()
        .filter(|b| b.is_active())
        .map(|b| (b.id(), b.bounds()))
        .collect();

    let mut hits = BTreeMap::new();
    for a in group_a.into_iter().filter(|a| a.is_active()) {
        let bounds = a.bounds();
        let overlapping: Vec<EntityId> = targets
            .iter()
            .filter(|(_, rect)| bounds.intersects(rect))
            .map(|(id, _)| *id)
            .collect();
        if !overlapping.is_empty() {
            hits.insert(a.id(), overlapping);
        }
    }
    hits
}

/// Active members of `group` overlapping a single entity.
pub fn collisions_with<'b, A, B>(entity: &A, group: impl IntoIterator<Item = &'b B>) -> Vec<EntityId>
where
    A: Entity,
    B: Entity + 'b,
{
    group_collisions(std::iter::once(entity), group)
        .remove(&entity.id())
        .unwrap_or_default()
}

/// True once `rect` has left a `width`×`height` playfield by more than `margin`
/// on any side.
pub fn is_out_of_bounds(rect: &Rect, width: f32, height: f32, margin: f32) -> bool {
    rect.right() < -margin
        || rect.left() > width + margin
        || rect.bottom() < -margin
        || rect.top() > height + margin
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_edges_do_not_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let right = Rect::new(10.0, 0.0, 10.0, 10.0);
        let below = Rect::new(0.0, 10.0, 10.0, 10.0);
        assert!(!a.intersects(&right));
        assert!(!a.intersects(&below));
        assert!(a.intersects(&Rect::new(9.5, 9.5, 10.0, 10.0)));
    }

    #[test]
    fn overlap_test_is_symmetric() {
        let a = Rect::new(3.0, 4.0, 10.0, 2.0);
        let b = Rect::new(12.0, 5.0, 1.0, 1.0);
        assert_eq!(a.intersects(&b), b.intersects(&a));
        let c = Rect::new(13.0, 5.0, 1.0, 1.0);
        assert_eq!(a.intersects(&c), c.intersects(&a));
    }

    #[test]
    fn zero_area_rect_never_overlaps() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let dot = Rect::new(5.0, 5.0, 0.0, 0.0);
        assert!(!a.intersects(&dot));
    }

    #[test]
    fn out_of_bounds_respects_margin() {
        let r = Rect::new(0.0, -60.0, 10.0, 10.0); // bottom at -50
        assert!(!is_out_of_bounds(&r, 100.0, 100.0, 50.0));
        assert!(is_out_of_bounds(&r, 100.0, 100.0, 49.0));
        let low = Rect::new(0.0, 151.0, 10.0, 10.0);
        assert!(is_out_of_bounds(&low, 100.0, 100.0, 50.0));
    }
}
