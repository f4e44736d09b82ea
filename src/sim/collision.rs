//! Collision detection
//!
//! One policy everywhere: the avatar is an axis-aligned rectangle shrunk by
//! the hitbox inset on every side. The same hitbox is tested against the
//! playfield edges and against every obstacle.

use glam::Vec2;

use super::state::{Avatar, CollisionCause, Obstacle, Playfield};

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Rect {
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        let half = size / 2.0;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Shrink by `amount` on every side
    pub fn inset(self, amount: f32) -> Self {
        Self {
            min: self.min + Vec2::splat(amount),
            max: self.max - Vec2::splat(amount),
        }
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.min.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.max.y
    }

    /// Strict overlap on the x axis (touching edges do not overlap)
    #[inline]
    pub fn overlaps_x(&self, left: f32, right: f32) -> bool {
        self.max.x > left && self.min.x < right
    }
}

/// The avatar's collision rectangle
pub fn avatar_hitbox(avatar: &Avatar, inset: f32) -> Rect {
    Rect::from_center(avatar.pos, avatar.size).inset(inset)
}

/// Check whether the hitbox has left the playfield vertically
pub fn boundary_hit(hitbox: &Rect, playfield: &Playfield) -> Option<CollisionCause> {
    if hitbox.top() < 0.0 {
        Some(CollisionCause::Ceiling)
    } else if hitbox.bottom() > playfield.height {
        Some(CollisionCause::Ground)
    } else {
        None
    }
}

/// Check the hitbox against one obstacle
///
/// Only obstacles overlapping the hitbox horizontally can hit; those hit
/// unless the hitbox lies entirely inside the gap band.
pub fn obstacle_hit(hitbox: &Rect, obstacle: &Obstacle, obstacle_width: f32) -> bool {
    hitbox.overlaps_x(obstacle.x, obstacle.right(obstacle_width))
        && (hitbox.top() < obstacle.gap_top || hitbox.bottom() > obstacle.gap_bottom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;

    fn avatar_at(y: f32) -> Avatar {
        let mut avatar = Avatar::centered(&Tuning::default(), &Playfield::new(480.0, 640.0));
        avatar.pos.y = y;
        avatar
    }

    fn obstacle(x: f32, gap_top: f32, gap_bottom: f32) -> Obstacle {
        Obstacle {
            id: 3,
            x,
            gap_top,
            gap_bottom,
            scored: false,
        }
    }

    #[test]
    fn test_hitbox_is_inset() {
        // 50x40 sprite at (100, 300) with a 5 inset -> 40x30 box
        let hitbox = avatar_hitbox(&avatar_at(300.0), 5.0);
        assert_eq!(hitbox.min, Vec2::new(80.0, 285.0));
        assert_eq!(hitbox.max, Vec2::new(120.0, 315.0));
    }

    #[test]
    fn test_boundary() {
        let playfield = Playfield::new(480.0, 640.0);
        assert_eq!(boundary_hit(&avatar_hitbox(&avatar_at(320.0), 5.0), &playfield), None);
        // Bottom of hitbox at 641
        assert_eq!(
            boundary_hit(&avatar_hitbox(&avatar_at(626.0), 5.0), &playfield),
            Some(CollisionCause::Ground)
        );
        // Top of hitbox at -1
        assert_eq!(
            boundary_hit(&avatar_hitbox(&avatar_at(14.0), 5.0), &playfield),
            Some(CollisionCause::Ceiling)
        );
        // Sprite pokes past the edge but the inset hitbox does not
        assert_eq!(boundary_hit(&avatar_hitbox(&avatar_at(622.0), 5.0), &playfield), None);
    }

    #[test]
    fn test_inside_gap_is_safe() {
        let hitbox = avatar_hitbox(&avatar_at(300.0), 5.0);
        assert!(!obstacle_hit(&hitbox, &obstacle(90.0, 250.0, 430.0), 60.0));
    }

    #[test]
    fn test_outside_gap_hits() {
        let hitbox = avatar_hitbox(&avatar_at(300.0), 5.0);
        // Top of hitbox (285) above gap top (290)
        assert!(obstacle_hit(&hitbox, &obstacle(90.0, 290.0, 470.0), 60.0));
        // Bottom of hitbox (315) below gap bottom (310)
        assert!(obstacle_hit(&hitbox, &obstacle(90.0, 130.0, 310.0), 60.0));
    }

    #[test]
    fn test_no_horizontal_overlap_no_hit() {
        let hitbox = avatar_hitbox(&avatar_at(300.0), 5.0);
        // Obstacle starts exactly at the hitbox's right edge
        assert!(!obstacle_hit(&hitbox, &obstacle(120.0, 0.0, 10.0), 60.0));
        // Obstacle ends exactly at the hitbox's left edge
        assert!(!obstacle_hit(&hitbox, &obstacle(20.0, 0.0, 10.0), 60.0));
        // One unit of overlap
        assert!(obstacle_hit(&hitbox, &obstacle(119.0, 0.0, 10.0), 60.0));
    }

    #[test]
    fn test_forgiving_margin() {
        // Sprite overlaps the gap edge by 4, within the inset
        let hitbox = avatar_hitbox(&avatar_at(300.0), 5.0);
        assert!(!obstacle_hit(&hitbox, &obstacle(90.0, 284.0, 464.0), 60.0));
    }
}
