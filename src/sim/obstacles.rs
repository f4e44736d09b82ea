//! Obstacle spawning, travel, recycling and scoring
//!
//! Obstacles move leftward in spawn order, so the live list is always sorted
//! by `x` and the last entry is the newest. Scored obstacles stay live until
//! their right edge leaves the playfield.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::difficulty::Difficulty;
use super::state::{Obstacle, Playfield, RngState};
use crate::tuning::Tuning;

/// The live obstacle set
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObstacleCourse {
    obstacles: Vec<Obstacle>,
    next_id: u32,
}

impl ObstacleCourse {
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub(crate) fn obstacles_mut(&mut self) -> &mut [Obstacle] {
        &mut self.obstacles
    }

    pub fn len(&self) -> usize {
        self.obstacles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obstacles.is_empty()
    }

    /// Newest (rightmost) obstacle
    pub fn last(&self) -> Option<&Obstacle> {
        self.obstacles.last()
    }

    pub fn get(&self, id: u32) -> Option<&Obstacle> {
        self.obstacles.iter().find(|o| o.id == id)
    }

    /// Drop every obstacle and restart id allocation
    pub fn clear(&mut self) {
        self.obstacles.clear();
        self.next_id = 0;
    }

    /// Where the next obstacle goes: one spacing past the newest obstacle,
    /// or the lead distance ahead of the avatar on an empty course
    pub fn next_spawn_x(&self, tuning: &Tuning, difficulty: &Difficulty) -> f32 {
        match self.last() {
            Some(last) => last.x + difficulty.spacing,
            None => tuning.avatar_x + tuning.lead_distance,
        }
    }

    /// Append one obstacle with a randomly placed gap
    pub fn spawn_next<R: Rng>(
        &mut self,
        tuning: &Tuning,
        playfield: &Playfield,
        difficulty: &Difficulty,
        rng: &mut R,
    ) -> &Obstacle {
        let x = self.next_spawn_x(tuning, difficulty);
        let (gap_top, gap_bottom) = place_gap(playfield, tuning.gap_margin, difficulty.gap_size, rng);
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        self.obstacles.push(Obstacle {
            id,
            x,
            gap_top,
            gap_bottom,
            scored: false,
        });
        &self.obstacles[self.obstacles.len() - 1]
    }

    /// Move every obstacle left by `dx`
    pub fn advance(&mut self, dx: f32) {
        for obstacle in &mut self.obstacles {
            obstacle.x -= dx;
        }
    }

    /// Remove obstacles whose right edge has left the playfield.
    /// Returns how many were removed.
    pub fn recycle(&mut self, obstacle_width: f32) -> usize {
        let before = self.obstacles.len();
        self.obstacles.retain(|o| o.right(obstacle_width) > 0.0);
        before - self.obstacles.len()
    }

    /// The single spawn trigger: spawn when the course is empty or the
    /// newest obstacle is at least one spacing in from the right edge.
    /// Returns the new obstacle's id.
    pub fn maybe_spawn(
        &mut self,
        tuning: &Tuning,
        playfield: &Playfield,
        difficulty: &Difficulty,
        rng_state: &mut RngState,
    ) -> Option<u32> {
        let due = match self.last() {
            Some(last) => playfield.width - last.x >= difficulty.spacing,
            None => true,
        };
        if !due {
            return None;
        }
        let mut rng = rng_state.next_rng();
        Some(self.spawn_next(tuning, playfield, difficulty, &mut rng).id)
    }
}

/// Choose a gap band for a new obstacle
///
/// The top is drawn from `[margin, height/2 + margin]` and then clamped so the
/// band stays at least `margin` away from both edges whenever it fits.
///
/// `gap_top` lands on a whole unit so `gap_bottom - gap_top` is exactly
/// `gap_size` in `f32`.
pub fn place_gap<R: Rng>(playfield: &Playfield, margin: f32, gap_size: f32, rng: &mut R) -> (f32, f32) {
    let upper = playfield.height / 2.0 + margin;
    let raw = if upper > margin {
        rng.random_range(margin..=upper)
    } else {
        margin
    };
    let min_top = margin.ceil();
    let max_top = (playfield.height - margin - gap_size)
        .max(margin)
        .floor()
        .max(min_top);
    let gap_top = raw.round().clamp(min_top, max_top);
    (gap_top, gap_top + gap_size)
}

/// Mark an obstacle scored once its right edge is behind `avatar_x`.
/// Returns true only on the tick it becomes scored.
pub fn score_if_passed(obstacle: &mut Obstacle, avatar_x: f32, obstacle_width: f32) -> bool {
    if !obstacle.scored && obstacle.right(obstacle_width) < avatar_x {
        obstacle.scored = true;
        return true;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::difficulty::{Tier, difficulty_for};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn rng() -> Pcg32 {
        Pcg32::seed_from_u64(99)
    }

    #[test]
    fn test_first_spawn_uses_lead_distance() {
        let tuning = Tuning::default();
        let mut course = ObstacleCourse::default();
        let o = course.spawn_next(&tuning, &Playfield::default(), &difficulty_for(0), &mut rng());
        assert_eq!(o.x, tuning.avatar_x + tuning.lead_distance);
        assert_eq!(o.id, 0);
    }

    #[test]
    fn test_next_spawn_follows_spacing() {
        let tuning = Tuning::default();
        let mut course = ObstacleCourse::default();
        let mut rng = rng();
        let easy = difficulty_for(0);
        let hard = Tier::Hard.params();
        let first_x = course.spawn_next(&tuning, &Playfield::default(), &easy, &mut rng).x;
        let second = course.spawn_next(&tuning, &Playfield::default(), &hard, &mut rng);
        assert_eq!(second.x, first_x + hard.spacing);
        assert_eq!(second.id, 1);
    }

    #[test]
    fn test_gap_band_within_margins() {
        let playfield = Playfield::new(480.0, 640.0);
        let mut rng = rng();
        for _ in 0..500 {
            let (top, bottom) = place_gap(&playfield, 50.0, 180.0, &mut rng);
            assert!(top >= 50.0);
            assert!(top <= playfield.height / 2.0 + 50.0);
            assert!(bottom <= playfield.height - 50.0);
            assert_eq!(bottom - top, 180.0);
        }
    }

    #[test]
    fn test_gap_size_exact_on_fractional_playfield() {
        // Surface sizes in CSS pixels are often fractional
        let playfield = Playfield::new(377.5, 611.3);
        let mut rng = rng();
        for gap in [180.0, 160.0, 140.0] {
            for _ in 0..200 {
                let (top, bottom) = place_gap(&playfield, 50.0, gap, &mut rng);
                assert_eq!(top, top.round());
                assert_eq!(bottom - top, gap);
                assert!(bottom <= playfield.height - 50.0);
            }
        }
    }

    #[test]
    fn test_gap_clamped_on_short_playfield() {
        // 200 tall: the band cannot fit between margins, so it pins to the top margin
        let playfield = Playfield::new(480.0, 200.0);
        let mut rng = rng();
        for _ in 0..100 {
            let (top, bottom) = place_gap(&playfield, 50.0, 180.0, &mut rng);
            assert_eq!(top, 50.0);
            assert_eq!(bottom, 230.0);
        }
    }

    #[test]
    fn test_advance_and_recycle() {
        let tuning = Tuning::default();
        let mut course = ObstacleCourse::default();
        course.spawn_next(&tuning, &Playfield::default(), &difficulty_for(0), &mut rng());
        course.advance(300.0);
        assert_eq!(course.obstacles()[0].x, 0.0);
        assert_eq!(course.recycle(tuning.obstacle_width), 0);

        // Right edge exactly at zero is offscreen
        course.advance(tuning.obstacle_width);
        assert_eq!(course.recycle(tuning.obstacle_width), 1);
        assert!(course.is_empty());
    }

    #[test]
    fn test_maybe_spawn_respects_spacing() {
        let tuning = Tuning::default();
        let playfield = Playfield::new(480.0, 640.0);
        let easy = difficulty_for(0);
        let mut rng_state = RngState::new(5);
        let mut course = ObstacleCourse::default();

        // Empty course always spawns at the lead distance (x = 300)
        assert_eq!(course.maybe_spawn(&tuning, &playfield, &easy, &mut rng_state), Some(0));
        // 480 - 300 = 180 < 230: not yet
        assert_eq!(course.maybe_spawn(&tuning, &playfield, &easy, &mut rng_state), None);

        course.advance(50.0);
        // 480 - 250 = 230: due
        assert_eq!(course.maybe_spawn(&tuning, &playfield, &easy, &mut rng_state), Some(1));
        assert_eq!(course.last().map(|o| o.x), Some(250.0 + easy.spacing));
        assert_eq!(rng_state.stream, 2);
    }

    #[test]
    fn test_score_if_passed_once() {
        let mut obstacle = Obstacle {
            id: 0,
            x: 39.0,
            gap_top: 100.0,
            gap_bottom: 280.0,
            scored: false,
        };
        // Right edge at 99 is behind x = 100
        assert!(score_if_passed(&mut obstacle, 100.0, 60.0));
        assert!(obstacle.scored);
        assert!(!score_if_passed(&mut obstacle, 100.0, 60.0));
    }

    #[test]
    fn test_not_scored_until_fully_past() {
        let mut obstacle = Obstacle {
            id: 0,
            x: 40.0,
            gap_top: 100.0,
            gap_bottom: 280.0,
            scored: false,
        };
        // Right edge exactly at the avatar is not yet past
        assert!(!score_if_passed(&mut obstacle, 100.0, 60.0));
        assert!(!obstacle.scored);
    }
}
