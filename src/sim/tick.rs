//! Simulation tick
//!
//! Core game loop step. Only advances while Running; every other phase leaves
//! the state untouched.

use super::collision::{avatar_hitbox, boundary_hit, obstacle_hit};
use super::difficulty::difficulty_for;
use super::obstacles::score_if_passed;
use super::physics;
use super::state::{CollisionCause, GameEvent, GamePhase, GameState};
use crate::step_scale;

/// Advance the game state by `dt` seconds of elapsed time
///
/// Order within a tick:
/// 1. integrate the avatar
/// 2. derive difficulty from the current score
/// 3. move obstacles, then per obstacle check collision and scoring
/// 4. recycle offscreen obstacles
/// 5. spawn if due
/// 6. check the playfield boundary
pub fn tick(state: &mut GameState, dt: f32) {
    if state.phase != GamePhase::Running {
        return;
    }
    if !dt.is_finite() || dt <= 0.0 {
        return;
    }
    let scale = step_scale(dt);
    state.time_ticks += 1;

    // 1. Physics
    physics::integrate(&mut state.avatar, state.tuning.gravity, scale);

    // 2. Difficulty, so a threshold crossed last tick applies now
    let difficulty = difficulty_for(state.score);

    // 3. Obstacles
    let width = state.tuning.obstacle_width;
    let avatar_x = state.avatar.pos.x;
    let hitbox = avatar_hitbox(&state.avatar, state.tuning.hitbox_inset);
    state.course.advance(difficulty.speed * scale);

    let mut hit = None;
    let mut passed = 0u32;
    for obstacle in state.course.obstacles_mut() {
        if obstacle_hit(&hitbox, obstacle, width) {
            hit = Some(obstacle.id);
            break;
        }
        if score_if_passed(obstacle, avatar_x, width) {
            passed += 1;
        }
    }
    for _ in 0..passed {
        state.score += 1;
        let score = state.score;
        state.emit(GameEvent::Scored { score });
    }
    if let Some(id) = hit {
        state.end_run(CollisionCause::Obstacle { id });
        return;
    }

    // 4. Recycle
    state.course.recycle(width);

    // 5. Spawn
    state.course.maybe_spawn(
        &state.tuning,
        &state.playfield,
        &difficulty,
        &mut state.rng_state,
    );

    // 6. Boundary
    if let Some(cause) = boundary_hit(&hitbox, &state.playfield) {
        state.end_run(cause);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::machine::Command;

    fn running(seed: u64) -> GameState {
        let mut state = GameState::new(seed, 0);
        state.handle(Command::Start);
        state.drain_events();
        state
    }

    #[test]
    fn test_idle_and_game_over_do_not_tick() {
        let mut state = GameState::new(1, 0);
        tick(&mut state, REFERENCE_DT);
        assert_eq!(state.time_ticks, 0);
        assert!(state.course.is_empty());

        let mut state = running(1);
        state.end_run(CollisionCause::Ground);
        let y = state.avatar.pos.y;
        tick(&mut state, REFERENCE_DT);
        assert_eq!(state.avatar.pos.y, y);
    }

    #[test]
    fn test_first_tick() {
        let mut state = running(1);
        tick(&mut state, REFERENCE_DT);
        assert_eq!(state.time_ticks, 1);
        assert!((state.avatar.vel_y - GRAVITY).abs() < 1e-6);
        assert_eq!(state.course.obstacles()[0].x, AVATAR_X + LEAD_DISTANCE - 3.0);
        // 480 - 297 < 230: nothing due yet
        assert_eq!(state.course.len(), 1);

        // 17 more ticks bring the first obstacle to x = 246
        for _ in 0..17 {
            tick(&mut state, REFERENCE_DT);
        }
        assert_eq!(state.course.len(), 2);
        let first_x = state.course.obstacles()[0].x;
        assert_eq!(state.course.obstacles()[1].x, first_x + 230.0);
    }

    #[test]
    fn test_invalid_dt_is_noop() {
        let mut state = running(1);
        tick(&mut state, 0.0);
        tick(&mut state, -1.0);
        tick(&mut state, f32::NAN);
        assert_eq!(state.time_ticks, 0);
        assert_eq!(state.avatar.vel_y, 0.0);
    }

    #[test]
    fn test_falls_to_ground() {
        let mut state = running(1);
        let mut ticks = 0;
        while state.phase == GamePhase::Running && ticks < 1000 {
            tick(&mut state, REFERENCE_DT);
            ticks += 1;
        }
        assert_eq!(state.phase, GamePhase::GameOver);
        let events = state.drain_events();
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::Collided {
                cause: CollisionCause::Ground,
                ..
            }
        )));
    }

    #[test]
    fn test_scores_passing_obstacle() {
        let mut state = running(1);
        // Clear gap around the avatar and park the obstacle just ahead of passing
        {
            let obstacle = &mut state.course.obstacles_mut()[0];
            obstacle.x = AVATAR_X - OBSTACLE_WIDTH + 2.0;
            obstacle.gap_top = 0.0;
            obstacle.gap_bottom = DEFAULT_PLAYFIELD_HEIGHT;
        }
        tick(&mut state, REFERENCE_DT);
        assert_eq!(state.score, 1);
        assert!(state.course.obstacles()[0].scored);
        assert!(state.drain_events().contains(&GameEvent::Scored { score: 1 }));

        tick(&mut state, REFERENCE_DT);
        assert_eq!(state.score, 1);
    }

    #[test]
    fn test_obstacle_hit_ends_run() {
        let mut state = running(1);
        {
            let obstacle = &mut state.course.obstacles_mut()[0];
            obstacle.x = AVATAR_X;
            obstacle.gap_top = 0.0;
            obstacle.gap_bottom = 50.0;
        }
        let id = state.course.obstacles()[0].id;
        tick(&mut state, REFERENCE_DT);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert!(state.drain_events().contains(&GameEvent::Collided {
            cause: CollisionCause::Obstacle { id },
            score: 0
        }));
    }

    #[test]
    fn test_threshold_applies_without_lag() {
        let mut state = running(1);
        state.score = 10;
        let x = state.course.obstacles()[0].x;
        tick(&mut state, REFERENCE_DT);
        assert_eq!(state.course.obstacles()[0].x, x - 4.5);
    }

    #[test]
    fn test_scaled_tick_moves_further() {
        let mut a = running(1);
        let mut b = running(1);
        tick(&mut a, REFERENCE_DT * 2.0);
        tick(&mut b, REFERENCE_DT);
        let xa = a.course.obstacles()[0].x;
        let xb = b.course.obstacles()[0].x;
        assert!((AVATAR_X + LEAD_DISTANCE - xa - 2.0 * (AVATAR_X + LEAD_DISTANCE - xb)).abs() < 1e-4);
        assert!(a.avatar.vel_y > b.avatar.vel_y);
    }

    #[test]
    fn test_determinism() {
        let mut state1 = running(99999);
        let mut state2 = running(99999);
        for i in 0..200 {
            if i % 18 == 0 {
                state1.handle(Command::Flap);
                state2.handle(Command::Flap);
            }
            tick(&mut state1, REFERENCE_DT);
            tick(&mut state2, REFERENCE_DT);
        }
        assert_eq!(state1.time_ticks, state2.time_ticks);
        assert_eq!(state1.course.obstacles(), state2.course.obstacles());
        assert_eq!(state1.avatar, state2.avatar);
    }
}
