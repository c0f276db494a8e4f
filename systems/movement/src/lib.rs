#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pursuit system that steers every active enemy toward the player.

use outpost_core::{config::ENEMY_SPEED, Command, EnemyView, Event, Vec2};

/// Pure system that reacts to world events and emits movement commands.
#[derive(Clone, Copy, Debug)]
pub struct Movement {
    speed: f32,
}

impl Movement {
    /// Creates a movement system advancing enemies `speed` units per tick.
    #[must_use]
    pub const fn new(speed: f32) -> Self {
        Self { speed }
    }

    /// Consumes world events and the enemy view to emit movement commands.
    ///
    /// Enemies advance one fixed step per handled batch that contains a
    /// `TimeAdvanced` event. The step is not clamped to the remaining
    /// distance, so an enemy closer than one step overshoots its target.
    pub fn handle(
        &self,
        events: &[Event],
        enemies: &EnemyView,
        target: Vec2,
        out: &mut Vec<Command>,
    ) {
        if !events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. }))
        {
            return;
        }

        for enemy in enemies.iter() {
            if let Some(position) = pursue(enemy.position, target, self.speed) {
                out.push(Command::MoveEnemy {
                    enemy: enemy.id,
                    position,
                });
            }
        }
    }
}

impl Default for Movement {
    fn default() -> Self {
        Self::new(ENEMY_SPEED)
    }
}

/// Position one step of `speed` units from `from` toward `target`.
///
/// Returns `None` when the two points coincide.
#[must_use]
pub fn pursue(from: Vec2, target: Vec2, speed: f32) -> Option<Vec2> {
    let offset = target - from;
    let distance = offset.length();
    if distance <= 0.0 || !distance.is_finite() {
        return None;
    }
    Some(from + offset / distance * speed)
}
