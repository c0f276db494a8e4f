//! Spawner bookkeeping.

use outpost_core::{SpawnerId, SpawnerSnapshot, Vec2};

#[derive(Clone, Debug)]
pub(crate) struct SpawnerState {
    pub(crate) id: SpawnerId,
    pub(crate) origin: Vec2,
    pub(crate) active_enemies: u32,
    pub(crate) discovered: bool,
}

impl SpawnerState {
    pub(crate) fn snapshot(&self) -> SpawnerSnapshot {
        SpawnerSnapshot {
            id: self.id,
            origin: self.origin,
            active_enemies: self.active_enemies,
            discovered: self.discovered,
        }
    }
}

/// Spawners indexed by identifier; identifiers are dense and never reused.
#[derive(Debug, Default)]
pub(crate) struct SpawnerRegistry {
    entries: Vec<SpawnerState>,
}

impl SpawnerRegistry {
    pub(crate) fn insert(&mut self, origin: Vec2) -> SpawnerId {
        let id = SpawnerId::new(self.entries.len() as u32);
        self.entries.push(SpawnerState {
            id,
            origin,
            active_enemies: 0,
            discovered: false,
        });
        id
    }

    pub(crate) fn get_mut(&mut self, id: SpawnerId) -> Option<&mut SpawnerState> {
        let index = usize::try_from(id.get()).ok()?;
        self.entries.get_mut(index)
    }

    /// Decrements the live count of a spawner, saturating at zero.
    pub(crate) fn release_enemy(&mut self, id: SpawnerId) {
        if let Some(spawner) = self.get_mut(id) {
            spawner.active_enemies = spawner.active_enemies.saturating_sub(1);
        }
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &SpawnerState> {
        self.entries.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut SpawnerState> {
        self.entries.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_follow_insertion_order() {
        let mut registry = SpawnerRegistry::default();
        let first = registry.insert(Vec2::new(100.0, 100.0));
        let second = registry.insert(Vec2::new(900.0, 100.0));

        assert_eq!(first, SpawnerId::new(0));
        assert_eq!(second, SpawnerId::new(1));
        assert!(registry.get_mut(SpawnerId::new(2)).is_none());
    }

    #[test]
    fn release_never_underflows() {
        let mut registry = SpawnerRegistry::default();
        let id = registry.insert(Vec2::ZERO);
        registry.release_enemy(id);

        let count = registry.iter().next().map(|spawner| spawner.active_enemies);
        assert_eq!(count, Some(0));
    }
}
