//! Fixed-capacity enemy pool with stable slot identifiers.

use outpost_core::{EnemyId, SpawnerId, Vec2};

/// Pool slot describing a single enemy.
#[derive(Clone, Debug)]
pub struct EnemySlot {
    id: EnemyId,
    owner: Option<SpawnerId>,
    position: Vec2,
    visible: bool,
    last_in_viewport: bool,
}

impl EnemySlot {
    fn vacant(id: EnemyId) -> Self {
        Self {
            id,
            owner: None,
            position: Vec2::ZERO,
            visible: false,
            last_in_viewport: false,
        }
    }

    /// Identifier of the slot.
    #[must_use]
    pub const fn id(&self) -> EnemyId {
        self.id
    }

    /// Spawner credited with the enemy, or `None` while the slot is vacant.
    #[must_use]
    pub const fn owner(&self) -> Option<SpawnerId> {
        self.owner
    }

    /// Reports whether the slot currently hosts a live enemy.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.owner.is_some()
    }

    /// Current world position of the enemy.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Whether the enemy stands in visible fog.
    #[must_use]
    pub const fn visible(&self) -> bool {
        self.visible
    }

    /// Whether the enemy was inside the culling region after its last move.
    #[must_use]
    pub const fn last_in_viewport(&self) -> bool {
        self.last_in_viewport
    }

    pub(crate) fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub(crate) fn set_last_in_viewport(&mut self, in_viewport: bool) {
        self.last_in_viewport = in_viewport;
    }
}

/// Pre-allocated enemy storage.
///
/// Slots are created once and recycled; a slot identifier never changes
/// meaning for the lifetime of the pool. The vacant stack hands out the
/// lowest free index first on a fresh pool.
#[derive(Clone, Debug)]
pub struct EnemyPool {
    slots: Vec<EnemySlot>,
    vacant: Vec<usize>,
}

impl EnemyPool {
    /// Allocates a pool with `capacity` vacant slots.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let slots = (0..capacity)
            .map(|index| EnemySlot::vacant(EnemyId::new(index as u32)))
            .collect();
        Self {
            slots,
            vacant: (0..capacity).rev().collect(),
        }
    }

    /// Total number of slots.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of slots hosting a live enemy.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.slots.len() - self.vacant.len()
    }

    /// Activates a vacant slot for `owner` at `position`.
    ///
    /// Returns `None` when every slot is already active.
    pub fn acquire(&mut self, owner: SpawnerId, position: Vec2) -> Option<EnemyId> {
        let index = self.vacant.pop()?;
        let slot = self.slots.get_mut(index)?;
        slot.owner = Some(owner);
        slot.position = position;
        slot.visible = false;
        slot.last_in_viewport = false;
        Some(slot.id)
    }

    /// Deactivates a slot, returning the spawner it was credited to.
    ///
    /// Releasing a vacant or unknown slot is a no-op that returns `None`, so
    /// a slot can never be returned to the vacant stack twice.
    pub fn release(&mut self, enemy: EnemyId) -> Option<SpawnerId> {
        let index = usize::try_from(enemy.get()).ok()?;
        let slot = self.slots.get_mut(index)?;
        let owner = slot.owner.take()?;
        slot.visible = false;
        slot.last_in_viewport = false;
        self.vacant.push(index);
        Some(owner)
    }

    /// Looks up an active slot.
    #[must_use]
    pub fn get(&self, enemy: EnemyId) -> Option<&EnemySlot> {
        let index = usize::try_from(enemy.get()).ok()?;
        self.slots.get(index).filter(|slot| slot.is_active())
    }

    pub(crate) fn get_mut(&mut self, enemy: EnemyId) -> Option<&mut EnemySlot> {
        let index = usize::try_from(enemy.get()).ok()?;
        self.slots.get_mut(index).filter(|slot| slot.is_active())
    }

    /// Iterates active slots in identifier order.
    pub fn active(&self) -> impl Iterator<Item = &EnemySlot> {
        self.slots.iter().filter(|slot| slot.is_active())
    }

    pub(crate) fn active_mut(&mut self) -> impl Iterator<Item = &mut EnemySlot> {
        self.slots.iter_mut().filter(|slot| slot.is_active())
    }
}
