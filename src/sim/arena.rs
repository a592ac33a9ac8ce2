//! Indexed entity storage
//!
//! Entities live in generational slots so ids stay valid across a tick.
//! Removal is two-phase: gameplay code marks entities, `compact` frees them
//! at the end of the tick. Iteration follows insertion order.

use serde::{Deserialize, Serialize};

use super::entity::{Entity, EntityKind};

/// Stable handle to an entity slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId {
    index: u32,
    generation: u32,
}

impl EntityId {
    /// Placeholder carried by entities that have not been inserted yet
    pub const UNASSIGNED: EntityId = EntityId {
        index: u32::MAX,
        generation: 0,
    };
}

#[derive(Debug, Clone, Default)]
struct Slot {
    generation: u32,
    entity: Option<Entity>,
}

/// Slot arena with insertion-ordered iteration
#[derive(Debug, Clone, Default)]
pub struct EntityArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    /// Live ids, oldest first
    order: Vec<EntityId>,
}

impl EntityArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an entity, stamping its id
    pub fn insert(&mut self, mut entity: Entity) -> EntityId {
        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                EntityId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot::default());
                EntityId {
                    index: (self.slots.len() - 1) as u32,
                    generation: 0,
                }
            }
        };
        entity.id = id;
        self.slots[id.index as usize].entity = Some(entity);
        self.order.push(id);
        id
    }

    pub fn extend(&mut self, entities: impl IntoIterator<Item = Entity>) {
        for entity in entities {
            self.insert(entity);
        }
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.entity.as_ref()
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.entity.as_mut()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Snapshot of stored ids (including marked ones), oldest first.
    /// Entities inserted after the snapshot are not included.
    pub fn ids(&self) -> Vec<EntityId> {
        self.order.clone()
    }

    /// Snapshot of ids for one kind
    pub fn ids_of(&self, kind: EntityKind) -> Vec<EntityId> {
        self.iter().filter(|e| e.kind == kind).map(|e| e.id).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.order.iter().filter_map(|id| self.get(*id))
    }

    pub fn find(&self, kind: EntityKind) -> Option<&Entity> {
        self.iter().find(|e| e.kind == kind)
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        self.iter().filter(|e| e.kind == kind).count()
    }

    /// Hostiles still stored this tick (marked ones count until compaction)
    pub fn hostile_count(&self) -> usize {
        self.iter().filter(|e| e.kind.is_hostile()).count()
    }

    /// Mark-phase helper for callers holding only an id
    pub fn mark_for_deletion(&mut self, id: EntityId) {
        if let Some(entity) = self.get_mut(id) {
            entity.mark_for_deletion();
        }
    }

    /// Compact phase: drop every marked entity. Returns the number removed.
    pub fn compact(&mut self) -> usize {
        let before = self.order.len();
        let slots = &mut self.slots;
        let free = &mut self.free;
        self.order.retain(|id| {
            let slot = &mut slots[id.index as usize];
            let keep = slot
                .entity
                .as_ref()
                .is_some_and(|e| !e.marked_for_deletion);
            if !keep {
                slot.entity = None;
                slot.generation = slot.generation.wrapping_add(1);
                free.push(id.index);
            }
            keep
        });
        before - self.order.len()
    }

    /// Remove everything, invalidating all outstanding ids
    pub fn clear(&mut self) {
        for id in self.order.drain(..) {
            let slot = &mut self.slots[id.index as usize];
            slot.entity = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(id.index);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::create_coin;
    use glam::Vec2;

    fn coin(value: u32) -> Entity {
        create_coin(Vec2::ZERO, Vec2::ZERO, value)
    }

    #[test]
    fn test_insert_stamps_id() {
        let mut arena = EntityArena::new();
        let id = arena.insert(coin(1));
        assert_eq!(arena.get(id).map(|e| e.id), Some(id));
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn test_compact_removes_only_marked() {
        let mut arena = EntityArena::new();
        let a = arena.insert(coin(1));
        let b = arena.insert(coin(2));
        let c = arena.insert(coin(3));

        arena.mark_for_deletion(b);
        // Marked entities stay readable until compaction
        assert!(arena.get(b).is_some());
        assert_eq!(arena.compact(), 1);

        assert!(arena.get(b).is_none());
        let values: Vec<u32> = arena.iter().map(|e| e.value).collect();
        assert_eq!(values, vec![1, 3]);
        assert!(arena.get(a).is_some() && arena.get(c).is_some());
    }

    #[test]
    fn test_stale_id_after_slot_reuse() {
        let mut arena = EntityArena::new();
        let old = arena.insert(coin(1));
        arena.mark_for_deletion(old);
        arena.compact();

        let new = arena.insert(coin(2));
        assert_ne!(old, new);
        assert!(arena.get(old).is_none());
        assert_eq!(arena.get(new).map(|e| e.value), Some(2));
    }

    #[test]
    fn test_iteration_follows_insertion_order_after_reuse() {
        let mut arena = EntityArena::new();
        let first = arena.insert(coin(1));
        arena.insert(coin(2));
        arena.mark_for_deletion(first);
        arena.compact();
        arena.insert(coin(3));

        let values: Vec<u32> = arena.iter().map(|e| e.value).collect();
        assert_eq!(values, vec![2, 3]);
    }

    #[test]
    fn test_snapshot_excludes_later_inserts() {
        let mut arena = EntityArena::new();
        arena.insert(coin(1));
        let snapshot = arena.ids();
        arena.insert(coin(2));
        assert_eq!(snapshot.len(), 1);
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn test_clear() {
        let mut arena = EntityArena::new();
        let id = arena.insert(coin(1));
        arena.clear();
        assert!(arena.is_empty());
        assert!(arena.get(id).is_none());
    }
}
