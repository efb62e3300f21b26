//! Generational arena backing ensemble trees.
//!
//! Nodes live in a flat slot vector and refer to each other by [`NodeId`]
//! instead of owning pointers. Parent back-references are plain `NodeId`s,
//! so the child/parent graph never forms an ownership cycle and needs no
//! `Rc`/`Weak` bookkeeping.
//!
//! Each slot carries a generation counter that is bumped when the slot is
//! vacated. A stale [`NodeId`] held across a removal therefore misses on
//! lookup instead of silently aliasing whatever node reused the slot.

use std::fmt;

/// Handle to a node stored in an [`Arena`].
///
/// Valid only for the arena that issued it. Lookups with a handle whose slot
/// was since freed (or freed and reused) return `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    /// Slot index, exposed for diagnostics only.
    pub fn index(&self) -> u32 {
        self.index
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

enum SlotState<T> {
    Occupied(T),
    Vacant { next_free: Option<u32> },
}

struct Slot<T> {
    generation: u32,
    state: SlotState<T>,
}

/// Slot-vector arena with generation-checked handles.
///
/// Removal pushes the slot onto an internal free list; the next insert
/// reuses it under a higher generation.
///
/// # Examples
///
/// ```
/// use trousseau_engine::arena::Arena;
///
/// let mut arena = Arena::new();
/// let id = arena.insert("vestido");
/// assert_eq!(arena.get(id), Some(&"vestido"));
///
/// arena.remove(id);
/// assert_eq!(arena.get(id), None); // handle went stale
/// ```
pub struct Arena<T> {
    slots: Vec<Slot<T>>,
    free_head: Option<u32>,
    len: usize,
}

impl<T> Arena<T> {
    /// Create an empty arena.
    pub fn new() -> Self {
        Arena {
            slots: Vec::new(),
            free_head: None,
            len: 0,
        }
    }

    /// Create an empty arena with room for `capacity` nodes.
    pub fn with_capacity(capacity: usize) -> Self {
        Arena {
            slots: Vec::with_capacity(capacity),
            free_head: None,
            len: 0,
        }
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the arena holds no live nodes.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert a value, reusing a vacant slot when one is available.
    pub fn insert(&mut self, value: T) -> NodeId {
        self.len += 1;
        match self.free_head {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                self.free_head = match slot.state {
                    SlotState::Vacant { next_free } => next_free,
                    // free list only ever points at vacant slots
                    SlotState::Occupied(_) => unreachable!("free list corrupt"),
                };
                slot.state = SlotState::Occupied(value);
                NodeId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    state: SlotState::Occupied(value),
                });
                NodeId {
                    index,
                    generation: 0,
                }
            }
        }
    }

    /// Remove the node behind `id`, returning its value.
    ///
    /// Returns `None` when the handle is stale or was never issued by this
    /// arena. The vacated slot's generation is bumped so outstanding copies
    /// of `id` stop resolving.
    pub fn remove(&mut self, id: NodeId) -> Option<T> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        if matches!(slot.state, SlotState::Vacant { .. }) {
            return None;
        }
        let state = std::mem::replace(
            &mut slot.state,
            SlotState::Vacant {
                next_free: self.free_head,
            },
        );
        slot.generation = slot.generation.wrapping_add(1);
        self.free_head = Some(id.index);
        self.len -= 1;
        match state {
            SlotState::Occupied(value) => Some(value),
            SlotState::Vacant { .. } => None,
        }
    }

    /// Immutable lookup; `None` for stale handles.
    pub fn get(&self, id: NodeId) -> Option<&T> {
        match self.slots.get(id.index as usize) {
            Some(slot) if slot.generation == id.generation => match &slot.state {
                SlotState::Occupied(value) => Some(value),
                SlotState::Vacant { .. } => None,
            },
            _ => None,
        }
    }

    /// Mutable lookup; `None` for stale handles.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        match self.slots.get_mut(id.index as usize) {
            Some(slot) if slot.generation == id.generation => match &mut slot.state {
                SlotState::Occupied(value) => Some(value),
                SlotState::Vacant { .. } => None,
            },
            _ => None,
        }
    }

    /// Whether `id` currently resolves to a live node.
    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Iterate over live nodes in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &T)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            let id = NodeId {
                index: index as u32,
                generation: slot.generation,
            };
            match &slot.state {
                SlotState::Occupied(value) => Some((id, value)),
                SlotState::Vacant { .. } => None,
            }
        })
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Arena::new()
    }
}
