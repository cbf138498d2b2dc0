//! Track identifier pool with lowest-first recycling.
//!
//! Slots are never removed, only toggled between free and occupied, so
//! slot `i` always holds identifier `i + 1`. `acquire()` scans from the
//! start and takes the first free slot, which makes reuse deterministic.

use serde::Serialize;

use crate::types::{Result, TrackError, TrackId};

/// Occupancy of one identifier slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotState {
    Free,
    Occupied,
}

impl std::fmt::Display for SlotState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SlotState::Free => write!(f, "free"),
            SlotState::Occupied => write!(f, "occupied"),
        }
    }
}

/// One entry in the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IdSlot {
    pub id: TrackId,
    pub state: SlotState,
}

#[derive(Debug, Clone, Default)]
pub struct IdPool {
    slots: Vec<IdSlot>,
}

impl IdPool {
    pub fn new() -> Self {
        IdPool { slots: Vec::new() }
    }

    /// Take the lowest free identifier, or mint `len + 1` if none is free.
    pub fn acquire(&mut self) -> TrackId {
        if let Some(slot) = self
            .slots
            .iter_mut()
            .find(|slot| slot.state == SlotState::Free)
        {
            slot.state = SlotState::Occupied;
            return slot.id;
        }

        let id = TrackId(self.slots.len() as u32 + 1);
        self.slots.push(IdSlot {
            id,
            state: SlotState::Occupied,
        });
        id
    }

    /// Return `id` to the free pool.
    ///
    /// Fails if the identifier was never issued or is already free.
    pub fn release(&mut self, id: TrackId) -> Result<()> {
        match self.slot_mut(id) {
            Some(slot) if slot.state == SlotState::Occupied => {
                slot.state = SlotState::Free;
                Ok(())
            }
            _ => Err(TrackError::IdNotOccupied(id.0)),
        }
    }

    pub fn state(&self, id: TrackId) -> Option<SlotState> {
        self.index_of(id).map(|i| self.slots[i].state)
    }

    pub fn is_occupied(&self, id: TrackId) -> bool {
        self.state(id) == Some(SlotState::Occupied)
    }

    /// All slots in identifier order.
    pub fn slots(&self) -> &[IdSlot] {
        &self.slots
    }

    /// Identifiers currently in use, ascending.
    pub fn occupied(&self) -> impl Iterator<Item = TrackId> + '_ {
        self.slots
            .iter()
            .filter(|slot| slot.state == SlotState::Occupied)
            .map(|slot| slot.id)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn index_of(&self, id: TrackId) -> Option<usize> {
        let idx = (id.0 as usize).checked_sub(1)?;
        (idx < self.slots.len()).then_some(idx)
    }

    fn slot_mut(&mut self, id: TrackId) -> Option<&mut IdSlot> {
        let idx = self.index_of(id)?;
        self.slots.get_mut(idx)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
