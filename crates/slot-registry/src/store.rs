use std::collections::{BTreeMap, HashMap};
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotEntry {
    pub slot: u32,
    pub assigned_at: OffsetDateTime,
}

/// Canonical item name -> slot number. Volatile; starts empty.
///
/// Slot numbers are not required to be unique across items.
#[derive(Debug, Default, Clone)]
pub struct SlotStore {
    entries: HashMap<String, SlotEntry>,
}

impl SlotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite; returns the previous slot, if any.
    pub fn upsert(&mut self, name: &str, slot: u32) -> Option<u32> {
        let entry = SlotEntry {
            slot,
            assigned_at: OffsetDateTime::now_utc(),
        };
        self.entries
            .insert(name.to_string(), entry)
            .map(|prev| prev.slot)
    }

    pub fn remove(&mut self, name: &str) -> Option<u32> {
        self.entries.remove(name).map(|e| e.slot)
    }

    pub fn get(&self, name: &str) -> Option<u32> {
        self.entries.get(name).map(|e| e.slot)
    }

    pub fn entry(&self, name: &str) -> Option<&SlotEntry> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sorted copy for display.
    pub fn snapshot(&self) -> BTreeMap<String, u32> {
        self.entries
            .iter()
            .map(|(name, e)| (name.clone(), e.slot))
            .collect()
    }
}
