//! Marker store: named, ordered marker sets plus the active-set pointer.

use markset_types::{MarkerSet, SetName};

/// Session-scoped collection of named marker sets.
///
/// Sets are unique by name and kept in insertion order (oldest first); the
/// last-appended set is the documented fallback survivor when the active set
/// is cleared. The store is constructed once at session start, mutated on
/// the session's control thread, and discarded at session end.
#[derive(Debug, Default)]
pub struct MarkerStore {
    active: Option<SetName>,
    sets: Vec<MarkerSet>,
}

impl MarkerStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove all sets and clear the active selection.
    pub fn clear(&mut self) {
        self.active = None;
        self.sets.clear();
    }

    /// Make the set with `name` active, if it exists.
    ///
    /// Unknown names leave the selection unchanged and return `false`. This
    /// is deliberately tolerant of stale names from the client; callers are
    /// free to ignore the flag.
    pub fn activate(&mut self, name: &str) -> bool {
        match self.position(name) {
            Some(index) => {
                self.active = Some(self.sets[index].name().clone());
                true
            }
            None => false,
        }
    }

    /// Publish a complete set and make it active.
    ///
    /// An existing set with the same name is replaced in place, preserving
    /// its position; otherwise the set is appended. This is the sole
    /// producer-facing mutation.
    pub fn publish(&mut self, set: MarkerSet) {
        self.active = Some(set.name().clone());

        match self.position(set.name().as_str()) {
            Some(index) => self.sets[index] = set,
            None => self.sets.push(set),
        }
    }

    /// Remove the currently active set and blank the selection.
    ///
    /// If sets remain, the last set in insertion order (the most-recently
    /// appended survivor) becomes active, mirroring a tab-stack: closing the
    /// current view reveals whatever was shown before.
    pub fn clear_active(&mut self) {
        if let Some(name) = self.active.take()
            && let Some(index) = self.position(name.as_str())
        {
            self.sets.remove(index);
        }

        self.active = self.sets.last().map(|set| set.name().clone());
    }

    /// All sets in insertion order.
    #[must_use]
    pub fn sets(&self) -> &[MarkerSet] {
        &self.sets
    }

    /// Name of the current selection, if any.
    #[must_use]
    pub fn active_name(&self) -> Option<&SetName> {
        self.active.as_ref()
    }

    /// The active set, tolerant of a selection that no longer resolves.
    ///
    /// Returns `None` both when nothing is selected and when the selected
    /// name has no matching set.
    #[must_use]
    pub fn active_set(&self) -> Option<&MarkerSet> {
        let name = self.active.as_ref()?;
        let index = self.position(name.as_str())?;
        Some(&self.sets[index])
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Replace the whole store state; used when rebuilding from a snapshot.
    pub(crate) fn set_state(&mut self, active: Option<SetName>, sets: Vec<MarkerSet>) {
        self.active = active;
        self.sets = sets;
    }

    /// Force a selection without a resolvability check (test-only, used to
    /// exercise tolerant readers).
    #[cfg(test)]
    pub(crate) fn set_active_unchecked(&mut self, name: SetName) {
        self.active = Some(name);
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.sets.iter().position(|set| set.name().as_str() == name)
    }
}
