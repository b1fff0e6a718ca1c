//! Snapshot of locked targets taken when a volley starts.

use glam::Vec3;

use skirmish_core::ids::HurtboxId;

use crate::collision::TargetSample;

#[derive(Debug, Clone, Copy, PartialEq)]
struct VolleyEntry {
    id: HurtboxId,
    remaining_stacks: u32,
}

/// Locked targets (with their stack counts) assigned to missiles of the current volley.
#[derive(Debug, Clone, Default)]
pub struct VolleyPool {
    entries: Vec<VolleyEntry>,
}

impl VolleyPool {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Replace the pool with `(target, stacks)` pairs.
    pub fn stage(&mut self, locks: impl IntoIterator<Item = (HurtboxId, u32)>) {
        self.entries = locks
            .into_iter()
            .filter(|(_, stacks)| *stacks > 0)
            .map(|(id, remaining_stacks)| VolleyEntry {
                id,
                remaining_stacks,
            })
            .collect();
    }

    /// Drop entries for which `keep` returns false.
    pub fn retain(&mut self, mut keep: impl FnMut(HurtboxId) -> bool) {
        self.entries.retain(|entry| keep(entry.id));
    }

    pub fn contains(&self, id: HurtboxId) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    pub fn remaining_stacks(&self, id: HurtboxId) -> u32 {
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .map_or(0, |entry| entry.remaining_stacks)
    }

    /// Assign the entry nearest to `from`.
    ///
    /// With `use_stacks`, only entries with stacks left qualify and the chosen
    /// one gives up a stack; exhausted entries leave the pool.
    pub fn take(
        &mut self,
        from: Vec3,
        use_stacks: bool,
        targets: &[TargetSample],
    ) -> Option<HurtboxId> {
        let index = self.nearest_index(from, targets, use_stacks)?;
        let id = self.entries[index].id;
        if use_stacks {
            let entry = &mut self.entries[index];
            entry.remaining_stacks = entry.remaining_stacks.saturating_sub(1);
            if entry.remaining_stacks == 0 {
                self.entries.remove(index);
            }
        }
        Some(id)
    }

    /// Entry nearest to `from` without consuming anything.
    pub fn nearest(&self, from: Vec3, targets: &[TargetSample]) -> Option<HurtboxId> {
        self.nearest_index(from, targets, false)
            .map(|index| self.entries[index].id)
    }

    fn nearest_index(
        &self,
        from: Vec3,
        targets: &[TargetSample],
        require_stacks: bool,
    ) -> Option<usize> {
        let mut best: Option<(usize, f32)> = None;
        for (index, entry) in self.entries.iter().enumerate() {
            if require_stacks && entry.remaining_stacks == 0 {
                continue;
            }
            let Some(target) = targets
                .iter()
                .find(|t| t.id == entry.id && t.damageable)
            else {
                continue;
            };
            let distance = from.distance_squared(target.center);
            if best.map_or(true, |(_, d)| distance < d) {
                best = Some((index, distance));
            }
        }
        best.map(|(index, _)| index)
    }
}
