//! Hover-driven disclosure of collapsed optional fields.
//!
//! Time is passed in by the caller. A hover schedules an open that
//! [`DisclosureController::advance`] fires once the delay has elapsed; a
//! leave before then cancels it. Pending opens remember the render
//! generation they were scheduled under and are dropped if the tree has
//! been replaced since.

use std::collections::{BTreeMap, BTreeSet};
use std::time::{Duration, Instant};

use crate::render::RenderTree;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingOpen {
    due: Instant,
    generation: u64,
}

/// Open/collapse state machine for collapsible fields.
#[derive(Debug, Clone)]
pub struct DisclosureController {
    delay: Duration,
    generation: u64,
    pending: BTreeMap<String, PendingOpen>,
    open: BTreeSet<String>,
}

impl DisclosureController {
    /// Creates a controller with the given hover delay.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: 0,
            pending: BTreeMap::new(),
            open: BTreeSet::new(),
        }
    }

    /// Forgets all state and follows render `generation` from now on.
    pub fn reset(&mut self, generation: u64) {
        self.generation = generation;
        self.pending.clear();
        self.open.clear();
    }

    /// Number of scheduled opens.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Returns true if `id` was opened by hover and is still open.
    #[must_use]
    pub fn is_open(&self, id: &str) -> bool {
        self.open.contains(id)
    }

    /// The pointer entered field `id`. Returns true if an open was scheduled.
    pub fn pointer_enter(&mut self, tree: &RenderTree, id: &str, now: Instant) -> bool {
        if tree.generation != self.generation
            || self.open.contains(id)
            || self.pending.contains_key(id)
        {
            return false;
        }
        if !tree.find(id).is_some_and(|f| f.collapsible) {
            return false;
        }
        self.pending.insert(
            id.to_string(),
            PendingOpen {
                due: now + self.delay,
                generation: self.generation,
            },
        );
        true
    }

    /// The pointer left field `id`.
    ///
    /// Cancels a pending open. An open field collapses again unless its own
    /// value is non-empty.
    pub fn pointer_leave(&mut self, tree: &mut RenderTree, id: &str) {
        if self.pending.remove(id).is_some() {
            tracing::debug!(field = id, "cancelled pending open");
            return;
        }
        if !self.open.remove(id) || tree.generation != self.generation {
            return;
        }
        if let Some(fragment) = tree.find_mut(id) {
            if !fragment.has_content() {
                fragment.collapsed = true;
            }
        }
    }

    /// Fires every open due at `now`; returns the ids that opened.
    pub fn advance(&mut self, tree: &mut RenderTree, now: Instant) -> Vec<String> {
        let due: Vec<String> = self
            .pending
            .iter()
            .filter(|(_, p)| p.due <= now)
            .map(|(id, _)| id.clone())
            .collect();
        let mut opened = Vec::new();
        for id in due {
            let Some(task) = self.pending.remove(&id) else {
                continue;
            };
            if task.generation != tree.generation {
                tracing::debug!(field = %id, "dropping open from a previous render");
                continue;
            }
            if let Some(fragment) = tree.find_mut(&id) {
                fragment.collapsed = false;
                self.open.insert(id.clone());
                opened.push(id);
            }
        }
        opened
    }
}
