use std::collections::BTreeSet;

/// Membership changes produced by a selection operation, in id order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionChange<T> {
    pub added: Vec<T>,
    pub removed: Vec<T>,
}

impl<T> Default for SelectionChange<T> {
    fn default() -> Self {
        Self {
            added: Vec::new(),
            removed: Vec::new(),
        }
    }
}

impl<T> SelectionChange<T> {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Ordered set of selected ids.
///
/// Every mutating call reports exactly which ids changed membership so the
/// caller can notify per id. Iteration is in id order, which keeps
/// notifications deterministic.
#[derive(Debug, Clone)]
pub struct SelectionManager<T> {
    selected: BTreeSet<T>,
}

impl<T> Default for SelectionManager<T> {
    fn default() -> Self {
        Self {
            selected: BTreeSet::new(),
        }
    }
}

impl<T: Ord + Clone> SelectionManager<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a click on an item.
    ///
    /// With `additive` the item's membership is toggled. Without it, clicking
    /// an item that is already selected keeps the whole selection (so a group
    /// can be dragged); otherwise the selection becomes exactly that item.
    pub fn handle_interaction(&mut self, id: &T, additive: bool) -> SelectionChange<T> {
        let mut change = SelectionChange::default();
        if additive {
            if self.selected.remove(id) {
                change.removed.push(id.clone());
            } else {
                self.selected.insert(id.clone());
                change.added.push(id.clone());
            }
        } else if !self.selected.contains(id) {
            change.removed = self.clear();
            self.selected.insert(id.clone());
            change.added.push(id.clone());
        }
        change
    }

    /// Add one id. Returns true if it was not already selected.
    pub fn select(&mut self, id: T) -> bool {
        self.selected.insert(id)
    }

    /// Remove one id. Returns true if it was selected.
    pub fn deselect(&mut self, id: &T) -> bool {
        self.selected.remove(id)
    }

    /// Add several ids, returning the ones that were newly selected in the
    /// order given.
    pub fn extend<I>(&mut self, ids: I) -> Vec<T>
    where
        I: IntoIterator<Item = T>,
    {
        ids.into_iter()
            .filter(|id| self.selected.insert(id.clone()))
            .collect()
    }

    /// Clear the selection, returning the ids that were selected.
    pub fn clear(&mut self) -> Vec<T> {
        std::mem::take(&mut self.selected).into_iter().collect()
    }

    /// Replace the selection with a new set of ids.
    pub fn replace_selection<I>(&mut self, ids: I) -> SelectionChange<T>
    where
        I: IntoIterator<Item = T>,
    {
        let next: BTreeSet<T> = ids.into_iter().collect();
        let change = SelectionChange {
            added: next.difference(&self.selected).cloned().collect(),
            removed: self.selected.difference(&next).cloned().collect(),
        };
        self.selected = next;
        change
    }

    /// Drop ids for which `keep` returns false, returning the dropped ids.
    pub fn retain<F>(&mut self, mut keep: F) -> Vec<T>
    where
        F: FnMut(&T) -> bool,
    {
        let mut dropped = Vec::new();
        self.selected.retain(|id| {
            let kept = keep(id);
            if !kept {
                dropped.push(id.clone());
            }
            kept
        });
        dropped
    }

    pub fn contains(&self, id: &T) -> bool {
        self.selected.contains(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.selected.iter()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}
