//! Bounded, positionally addressed input slots for ingredients and steps

use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListError {
    #[error("max {label} reached ({max})")]
    LimitReached { label: &'static str, max: usize },
    #[error("at least one {singular} slot must remain")]
    FloorReached { singular: &'static str },
    #[error("no {singular} at position {index}")]
    OutOfRange {
        singular: &'static str,
        index: usize,
    },
}

/// Editable slots with a floor of one and a configurable ceiling.
///
/// Slots may be empty while editing; `commit` drops the empty ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedList {
    slots: Vec<String>,
    max: usize,
    label: &'static str,
    singular: &'static str,
}

impl BoundedList {
    /// One empty slot. `max` is clamped to at least 1.
    pub fn new(max: usize, label: &'static str, singular: &'static str) -> Self {
        Self {
            slots: vec![String::new()],
            max: max.max(1),
            label,
            singular,
        }
    }

    /// Inverse of `commit`: one slot per value, or a single empty slot for no values
    pub fn from_values(
        values: &[String],
        max: usize,
        label: &'static str,
        singular: &'static str,
    ) -> Self {
        let mut list = Self::new(max, label, singular);
        if values.is_empty() {
            return list;
        }
        if values.len() > list.max {
            warn!(
                label,
                count = values.len(),
                max = list.max,
                "Truncating list to configured maximum"
            );
        }
        list.slots = values.iter().take(list.max).cloned().collect();
        list
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn max(&self) -> usize {
        self.max
    }

    pub fn slots(&self) -> &[String] {
        &self.slots
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.slots.get(index).map(String::as_str)
    }

    pub fn can_add(&self) -> bool {
        self.slots.len() < self.max
    }

    /// Whether a removal affordance should be offered
    pub fn can_remove(&self) -> bool {
        self.slots.len() > 1
    }

    /// Append one empty slot, returning its index
    pub fn add(&mut self) -> Result<usize, ListError> {
        if !self.can_add() {
            return Err(ListError::LimitReached {
                label: self.label,
                max: self.max,
            });
        }
        self.slots.push(String::new());
        Ok(self.slots.len() - 1)
    }

    /// Remove the slot at `index`; later slots shift down by one
    pub fn remove(&mut self, index: usize) -> Result<String, ListError> {
        if index >= self.slots.len() {
            return Err(ListError::OutOfRange {
                singular: self.singular,
                index,
            });
        }
        if !self.can_remove() {
            return Err(ListError::FloorReached {
                singular: self.singular,
            });
        }
        Ok(self.slots.remove(index))
    }

    pub fn set(&mut self, index: usize, value: impl Into<String>) -> Result<(), ListError> {
        match self.slots.get_mut(index) {
            Some(slot) => {
                *slot = value.into();
                Ok(())
            }
            None => Err(ListError::OutOfRange {
                singular: self.singular,
                index,
            }),
        }
    }

    /// Non-empty entries in slot order
    pub fn commit(&self) -> Vec<String> {
        self.slots
            .iter()
            .filter(|s| !s.trim().is_empty())
            .cloned()
            .collect()
    }

    /// `commit` for drafting: a list with nothing filled keeps its blank slot
    pub fn draft_values(&self) -> Vec<String> {
        let values = self.commit();
        if values.is_empty() {
            vec![String::new()]
        } else {
            values
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ingredients(max: usize) -> BoundedList {
        BoundedList::new(max, "ingredients", "ingredient")
    }

    #[test]
    fn test_starts_with_one_empty_slot() {
        let list = ingredients(30);
        assert_eq!(list.slots(), &[String::new()]);
        assert!(!list.can_remove());
    }

    #[test]
    fn test_add_stops_at_max() {
        let mut list = ingredients(30);
        for _ in 1..30 {
            list.add().unwrap();
        }
        assert_eq!(list.len(), 30);
        let err = list.add().unwrap_err();
        assert_eq!(err.to_string(), "max ingredients reached (30)");
        assert_eq!(list.len(), 30);
    }

    #[test]
    fn test_remove_refuses_last_slot() {
        let mut list = ingredients(30);
        assert_eq!(
            list.remove(0).unwrap_err(),
            ListError::FloorReached {
                singular: "ingredient"
            }
        );
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_remove_reindexes() {
        let mut list = ingredients(30);
        list.set(0, "flour").unwrap();
        list.add().unwrap();
        list.set(1, "sugar").unwrap();
        list.add().unwrap();
        list.set(2, "eggs").unwrap();

        assert_eq!(list.remove(1).unwrap(), "sugar");
        assert_eq!(list.get(0), Some("flour"));
        assert_eq!(list.get(1), Some("eggs"));
        assert_eq!(list.get(2), None);
    }

    #[test]
    fn test_commit_drops_empty_interior_slots() {
        let mut list = ingredients(30);
        list.set(0, "flour").unwrap();
        list.add().unwrap();
        list.add().unwrap();
        list.set(2, "eggs").unwrap();
        list.add().unwrap();
        list.set(3, "  ").unwrap();

        assert_eq!(list.commit(), vec!["flour".to_string(), "eggs".to_string()]);
        assert_eq!(list.len(), 4);
    }

    #[test]
    fn test_from_values_is_inverse_of_commit() {
        let values = vec!["flour".to_string(), "eggs".to_string()];
        let list = BoundedList::from_values(&values, 30, "ingredients", "ingredient");
        assert_eq!(list.commit(), values);

        let empty = BoundedList::from_values(&[], 30, "ingredients", "ingredient");
        assert_eq!(empty.slots(), &[String::new()]);
    }

    #[test]
    fn test_draft_values_keep_blank_slot_when_nothing_filled() {
        let mut list = ingredients(30);
        list.add().unwrap();
        assert_eq!(list.draft_values(), vec![String::new()]);

        list.set(1, "salt").unwrap();
        assert_eq!(list.draft_values(), vec!["salt".to_string()]);
    }

    #[test]
    fn test_from_values_truncates_to_max() {
        let values: Vec<String> = (0..5).map(|i| format!("step {}", i)).collect();
        let list = BoundedList::from_values(&values, 3, "steps", "step");
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_length_stays_in_bounds_under_mixed_operations() {
        let mut list = ingredients(5);
        let ops = [1, 1, 0, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 1, 0];
        for op in ops {
            if op == 1 {
                let _ = list.add();
            } else {
                let _ = list.remove(0);
            }
            assert!((1..=5).contains(&list.len()));
        }
    }
}
