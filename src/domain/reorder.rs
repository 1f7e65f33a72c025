//! Turning user-intended reorderings into position key updates.
//!
//! The coordinator works on a slice of [`Positioned`] items taken in their
//! displayed order. It never mutates the slice; it returns a [`Reordering`]
//! describing the final id order and the keys that changed. Persisting
//! those updates is the caller's concern.

use crate::domain::position::{PositionSequencer, Positioned};
use crate::error::{BoardError, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::{fmt, str::FromStr};

/// Single-step move direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => write!(f, "up"),
            Self::Down => write!(f, "down"),
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            _ => Err(format!("Invalid direction '{}'. Valid directions: up, down", s)),
        }
    }
}

/// A new key for one item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionUpdate<Id> {
    pub id: Id,
    pub order_index: f64,
}

/// Result of a reorder computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reordering<Id> {
    /// Every id of the collection in its final order
    pub order: Vec<Id>,
    /// Only the items whose key changed, in final order
    pub updates: Vec<PositionUpdate<Id>>,
    /// Whether the collection had to be renumbered first
    pub renormalized: bool,
}

impl<Id: Clone + Eq + Hash> Reordering<Id> {
    fn unchanged<T: Positioned<Id = Id>>(items: &[T]) -> Self {
        Self {
            order: items.iter().map(|i| i.position_id().clone()).collect(),
            updates: Vec::new(),
            renormalized: false,
        }
    }

    pub fn is_noop(&self) -> bool {
        self.updates.is_empty()
    }

    /// The new key assigned to `id`, if it changed
    pub fn key_for(&self, id: &Id) -> Option<f64> {
        self.updates
            .iter()
            .find(|u| &u.id == id)
            .map(|u| u.order_index)
    }

    /// Writes the new keys into whichever of `items` they concern
    pub fn write_keys<T: Positioned<Id = Id>>(&self, items: &mut [T]) {
        let keys: HashMap<&Id, f64> = self
            .updates
            .iter()
            .map(|u| (&u.id, u.order_index))
            .collect();

        for item in items.iter_mut() {
            if let Some(&key) = keys.get(item.position_id()) {
                item.set_order_index(key);
            }
        }
    }

    /// Writes the new keys into `items` and re-sorts them by key
    pub fn apply_to<T: Positioned<Id = Id>>(&self, items: &mut [T]) {
        self.write_keys(items);
        items.sort_by(|a, b| a.order_index().total_cmp(&b.order_index()));
    }
}

/// Computes position updates for moves and full reorderings
#[derive(Debug, Clone, Copy, Default)]
pub struct ReorderCoordinator {
    sequencer: PositionSequencer,
}

impl ReorderCoordinator {
    pub fn new(sequencer: PositionSequencer) -> Self {
        Self { sequencer }
    }

    pub fn sequencer(&self) -> &PositionSequencer {
        &self.sequencer
    }

    /// Moves one item a single step up or down.
    ///
    /// Moving past either end is a no-op. Only the moved item receives a
    /// new key unless the collection has to be renumbered.
    pub fn move_one<T: Positioned>(
        &self,
        items: &[T],
        id: &T::Id,
        direction: Direction,
    ) -> Result<Reordering<T::Id>> {
        let index = position_of(items, id)?;
        let target = match direction {
            Direction::Up => index.checked_sub(1),
            Direction::Down => Some(index + 1).filter(|&t| t < items.len()),
        };

        match target {
            Some(target) => self.relocate(items, id, Some(index), target),
            None => Ok(Reordering::unchanged(items)),
        }
    }

    /// Places `id` at `index` of `items`.
    ///
    /// If `id` is already part of `items` it is moved there (a drag within
    /// the column); otherwise it is treated as arriving from elsewhere (a drop
    /// from another column) and the result's order contains it as well.
    /// `index` past the end appends.
    pub fn place_at<T: Positioned>(
        &self,
        items: &[T],
        id: &T::Id,
        index: usize,
    ) -> Result<Reordering<T::Id>> {
        let from = items.iter().position(|i| i.position_id() == id);
        let last = match from {
            Some(_) => items.len() - 1,
            None => items.len(),
        };
        let target = index.min(last);

        if from == Some(target) {
            return Ok(Reordering::unchanged(items));
        }
        self.relocate(items, id, from, target)
    }

    /// Assigns keys so that the collection sorts exactly as `ordered_ids`.
    ///
    /// `ordered_ids` must be a permutation of the ids in `items`. Items whose
    /// existing keys already form the longest increasing run along the new
    /// order keep them; everything else gets a fresh key.
    pub fn apply_full_order<T: Positioned>(
        &self,
        items: &[T],
        ordered_ids: &[T::Id],
    ) -> Result<Reordering<T::Id>> {
        let order = permutation_of(items, ordered_ids)?;
        let ids = items.iter().map(|i| i.position_id().clone()).collect();
        self.reassign(items, ids, order, longest_increasing_run)
    }

    fn relocate<T: Positioned>(
        &self,
        items: &[T],
        id: &T::Id,
        from: Option<usize>,
        to: usize,
    ) -> Result<Reordering<T::Id>> {
        let mut ids: Vec<T::Id> = items.iter().map(|i| i.position_id().clone()).collect();
        let slot = match from {
            Some(index) => index,
            None => {
                ids.push(id.clone());
                items.len()
            }
        };

        let mut order: Vec<usize> = (0..items.len()).filter(|&i| Some(i) != from).collect();
        order.insert(to, slot);

        self.reassign(items, ids, order, |along| {
            (0..along.len()).map(|pos| pos != to).collect()
        })
    }

    /// Plans keys for `order` (indices into `ids`), renumbering once if the
    /// current keys leave no room.
    fn reassign<T, F>(
        &self,
        items: &[T],
        ids: Vec<T::Id>,
        order: Vec<usize>,
        select_kept: F,
    ) -> Result<Reordering<T::Id>>
    where
        T: Positioned,
        F: Fn(&[f64]) -> Vec<bool>,
    {
        // an item arriving from another collection has no key yet
        let mut current: Vec<f64> = items.iter().map(|i| i.order_index()).collect();
        current.resize(ids.len(), f64::NAN);

        let plan = |keys: &[f64]| -> Result<Vec<f64>> {
            let along: Vec<f64> = order.iter().map(|&i| keys[i]).collect();
            let kept = select_kept(&along);
            self.fill_gaps(&along, &kept)
        };

        let (planned, renormalized) = match plan(&current) {
            Ok(planned) => (planned, false),
            Err(err) if err.is_precision_exhausted() => {
                debug!(
                    "renumbering {} items after position precision was exhausted: {}",
                    items.len(),
                    err
                );
                let mut renumbered = self.sequencer.renumbered(items.len())?;
                renumbered.resize(ids.len(), f64::NAN);
                (plan(&renumbered)?, true)
            }
            Err(err) => return Err(err),
        };

        let updates = order
            .iter()
            .zip(&planned)
            .filter(|&(&i, &key)| current[i].to_bits() != key.to_bits())
            .map(|(&i, &key)| PositionUpdate {
                id: ids[i].clone(),
                order_index: key,
            })
            .collect();

        Ok(Reordering {
            order: order.iter().map(|&i| ids[i].clone()).collect(),
            updates,
            renormalized,
        })
    }

    /// Keeps the keys marked in `kept` and fills each run between them with
    /// fresh keys from the sequencer.
    fn fill_gaps(&self, along: &[f64], kept: &[bool]) -> Result<Vec<f64>> {
        let mut planned = along.to_vec();
        let mut previous: Option<f64> = None;
        let mut pos = 0;

        while pos < along.len() {
            if kept[pos] {
                previous = Some(along[pos]);
                pos += 1;
                continue;
            }

            let start = pos;
            while pos < along.len() && !kept[pos] {
                pos += 1;
            }
            let next = along.get(pos).copied();
            let fresh = self.sequencer.keys_between(previous, next, pos - start)?;
            planned[start..pos].copy_from_slice(&fresh);
        }

        // kept neighbors may already be tied or out of order
        if let Some(pair) = planned
            .windows(2)
            .find(|pair| !(pair[0] < pair[1]) || !pair[1].is_finite())
        {
            return Err(BoardError::precision(Some(pair[0]), Some(pair[1])));
        }
        if planned.first().is_some_and(|k| !k.is_finite()) {
            return Err(BoardError::precision(None, planned.first().copied()));
        }
        Ok(planned)
    }
}

fn position_of<T: Positioned>(items: &[T], id: &T::Id) -> Result<usize> {
    items
        .iter()
        .position(|i| i.position_id() == id)
        .ok_or_else(|| BoardError::NotFound(id.to_string()))
}

/// Maps `ordered_ids` onto indices of `items`, rejecting anything that is
/// not an exact permutation.
fn permutation_of<T: Positioned>(items: &[T], ordered_ids: &[T::Id]) -> Result<Vec<usize>> {
    let mut index: HashMap<&T::Id, usize> = HashMap::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        if index.insert(item.position_id(), i).is_some() {
            return Err(BoardError::InvalidOrder(format!(
                "collection contains {} more than once",
                item.position_id()
            )));
        }
    }

    let mut seen = HashSet::with_capacity(ordered_ids.len());
    let mut order = Vec::with_capacity(ordered_ids.len());
    for id in ordered_ids {
        let i = *index
            .get(id)
            .ok_or_else(|| BoardError::InvalidOrder(format!("unknown id {}", id)))?;
        if !seen.insert(i) {
            return Err(BoardError::InvalidOrder(format!("{} appears more than once", id)));
        }
        order.push(i);
    }

    if order.len() != items.len() {
        let missing = items
            .iter()
            .enumerate()
            .filter(|(i, _)| !seen.contains(i))
            .map(|(_, item)| item.position_id().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(BoardError::InvalidOrder(format!("missing ids: {}", missing)));
    }
    Ok(order)
}

/// Marks one longest strictly increasing subsequence of finite keys
fn longest_increasing_run(keys: &[f64]) -> Vec<bool> {
    let mut tails: Vec<usize> = Vec::new();
    let mut predecessor: Vec<Option<usize>> = vec![None; keys.len()];

    for (i, &key) in keys.iter().enumerate() {
        if !key.is_finite() {
            continue;
        }
        let len = tails.partition_point(|&t| keys[t] < key);
        if len > 0 {
            predecessor[i] = Some(tails[len - 1]);
        }
        if len == tails.len() {
            tails.push(i);
        } else {
            tails[len] = i;
        }
    }

    let mut kept = vec![false; keys.len()];
    let mut cursor = tails.last().copied();
    while let Some(i) = cursor {
        kept[i] = true;
        cursor = predecessor[i];
    }
    kept
}
