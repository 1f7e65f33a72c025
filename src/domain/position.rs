//! Fractional position keys.
//!
//! Items in a column (or the columns of a board) are ordered by an `f64`
//! key. A new key can always be placed between two neighbors without
//! touching the rest of the collection, until the gap between those
//! neighbors drops below the configured epsilon. At that point the
//! sequencer reports [`BoardError::PrecisionExhausted`] and the caller is
//! expected to renumber the collection.

use crate::config::{OrderingConfig, MAX_EXACT_KEY};
use crate::error::{BoardError, Result};
use std::fmt;
use std::hash::Hash;

/// Anything that carries an identity and a position key
pub trait Positioned {
    type Id: Clone + Eq + Hash + fmt::Display;

    fn position_id(&self) -> &Self::Id;

    fn order_index(&self) -> f64;

    fn set_order_index(&mut self, order_index: f64);
}

/// Produces position keys between existing neighbors
#[derive(Debug, Clone, Copy, Default)]
pub struct PositionSequencer {
    config: OrderingConfig,
}

impl PositionSequencer {
    pub fn new(config: OrderingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &OrderingConfig {
        &self.config
    }

    /// Returns a key strictly between `before` and `after`.
    ///
    /// A missing `before` means "insert at the start", a missing `after`
    /// means "append". With both missing the collection is empty and the
    /// configured seed is returned.
    ///
    /// # Examples
    /// ```
    /// use taskboard_core::domain::position::PositionSequencer;
    ///
    /// let sequencer = PositionSequencer::default();
    /// assert_eq!(sequencer.key_between(Some(1.0), Some(2.0)).unwrap(), 1.5);
    /// assert_eq!(sequencer.key_between(None, Some(1.0)).unwrap(), 0.0);
    /// assert_eq!(sequencer.key_between(Some(3.0), None).unwrap(), 4.0);
    /// assert_eq!(sequencer.key_between(None, None).unwrap(), 1.0);
    /// ```
    pub fn key_between(&self, before: Option<f64>, after: Option<f64>) -> Result<f64> {
        let keys = self.keys_between(before, after, 1)?;
        keys.first()
            .copied()
            .ok_or_else(|| BoardError::precision(before, after))
    }

    /// Returns `count` ascending keys spread evenly over the open interval
    /// between `before` and `after`.
    pub fn keys_between(
        &self,
        before: Option<f64>,
        after: Option<f64>,
        count: usize,
    ) -> Result<Vec<f64>> {
        let exhausted = || BoardError::precision(before, after);

        if before.is_some_and(|b| !b.is_finite()) || after.is_some_and(|a| !a.is_finite()) {
            return Err(exhausted());
        }
        if count == 0 {
            return Ok(Vec::new());
        }

        let step = self.config.step;
        let n = count as f64;
        let keys: Vec<f64> = match (before, after) {
            (Some(lo), Some(hi)) => {
                let span = hi - lo;
                if !(span >= self.config.epsilon * n) {
                    return Err(exhausted());
                }
                if count == 1 {
                    vec![lo + span / 2.0]
                } else {
                    let gap = span / (n + 1.0);
                    (1..=count).map(|i| lo + gap * i as f64).collect()
                }
            }
            (None, Some(hi)) => (0..count).map(|i| hi - step * (n - i as f64)).collect(),
            (Some(lo), None) => (1..=count).map(|i| lo + step * i as f64).collect(),
            (None, None) => (0..count).map(|i| self.config.seed + step * i as f64).collect(),
        };

        let above_lo = |k: f64| before.map_or(true, |lo| k > lo);
        let below_hi = |k: f64| after.map_or(true, |hi| k < hi);
        let ascending = keys.windows(2).all(|pair| pair[0] < pair[1]);

        if ascending && keys.iter().all(|&k| k.is_finite() && above_lo(k) && below_hi(k)) {
            Ok(keys)
        } else {
            Err(exhausted())
        }
    }

    /// Evenly spaced integer-valued keys for a full renumbering pass
    pub fn renumbered(&self, count: usize) -> Result<Vec<f64>> {
        let spacing = self.config.renumber_spacing;
        let top = spacing * count.saturating_sub(1) as f64;
        if !top.is_finite() || top > MAX_EXACT_KEY {
            return Err(BoardError::precision(None, None));
        }
        Ok((0..count).map(|i| spacing * i as f64).collect())
    }
}
