//! Low/high cost assumptions carried through every derived quantity
//!
//! Each formula is written once and evaluated under both cost levels with
//! [`Range::evaluate`], instead of duplicating it for the min and max case.

use serde::{Deserialize, Serialize};

/// Which end of an estimated cost range a calculation assumes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CostLevel {
    /// Optimistic: every ranged cost at its lower estimate
    Min,
    /// Pessimistic: every ranged cost at its upper estimate
    Max,
}

impl CostLevel {
    pub const ALL: [CostLevel; 2] = [CostLevel::Min, CostLevel::Max];

    pub fn opposite(&self) -> CostLevel {
        match self {
            CostLevel::Min => CostLevel::Max,
            CostLevel::Max => CostLevel::Min,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CostLevel::Min => "min",
            CostLevel::Max => "max",
        }
    }
}

/// A `{min, max}` pair
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Range<T> {
    pub min: T,
    pub max: T,
}

impl<T> Range<T> {
    pub fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    /// Evaluate one formula under both cost levels
    pub fn evaluate<F>(mut f: F) -> Self
    where
        F: FnMut(CostLevel) -> T,
    {
        Self {
            min: f(CostLevel::Min),
            max: f(CostLevel::Max),
        }
    }

    /// Value for a given cost level
    pub fn at(&self, level: CostLevel) -> &T {
        match level {
            CostLevel::Min => &self.min,
            CostLevel::Max => &self.max,
        }
    }

    /// Value under a cost level for a quantity stored with swapped ends, i.e. one
    /// that falls as costs rise (see [`Range::swapped`])
    pub fn at_inverse(&self, level: CostLevel) -> &T {
        self.at(level.opposite())
    }

    pub fn at_mut(&mut self, level: CostLevel) -> &mut T {
        match level {
            CostLevel::Min => &mut self.min,
            CostLevel::Max => &mut self.max,
        }
    }

    pub fn map<U, F>(self, mut f: F) -> Range<U>
    where
        F: FnMut(T) -> U,
    {
        Range {
            min: f(self.min),
            max: f(self.max),
        }
    }

    pub fn zip<U>(self, other: Range<U>) -> Range<(T, U)> {
        Range {
            min: (self.min, other.min),
            max: (self.max, other.max),
        }
    }

    /// Swap the ends. Return-like quantities fall as costs rise, so their lower
    /// bound comes from the max-cost evaluation.
    pub fn swapped(self) -> Self {
        Self {
            min: self.max,
            max: self.min,
        }
    }
}

impl Range<f64> {
    pub fn point(value: f64) -> Self {
        Self::new(value, value)
    }

    /// Reorder so that `min <= max`
    pub fn ordered(self) -> Self {
        if self.min <= self.max {
            self
        } else {
            self.swapped()
        }
    }

}

impl Range<Option<f64>> {
    /// Reorder so that `min <= max` when both ends are defined.
    ///
    /// Ratios such as ROI are not monotone in cost: with a loss, a larger
    /// investment gives a less negative ratio. They are evaluated per level and
    /// ordered by value afterwards.
    pub fn ordered(self) -> Self {
        match (self.min, self.max) {
            (Some(min), Some(max)) if min > max => self.swapped(),
            _ => self,
        }
    }
}
