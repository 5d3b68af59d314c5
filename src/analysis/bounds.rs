//! Integer interval bounds with an explicit "unbounded" upper end.

use serde::{Deserialize, Serialize};

/// A `[min, max]` interval over non-negative integers.
///
/// `max == None` means no upper bound has been proven yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bound {
    pub min: u64,
    pub max: Option<u64>,
}

impl Bound {
    /// `[value, value]`.
    pub fn exact(value: u64) -> Self {
        Self {
            min: value,
            max: Some(value),
        }
    }

    /// `[min, +inf)`.
    pub fn at_least(min: u64) -> Self {
        Self { min, max: None }
    }

    /// `[min, max]`.
    pub fn between(min: u64, max: u64) -> Self {
        Self { min, max: Some(max) }
    }

    /// Whether min and max coincide.
    pub fn is_fixed(&self) -> bool {
        self.max == Some(self.min)
    }

    /// The value, when fixed.
    pub fn value(&self) -> Option<u64> {
        self.is_fixed().then_some(self.min)
    }

    /// Number of candidate values (`max - min + 1`), `None` when unbounded.
    pub fn width(&self) -> Option<u64> {
        self.max.map(|max| max.saturating_sub(self.min) + 1)
    }

    /// Whether `other` is at least as tight as `self` on both ends.
    pub fn contains(&self, other: &Bound) -> bool {
        let max_ok = match (self.max, other.max) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(a), Some(b)) => b <= a,
        };
        other.min >= self.min && max_ok
    }
}

impl std::fmt::Display for Bound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.max {
            Some(max) if max == self.min => write!(f, "{max}"),
            Some(max) => write!(f, "[{}, {max}]", self.min),
            None => write!(f, "[{}, ∞)", self.min),
        }
    }
}
