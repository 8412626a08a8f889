//! Solver-facing encoding of a fixing mask.
//!
//! Each original variable is either free, carrying its index in the reduced
//! space, or fixed at 0 or 1. Backends use the bridge to rebuild a full
//! selection from a reduced solution without holding the mask itself.

use serde::Serialize;

use super::error::MaskError;

/// Raw encoding of a variable fixed at 0.
pub const RAW_FIXED_ZERO: i64 = -1;
/// Raw encoding of a variable fixed at 1.
pub const RAW_FIXED_ONE: i64 = -2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BridgeSlot {
    Free(usize),
    FixedZero,
    FixedOne,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bridge {
    slots: Vec<BridgeSlot>,
    n_free: usize,
}

impl Bridge {
    /// Bridge of `n` free variables and nothing fixed.
    pub fn identity(n: usize) -> Self {
        Self {
            slots: (0..n).map(BridgeSlot::Free).collect(),
            n_free: n,
        }
    }

    pub fn from_slots(slots: Vec<BridgeSlot>) -> Result<Self, MaskError> {
        let n_free = Self::check(&slots).ok_or(MaskError::InvalidBridge)?;
        Ok(Self { slots, n_free })
    }

    /// Decode the `-1` / `-2` / free-index integer form.
    pub fn from_raw(raw: &[i64]) -> Result<Self, MaskError> {
        let slots = raw
            .iter()
            .map(|&value| match value {
                RAW_FIXED_ZERO => Ok(BridgeSlot::FixedZero),
                RAW_FIXED_ONE => Ok(BridgeSlot::FixedOne),
                v => usize::try_from(v)
                    .map(BridgeSlot::Free)
                    .map_err(|_| MaskError::InvalidBridge),
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_slots(slots)
    }

    /// Number of free variables when the free slots are numbered
    /// contiguously from zero in original order.
    pub fn check(slots: &[BridgeSlot]) -> Option<usize> {
        let mut next = 0;
        for slot in slots {
            if let BridgeSlot::Free(id) = *slot {
                if id != next {
                    return None;
                }
                next += 1;
            }
        }
        Some(next)
    }

    pub fn to_raw(&self) -> Vec<i64> {
        self.slots
            .iter()
            .map(|slot| match slot {
                BridgeSlot::Free(id) => *id as i64,
                BridgeSlot::FixedZero => RAW_FIXED_ZERO,
                BridgeSlot::FixedOne => RAW_FIXED_ONE,
            })
            .collect()
    }

    pub fn slots(&self) -> &[BridgeSlot] {
        &self.slots
    }

    /// Number of original variables.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn n_free(&self) -> usize {
        self.n_free
    }

    /// Rebuild a full vector in the original space from a reduced one.
    pub fn expand(&self, reduced: &[f64]) -> Result<Vec<f64>, MaskError> {
        if reduced.len() != self.n_free {
            return Err(MaskError::DimensionMismatch {
                expected: self.n_free,
                found: reduced.len(),
            });
        }
        Ok(self
            .slots
            .iter()
            .map(|slot| match slot {
                BridgeSlot::Free(id) => reduced[*id],
                BridgeSlot::FixedZero => 0.0,
                BridgeSlot::FixedOne => 1.0,
            })
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn identity_counts_every_slot_as_free() {
        let bridge = Bridge::identity(3);
        assert_eq!(bridge.n_free(), 3);
        assert_eq!(bridge.to_raw(), vec![0, 1, 2]);
    }

    #[test]
    fn raw_form_round_trips() {
        let bridge = Bridge::from_raw(&[-1, 0, -2, 1]).unwrap();
        assert_eq!(
            bridge.slots(),
            &[
                BridgeSlot::FixedZero,
                BridgeSlot::Free(0),
                BridgeSlot::FixedOne,
                BridgeSlot::Free(1)
            ]
        );
        assert_eq!(bridge.to_raw(), vec![-1, 0, -2, 1]);
    }

    #[test]
    fn check_rejects_gaps_and_reordering() {
        assert_eq!(Bridge::check(&[BridgeSlot::Free(1)]), None);
        assert_eq!(
            Bridge::check(&[BridgeSlot::Free(1), BridgeSlot::Free(0)]),
            None
        );
        assert_eq!(Bridge::from_raw(&[0, -3]), Err(MaskError::InvalidBridge));
        assert_eq!(Bridge::check(&[BridgeSlot::FixedOne]), Some(0));
    }

    #[test]
    fn expand_fills_fixed_slots() {
        let bridge = Bridge::from_raw(&[-2, 0, -1, 1]).unwrap();
        assert_eq!(bridge.expand(&[0.0, 1.0]).unwrap(), vec![1.0, 0.0, 0.0, 1.0]);
        assert_eq!(
            bridge.expand(&[1.0]),
            Err(MaskError::DimensionMismatch {
                expected: 2,
                found: 1
            })
        );
    }
}
