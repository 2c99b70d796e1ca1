//! Vector clock engine
//!
//! Each participant owns one `VectorClock` of fixed length N, one slot per
//! participant. Slot `i` is only ever incremented by participant `i`; remote
//! history enters through `merge`, which takes the element-wise maximum.
//!
//! Clocks are snapshotted (`Clone`) whenever they are attached to an
//! outgoing message or a history record - the live clock keeps mutating and
//! must never be aliased into a payload.

use std::fmt;

use crate::{VectraError, VectraResult};

/// Causal relationship between two events, derived from their clocks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CausalOrder {
    /// Left event happened before the right one.
    HappensBefore,
    /// Left event happened after the right one.
    HappensAfter,
    /// Identical clocks (same event, or a replay).
    Equal,
    /// Mutually incomparable - neither causally precedes the other.
    Concurrent,
}

/// Fixed-length vector clock.
///
/// INVARIANT: the slot count equals the participant count N for the whole
/// lifetime of the clock; it never grows or shrinks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VectorClock {
    slots: Vec<u64>,
}

impl VectorClock {
    /// All-zero clock for a system of `participants` processes.
    pub fn new(participants: usize) -> Self {
        VectorClock {
            slots: vec![0; participants],
        }
    }

    /// Rebuild a clock from raw slot values (wire decode path).
    pub fn from_slots(slots: Vec<u64>) -> Self {
        VectorClock { slots }
    }

    /// Number of slots (the participant count N).
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Value of slot `index`, or 0 if out of range.
    #[inline]
    pub fn get(&self, index: usize) -> u64 {
        self.slots.get(index).copied().unwrap_or(0)
    }

    #[inline]
    pub fn as_slice(&self) -> &[u64] {
        &self.slots
    }

    /// Advance the owner's slot by one.
    ///
    /// Precondition: `index < N`. Only the owning participant may call this
    /// with its own index.
    pub fn increment(&mut self, index: usize) {
        debug_assert!(index < self.slots.len());
        self.slots[index] += 1;
    }

    /// Merge a remote clock into this one (element-wise maximum).
    ///
    /// A length mismatch is a protocol violation: the merge is rejected
    /// whole, with no partial mutation.
    pub fn merge(&mut self, other: &VectorClock) -> VectraResult<()> {
        if other.len() != self.len() {
            return Err(VectraError::ClockLengthMismatch {
                expected: self.len(),
                actual: other.len(),
            });
        }

        for (slot, &remote) in self.slots.iter_mut().zip(&other.slots) {
            *slot = (*slot).max(remote);
        }

        Ok(())
    }

    /// Causal comparison of two clocks of equal length.
    ///
    /// `a <= b` element-wise (and `a != b`) means `a` happens-before `b`;
    /// the symmetric case is happens-after; slot-for-slot equality is
    /// `Equal`; everything else is `Concurrent`.
    pub fn compare(&self, other: &VectorClock) -> CausalOrder {
        let mut less = false;
        let mut greater = false;

        for (&a, &b) in self.slots.iter().zip(&other.slots) {
            if a < b {
                less = true;
            } else if a > b {
                greater = true;
            }
        }

        match (less, greater) {
            (false, false) => CausalOrder::Equal,
            (true, false) => CausalOrder::HappensBefore,
            (false, true) => CausalOrder::HappensAfter,
            (true, true) => CausalOrder::Concurrent,
        }
    }
}

impl fmt::Display for VectorClock {
    /// Comma-joined slots, no spaces: `2,0,1`. This exact form is embedded
    /// in history entry text, so it must stay stable.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, slot) in self.slots.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", slot)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_new_clock_is_all_zero() {
        let clock = VectorClock::new(4);
        assert_eq!(clock.len(), 4);
        assert_eq!(clock.as_slice(), &[0, 0, 0, 0]);
    }

    #[test]
    fn test_increment_touches_only_own_slot() {
        let mut clock = VectorClock::new(3);
        clock.increment(1);
        assert_eq!(clock.as_slice(), &[0, 1, 0]);
        clock.increment(1);
        assert_eq!(clock.as_slice(), &[0, 2, 0]);
    }

    #[test]
    fn test_merge_is_elementwise_max() {
        let mut a = VectorClock::from_slots(vec![3, 0, 5]);
        let b = VectorClock::from_slots(vec![1, 4, 5]);
        a.merge(&b).unwrap();
        assert_eq!(a.as_slice(), &[3, 4, 5]);
    }

    #[test]
    fn test_merge_rejects_length_mismatch_without_mutation() {
        let mut a = VectorClock::from_slots(vec![1, 2, 3]);
        let b = VectorClock::from_slots(vec![9, 9]);
        let err = a.merge(&b).unwrap_err();
        assert!(matches!(
            err,
            VectraError::ClockLengthMismatch {
                expected: 3,
                actual: 2
            }
        ));
        assert_eq!(a.as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn test_compare_equal() {
        let a = VectorClock::from_slots(vec![1, 2]);
        let b = VectorClock::from_slots(vec![1, 2]);
        assert_eq!(a.compare(&b), CausalOrder::Equal);
    }

    #[test]
    fn test_compare_happens_before_and_after() {
        let a = VectorClock::from_slots(vec![1, 0, 0]);
        let b = VectorClock::from_slots(vec![2, 0, 1]);
        assert_eq!(a.compare(&b), CausalOrder::HappensBefore);
        assert_eq!(b.compare(&a), CausalOrder::HappensAfter);
    }

    #[test]
    fn test_compare_concurrent() {
        let a = VectorClock::from_slots(vec![1, 0]);
        let b = VectorClock::from_slots(vec![0, 1]);
        assert_eq!(a.compare(&b), CausalOrder::Concurrent);
        assert_eq!(b.compare(&a), CausalOrder::Concurrent);
    }

    #[test]
    fn test_display_is_comma_joined() {
        let clock = VectorClock::from_slots(vec![2, 0, 1]);
        assert_eq!(clock.to_string(), "2,0,1");
    }

    proptest! {
        #[test]
        fn prop_merge_dominates_both_inputs(
            a in prop::collection::vec(0u64..1000, 5),
            b in prop::collection::vec(0u64..1000, 5),
        ) {
            let mut merged = VectorClock::from_slots(a.clone());
            let other = VectorClock::from_slots(b.clone());
            merged.merge(&other).unwrap();

            for i in 0..5 {
                prop_assert!(merged.get(i) >= a[i]);
                prop_assert!(merged.get(i) >= b[i]);
                prop_assert_eq!(merged.get(i), a[i].max(b[i]));
            }
        }

        #[test]
        fn prop_compare_antisymmetric(
            a in prop::collection::vec(0u64..8, 4),
            b in prop::collection::vec(0u64..8, 4),
        ) {
            let a = VectorClock::from_slots(a);
            let b = VectorClock::from_slots(b);

            let expected = match a.compare(&b) {
                CausalOrder::HappensBefore => CausalOrder::HappensAfter,
                CausalOrder::HappensAfter => CausalOrder::HappensBefore,
                other => other,
            };
            prop_assert_eq!(b.compare(&a), expected);
        }

        #[test]
        fn prop_increment_then_compare_is_after(
            slots in prop::collection::vec(0u64..1000, 3),
            index in 0usize..3,
        ) {
            let before = VectorClock::from_slots(slots);
            let mut after = before.clone();
            after.increment(index);
            prop_assert_eq!(after.compare(&before), CausalOrder::HappensAfter);
            prop_assert_eq!(before.compare(&after), CausalOrder::HappensBefore);
        }
    }
}
