//! The [`Assignment`]: a heterogeneous mapping from value handles to
//! lattice values. Variables that were never written hold their lattice's
//! bottom element.

use super::lattice::{AnyValue, Lattice};
use super::value_id::{TypedValueId, ValueId};
use itertools::Itertools;
use std::{
    collections::{BTreeMap, HashMap},
    fmt,
};

/// How a value moved under a meet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Change {
    /// The value was already an upper bound of the source.
    Unchanged,
    /// The value strictly grew.
    Grew,
}

/// One stored value together with a change stamp.
///
/// The stamp moves every time the value may have changed; the engine
/// compares stamps around an update to see which outputs actually moved.
struct Slot {
    value: Box<AnyValue>,
    stamp: u64,
}

/// A mapping from value handles to values of their respective lattices.
///
/// Reads never fail: a variable without an entry reads as the bottom
/// element of its lattice. Values only ever grow while the solver runs;
/// [`set`](Assignment::set) is meant for seeding and tests.
#[derive(Default)]
pub struct Assignment {
    slots: HashMap<ValueId, Slot>,
}

impl Assignment {
    /// Constructs an empty assignment; every variable reads as bottom.
    pub fn new() -> Self {
        Self::default()
    }

    fn slot_mut<L: Lattice>(&mut self, v: TypedValueId<L>) -> &mut Slot {
        let key = ValueId::from(v);
        self.slots.entry(key).or_insert_with(|| Slot {
            value: (key.ops().bottom)(),
            stamp: 0,
        })
    }

    /// Returns the current value of `v`, materializing bottom if absent.
    pub fn get<L: Lattice>(&mut self, v: TypedValueId<L>) -> &L::Value {
        self.slot_mut(v)
            .value
            .downcast_ref::<L::Value>()
            .expect("slot keyed by lattice tag holds the lattice's value type")
    }

    /// Returns the current value of `v` without materializing anything.
    /// `None` means the variable is at bottom.
    pub fn peek<L: Lattice>(&self, v: TypedValueId<L>) -> Option<&L::Value> {
        self.slots.get(&ValueId::from(v)).map(|slot| {
            slot.value
                .downcast_ref::<L::Value>()
                .expect("slot keyed by lattice tag holds the lattice's value type")
        })
    }

    /// Returns a mutable reference to the current value of `v`,
    /// materializing bottom if absent.
    ///
    /// The variable counts as changed afterwards; constraints that end up
    /// not modifying it should report
    /// [`Unchanged`](crate::model::UpdateResult::Unchanged) instead of
    /// borrowing mutably.
    pub fn get_mut<L: Lattice>(&mut self, v: TypedValueId<L>) -> &mut L::Value {
        let slot = self.slot_mut(v);
        slot.stamp += 1;
        slot.value
            .downcast_mut::<L::Value>()
            .expect("slot keyed by lattice tag holds the lattice's value type")
    }

    /// Overwrites the value of `v`. Seed and test use only; the engine
    /// itself advances values through [`meet_assign`](Assignment::meet_assign).
    pub fn set<L: Lattice>(&mut self, v: TypedValueId<L>, value: L::Value) {
        let slot = self.slot_mut(v);
        slot.value = Box::new(value);
        slot.stamp += 1;
    }

    /// Meets `src` into the value of `v` and reports whether it grew.
    ///
    /// Dispatches through the lattice's operation table, like every other
    /// operation the engine performs on values it cannot name.
    pub fn meet_assign<L: Lattice>(&mut self, v: TypedValueId<L>, src: &L::Value) -> Change {
        let key = ValueId::from(v);
        let slot = self.slot_mut(v);
        if (key.ops().meet_assign)(&mut *slot.value, src) {
            slot.stamp += 1;
            Change::Grew
        } else {
            Change::Unchanged
        }
    }

    /// Returns true if every value in `self` is below its value in
    /// `other`, by the respective lattice orders.
    pub fn less_or_equal(&self, other: &Assignment) -> bool {
        self.non_bottom().all(|(id, slot)| {
            other
                .slots
                .get(id)
                .map_or(false, |o| (id.ops().less)(&*slot.value, &*o.value))
        })
    }

    /// Returns the change stamp of `v`; 0 if never written.
    pub(crate) fn stamp(&self, v: ValueId) -> u64 {
        self.slots.get(&v).map_or(0, |slot| slot.stamp)
    }

    /// Puts `v` back to the bottom of its lattice. Used by the engine when
    /// a non-monotone rewrite invalidates values derived from `v`'s old
    /// value.
    pub(crate) fn reset(&mut self, v: ValueId) {
        if let Some(slot) = self.slots.get_mut(&v) {
            slot.value = (v.ops().bottom)();
            slot.stamp += 1;
        }
    }

    /// Returns true if `v` currently holds the bottom element of its lattice.
    pub fn is_bottom(&self, v: impl Into<ValueId>) -> bool {
        let v = v.into();
        self.slots
            .get(&v)
            .map_or(true, |slot| (v.ops().is_bottom)(&*slot.value))
    }

    /// Returns a diagnostic snapshot: the rendered value of every
    /// non-bottom variable, ordered by id.
    pub fn to_map(&self) -> BTreeMap<ValueId, String> {
        self.non_bottom()
            .map(|(id, slot)| (*id, DisplayValue { id: *id, slot }.to_string()))
            .collect()
    }

    fn non_bottom(&self) -> impl Iterator<Item = (&ValueId, &Slot)> {
        self.slots
            .iter()
            .filter(|(id, slot)| !(id.ops().is_bottom)(&*slot.value))
    }
}

/// Renders a slot's value through its lattice's operation table.
struct DisplayValue<'a> {
    id: ValueId,
    slot: &'a Slot,
}

impl fmt::Display for DisplayValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        (self.id.ops().fmt)(&*self.slot.value, f)
    }
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self
            .non_bottom()
            .sorted_by_key(|entry| *entry.0)
            .map(|(id, slot)| format!("{}={}", id, DisplayValue { id: *id, slot }))
            .join(",");
        write!(f, "{{{}}}", entries)
    }
}

impl fmt::Debug for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl Clone for Assignment {
    fn clone(&self) -> Self {
        let slots = self
            .slots
            .iter()
            .map(|(id, slot)| {
                (
                    *id,
                    Slot {
                        value: (id.ops().clone)(&*slot.value),
                        stamp: slot.stamp,
                    },
                )
            })
            .collect();
        Assignment { slots }
    }
}

impl PartialEq for Assignment {
    /// Equality modulo bottom: a materialized bottom slot is equal to an
    /// absent one.
    fn eq(&self, other: &Self) -> bool {
        if self.non_bottom().count() != other.non_bottom().count() {
            return false;
        }
        self.non_bottom().all(|(id, slot)| {
            other
                .slots
                .get(id)
                .map_or(false, |o| (id.ops().eq)(&*slot.value, &*o.value))
        })
    }
}
