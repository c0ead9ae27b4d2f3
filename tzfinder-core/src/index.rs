//! Packed small sets of time-zone indices.
//!
//! A time-zone index is a 1-based `u16` into the per-tree id table; `0`
//! marks an empty slot. The three set types pack 2, 4 and 8 slots into a
//! `u32`/`u64`/`u128` respectively, with identical semantics: insertion
//! order is preserved, duplicates are absorbed silently, and `add` reports
//! `false` only when a new value meets a full set.
//!
//! [`TimeZoneIndex`] is the leaf payload (at most two zones ever share a
//! cell in the final tree). [`TimeZoneIndex2`] holds overflow candidates in
//! the builder's side table. [`TimeZoneIndex8`] carries the candidate set
//! the consolidator accumulates down a root-to-leaf path.

macro_rules! packed_index_set {
    ($(#[$doc:meta])* $name:ident, $repr:ty, $slots:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        pub struct $name($repr);

        impl $name {
            pub const EMPTY: Self = Self(0);
            pub const SLOTS: usize = $slots;

            /// Slot `i`, or `0` when the slot is vacant.
            #[inline]
            pub fn get(&self, i: usize) -> u16 {
                debug_assert!(i < Self::SLOTS);
                (self.0 >> (i * 16)) as u16
            }

            /// Insert `idx`, keeping duplicates out. Returns `true` when
            /// the value is present afterwards (newly stored or already
            /// there), `false` when every slot is taken.
            pub fn add(&mut self, idx: u16) -> bool {
                debug_assert!(idx > 0, "time-zone indices are 1-based");
                for i in 0..Self::SLOTS {
                    let slot = self.get(i);
                    if slot == idx {
                        return true;
                    }
                    if slot == 0 {
                        self.0 |= (idx as $repr) << (i * 16);
                        return true;
                    }
                }
                false
            }

            pub fn contains(&self, idx: u16) -> bool {
                self.iter().any(|v| v == idx)
            }

            pub fn len(&self) -> usize {
                (0..Self::SLOTS).take_while(|&i| self.get(i) != 0).count()
            }

            pub fn is_empty(&self) -> bool {
                self.0 == 0
            }

            /// Occupied slots in insertion order.
            pub fn iter(&self) -> impl Iterator<Item = u16> + '_ {
                (0..Self::SLOTS)
                    .map(|i| self.get(i))
                    .take_while(|&v| v != 0)
            }
        }
    };
}

packed_index_set!(
    /// Leaf payload: up to two 1-based indices (`first`, `second`).
    ///
    /// Invariants: `first > 0` unless the set is empty, and `second != 0`
    /// implies `first != 0`; both fall out of slot-order insertion.
    TimeZoneIndex,
    u32,
    2
);

packed_index_set!(
    /// Four-slot overflow carrier for the builder's side table.
    TimeZoneIndex2,
    u64,
    4
);

packed_index_set!(
    /// Eight-slot candidate set accumulated during consolidation.
    TimeZoneIndex8,
    u128,
    8
);

impl TimeZoneIndex {
    /// A set holding exactly one index.
    pub fn single(first: u16) -> Self {
        debug_assert!(first > 0);
        Self(first as u32)
    }

    /// Reassemble from raw halves. Used by the deserializer, which has
    /// already validated the invariants against the stream.
    pub fn from_parts(first: u16, second: u16) -> Self {
        Self(first as u32 | (second as u32) << 16)
    }

    pub fn first(&self) -> u16 {
        self.get(0)
    }

    pub fn second(&self) -> u16 {
        self.get(1)
    }

    /// Canonical form: two-entry payloads ordered ascending. Slot order is
    /// insertion order during the build, which depends on worker timing;
    /// serialization always goes through this so that output is
    /// schedule-independent.
    pub fn normalized(self) -> Self {
        let (first, second) = (self.first(), self.second());
        if second != 0 && first > second {
            Self::from_parts(second, first)
        } else {
            self
        }
    }
}
