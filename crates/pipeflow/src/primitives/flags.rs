//! Flag algebra describing known pipeline properties.
//!
//! ## Purpose
//!
//! Every point in a stage chain carries a [`StreamFlags`] value recording which
//! of ORDERED, SORTED, DISTINCT, SIZED and SHORT_CIRCUIT are known to hold,
//! known not to hold, or unknown. Later stages and terminal operations read
//! these flags to choose cheaper algorithms without re-scanning the chain.
//!
//! ## Design notes
//!
//! * **Tri-state**: Two bitsets, `set` (known-true) and `cleared` (known-false).
//!   A flag in neither is unknown.
//! * **Deltas**: A stage contributes a [`FlagDelta`]; composition is
//!   `(U ∪ D.set) \ D.clear`, with the clear applied last.
//! * **Monotonic short-circuit**: A delta can never clear SHORT_CIRCUIT.
//!
//! ## Invariants
//!
//! * `set & cleared == 0` for every value.
//! * Flags are computed once when a stage is appended and never recomputed.

// External dependencies
use core::fmt::{Debug, Formatter, Result};
use core::ops::BitOr;
use serde::{Deserialize, Serialize};

// ============================================================================
// Flag Bits
// ============================================================================

/// State of a single flag at a point in the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagState {
    /// The property is known to hold.
    KnownTrue,
    /// The property is known not to hold.
    KnownFalse,
    /// Nothing is known about the property.
    Unknown,
}

/// Set of pipeline properties with known-true / known-false tracking.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct StreamFlags {
    set: u8,
    cleared: u8,
}

impl StreamFlags {
    /// Elements are produced in a defined encounter order.
    pub const ORDERED: Self = Self::bits(0b0_0001);
    /// Elements are sorted in natural order (implies ORDERED).
    pub const SORTED: Self = Self::bits(0b0_0010);
    /// No two elements are equal.
    pub const DISTINCT: Self = Self::bits(0b0_0100);
    /// The exact number of elements is known before traversal.
    pub const SIZED: Self = Self::bits(0b0_1000);
    /// Evaluation may finish before the source is exhausted.
    pub const SHORT_CIRCUIT: Self = Self::bits(0b1_0000);

    /// No flag known either way.
    pub const EMPTY: Self = Self { set: 0, cleared: 0 };

    /// Flags a cursor may report as characteristics.
    pub const CURSOR_MASK: u8 = 0b0_1111;

    const fn bits(set: u8) -> Self {
        Self { set, cleared: 0 }
    }

    /// Build a value from raw known-true bits.
    pub const fn from_set_bits(set: u8) -> Self {
        Self {
            set: set & 0b1_1111,
            cleared: 0,
        }
    }

    /// Raw known-true bits.
    pub const fn set_bits(self) -> u8 {
        self.set
    }

    /// Whether every flag in `other` is known-true here.
    #[inline]
    pub const fn is_known(self, other: Self) -> bool {
        other.set != 0 && self.set & other.set == other.set
    }

    /// Whether every flag in `other` is known-false here.
    #[inline]
    pub const fn is_cleared(self, other: Self) -> bool {
        other.set != 0 && self.cleared & other.set == other.set
    }

    /// Tri-state view of a single flag.
    pub fn state(self, flag: Self) -> FlagState {
        if self.is_known(flag) {
            FlagState::KnownTrue
        } else if self.is_cleared(flag) {
            FlagState::KnownFalse
        } else {
            FlagState::Unknown
        }
    }

    /// Shorthand for `is_known(ORDERED)`.
    #[inline]
    pub const fn is_ordered(self) -> bool {
        self.is_known(Self::ORDERED)
    }

    /// Shorthand for `is_known(SORTED)`.
    #[inline]
    pub const fn is_sorted(self) -> bool {
        self.is_known(Self::SORTED)
    }

    /// Shorthand for `is_known(DISTINCT)`.
    #[inline]
    pub const fn is_distinct(self) -> bool {
        self.is_known(Self::DISTINCT)
    }

    /// Shorthand for `is_known(SIZED)`.
    #[inline]
    pub const fn is_sized(self) -> bool {
        self.is_known(Self::SIZED)
    }

    /// Shorthand for `is_known(SHORT_CIRCUIT)`.
    #[inline]
    pub const fn is_short_circuit(self) -> bool {
        self.is_known(Self::SHORT_CIRCUIT)
    }

    /// Initial flags for a source reporting `characteristics`.
    ///
    /// SORTED without ORDERED is meaningless, so ORDERED is implied. Only the
    /// cursor-reportable subset survives.
    pub fn for_source(characteristics: Self) -> Self {
        let mut set = characteristics.set & Self::CURSOR_MASK;
        if set & Self::SORTED.set != 0 {
            set |= Self::ORDERED.set;
        }
        Self { set, cleared: 0 }
    }

    /// Combine upstream flags with a stage delta.
    pub fn combine(self, delta: FlagDelta) -> Self {
        let set = (self.set | delta.set) & !delta.clear;
        let cleared = (self.cleared & !delta.set) | delta.clear;
        Self { set, cleared }
    }

    /// Known-true flags of both values, for building flag constants.
    pub const fn union(self, other: Self) -> Self {
        Self {
            set: self.set | other.set,
            cleared: 0,
        }
    }

    /// Same flags with `other` additionally known-true.
    pub fn with(self, other: Self) -> Self {
        Self {
            set: self.set | other.set,
            cleared: self.cleared & !other.set,
        }
    }
}

impl BitOr for StreamFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.with(rhs)
    }
}

impl Debug for StreamFlags {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        const NAMES: [(StreamFlags, &str); 5] = [
            (StreamFlags::ORDERED, "ORDERED"),
            (StreamFlags::SORTED, "SORTED"),
            (StreamFlags::DISTINCT, "DISTINCT"),
            (StreamFlags::SIZED, "SIZED"),
            (StreamFlags::SHORT_CIRCUIT, "SHORT_CIRCUIT"),
        ];
        let mut list = f.debug_list();
        for (flag, name) in NAMES {
            match self.state(flag) {
                FlagState::KnownTrue => {
                    list.entry(&format_args!("+{name}"));
                }
                FlagState::KnownFalse => {
                    list.entry(&format_args!("-{name}"));
                }
                FlagState::Unknown => {}
            }
        }
        list.finish()
    }
}

// ============================================================================
// Flag Delta
// ============================================================================

/// Flags a stage forces on and off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlagDelta {
    set: u8,
    clear: u8,
}

impl FlagDelta {
    /// A delta that preserves everything.
    pub const NONE: Self = Self { set: 0, clear: 0 };

    /// Create a delta; SHORT_CIRCUIT is stripped from `clear`.
    pub const fn new(set: StreamFlags, clear: StreamFlags) -> Self {
        Self {
            set: set.set,
            clear: clear.set & !StreamFlags::SHORT_CIRCUIT.set,
        }
    }

    /// A delta that only sets `flags`.
    pub const fn setting(flags: StreamFlags) -> Self {
        Self::new(flags, StreamFlags::EMPTY)
    }

    /// A delta that only clears `flags`.
    pub const fn clearing(flags: StreamFlags) -> Self {
        Self::new(StreamFlags::EMPTY, flags)
    }

    /// Flags forced on.
    pub const fn set(self) -> StreamFlags {
        StreamFlags::from_set_bits(self.set)
    }

    /// Flags forced off.
    pub const fn clear(self) -> StreamFlags {
        StreamFlags::from_set_bits(self.clear)
    }

    /// Merge two deltas, `other` applied after `self`.
    pub const fn then(self, other: Self) -> Self {
        let set = (self.set & !other.clear) | other.set;
        let clear = (self.clear & !other.set) | other.clear;
        Self { set, clear }
    }

    /// Whether this delta makes evaluation short-circuiting.
    pub const fn is_short_circuit(self) -> bool {
        self.set & StreamFlags::SHORT_CIRCUIT.set != 0
    }
}
