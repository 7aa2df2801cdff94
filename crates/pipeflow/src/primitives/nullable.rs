//! Absent-value detection.
//!
//! Element types that admit an absent value (such as `Option<T>`) report it
//! through [`Nullable`]. Deduplicating stages route absent values through a
//! one-shot flag instead of storing them as set keys.

/// Element types that may carry an absent value.
pub trait Nullable {
    /// Whether this value is the absent value. Defaults to `false`.
    fn is_null(&self) -> bool {
        false
    }
}

impl<T> Nullable for Option<T> {
    #[inline]
    fn is_null(&self) -> bool {
        self.is_none()
    }
}

macro_rules! never_null {
    ($($t:ty),* $(,)?) => {
        $(impl Nullable for $t {})*
    };
}

never_null!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, bool, char, String, &'static str,
);

impl<T> Nullable for Vec<T> {}

impl<T: Nullable + ?Sized> Nullable for Box<T> {
    fn is_null(&self) -> bool {
        (**self).is_null()
    }
}

impl<A, B> Nullable for (A, B) {}

impl<A, B, C> Nullable for (A, B, C) {}
