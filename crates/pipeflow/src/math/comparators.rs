//! Comparator combinators.
//!
//! Comparators are plain `Fn(&T, &T) -> Ordering` closures, usable with
//! `sorted_by`, `min_by` and `max_by`. Auto traits pass through, so a
//! combinator built from `Send + Sync` parts is itself `Send + Sync`.

// External dependencies
use core::cmp::Ordering;

/// Natural ascending order.
pub fn natural_order<T: Ord>() -> impl Fn(&T, &T) -> Ordering + Copy {
    |a: &T, b: &T| a.cmp(b)
}

/// Natural descending order.
pub fn reverse_order<T: Ord>() -> impl Fn(&T, &T) -> Ordering + Copy {
    |a: &T, b: &T| b.cmp(a)
}

/// Reverse an arbitrary comparator.
pub fn reversed<T, C>(cmp: C) -> impl Fn(&T, &T) -> Ordering
where
    C: Fn(&T, &T) -> Ordering,
{
    move |a, b| cmp(b, a)
}

/// Compare by an extracted key.
pub fn comparing<T, K, F>(key: F) -> impl Fn(&T, &T) -> Ordering
where
    K: Ord,
    F: Fn(&T) -> K,
{
    move |a, b| key(a).cmp(&key(b))
}

/// Order absent values before present ones; present values use `cmp`.
pub fn nulls_first<T, C>(cmp: C) -> impl Fn(&Option<T>, &Option<T>) -> Ordering
where
    C: Fn(&T, &T) -> Ordering,
{
    move |a, b| match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => cmp(x, y),
    }
}

/// Order absent values after present ones; present values use `cmp`.
pub fn nulls_last<T, C>(cmp: C) -> impl Fn(&Option<T>, &Option<T>) -> Ordering
where
    C: Fn(&T, &T) -> Ordering,
{
    move |a, b| match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => cmp(x, y),
    }
}

/// Use `second` to break ties left by `first`.
pub fn then_comparing<T, A, B>(first: A, second: B) -> impl Fn(&T, &T) -> Ordering
where
    A: Fn(&T, &T) -> Ordering,
    B: Fn(&T, &T) -> Ordering,
{
    move |a, b| first(a, b).then_with(|| second(a, b))
}

/// Total order on `f64`: -0.0 sorts before 0.0 and every NaN sorts after
/// positive infinity, all NaNs comparing equal.
pub fn double_order(a: &f64, b: &f64) -> Ordering {
    if a < b {
        return Ordering::Less;
    }
    if a > b {
        return Ordering::Greater;
    }
    canonical_bits(*a).cmp(&canonical_bits(*b))
}

/// Bit pattern of `value` with every NaN mapped to the canonical NaN.
pub fn canonical_bits(value: f64) -> i64 {
    if value.is_nan() {
        f64::NAN.to_bits() as i64
    } else {
        value.to_bits() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_order_is_total() {
        let mut values = vec![f64::NAN, 1.0, 0.0, -0.0, f64::NEG_INFINITY, f64::INFINITY];
        values.sort_by(double_order);
        assert_eq!(values[0], f64::NEG_INFINITY);
        assert!(values[1].is_sign_negative() && values[1] == 0.0);
        assert!(values[2].is_sign_positive() && values[2] == 0.0);
        assert_eq!(values[3], 1.0);
        assert_eq!(values[4], f64::INFINITY);
        assert!(values[5].is_nan());
    }

    #[test]
    fn test_nulls_first_orders_absent_before_present() {
        let mut values = vec![Some(2), None, Some(1)];
        values.sort_by(nulls_first(natural_order()));
        assert_eq!(values, vec![None, Some(1), Some(2)]);
    }
}
