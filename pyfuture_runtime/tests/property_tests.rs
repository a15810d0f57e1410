//! Property tests for the algebraic laws the runtime types must satisfy.

use proptest::prelude::*;
use pyfuture_runtime::ops::{BinaryOp, binary_op, get_item, iterate};
use pyfuture_runtime::{NewBytes, NewInt, NewRange, NewStr, Slice, Value, register_surrogateescape};

// =============================================================================
// Strategies
// =============================================================================

fn text_in(chars: impl Strategy<Value = char>) -> impl Strategy<Value = String> {
    prop::collection::vec(chars, 0..40).prop_map(|cs| cs.into_iter().collect())
}

fn cp1251_char() -> impl Strategy<Value = char> {
    prop_oneof![
        prop::char::range(' ', '~'),
        prop::char::range('\u{410}', '\u{44F}'),
        Just('\u{401}'),
        Just('\u{451}'),
    ]
}

fn nonzero() -> impl Strategy<Value = i64> {
    any::<i64>().prop_filter("divisor must be non-zero", |n| *n != 0)
}

fn round_trip(text: &str, encoding: &str) -> NewStr {
    let original = NewStr::from(text);
    let encoded = original.encode(encoding, "strict").unwrap();
    NewBytes::from(encoded.as_bytes()).decode(encoding, "strict").unwrap()
}

// =============================================================================
// Integer Division
// =============================================================================

proptest! {
    #[test]
    fn test_floor_division_law(a in any::<i64>(), b in nonzero()) {
        let (a, b) = (NewInt::from(a), NewInt::from(b));
        let q = a.floor_div(&b).unwrap();
        let r = a.modulo(&b).unwrap();
        prop_assert_eq!(&(&q * &b) + &r, a);
        prop_assert!(r.abs() < b.abs());
        prop_assert!(r.is_zero() || r.is_negative() == b.is_negative());
    }

    #[test]
    fn test_divmod_matches_operators(a in any::<i32>(), b in nonzero()) {
        let (x, y) = (Value::from(a), Value::from(b));
        let q = binary_op(BinaryOp::FloorDiv, &x, &y).unwrap();
        let r = binary_op(BinaryOp::Mod, &x, &y).unwrap();
        let pair = pyfuture_runtime::ops::divmod(&x, &y).unwrap();
        prop_assert_eq!(pair, Value::Tuple(vec![q, r]));
    }

    #[test]
    fn test_true_division_matches_float_for_small_ints(
        a in -(1i64 << 52)..(1i64 << 52),
        b in nonzero().prop_map(|n| n % (1 << 52)).prop_filter("non-zero", |n| *n != 0),
    ) {
        let q = NewInt::from(a).true_div(&NewInt::from(b)).unwrap();
        prop_assert_eq!(q, a as f64 / b as f64);
    }
}

// =============================================================================
// Codec Round Trips
// =============================================================================

proptest! {
    #[test]
    fn test_utf8_round_trip(s in any::<String>()) {
        prop_assert_eq!(round_trip(&s, "utf-8"), NewStr::from(s.as_str()));
    }

    #[test]
    fn test_utf16_round_trip(s in any::<String>()) {
        prop_assert_eq!(round_trip(&s, "utf-16"), NewStr::from(s.as_str()));
    }

    #[test]
    fn test_ascii_round_trip(s in text_in(prop::char::range('\0', '\u{7F}'))) {
        prop_assert_eq!(round_trip(&s, "ascii"), NewStr::from(s.as_str()));
    }

    #[test]
    fn test_latin1_round_trip(s in text_in(prop::char::range('\0', '\u{FF}'))) {
        prop_assert_eq!(round_trip(&s, "latin-1"), NewStr::from(s.as_str()));
    }

    #[test]
    fn test_cp1251_round_trip(s in text_in(cp1251_char())) {
        prop_assert_eq!(round_trip(&s, "cp1251"), NewStr::from(s.as_str()));
    }

    #[test]
    fn test_surrogateescape_round_trip(
        raw in prop::collection::vec(0x80u8..=0xFF, 0..40),
        encoding in prop::sample::select(vec!["utf-8", "ascii"]),
    ) {
        register_surrogateescape();
        let data = NewBytes::from(raw.clone());
        let decoded = data.decode(encoding, "surrogateescape").unwrap();
        let encoded = decoded.encode(encoding, "surrogateescape").unwrap();
        prop_assert_eq!(encoded.as_bytes(), raw.as_slice());
    }

    #[test]
    fn test_text_plus_bytes_always_raises(s in any::<String>(), raw in any::<Vec<u8>>()) {
        let text = Value::from(s.as_str());
        let data = Value::from(NewBytes::from(raw));
        prop_assert!(binary_op(BinaryOp::Add, &text, &data).unwrap_err().is_type_error());
        prop_assert!(binary_op(BinaryOp::Add, &data, &text).unwrap_err().is_type_error());
    }
}

// =============================================================================
// Range Slicing
// =============================================================================

fn optional(range: std::ops::Range<i64>) -> impl Strategy<Value = Option<i64>> {
    prop::option::of(range)
}

proptest! {
    #[test]
    fn test_range_slice_matches_list(
        start in -20i64..20,
        stop in -20i64..20,
        step in (-5i64..5).prop_filter("step must be non-zero", |s| *s != 0),
        slice_start in optional(-25..25),
        slice_stop in optional(-25..25),
        slice_step in optional(-4..4).prop_filter("slice step must be non-zero", |s| *s != Some(0)),
    ) {
        let range = Value::from(NewRange::new(start, stop, step).unwrap());
        let slice = Value::Slice(Slice { start: slice_start, stop: slice_stop, step: slice_step });

        let materialized = Value::Tuple(iterate(&range).unwrap());
        let expected = iterate(&get_item(&materialized, &slice).unwrap()).unwrap();
        let sliced = get_item(&range, &slice).unwrap();

        prop_assert!(matches!(sliced, Value::Range(_)));
        prop_assert_eq!(iterate(&sliced).unwrap(), expected);
    }

    #[test]
    fn test_range_membership_matches_iteration(
        start in -30i64..30,
        stop in -30i64..30,
        step in (-6i64..6).prop_filter("step must be non-zero", |s| *s != 0),
        needle in -40i64..40,
    ) {
        let range = NewRange::new(start, stop, step).unwrap();
        let listed: Vec<NewInt> = range.iter().collect();
        let needle_value = Value::from(needle);
        prop_assert_eq!(range.contains(&needle_value), listed.contains(&NewInt::from(needle)));
        prop_assert_eq!(range.len_usize().unwrap(), listed.len());
    }
}
