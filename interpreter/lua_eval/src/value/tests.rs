use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;

fn sample_values() -> Vec<Value> {
    vec![
        Value::Nil,
        Value::Boolean(true),
        Value::Boolean(false),
        Value::Number(0.0),
        Value::Number(-1.5),
        Value::string(""),
        Value::string("abc"),
        Value::table(Table::new()),
    ]
}

// Type tags

#[test]
fn type_names_are_the_lua_tags() {
    assert_eq!(Value::Nil.type_name(), "nil");
    assert_eq!(Value::Boolean(true).type_name(), "boolean");
    assert_eq!(Value::Number(1.0).type_name(), "number");
    assert_eq!(Value::string("x").type_name(), "string");
    assert_eq!(Value::table(Table::new()).type_name(), "table");
    assert_eq!(TypeTag::Thread.name(), "thread");
    assert_eq!(TypeTag::Userdata.name(), "userdata");
}

#[test]
fn every_tag_has_a_distinct_name() {
    let mut names: Vec<_> = TypeTag::ALL.iter().map(|t| t.name()).collect();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), TypeTag::ALL.len());
}

// Truthiness

#[test]
fn only_nil_and_false_are_falsy() {
    assert!(!Value::Nil.is_truthy());
    assert!(!Value::Boolean(false).is_truthy());
    assert!(Value::Boolean(true).is_truthy());
    assert!(Value::Number(0.0).is_truthy());
    assert!(Value::string("").is_truthy());
    assert!(Value::table(Table::new()).is_truthy());
}

// Equality

#[test]
fn nil_is_a_singleton() {
    assert_eq!(Value::Nil, Value::Nil);
}

#[test]
fn numbers_compare_ieee() {
    assert_eq!(Value::Number(0.0), Value::Number(-0.0));
    assert_ne!(Value::Number(f64::NAN), Value::Number(f64::NAN));
    assert_eq!(Value::Number(1.5), Value::Number(1.5));
}

#[test]
fn strings_compare_by_content() {
    assert_eq!(Value::string("ab"), Value::string(String::from("ab")));
    assert_ne!(Value::string("ab"), Value::string("ac"));
}

#[test]
fn tables_compare_by_identity() {
    let a = Value::table(Table::new());
    let b = a.clone();
    let c = Value::table(Table::new());
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn values_of_different_tags_never_compare_equal() {
    let values = sample_values();
    for (i, a) in values.iter().enumerate() {
        for (j, b) in values.iter().enumerate() {
            if a.type_tag() != b.type_tag() {
                assert_ne!(a, b, "values {i} and {j} should differ");
            }
        }
    }
}

// Coercion

#[test]
fn coerce_number_accepts_numeric_strings() {
    assert_eq!(Value::string("2").coerce_number(), Some(2.0));
    assert_eq!(Value::string(" 3.5 ").coerce_number(), Some(3.5));
    assert_eq!(Value::string("1e2").coerce_number(), Some(100.0));
    assert_eq!(Value::string("-4").coerce_number(), Some(-4.0));
}

#[test]
fn coerce_number_rejects_non_numeric() {
    assert_eq!(Value::string("x").coerce_number(), None);
    assert_eq!(Value::string("").coerce_number(), None);
    assert_eq!(Value::string("inf").coerce_number(), None);
    assert_eq!(Value::string("nan").coerce_number(), None);
    assert_eq!(Value::Nil.coerce_number(), None);
    assert_eq!(Value::Boolean(true).coerce_number(), None);
}

// Display

#[test]
fn display_of_primitives() {
    assert_eq!(Value::Nil.display_string(), "nil");
    assert_eq!(Value::Boolean(true).display_string(), "true");
    assert_eq!(Value::Boolean(false).display_string(), "false");
    assert_eq!(Value::string("hi").display_string(), "hi");
}

#[test]
fn display_of_tables_is_a_unique_tag() {
    let a = Value::table(Table::new());
    let b = Value::table(Table::new());
    let sa = a.display_string();
    assert!(sa.starts_with("table: "));
    assert_ne!(sa, b.display_string());
}

// Number formatting

#[test]
fn integral_numbers_print_without_point() {
    assert_eq!(number_to_display(0.0), "0");
    assert_eq!(number_to_display(1.0), "1");
    assert_eq!(number_to_display(-1.0), "-1");
    assert_eq!(number_to_display(42.0), "42");
    assert_eq!(number_to_display(1e13), "10000000000000");
}

#[test]
fn fractional_numbers_strip_trailing_zeros() {
    assert_eq!(number_to_display(0.5), "0.5");
    assert_eq!(number_to_display(3.25), "3.25");
    assert_eq!(number_to_display(-0.125), "-0.125");
    assert_eq!(number_to_display(123456789.123), "123456789.123");
}

#[test]
fn fourteen_significant_digits() {
    assert_eq!(number_to_display(1.0 / 3.0), "0.33333333333333");
}

#[test]
fn large_and_small_magnitudes_use_scientific() {
    assert_eq!(number_to_display(1e14), "1e+14");
    assert_eq!(number_to_display(1e100), "1e+100");
    assert_eq!(number_to_display(1e-5), "1e-05");
    assert_eq!(number_to_display(2.5e20), "2.5e+20");
}

#[test]
fn small_fixed_range_boundary() {
    assert_eq!(number_to_display(1e-4), "0.0001");
}

#[test]
fn non_finite_numbers() {
    assert_eq!(number_to_display(f64::NAN), "nan");
    assert_eq!(number_to_display(f64::INFINITY), "inf");
    assert_eq!(number_to_display(f64::NEG_INFINITY), "-inf");
}

#[test]
fn negative_zero_keeps_its_sign() {
    assert_eq!(number_to_display(-0.0), "-0");
}

// Property-based invariants

proptest! {
    #[test]
    fn every_value_has_a_known_tag(n in proptest::num::f64::ANY) {
        let tag = Value::Number(n).type_tag();
        prop_assert!(TypeTag::ALL.contains(&tag));
    }

    #[test]
    fn truthiness_negation_is_an_involution(b in any::<bool>(), n in proptest::num::f64::ANY) {
        for v in [Value::Boolean(b), Value::Number(n), Value::Nil] {
            let negated = Value::Boolean(!v.is_truthy());
            prop_assert_eq!(negated.is_truthy(), !v.is_truthy());
        }
    }

    #[test]
    fn integral_display_reparses_exactly(n in -999_999_999_999i64..=999_999_999_999i64) {
        let v = n as f64;
        let shown = number_to_display(v);
        prop_assert_eq!(shown.parse::<f64>().ok(), Some(v));
        prop_assert!(!shown.contains('.'));
    }

    #[test]
    fn string_equality_matches_byte_equality(a in ".*", b in ".*") {
        let va = Value::string(a.as_str());
        let vb = Value::string(b.as_str());
        prop_assert_eq!(va == vb, a.as_bytes() == b.as_bytes());
    }
}
