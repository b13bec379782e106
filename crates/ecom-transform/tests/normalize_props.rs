//! Property tests for the normalization utilities.

use ecom_transform::{
    line_total, normalize_email, normalize_phone, normalize_text, profit_margin, title_case,
};
use proptest::prelude::*;

proptest! {
    #[test]
    fn phone_output_is_digits_only(raw in ".{0,40}") {
        if let Some(phone) = normalize_phone(Some(&raw)) {
            prop_assert!(!phone.is_empty());
            prop_assert!(phone.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn text_normalization_is_idempotent(raw in ".{0,40}") {
        let once = normalize_text(Some(&raw));
        let twice = normalize_text(once.as_deref());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn email_normalization_is_idempotent(raw in "[ A-Za-z0-9@._-]{0,40}") {
        let once = normalize_email(Some(&raw));
        let twice = normalize_email(once.as_deref());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn title_case_preserves_length_for_ascii(raw in "[a-zA-Z][a-zA-Z '-]{0,30}[a-zA-Z]") {
        let titled = title_case(Some(&raw)).expect("non-blank input");
        prop_assert_eq!(titled.len(), raw.trim().len());
        prop_assert!(titled.chars().next().is_some_and(|c| c.is_ascii_uppercase()));
    }

    #[test]
    fn margin_never_exceeds_one_hundred_for_non_negative_cost(
        price in 0.01f64..10_000.0,
        cost in 0.0f64..10_000.0,
    ) {
        let margin = profit_margin(Some(price), Some(cost)).expect("positive price");
        prop_assert!(margin <= 100.0);
    }

    #[test]
    fn full_discount_zeroes_line_total(quantity in 1i64..1_000, price in 0.0f64..1_000.0) {
        prop_assert_eq!(line_total(Some(quantity), Some(price), Some(100.0)), Some(0.0));
    }
}
