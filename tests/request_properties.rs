//! Property tests for the registry and request builder
//!
//! For any variant and any field contents:
//! - Only global fields and fields of visible groups appear in the request
//! - Keys follow the variant's field order after `label_type`
//! - Whole-number lengths are scaled by 128

use labelpanel::models::{Field, LabelConfiguration, Variant};
use labelpanel::services::{build_request, fields_for, visibility_for};
use proptest::prelude::*;
use serde_json::json;

fn variant_strategy() -> impl Strategy<Value = Variant> {
    prop::sample::select(Variant::ALL.to_vec())
}

proptest! {
    #[test]
    fn hidden_groups_never_reach_the_request(
        variant in variant_strategy(),
        values in prop::collection::vec(".{0,12}", Field::ALL.len()),
    ) {
        let mut config = LabelConfiguration::with_variant(variant);
        for (field, value) in Field::ALL.into_iter().zip(values) {
            config.values.set(field, value);
        }

        let request = build_request(&config);
        let visibility = visibility_for(variant);

        prop_assert_eq!(request.label_type(), Some(variant.as_str()));
        for key in request.keys().skip(1) {
            let field: Field = key.parse().unwrap();
            let visible = match field.group() {
                None => true,
                Some(group) => visibility.is_visible(group),
            };
            prop_assert!(visible, "{} leaked into a {} request", key, variant);
        }
    }

    #[test]
    fn keys_follow_field_order(variant in variant_strategy()) {
        let request = build_request(&LabelConfiguration::with_variant(variant));

        let expected: Vec<&str> = std::iter::once("label_type")
            .chain(fields_for(variant).iter().map(|f| f.key()))
            .collect();
        let keys: Vec<&str> = request.keys().collect();

        // align is the only field that may be left out, and defaults to selected
        prop_assert_eq!(keys, expected);
    }

    #[test]
    fn whole_lengths_are_scaled(units in 0u32..10_000) {
        let mut config = LabelConfiguration::with_variant(Variant::Wrap);
        config.values.set(Field::Length, units.to_string());

        let request = build_request(&config);

        prop_assert_eq!(request.field("length"), Some(&json!(u64::from(units) * 128)));
    }

    #[test]
    fn lines_split_on_newlines(lines in prop::collection::vec("[a-z ]{0,8}", 1..6)) {
        let mut config = LabelConfiguration::with_variant(Variant::Text);
        config.values.set(Field::Lines, lines.join("\n"));

        let request = build_request(&config);

        prop_assert_eq!(request.field("lines"), Some(&json!(lines)));
    }
}
