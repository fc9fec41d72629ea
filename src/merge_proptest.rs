//! Property-based tests for the three-way merge.
//!
//! These tests use proptest to generate random configuration items and
//! verify that the merge laws hold for all of them.

#[cfg(test)]
mod proptest_tests {
    use crate::merge::{identical, merge_config_item_states, MergeOperation};
    use proptest::prelude::*;
    use serde_yaml::{Mapping, Value as YamlValue};

    fn scalar() -> impl Strategy<Value = YamlValue> {
        prop_oneof![
            any::<i64>().prop_map(|n| YamlValue::Number(n.into())),
            "[a-z]{0,6}".prop_map(YamlValue::String),
            any::<bool>().prop_map(YamlValue::Bool),
            Just(YamlValue::Null),
        ]
    }

    fn mapping_of<S>(values: S) -> impl Strategy<Value = YamlValue>
    where
        S: Strategy<Value = YamlValue>,
    {
        // Keys come in generation order, not sorted.
        prop::collection::vec(("[a-e]", values), 0..5).prop_map(|entries| {
            YamlValue::Mapping(
                entries
                    .into_iter()
                    .map(|(key, value)| (YamlValue::String(key), value))
                    .collect::<Mapping>(),
            )
        })
    }

    /// Nested items with string keys, scalar leaves and lists.
    fn item() -> impl Strategy<Value = YamlValue> {
        let value = scalar().prop_recursive(3, 32, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(YamlValue::Sequence),
                mapping_of(inner),
            ]
        });
        mapping_of(value)
    }

    fn flat_item() -> impl Strategy<Value = YamlValue> {
        mapping_of(scalar())
    }

    fn scalar_list() -> impl Strategy<Value = YamlValue> {
        prop::collection::vec(scalar(), 0..5).prop_map(YamlValue::Sequence)
    }

    // ============================================================================
    // Unmodified active storage
    // ============================================================================

    proptest! {
        /// Property: a site that never customized an item receives upstream verbatim
        #[test]
        fn unmodified_active_takes_current(previous in item(), current in item()) {
            let (merged, report) = merge_config_item_states(&previous, &current, &previous);
            prop_assert!(identical(&merged, &current), "{:?} != {:?}", merged, current);
            prop_assert_eq!(report.count(MergeOperation::Ignore), 0);
        }

        /// Property: merging with no upstream change leaves the site untouched
        #[test]
        fn no_upstream_change_keeps_active(previous in item(), active in item()) {
            let (merged, report) = merge_config_item_states(&previous, &previous, &active);
            prop_assert!(identical(&merged, &active));
            prop_assert_eq!(report.count(MergeOperation::Update), 0);
            prop_assert_eq!(report.count(MergeOperation::Ignore), 0);
        }

        /// Property: merging is deterministic
        #[test]
        fn merge_is_deterministic(previous in item(), current in item(), active in item()) {
            let first = merge_config_item_states(&previous, &current, &active);
            let second = merge_config_item_states(&previous, &current, &active);
            prop_assert!(identical(&first.0, &second.0));
            prop_assert_eq!(first.1, second.1);
        }
    }

    // ============================================================================
    // Customized leaves
    // ============================================================================

    proptest! {
        /// Property: a leaf the site changed keeps the site's value
        #[test]
        fn customized_leaves_are_preserved(
            previous in flat_item(),
            current in flat_item(),
            active in flat_item(),
        ) {
            let (merged, _) = merge_config_item_states(&previous, &current, &active);
            let previous = previous.as_mapping().cloned().unwrap_or_default();
            let active = active.as_mapping().cloned().unwrap_or_default();

            for (key, active_value) in &active {
                let Some(previous_value) = previous.get(key) else {
                    continue;
                };
                if identical(active_value, previous_value) {
                    continue;
                }
                prop_assert_eq!(
                    merged.get(key),
                    Some(active_value),
                    "customized key {:?} lost",
                    key
                );
            }
        }

        /// Property: a key removed upstream is dropped only when untouched
        #[test]
        fn removal_respects_customization(
            previous in flat_item(),
            current in flat_item(),
            active in flat_item(),
        ) {
            let (merged, _) = merge_config_item_states(&previous, &current, &active);
            let previous_map = previous.as_mapping().cloned().unwrap_or_default();
            let current_map = current.as_mapping().cloned().unwrap_or_default();
            let active_map = active.as_mapping().cloned().unwrap_or_default();

            for (key, previous_value) in &previous_map {
                if current_map.contains_key(key) {
                    continue;
                }
                let Some(active_value) = active_map.get(key) else {
                    continue;
                };
                if identical(active_value, previous_value) {
                    prop_assert!(merged.get(key).is_none(), "untouched key {:?} kept", key);
                } else {
                    prop_assert_eq!(merged.get(key), Some(active_value));
                }
            }
        }
    }

    // ============================================================================
    // Indexed lists
    // ============================================================================

    proptest! {
        /// Property: a list is substituted exactly when the site left it alone
        #[test]
        fn list_substitution_law(
            previous in scalar_list(),
            current in scalar_list(),
            active in scalar_list(),
        ) {
            let (merged, report) = merge_config_item_states(&previous, &current, &active);
            if identical(&previous, &active) {
                prop_assert!(identical(&merged, &current));
                prop_assert_eq!(report.count(MergeOperation::Substitute), 1);
            } else {
                prop_assert!(identical(&merged, &active));
                prop_assert_eq!(report.count(MergeOperation::Ignore), 1);
            }
        }

        /// Property: nested lists follow the same law
        #[test]
        fn nested_list_substitution_law(
            previous in scalar_list(),
            current in scalar_list(),
            active in scalar_list(),
        ) {
            prop_assume!(!identical(&previous, &current));
            let wrap = |list: &YamlValue| {
                let mut map = Mapping::new();
                map.insert(YamlValue::String("roles".to_string()), list.clone());
                YamlValue::Mapping(map)
            };
            let (merged, _) = merge_config_item_states(&wrap(&previous), &wrap(&current), &wrap(&active));
            let expected = if identical(&previous, &active) { &current } else { &active };
            prop_assert!(identical(&merged["roles"], expected));
        }
    }
}
