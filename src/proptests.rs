//! Property-based tests for the repo list merge, exclude normalization and
//! command synthesis.
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold for all possible inputs.

#[cfg(test)]
mod proptest_tests {
    use std::collections::BTreeMap;
    use std::path::Path;

    use proptest::prelude::*;
    use serde_json::{json, Map, Value};

    use crate::command::{FpmCommand, FpmSettings};
    use crate::config::parse_repo_list;
    use crate::instructions::normalize_excludes;
    use crate::options::{OptionValue, PackageSpec, Scalar};
    use crate::template::TemplateContext;

    fn repo_names() -> impl Strategy<Value = Vec<String>> {
        prop::collection::btree_set("[a-z][a-z0-9-]{0,8}", 1..6)
            .prop_map(|names| names.into_iter().collect())
    }

    fn templates() -> impl Strategy<Value = BTreeMap<String, String>> {
        prop::collection::btree_map("[a-z]{1,4}", "[a-z0-9/]{0,6}", 0..5)
    }

    fn to_object(map: &BTreeMap<String, String>) -> Value {
        Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect::<Map<String, Value>>(),
        )
    }

    fn synthesize(spec: &PackageSpec) -> FpmCommand {
        FpmCommand::synthesize(spec, &TemplateContext::new(), &FpmSettings::new(Path::new("/a")))
            .unwrap()
    }

    // ============================================================================
    // repo list merge property tests
    // ============================================================================

    proptest! {
        /// Property: every merged repo is named after its key, whatever
        /// DEFAULT or the entry itself claim
        #[test]
        fn merged_name_equals_key(
            names in repo_names(),
            default_name in prop::option::of("[A-Z]{1,6}"),
            entry_name in prop::option::of("[A-Z]{1,6}"),
        ) {
            let mut root = Map::new();
            let mut default = Map::new();
            if let Some(n) = &default_name {
                default.insert("name".to_string(), json!(n));
            }
            root.insert("DEFAULT".to_string(), Value::Object(default));
            for name in &names {
                let mut entry = Map::new();
                if let Some(n) = &entry_name {
                    entry.insert("name".to_string(), json!(n));
                }
                root.insert(name.clone(), Value::Object(entry));
            }

            let repos = parse_repo_list(&Value::Object(root).to_string(), Path::new("repos.json")).unwrap();
            let merged: Vec<String> = repos.into_iter().map(|r| r.name).collect();
            let mut expected = names.clone();
            expected.sort();
            prop_assert_eq!(merged, expected);
        }

        /// Property: templates merge as a union where repo entries win
        #[test]
        fn templates_merge_is_union_with_repo_priority(
            default_templates in templates(),
            repo_templates in templates(),
        ) {
            let content = json!({
                "DEFAULT": {"templates": to_object(&default_templates)},
                "demo": {"templates": to_object(&repo_templates)},
            })
            .to_string();
            let repos = parse_repo_list(&content, Path::new("repos.json")).unwrap();

            let mut expected = default_templates.clone();
            expected.extend(repo_templates.clone());
            prop_assert_eq!(&repos[0].templates, &expected);
        }
    }

    // ============================================================================
    // exclude normalization property tests
    // ============================================================================

    proptest! {
        /// Property: normalizing excludes twice equals normalizing once, and
        /// the default pattern appears exactly once
        #[test]
        fn normalize_excludes_is_idempotent(
            patterns in prop::collection::vec("[a-z./]{1,6}\\*?", 0..6),
            include_default in any::<bool>(),
        ) {
            let mut items: Vec<Scalar> = patterns.iter().map(Scalar::text).collect();
            if include_default {
                items.push(Scalar::text("*/.git*"));
            }
            let mut spec = PackageSpec::new();
            spec.set("exclude", OptionValue::List(items.clone()));

            normalize_excludes(&mut spec).unwrap();
            let once = spec.clone();
            normalize_excludes(&mut spec).unwrap();
            prop_assert_eq!(&spec, &once);

            let excludes = spec.get("exclude").unwrap().elements().to_vec();
            let defaults = excludes.iter().filter(|s| s.as_text() == Some("*/.git*")).count();
            prop_assert_eq!(defaults, 1);
            prop_assert_eq!(&excludes[..items.len()], &items[..]);
        }
    }

    // ============================================================================
    // option validation and synthesis property tests
    // ============================================================================

    proptest! {
        /// Property: a single-character key always fails validation
        #[test]
        fn single_character_key_rejected(key in "[a-zA-Z]", other in "[a-z]{2,8}") {
            let mut spec = PackageSpec::new();
            spec.set(other, OptionValue::text("x"));
            spec.set(key, OptionValue::text("y"));
            prop_assert!(spec.validate_keys(Path::new("fpm.json")).is_err());
        }

        /// Property: text without braces renders unchanged
        #[test]
        fn render_without_braces_is_identity(text in "[^{}]*") {
            let context: TemplateContext = [("name", "foo")].into_iter().collect();
            prop_assert_eq!(context.render(&text).unwrap(), text);
        }

        /// Property: a placeholder is replaced by its context value
        #[test]
        fn render_substitutes_name(name in "[a-z0-9.-]{1,12}") {
            let context: TemplateContext = [("name", name.as_str())].into_iter().collect();
            prop_assert_eq!(context.render("pkg-{name}").unwrap(), format!("pkg-{}", name));
        }

        /// Property: true emits exactly one bare flag, false emits nothing
        #[test]
        fn boolean_options_render_as_bare_flags(key in "[a-z]{2,10}", value in any::<bool>()) {
            prop_assume!(key != "user" && key != "group");
            let mut spec = PackageSpec::new();
            spec.set(key.clone(), OptionValue::flag(value));
            let args = synthesize(&spec).args;
            let option_args = &args[7..];
            if value {
                prop_assert_eq!(option_args.to_vec(), vec![format!("--{}", key)]);
            } else {
                prop_assert!(option_args.is_empty());
            }
        }
    }
}
