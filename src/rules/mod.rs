//! Rule engine: declarative validation rules over an argument set.
//!
//! Every operation carries an ordered `Vec<Rule>`. Rules are pure: they read
//! the [`ArgumentSet`] and either pass or fail with a description of the
//! violated constraint. Evaluation stops at the first failure.
//!
//! Except for `Required` and `ConditionalRequired`, rules pass when the field
//! they constrain is absent.

mod patterns;

pub use patterns::{CharClass, NamePattern, PASSWORD_CLASSES, PASSWORD_SPECIALS};

use crate::tools::ArgumentSet;
use crate::types::{Error, Result};
use serde_json::Value;

/// One validation rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// Field must be present and non-empty.
    Required(&'static str),

    /// String field must fully match a naming pattern.
    Pattern {
        field: &'static str,
        pattern: NamePattern,
    },

    /// String length (in characters) or list length within `[min, max]`.
    LengthRange {
        field: &'static str,
        min: usize,
        max: usize,
    },

    /// Integer within `[min, max]`; `max = None` means unbounded.
    IntRange {
        field: &'static str,
        min: i64,
        max: Option<i64>,
    },

    /// String value must be one of a fixed set.
    EnumMembership {
        field: &'static str,
        allowed: &'static [&'static str],
    },

    /// At most one of the two fields may be present.
    MutualExclusion(&'static str, &'static str),

    /// List (or mapping) must not have more than `max` entries.
    CountBound { field: &'static str, max: usize },

    /// Every list inside a key → list mapping has at most `max` values.
    ValuesPerKey { field: &'static str, max: usize },

    /// `field` is required when `when` holds one of `is_any_of`.
    ConditionalRequired {
        field: &'static str,
        when: &'static str,
        is_any_of: &'static [&'static str],
    },

    /// `field` must equal `expected` when `when` equals `equals`.
    ConditionalValue {
        field: &'static str,
        expected: &'static str,
        when: &'static str,
        equals: &'static str,
    },

    /// String must draw from at least `min_classes` of `classes`.
    Complexity {
        field: &'static str,
        min_classes: usize,
        classes: &'static [CharClass],
    },

    /// Two lists may not both hold more than one entry.
    PairedCardinality(&'static str, &'static str),
}

// =============================================================================
// Constructors
// =============================================================================

impl Rule {
    pub const fn required(field: &'static str) -> Self {
        Rule::Required(field)
    }

    pub const fn pattern(field: &'static str, pattern: NamePattern) -> Self {
        Rule::Pattern { field, pattern }
    }

    pub const fn length(field: &'static str, min: usize, max: usize) -> Self {
        Rule::LengthRange { field, min, max }
    }

    pub const fn max_length(field: &'static str, max: usize) -> Self {
        Rule::LengthRange { field, min: 0, max }
    }

    pub const fn range(field: &'static str, min: i64, max: i64) -> Self {
        Rule::IntRange {
            field,
            min,
            max: Some(max),
        }
    }

    pub const fn at_least(field: &'static str, min: i64) -> Self {
        Rule::IntRange {
            field,
            min,
            max: None,
        }
    }

    pub const fn one_of(field: &'static str, allowed: &'static [&'static str]) -> Self {
        Rule::EnumMembership { field, allowed }
    }

    pub const fn exclusive(first: &'static str, second: &'static str) -> Self {
        Rule::MutualExclusion(first, second)
    }

    pub const fn max_count(field: &'static str, max: usize) -> Self {
        Rule::CountBound { field, max }
    }

    pub const fn required_when(
        field: &'static str,
        when: &'static str,
        is_any_of: &'static [&'static str],
    ) -> Self {
        Rule::ConditionalRequired {
            field,
            when,
            is_any_of,
        }
    }

    /// The field this rule reports against (the first one for pair rules).
    pub fn field(&self) -> &'static str {
        match self {
            Rule::Required(field)
            | Rule::Pattern { field, .. }
            | Rule::LengthRange { field, .. }
            | Rule::IntRange { field, .. }
            | Rule::EnumMembership { field, .. }
            | Rule::CountBound { field, .. }
            | Rule::ValuesPerKey { field, .. }
            | Rule::ConditionalRequired { field, .. }
            | Rule::ConditionalValue { field, .. }
            | Rule::Complexity { field, .. } => field,
            Rule::MutualExclusion(first, _) | Rule::PairedCardinality(first, _) => first,
        }
    }
}

// =============================================================================
// Evaluation
// =============================================================================

impl Rule {
    /// Evaluate this rule against an argument set.
    pub fn check(&self, args: &ArgumentSet) -> Result<()> {
        match self {
            Rule::Required(field) => match args.get(field) {
                None => Err(Error::validation(format!("missing required field: {field}"))),
                Some(value) if is_empty(value) => Err(Error::validation(format!(
                    "missing required field: {field} must not be empty"
                ))),
                Some(_) => Ok(()),
            },

            Rule::Pattern { field, pattern } => {
                let Some(value) = args.get(field) else {
                    return Ok(());
                };
                let text = expect_str(field, value)?;
                if pattern.is_match(text) {
                    Ok(())
                } else {
                    Err(Error::validation(format!(
                        "{field} '{text}' is invalid: {}",
                        pattern.describe()
                    )))
                }
            }

            Rule::LengthRange { field, min, max } => {
                let Some(value) = args.get(field) else {
                    return Ok(());
                };
                let (len, unit) = match value {
                    Value::String(s) => (s.chars().count(), "characters"),
                    Value::Array(items) => (items.len(), "entries"),
                    other => {
                        return Err(Error::validation(format!(
                            "{field} must be a string or list, got {}",
                            value_type_name(other)
                        )))
                    }
                };
                if len >= *min && len <= *max {
                    Ok(())
                } else if *min == 0 {
                    Err(Error::validation(format!(
                        "{field} must be at most {max} {unit}, got {len}"
                    )))
                } else {
                    Err(Error::validation(format!(
                        "{field} must be between {min} and {max} {unit}, got {len}"
                    )))
                }
            }

            Rule::IntRange { field, min, max } => {
                let Some(value) = args.get(field) else {
                    return Ok(());
                };
                let n = value.as_i64().ok_or_else(|| {
                    Error::validation(format!(
                        "{field} must be an integer, got {}",
                        value_type_name(value)
                    ))
                })?;
                match max {
                    Some(max) if n < *min || n > *max => Err(Error::validation(format!(
                        "{field} must be between {min} and {max}, got {n}"
                    ))),
                    None if n < *min => Err(Error::validation(format!(
                        "{field} must be at least {min}, got {n}"
                    ))),
                    _ => Ok(()),
                }
            }

            Rule::EnumMembership { field, allowed } => {
                let Some(value) = args.get(field) else {
                    return Ok(());
                };
                let text = expect_str(field, value)?;
                if allowed.iter().any(|a| *a == text) {
                    Ok(())
                } else {
                    Err(Error::validation(format!(
                        "invalid {field} '{text}', expected one of: {}",
                        allowed.join(", ")
                    )))
                }
            }

            Rule::MutualExclusion(first, second) => {
                if args.contains(first) && args.contains(second) {
                    Err(Error::validation(format!(
                        "{first} and {second} cannot be used together"
                    )))
                } else {
                    Ok(())
                }
            }

            Rule::CountBound { field, max } => {
                let Some(value) = args.get(field) else {
                    return Ok(());
                };
                let count = match value {
                    Value::Array(items) => items.len(),
                    Value::Object(map) => map.len(),
                    other => {
                        return Err(Error::validation(format!(
                            "{field} must be a list, got {}",
                            value_type_name(other)
                        )))
                    }
                };
                if count > *max {
                    Err(Error::validation(format!(
                        "{field} accepts at most {max} entries, got {count}"
                    )))
                } else {
                    Ok(())
                }
            }

            Rule::ValuesPerKey { field, max } => {
                let Some(value) = args.get(field) else {
                    return Ok(());
                };
                let map = value.as_object().ok_or_else(|| {
                    Error::validation(format!(
                        "{field} must be a mapping, got {}",
                        value_type_name(value)
                    ))
                })?;
                for (key, values) in map {
                    let count = values.as_array().map_or(1, Vec::len);
                    if count > *max {
                        return Err(Error::validation(format!(
                            "{field} key '{key}' accepts at most {max} values, got {count}"
                        )));
                    }
                }
                Ok(())
            }

            Rule::ConditionalRequired {
                field,
                when,
                is_any_of,
            } => match args.str(when) {
                Some(trigger) if is_any_of.iter().any(|v| *v == trigger) => {
                    match args.get(field) {
                        Some(value) if !is_empty(value) => Ok(()),
                        _ => Err(Error::validation(format!(
                            "missing required field: {field} is required when {when} is {trigger}"
                        ))),
                    }
                }
                _ => Ok(()),
            },

            Rule::ConditionalValue {
                field,
                expected,
                when,
                equals,
            } => {
                if args.str(when) != Some(*equals) {
                    return Ok(());
                }
                match args.get(field) {
                    None => Ok(()),
                    Some(value) if value.as_str() == Some(*expected) => Ok(()),
                    Some(_) => Err(Error::validation(format!(
                        "{field} must be '{expected}' when {when} is {equals}"
                    ))),
                }
            }

            Rule::Complexity {
                field,
                min_classes,
                classes,
            } => {
                let Some(value) = args.get(field) else {
                    return Ok(());
                };
                let text = expect_str(field, value)?;
                let satisfied = classes
                    .iter()
                    .filter(|class| text.chars().any(|c| class.matches(c)))
                    .count();
                if satisfied >= *min_classes {
                    Ok(())
                } else {
                    let labels: Vec<String> = classes.iter().map(|c| c.label()).collect();
                    Err(Error::validation(format!(
                        "{field} must contain at least {min_classes} of: {}",
                        labels.join(", ")
                    )))
                }
            }

            Rule::PairedCardinality(first, second) => {
                let first_len = args.array(first).map_or(0, Vec::len);
                let second_len = args.array(second).map_or(0, Vec::len);
                if first_len > 1 && second_len > 1 {
                    Err(Error::validation(format!(
                        "cannot combine multiple {first} ({first_len}) with multiple {second} \
                         ({second_len}); one of the lists must contain exactly one entry"
                    )))
                } else {
                    Ok(())
                }
            }
        }
    }
}

/// Evaluate rules in order, stopping at the first failure.
pub fn check_all(rules: &[Rule], args: &ArgumentSet) -> Result<()> {
    for rule in rules {
        rule.check(args)?;
    }
    Ok(())
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

fn expect_str<'a>(field: &str, value: &'a Value) -> Result<&'a str> {
    value.as_str().ok_or_else(|| {
        Error::validation(format!(
            "{field} must be a string, got {}",
            value_type_name(value)
        ))
    })
}

pub(crate) fn value_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> ArgumentSet {
        ArgumentSet::from_value(value).unwrap()
    }

    fn password_rules() -> Vec<Rule> {
        vec![
            Rule::length("account_password", 8, 32),
            Rule::Complexity {
                field: "account_password",
                min_classes: 3,
                classes: PASSWORD_CLASSES,
            },
        ]
    }

    #[test]
    fn test_required_absent_and_empty() {
        let rule = Rule::required("instance_id");
        let err = rule.check(&args(json!({}))).unwrap_err();
        assert!(err.to_string().contains("missing required field: instance_id"));
        assert!(rule.check(&args(json!({"instance_id": ""}))).is_err());
        assert!(rule.check(&args(json!({"instance_id": []}))).is_err());
        assert!(rule.check(&args(json!({"instance_id": "mysql-1"}))).is_ok());
    }

    #[test]
    fn test_pattern_skips_absent_but_rejects_empty() {
        let rule = Rule::pattern("instance_new_name", NamePattern::ResourceName);
        assert!(rule.check(&args(json!({}))).is_ok());
        assert!(rule.check(&args(json!({"instance_new_name": ""}))).is_err());
        assert!(rule.check(&args(json!({"instance_new_name": "9db"}))).is_err());
        assert!(rule.check(&args(json!({"instance_new_name": "x"}))).is_ok());
    }

    #[test]
    fn test_max_length_counts_characters() {
        let rule = Rule::max_length("account_desc", 256);
        assert!(rule.check(&args(json!({"account_desc": "描".repeat(256)}))).is_ok());
        let err = rule
            .check(&args(json!({"account_desc": "a".repeat(257)})))
            .unwrap_err();
        assert!(err.to_string().contains("at most 256 characters, got 257"));
        assert!(rule.check(&args(json!({"account_desc": ""}))).is_ok());
    }

    #[test]
    fn test_password_length_boundaries() {
        let rules = password_rules();
        assert!(check_all(&rules, &args(json!({"account_password": "Abcdef1"}))).is_err());
        assert!(check_all(&rules, &args(json!({"account_password": "Abcdefg1"}))).is_ok());
        let len_32 = format!("Ab1{}", "c".repeat(29));
        assert!(check_all(&rules, &args(json!({ "account_password": len_32 }))).is_ok());
        let len_33 = format!("Ab1{}", "c".repeat(30));
        assert!(check_all(&rules, &args(json!({ "account_password": len_33 }))).is_err());
    }

    #[test]
    fn test_password_character_classes() {
        let rules = password_rules();
        // upper + lower only
        let err = check_all(&rules, &args(json!({"account_password": "Abcdefghij"}))).unwrap_err();
        assert!(err.to_string().contains("at least 3 of"));
        assert!(!err.to_string().contains("Abcdefghij"));
        // lower + digit + special
        assert!(check_all(&rules, &args(json!({"account_password": "abcdef1!"}))).is_ok());
        // upper + lower + digit
        assert!(check_all(&rules, &args(json!({"account_password": "Abcdefg1"}))).is_ok());
        // digit + special only
        assert!(check_all(&rules, &args(json!({"account_password": "12345678#"}))).is_err());
    }

    #[test]
    fn test_int_range() {
        let rule = Rule::range("page_size", 1, 1000);
        assert!(rule.check(&args(json!({"page_size": 1000}))).is_ok());
        assert!(rule.check(&args(json!({"page_size": 1001}))).is_err());
        assert!(rule.check(&args(json!({"page_size": 0}))).is_err());

        let rule = Rule::at_least("offset", 0);
        assert!(rule.check(&args(json!({"offset": 0}))).is_ok());
        let err = rule.check(&args(json!({"offset": -1}))).unwrap_err();
        assert!(err.to_string().contains("at least 0"));
    }

    #[test]
    fn test_enum_membership() {
        let rule = Rule::one_of("character_set_name", &["utf8", "utf8mb4", "latin1", "ascii"]);
        assert!(rule.check(&args(json!({"character_set_name": "latin1"}))).is_ok());
        let err = rule
            .check(&args(json!({"character_set_name": "gbk"})))
            .unwrap_err();
        assert!(err.to_string().contains("expected one of: utf8, utf8mb4, latin1, ascii"));
    }

    #[test]
    fn test_mutual_exclusion() {
        let rule = Rule::exclusive("allow_list", "user_allow_list");
        assert!(rule
            .check(&args(json!({"allow_list": "10.0.0.1", "user_allow_list": "10.0.0.2"})))
            .is_err());
        assert!(rule.check(&args(json!({"allow_list": "10.0.0.1"}))).is_ok());
        assert!(rule.check(&args(json!({"user_allow_list": "10.0.0.2"}))).is_ok());
        // Presence, not truthiness, decides.
        assert!(rule
            .check(&args(json!({"allow_list": "", "user_allow_list": ""})))
            .is_err());
    }

    #[test]
    fn test_count_bound_on_lists_and_maps() {
        let rule = Rule::max_count("instance_ids", 200);
        let ids: Vec<String> = (0..200).map(|i| format!("mysql-{i}")).collect();
        assert!(rule.check(&args(json!({ "instance_ids": ids }))).is_ok());
        let ids: Vec<String> = (0..201).map(|i| format!("mysql-{i}")).collect();
        let err = rule.check(&args(json!({ "instance_ids": ids }))).unwrap_err();
        assert!(err.to_string().contains("at most 200 entries, got 201"));

        let rule = Rule::max_count("tag_filters", 1);
        assert!(rule
            .check(&args(json!({"tag_filters": {"a": [], "b": []}})))
            .is_err());
    }

    #[test]
    fn test_values_per_key() {
        let rule = Rule::ValuesPerKey {
            field: "tag_filters",
            max: 3,
        };
        assert!(rule
            .check(&args(json!({"tag_filters": {"env": ["a", "b", "c"]}})))
            .is_ok());
        let err = rule
            .check(&args(json!({"tag_filters": {"env": ["a", "b", "c", "d"]}})))
            .unwrap_err();
        assert!(err.to_string().contains("key 'env'"));
    }

    #[test]
    fn test_conditional_required() {
        let rule = Rule::required_when(
            "AccountPrivilegeDetail",
            "AccountPrivilege",
            &["Custom", "Global"],
        );
        assert!(rule.check(&args(json!({"AccountPrivilege": "ReadOnly"}))).is_ok());
        assert!(rule.check(&args(json!({"AccountPrivilege": "Custom"}))).is_err());
        assert!(rule
            .check(&args(json!({"AccountPrivilege": "Global", "AccountPrivilegeDetail": ""})))
            .is_err());
        assert!(rule
            .check(&args(json!({"AccountPrivilege": "Global", "AccountPrivilegeDetail": "SELECT"})))
            .is_ok());
    }

    #[test]
    fn test_conditional_value() {
        let rule = Rule::ConditionalValue {
            field: "host",
            expected: "%",
            when: "account_type",
            equals: "Super",
        };
        assert!(rule
            .check(&args(json!({"account_type": "Super", "host": "%"})))
            .is_ok());
        assert!(rule
            .check(&args(json!({"account_type": "Super", "host": "10.0.0.%"})))
            .is_err());
        assert!(rule
            .check(&args(json!({"account_type": "Normal", "host": "10.0.0.%"})))
            .is_ok());
    }

    #[test]
    fn test_paired_cardinality() {
        let rule = Rule::PairedCardinality("instance_ids", "allow_list_ids");
        assert!(rule
            .check(&args(json!({"instance_ids": ["a", "b", "c"], "allow_list_ids": ["x", "y"]})))
            .is_err());
        assert!(rule
            .check(&args(json!({"instance_ids": ["a", "b", "c"], "allow_list_ids": ["x"]})))
            .is_ok());
        assert!(rule
            .check(&args(json!({"instance_ids": ["a"], "allow_list_ids": ["x", "y", "z"]})))
            .is_ok());
    }

    #[test]
    fn test_check_all_stops_at_first_failure() {
        let rules = vec![Rule::required("a"), Rule::required("b")];
        let err = check_all(&rules, &args(json!({}))).unwrap_err();
        assert!(err.to_string().contains("field: a"));
    }

    #[test]
    fn test_rules_do_not_mutate_arguments() {
        let before = args(json!({"instance_ids": ["a"], "allow_list_ids": ["x"]}));
        let after = before.clone();
        let rules = vec![
            Rule::required("instance_ids"),
            Rule::max_count("instance_ids", 200),
            Rule::PairedCardinality("instance_ids", "allow_list_ids"),
        ];
        check_all(&rules, &after).unwrap();
        assert_eq!(before, after);
    }
}
