//! Naming patterns and character classes used by the rule engine.

use regex::Regex;
use std::sync::LazyLock;

// Instance and allow-list names: no leading digit or hyphen, word characters
// (Unicode letters incl. CJK, digits, underscore) and hyphen, 1..=128 chars.
static RESOURCE_NAME_RE: LazyLock<Regex> = LazyLock::new(|| compile(r"^[\w&&\D][\w-]{0,127}$"));

static ACCOUNT_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"^[A-Za-z][A-Za-z0-9_-]{0,30}[A-Za-z0-9]$"));

static DATABASE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| compile(r"^[A-Za-z][A-Za-z0-9_-]{0,62}[A-Za-z0-9]$"));

// Only ever called with the string literals above.
#[allow(clippy::expect_used)]
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("name pattern literal compiles")
}

/// Named full-match patterns for identifier-like fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamePattern {
    /// Instance and allow-list names.
    ResourceName,
    /// Database account names.
    AccountName,
    /// Database names.
    DatabaseName,
}

impl NamePattern {
    pub fn is_match(self, value: &str) -> bool {
        self.regex().is_match(value)
    }

    fn regex(self) -> &'static Regex {
        match self {
            NamePattern::ResourceName => &RESOURCE_NAME_RE,
            NamePattern::AccountName => &ACCOUNT_NAME_RE,
            NamePattern::DatabaseName => &DATABASE_NAME_RE,
        }
    }

    /// Human-readable statement of the naming rule.
    pub fn describe(self) -> &'static str {
        match self {
            NamePattern::ResourceName => {
                "must not start with a digit or hyphen, may only contain letters (including CJK), \
                 digits, underscores and hyphens, and must be 1-128 characters long"
            }
            NamePattern::AccountName => {
                "must be 2-32 characters, start with a letter, end with a letter or digit, \
                 and only contain letters, digits, underscores and hyphens"
            }
            NamePattern::DatabaseName => {
                "must be 2-64 characters, start with a letter, end with a letter or digit, \
                 and only contain letters, digits, underscores and hyphens"
            }
        }
    }
}

/// Special characters accepted in database account passwords.
pub const PASSWORD_SPECIALS: &str = "!@#$%^&*()_+-=,.&?|/";

/// Character classes counted by complexity rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    Uppercase,
    Lowercase,
    Digit,
    Special(&'static str),
}

/// The four classes a database password draws from.
pub const PASSWORD_CLASSES: &[CharClass] = &[
    CharClass::Uppercase,
    CharClass::Lowercase,
    CharClass::Digit,
    CharClass::Special(PASSWORD_SPECIALS),
];

impl CharClass {
    pub fn matches(self, c: char) -> bool {
        match self {
            CharClass::Uppercase => c.is_ascii_uppercase(),
            CharClass::Lowercase => c.is_ascii_lowercase(),
            CharClass::Digit => c.is_ascii_digit(),
            CharClass::Special(set) => set.contains(c),
        }
    }

    pub fn label(self) -> String {
        match self {
            CharClass::Uppercase => "uppercase letters".to_string(),
            CharClass::Lowercase => "lowercase letters".to_string(),
            CharClass::Digit => "digits".to_string(),
            CharClass::Special(set) => format!("special characters ({set})"),
        }
    }
}
