// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Member and type attributes, and the annotation view derived from them.

/// A validation rule attached to a member.
///
/// Rules are data only; evaluating them belongs to the validation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationRule {
    /// Value must be present (not `None`, not empty).
    Required,
    /// Numeric value must lie in `min..=max`.
    Range { min: f64, max: f64 },
    /// Length must lie in `min..=max` (`max = None` means unbounded).
    Length { min: usize, max: Option<usize> },
    /// Value must match the regular expression.
    Pattern(String),
    /// Value must be an e-mail address.
    Email,
    /// Value must be a mobile phone number.
    MobilePhone,
}

/// Raw attribute as declared on a type or member.
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    /// Human-facing name and optional description.
    Display {
        name: String,
        description: Option<String>,
    },
    /// Description alone; leaves any display name untouched.
    Description(String),
    /// Validation rule with an optional error message.
    Validation {
        rule: ValidationRule,
        message: Option<String>,
    },
    /// Free-form key/value pair.
    Custom { key: String, value: String },
}

impl Attribute {
    /// Display attribute with a name only.
    pub fn display(name: impl Into<String>) -> Self {
        Self::Display {
            name: name.into(),
            description: None,
        }
    }

    /// Validation attribute without a custom message.
    pub fn rule(rule: ValidationRule) -> Self {
        Self::Validation {
            rule,
            message: None,
        }
    }

    /// Custom key/value attribute.
    pub fn custom(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Custom {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A rule together with its message.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleEntry {
    pub rule: ValidationRule,
    pub message: Option<String>,
}

/// Annotation view consumed by the validation layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Annotations {
    display_name: Option<String>,
    description: Option<String>,
    rules: Vec<RuleEntry>,
    custom: Vec<(String, String)>,
}

impl Annotations {
    /// Derive annotations from raw attributes. The last display attribute wins.
    pub fn from_attributes(attributes: &[Attribute]) -> Self {
        let mut out = Self::default();
        for attr in attributes {
            match attr {
                Attribute::Display { name, description } => {
                    out.display_name = Some(name.clone());
                    if description.is_some() {
                        out.description = description.clone();
                    }
                }
                Attribute::Description(text) => out.description = Some(text.clone()),
                Attribute::Validation { rule, message } => out.rules.push(RuleEntry {
                    rule: rule.clone(),
                    message: message.clone(),
                }),
                Attribute::Custom { key, value } => out.custom.push((key.clone(), value.clone())),
            }
        }
        out
    }

    /// Declared display name.
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// Display name, or `fallback` (usually the member name).
    pub fn display_name_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.display_name.as_deref().unwrap_or(fallback)
    }

    /// Declared description.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Validation rules in declaration order.
    pub fn rules(&self) -> &[RuleEntry] {
        &self.rules
    }

    /// Whether any validation rule is declared.
    pub fn has_rules(&self) -> bool {
        !self.rules.is_empty()
    }

    /// Whether `Required` is among the rules.
    pub fn is_required(&self) -> bool {
        self.rules
            .iter()
            .any(|r| matches!(r.rule, ValidationRule::Required))
    }

    /// Look up a custom attribute (first match).
    pub fn custom(&self, key: &str) -> Option<&str> {
        self.custom
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_attributes() {
        let attrs = vec![
            Attribute::display("User Name"),
            Attribute::rule(ValidationRule::Required),
            Attribute::Validation {
                rule: ValidationRule::Length {
                    min: 1,
                    max: Some(32),
                },
                message: Some("too long".into()),
            },
            Attribute::custom("column", "user_name"),
        ];
        let ann = Annotations::from_attributes(&attrs);
        assert_eq!(ann.display_name(), Some("User Name"));
        assert!(ann.is_required());
        assert_eq!(ann.rules().len(), 2);
        assert_eq!(ann.rules()[1].message.as_deref(), Some("too long"));
        assert_eq!(ann.custom("column"), Some("user_name"));
        assert_eq!(ann.custom("missing"), None);
    }

    #[test]
    fn test_description_keeps_display_name() {
        let attrs = vec![
            Attribute::display("Count"),
            Attribute::Description("how many".into()),
        ];
        let ann = Annotations::from_attributes(&attrs);
        assert_eq!(ann.display_name(), Some("Count"));
        assert_eq!(ann.description(), Some("how many"));

        let only = Annotations::from_attributes(&[Attribute::Description("note".into())]);
        assert_eq!(only.display_name(), None);
        assert_eq!(only.description(), Some("note"));
    }

    #[test]
    fn test_display_name_fallback() {
        let ann = Annotations::default();
        assert_eq!(ann.display_name_or("age"), "age");
        assert!(!ann.has_rules());
    }
}
