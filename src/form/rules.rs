use std::fmt::{Display, Formatter};
use std::sync::LazyLock;

use gpui::SharedString;
use regex::Regex;

use super::controller::FieldKey;
use super::validation::ValidationError;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern must compile")
});

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum FieldKind {
    Text,
    Email,
    Select,
    MultilineText,
}

/// Declared shape of one form field. Produced by `#[derive(FormModel)]` from
/// `#[field(..)]` attributes, or written by hand.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FieldSpec {
    pub key: FieldKey,
    /// Explicit label. Without one the key is shown in sentence case.
    pub label: Option<&'static str>,
    pub kind: FieldKind,
    pub required: bool,
    pub min_len: Option<usize>,
}

impl FieldSpec {
    pub const fn new(key: &'static str, kind: FieldKind) -> Self {
        Self {
            key: FieldKey::new(key),
            label: None,
            kind,
            required: false,
            min_len: None,
        }
    }

    pub const fn label(mut self, value: &'static str) -> Self {
        self.label = Some(value);
        self
    }

    pub fn display_label(&self) -> SharedString {
        match self.label {
            Some(label) => label.into(),
            None => sentence_case(self.key.as_str()).into(),
        }
    }

    pub const fn required(mut self, value: bool) -> Self {
        self.required = value;
        self
    }

    pub const fn min_len(mut self, value: usize) -> Self {
        self.min_len = Some(value);
        self
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FieldIssue {
    Required,
    InvalidEmail,
    TooShort { min: usize },
}

impl Display for FieldIssue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldIssue::Required => f.write_str("This field is required"),
            FieldIssue::InvalidEmail => f.write_str("Please enter a valid email address"),
            FieldIssue::TooShort { min } => {
                write!(f, "Message must be at least {min} characters long")
            }
        }
    }
}

impl std::error::Error for FieldIssue {}

impl ValidationError for FieldIssue {
    fn message(&self) -> SharedString {
        self.to_string().into()
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ValidationResult {
    Valid,
    Invalid(FieldIssue),
}

impl ValidationResult {
    pub fn into_result(self) -> Result<(), FieldIssue> {
        match self {
            ValidationResult::Valid => Ok(()),
            ValidationResult::Invalid(issue) => Err(issue),
        }
    }
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_PATTERN.is_match(value)
}

/// Checks `value` against the declared rules. First failure wins: required,
/// then email format, then minimum length. The value is trimmed first, and an
/// optional empty value still has to satisfy the format and length rules.
pub fn evaluate(spec: &FieldSpec, value: &str) -> ValidationResult {
    let value = value.trim();

    if spec.required && value.is_empty() {
        return ValidationResult::Invalid(FieldIssue::Required);
    }

    if spec.kind == FieldKind::Email && !is_valid_email(value) {
        return ValidationResult::Invalid(FieldIssue::InvalidEmail);
    }

    if spec.kind == FieldKind::MultilineText {
        if let Some(min) = spec.min_len {
            if value.chars().count() < min {
                return ValidationResult::Invalid(FieldIssue::TooShort { min });
            }
        }
    }

    ValidationResult::Valid
}

/// `reply_to` becomes `Reply to`.
fn sentence_case(key: &str) -> String {
    let spaced = key
        .split('_')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_email_must_still_be_well_formed() {
        let spec = FieldSpec::new("reply_to", FieldKind::Email);
        assert_eq!(
            evaluate(&spec, ""),
            ValidationResult::Invalid(FieldIssue::InvalidEmail)
        );
        assert_eq!(
            evaluate(&spec, "   "),
            ValidationResult::Invalid(FieldIssue::InvalidEmail)
        );
        assert_eq!(evaluate(&spec, "a@b.co"), ValidationResult::Valid);
    }

    #[test]
    fn optional_message_must_still_reach_minimum_length() {
        let spec = FieldSpec::new("notes", FieldKind::MultilineText).min_len(10);
        assert_eq!(
            evaluate(&spec, ""),
            ValidationResult::Invalid(FieldIssue::TooShort { min: 10 })
        );
        assert_eq!(evaluate(&spec, "long enough text"), ValidationResult::Valid);
    }

    #[test]
    fn optional_plain_fields_accept_empty_values() {
        assert_eq!(
            evaluate(&FieldSpec::new("company", FieldKind::Text), ""),
            ValidationResult::Valid
        );
        assert_eq!(
            evaluate(&FieldSpec::new("budget", FieldKind::Select), " "),
            ValidationResult::Valid
        );
    }

    #[test]
    fn required_check_runs_before_format_rules() {
        let spec = FieldSpec::new("email", FieldKind::Email).required(true);
        assert_eq!(
            evaluate(&spec, ""),
            ValidationResult::Invalid(FieldIssue::Required)
        );
    }

    #[test]
    fn default_label_is_sentence_cased_key() {
        assert_eq!(
            FieldSpec::new("reply_to", FieldKind::Email)
                .display_label()
                .to_string(),
            "Reply to"
        );
        assert_eq!(
            FieldSpec::new("reply_to", FieldKind::Email)
                .label("Reply address")
                .display_label()
                .to_string(),
            "Reply address"
        );
        assert_eq!(sentence_case("full__name_"), "Full name");
    }
}
