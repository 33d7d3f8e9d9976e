//! Schema validation for untyped resource submissions.
//!
//! A [`Submission`] walks one JSON object and applies field rules one by one.
//! Every rule records its own failure in a shared [`FieldErrors`] map instead
//! of returning early, so a single pass reports every problem with the form.
//! Entity modules compose these rules into their `validate` functions.

use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::error;
use uuid::Uuid;

/// Field name used when the submission itself is not a JSON object.
pub const BODY_FIELD: &str = "_body";

/// Ordered map of field name to human-readable messages.
///
/// # Examples
/// ```
/// use schoolapp::domain::FieldErrors;
///
/// let mut errors = FieldErrors::default();
/// errors.push("email", "Invalid email address.");
/// assert!(errors.contains("email"));
/// assert!(!errors.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    /// Record `message` against `field`.
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// `true` when no field has failed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `true` when `field` has at least one message.
    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Messages recorded for `field`.
    #[must_use]
    pub fn messages(&self, field: &str) -> &[String] {
        self.0.get(field).map_or(&[], Vec::as_slice)
    }

    /// Iterate over `(field, messages)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0
            .iter()
            .map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }
}

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

/// `None` only if the pattern fails to compile; every address is then
/// rejected rather than accepted.
static EMAIL_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(EMAIL_PATTERN)
        .inspect_err(|err| error!(error = %err, "email pattern failed to compile"))
        .ok()
});

/// `true` when `value` looks like `local@domain.tld`.
#[must_use]
pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.as_ref().is_some_and(|re| re.is_match(value))
}

/// Rule runner over a single JSON object.
///
/// # Examples
/// ```
/// use schoolapp::domain::Submission;
/// use serde_json::json;
///
/// let input = json!({ "title": "  Algebra ", "credits": 0 });
/// let mut submission = Submission::new(&input).expect("object body");
/// assert_eq!(submission.required_string("title", "Title cannot be empty.").as_deref(), Some("Algebra"));
/// assert!(submission.integer_at_least("credits", 1, "Credits must be at least 1.").is_none());
/// assert!(submission.into_errors().contains("credits"));
/// ```
#[derive(Debug)]
pub struct Submission<'a> {
    fields: &'a Map<String, Value>,
    errors: FieldErrors,
}

impl<'a> Submission<'a> {
    /// Start validating `input`.
    ///
    /// # Errors
    /// Returns a [`BODY_FIELD`] error when `input` is not a JSON object.
    pub fn new(input: &'a Value) -> Result<Self, FieldErrors> {
        match input {
            Value::Object(fields) => Ok(Self {
                fields,
                errors: FieldErrors::default(),
            }),
            _ => {
                let mut errors = FieldErrors::default();
                errors.push(BODY_FIELD, "Request body must be a JSON object.");
                Err(errors)
            }
        }
    }

    fn present(&self, field: &str) -> Option<&'a Value> {
        self.fields.get(field).filter(|value| !value.is_null())
    }

    fn fail<T>(&mut self, field: &str, message: &str) -> Option<T> {
        self.errors.push(field, message);
        None
    }

    /// Required string, trimmed; fails when absent, non-string, or blank.
    pub fn required_string(&mut self, field: &str, message: &str) -> Option<String> {
        match self.present(field).and_then(Value::as_str).map(str::trim) {
            Some(text) if !text.is_empty() => Some(text.to_owned()),
            _ => self.fail(field, message),
        }
    }

    /// Optional string; null, absent, or blank become `None`.
    pub fn optional_string(&mut self, field: &str) -> Option<String> {
        match self.present(field) {
            None => None,
            Some(Value::String(text)) => {
                let trimmed = text.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_owned())
            }
            Some(_) => self.fail(field, &format!("{field} must be a string.")),
        }
    }

    /// Required email address.
    pub fn email(&mut self, field: &str, message: &str) -> Option<String> {
        match self.present(field).and_then(Value::as_str).map(str::trim) {
            Some(text) if is_valid_email(text) => Some(text.to_owned()),
            _ => self.fail(field, message),
        }
    }

    /// Optional `YYYY-MM-DD` date.
    pub fn optional_date(&mut self, field: &str, message: &str) -> Option<NaiveDate> {
        let text = self.optional_string(field)?;
        match NaiveDate::parse_from_str(&text, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => self.fail(field, message),
        }
    }

    /// Required `YYYY-MM-DD` date.
    pub fn required_date(&mut self, field: &str, message: &str) -> Option<NaiveDate> {
        let parsed = self
            .present(field)
            .and_then(Value::as_str)
            .and_then(|text| NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok());
        match parsed {
            Some(date) => Some(date),
            None => self.fail(field, message),
        }
    }

    /// Whole number no smaller than `min`.
    ///
    /// Integer-valued strings are accepted because HTML forms post numbers as
    /// text; fractional values are rejected in either form.
    pub fn integer_at_least(&mut self, field: &str, min: i32, message: &str) -> Option<i32> {
        let parsed = match self.present(field) {
            Some(Value::Number(number)) => number.as_i64(),
            Some(Value::String(text)) => text.trim().parse::<i64>().ok(),
            _ => None,
        };
        match parsed.and_then(|value| i32::try_from(value).ok()) {
            Some(value) if value >= min => Some(value),
            _ => self.fail(field, message),
        }
    }

    /// Value from a fixed set, parsed through `FromStr`.
    pub fn one_of<T: FromStr>(&mut self, field: &str, message: &str) -> Option<T> {
        match self
            .present(field)
            .and_then(Value::as_str)
            .and_then(|text| text.trim().parse::<T>().ok())
        {
            Some(value) => Some(value),
            None => self.fail(field, message),
        }
    }

    /// JSON boolean, or `default` when the field is absent.
    pub fn boolean_or(&mut self, field: &str, default: bool, message: &str) -> Option<bool> {
        match self.present(field) {
            None => Some(default),
            Some(Value::Bool(flag)) => Some(*flag),
            Some(_) => self.fail(field, message),
        }
    }

    /// Required UUID reference.
    pub fn uuid(&mut self, field: &str, message: &str) -> Option<Uuid> {
        match self
            .present(field)
            .and_then(Value::as_str)
            .and_then(|text| Uuid::parse_str(text.trim()).ok())
        {
            Some(id) => Some(id),
            None => self.fail(field, message),
        }
    }

    /// Reject a string longer than `max` characters once trimmed.
    ///
    /// Limits mirror the `VARCHAR` widths of the backing columns, so both
    /// stores refuse the same input as a field error.
    pub fn max_chars(&mut self, field: &str, max: usize) {
        let too_long = self
            .present(field)
            .and_then(Value::as_str)
            .is_some_and(|text| text.trim().chars().count() > max);
        if too_long {
            self.errors
                .push(field, format!("{field} must be at most {max} characters."));
        }
    }

    /// Apply [`Self::max_chars`] to each `(field, max)` pair.
    pub fn max_chars_each(&mut self, limits: &[(&str, usize)]) {
        for (field, max) in limits {
            self.max_chars(field, *max);
        }
    }

    /// `true` while no rule has failed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    /// Collected failures.
    #[must_use]
    pub fn into_errors(self) -> FieldErrors {
        self.errors
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("a@b", false)]
    #[case("a@b.c", true)]
    #[case("ann@x.com", true)]
    #[case("ann lee@x.com", false)]
    #[case("@x.com", false)]
    fn email_shape(#[case] value: &str, #[case] valid: bool) {
        assert_eq!(is_valid_email(value), valid);
    }

    #[rstest]
    fn email_pattern_compiles() {
        assert!(EMAIL_RE.is_some());
    }

    #[rstest]
    #[case("MAT101", true)]
    #[case("  MAT101  ", true)]
    #[case("MATH-1010", false)]
    #[case("éééééééé", true)]
    fn length_limits_count_trimmed_characters(#[case] code: &str, #[case] ok: bool) {
        let input = json!({ "course_code": code });
        let mut submission = Submission::new(&input).expect("object");
        submission.max_chars("course_code", 8);
        assert_eq!(submission.is_clean(), ok);
        if !ok {
            assert_eq!(
                submission.into_errors().messages("course_code"),
                ["course_code must be at most 8 characters."]
            );
        }
    }

    #[rstest]
    #[case(json!(1), Some(1))]
    #[case(json!(4), Some(4))]
    #[case(json!("3"), Some(3))]
    #[case(json!(0), None)]
    #[case(json!(2.5), None)]
    #[case(json!("2.5"), None)]
    #[case(json!("abc"), None)]
    #[case(json!(true), None)]
    fn credits_rule(#[case] credits: Value, #[case] expected: Option<i32>) {
        let input = json!({ "credits": credits });
        let mut submission = Submission::new(&input).expect("object");
        let parsed = submission.integer_at_least("credits", 1, "Credits must be at least 1.");
        assert_eq!(parsed, expected);
        assert_eq!(submission.is_clean(), expected.is_some());
    }

    #[rstest]
    fn non_object_is_a_body_error() {
        let errors = Submission::new(&json!(["not", "an", "object"])).expect_err("array body");
        assert!(errors.contains(BODY_FIELD));
    }

    #[rstest]
    fn failures_accumulate_across_fields() {
        let input = json!({ "firstname": " ", "email": "nope", "notes": 12 });
        let mut submission = Submission::new(&input).expect("object");
        submission.required_string("firstname", "First name cannot be empty.");
        submission.required_string("lastname", "Last name cannot be empty.");
        submission.email("email", "Invalid email address.");
        submission.optional_string("notes");
        let errors = submission.into_errors();

        assert_eq!(
            errors.iter().map(|(field, _)| field).collect::<Vec<_>>(),
            ["email", "firstname", "lastname", "notes"]
        );
    }

    #[rstest]
    #[case(json!({}), None)]
    #[case(json!({ "bio": null }), None)]
    #[case(json!({ "bio": "   " }), None)]
    #[case(json!({ "bio": " Maths lead " }), Some("Maths lead"))]
    fn optional_strings_normalise_blank_to_none(
        #[case] input: Value,
        #[case] expected: Option<&str>,
    ) {
        let mut submission = Submission::new(&input).expect("object");
        assert_eq!(submission.optional_string("bio").as_deref(), expected);
        assert!(submission.is_clean());
    }

    #[rstest]
    fn optional_date_rejects_free_text() {
        let input = json!({ "hiredate": "last spring" });
        let mut submission = Submission::new(&input).expect("object");
        assert!(
            submission
                .optional_date("hiredate", "Hire date must be a valid date (YYYY-MM-DD).")
                .is_none()
        );
        assert!(submission.into_errors().contains("hiredate"));
    }

    #[rstest]
    fn boolean_defaults_only_when_absent() {
        let input = json!({ "is_active": "yes" });
        let mut submission = Submission::new(&input).expect("object");
        assert_eq!(submission.boolean_or("is_email_confirmed", false, "bad"), Some(false));
        assert_eq!(submission.boolean_or("is_active", true, "bad"), None);
    }
}
