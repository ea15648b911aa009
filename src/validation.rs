//! Form Validation
//!
//! Declarative per-field rules checked before a form is submitted. Only the
//! first failing rule of a field is reported, in a fixed order:
//! required, length, email/phone, pattern, numeric range, custom.
//!
//! Validation is pure; views render the resulting messages next to fields.

use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::store::PAYMENT_METHODS;

/// Submitted form fields by name
pub type FormData = BTreeMap<String, String>;

/// Predicate over a field value and the whole form
pub type Check = Arc<dyn Fn(&str, &FormData) -> bool + Send + Sync>;

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
const PHONE_PATTERN: &str = r"^\+?[0-9\s\-()/]{6,20}$";

static EMAIL_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
static PHONE_REGEX: OnceLock<Option<Regex>> = OnceLock::new();

fn builtin_regex(cell: &'static OnceLock<Option<Regex>>, pattern: &str) -> Option<&'static Regex> {
    cell.get_or_init(|| match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::error!(pattern, error = %e, "Invalid built-in pattern");
            None
        }
    })
    .as_ref()
}

/// A single validation rule
#[derive(Clone)]
pub enum Rule {
    Required,
    MinLength(usize),
    MaxLength(usize),
    Email,
    Phone,
    Pattern { regex: Regex, message: String },
    Min(f64),
    Max(f64),
    Custom { check: Check, message: String },
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Required => write!(f, "Required"),
            Rule::MinLength(n) => write!(f, "MinLength({})", n),
            Rule::MaxLength(n) => write!(f, "MaxLength({})", n),
            Rule::Email => write!(f, "Email"),
            Rule::Phone => write!(f, "Phone"),
            Rule::Pattern { regex, .. } => write!(f, "Pattern({})", regex.as_str()),
            Rule::Min(n) => write!(f, "Min({})", n),
            Rule::Max(n) => write!(f, "Max({})", n),
            Rule::Custom { message, .. } => write!(f, "Custom({:?})", message),
        }
    }
}

impl Rule {
    /// Pattern rule from a regular expression
    pub fn pattern(pattern: &str, message: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Rule::Pattern {
            regex: Regex::new(pattern)?,
            message: message.into(),
        })
    }

    /// Rule backed by an arbitrary predicate
    pub fn custom<F>(message: impl Into<String>, check: F) -> Self
    where
        F: Fn(&str, &FormData) -> bool + Send + Sync + 'static,
    {
        Rule::Custom {
            check: Arc::new(check),
            message: message.into(),
        }
    }

    /// Field value must equal the value of `other`
    pub fn matches_field(other: &str, message: impl Into<String>) -> Self {
        let other = other.to_string();
        Self::custom(message, move |value, form| {
            form.get(&other).map(|v| v.as_str()) == Some(value)
        })
    }

    fn precedence(&self) -> u8 {
        match self {
            Rule::Required => 0,
            Rule::MinLength(_) | Rule::MaxLength(_) => 1,
            Rule::Email | Rule::Phone => 2,
            Rule::Pattern { .. } => 3,
            Rule::Min(_) | Rule::Max(_) => 4,
            Rule::Custom { .. } => 5,
        }
    }

    /// Error message if `value` violates the rule
    fn check(&self, value: &str, form: &FormData) -> Option<String> {
        match self {
            Rule::Required => {
                value.is_empty().then(|| "Dieses Feld ist erforderlich.".to_string())
            }
            Rule::MinLength(min) => (value.chars().count() < *min)
                .then(|| format!("Mindestens {} Zeichen erforderlich.", min)),
            Rule::MaxLength(max) => (value.chars().count() > *max)
                .then(|| format!("Maximal {} Zeichen erlaubt.", max)),
            Rule::Email => (!builtin_regex(&EMAIL_REGEX, EMAIL_PATTERN)
                .is_some_and(|re| re.is_match(value)))
            .then(|| "Bitte geben Sie eine gültige E-Mail-Adresse ein.".to_string()),
            Rule::Phone => (!builtin_regex(&PHONE_REGEX, PHONE_PATTERN)
                .is_some_and(|re| re.is_match(value)))
            .then(|| "Bitte geben Sie eine gültige Telefonnummer ein.".to_string()),
            Rule::Pattern { regex, message } => (!regex.is_match(value)).then(|| message.clone()),
            Rule::Min(min) => match parse_number(value) {
                Some(n) if n >= *min => None,
                Some(_) => Some(format!("Der Wert muss mindestens {} sein.", min)),
                None => Some("Bitte geben Sie eine Zahl ein.".to_string()),
            },
            Rule::Max(max) => match parse_number(value) {
                Some(n) if n <= *max => None,
                Some(_) => Some(format!("Der Wert darf höchstens {} sein.", max)),
                None => Some("Bitte geben Sie eine Zahl ein.".to_string()),
            },
            Rule::Custom { check, message } => (!check(value, form)).then(|| message.clone()),
        }
    }
}

fn parse_number(value: &str) -> Option<f64> {
    value.replace(',', ".").parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Outcome of [`FormValidator::validate`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationResult {
    pub is_valid: bool,
    /// First failing message per field
    pub errors: BTreeMap<String, String>,
}

impl ValidationResult {
    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }
}

/// Rule set for one form
#[derive(Debug, Clone, Default)]
pub struct FormValidator {
    fields: Vec<(String, Vec<Rule>)>,
}

impl FormValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `rule` for `field`
    pub fn add_rule(&mut self, field: &str, rule: Rule) -> &mut Self {
        match self.fields.iter_mut().find(|(name, _)| name == field) {
            Some((_, rules)) => rules.push(rule),
            None => self.fields.push((field.to_string(), vec![rule])),
        }
        self
    }

    /// Builder form of [`add_rule`](Self::add_rule)
    pub fn rule(mut self, field: &str, rule: Rule) -> Self {
        self.add_rule(field, rule);
        self
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// First error for `field`, if any
    pub fn validate_field(&self, field: &str, form: &FormData) -> Option<String> {
        let rules = self
            .fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, rules)| rules)?;

        let value = form.get(field).map(|v| v.trim()).unwrap_or("");
        let required = rules.iter().any(|r| matches!(r, Rule::Required));
        if value.is_empty() && !required {
            return None;
        }

        let mut ordered: Vec<&Rule> = rules.iter().collect();
        ordered.sort_by_key(|r| r.precedence());
        ordered.into_iter().find_map(|rule| rule.check(value, form))
    }

    /// Check every registered field
    pub fn validate(&self, form: &FormData) -> ValidationResult {
        let errors: BTreeMap<String, String> = self
            .fields
            .iter()
            .filter_map(|(name, _)| {
                self.validate_field(name, form)
                    .map(|message| (name.clone(), message))
            })
            .collect();

        ValidationResult {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    // ============ Shop forms ============

    pub fn login() -> Self {
        Self::new()
            .rule("email", Rule::Required)
            .rule("email", Rule::Email)
            .rule("password", Rule::Required)
    }

    pub fn register() -> Self {
        Self::new()
            .rule("first_name", Rule::Required)
            .rule("first_name", Rule::MaxLength(50))
            .rule("last_name", Rule::Required)
            .rule("last_name", Rule::MaxLength(50))
            .rule("email", Rule::Required)
            .rule("email", Rule::Email)
            .rule("password", Rule::Required)
            .rule("password", Rule::MinLength(8))
            .rule("password_confirm", Rule::Required)
            .rule(
                "password_confirm",
                Rule::matches_field("password", "Die Passwörter stimmen nicht überein."),
            )
    }

    pub fn checkout() -> Self {
        Self::new()
            .rule("first_name", Rule::Required)
            .rule("last_name", Rule::Required)
            .rule("email", Rule::Required)
            .rule("email", Rule::Email)
            .rule("phone", Rule::Phone)
            .rule("street", Rule::Required)
            .rule("postal_code", Rule::Required)
            .rule(
                "postal_code",
                Rule::custom("Bitte geben Sie eine gültige Postleitzahl ein.", |v, _| {
                    v.len() == 5 && v.chars().all(|c| c.is_ascii_digit())
                }),
            )
            .rule("city", Rule::Required)
            .rule("payment_method", Rule::Required)
            .rule(
                "payment_method",
                Rule::custom("Bitte wählen Sie eine Zahlungsart.", |v, _| {
                    PAYMENT_METHODS.iter().any(|(code, _)| *code == v)
                }),
            )
            .rule("notes", Rule::MaxLength(500))
    }

    pub fn contact() -> Self {
        Self::new()
            .rule("first_name", Rule::Required)
            .rule("last_name", Rule::Required)
            .rule("email", Rule::Required)
            .rule("email", Rule::Email)
            .rule("subject", Rule::Required)
            .rule("subject", Rule::MaxLength(200))
            .rule("message", Rule::Required)
            .rule("message", Rule::MinLength(10))
            .rule("message", Rule::MaxLength(2000))
    }

    pub fn newsletter() -> Self {
        Self::new()
            .rule("email", Rule::Required)
            .rule("email", Rule::Email)
    }

    pub fn review() -> Self {
        Self::new()
            .rule("rating", Rule::Required)
            .rule("rating", Rule::Min(1.0))
            .rule("rating", Rule::Max(5.0))
            .rule("title", Rule::MaxLength(100))
            .rule("comment", Rule::MaxLength(2000))
            .rule("reviewer_name", Rule::MaxLength(100))
    }
}
