//! Rules for a "create customer" payload.
//!
//! The same [`validate`] runs for JSON API bodies and for HTML form
//! submissions, so both entry points accept and reject exactly the same input.
//! Every field is checked and every failure is reported.

use super::CreateCustomer;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const PHONE_MIN_CHARS: usize = 7;
pub const ZIP_MIN_CHARS: usize = 4;

#[derive(thiserror::Error, Debug, Default, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
#[error("invalid customer: {form_errors:?} {field_errors:?}")]
pub struct ValidationErrors {
    pub form_errors: Vec<String>,
    pub field_errors: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    fn form(message: String) -> Self {
        Self {
            form_errors: vec![message],
            field_errors: BTreeMap::new(),
        }
    }

    fn add(&mut self, field: &str, message: String) {
        self.field_errors
            .entry(field.to_owned())
            .or_default()
            .push(message);
    }

    pub fn is_empty(&self) -> bool {
        self.form_errors.is_empty() && self.field_errors.is_empty()
    }

    pub fn messages_for(&self, field: &str) -> &[String] {
        self.field_errors
            .get(field)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

pub fn validate(input: &Value) -> Result<CreateCustomer, ValidationErrors> {
    let Some(object) = input.as_object() else {
        return Err(ValidationErrors::form(format!(
            "Expected object, received {}",
            kind_of(input)
        )));
    };
    let mut fields = Fields {
        object,
        errors: ValidationErrors::default(),
    };
    let first_name = fields.text("firstName", 1);
    let last_name = fields.text("lastName", 1);
    let email = fields.email("email");
    let phone = fields.text("phone", PHONE_MIN_CHARS);
    let address1 = fields.text("address1", 1);
    let address2 = fields.optional_text("address2");
    let city = fields.text("city", 1);
    let state = fields.text("state", 1);
    let zip = fields.text("zip", ZIP_MIN_CHARS);
    let notes = fields.optional_text("notes");
    let active = fields.optional_bool("active");
    let (
        Some(first_name),
        Some(last_name),
        Some(email),
        Some(phone),
        Some(address1),
        Some(city),
        Some(state),
        Some(zip),
    ) = (first_name, last_name, email, phone, address1, city, state, zip)
    else {
        return Err(fields.errors);
    };
    if !fields.errors.is_empty() {
        return Err(fields.errors);
    }
    Ok(CreateCustomer {
        first_name,
        last_name,
        email,
        phone,
        address1,
        address2,
        city,
        state,
        zip,
        notes,
        active: active.unwrap_or(true),
    })
}

struct Fields<'a> {
    object: &'a Map<String, Value>,
    errors: ValidationErrors,
}

impl Fields<'_> {
    // Outer `None` means the key holds something other than a string.
    fn string(&mut self, name: &str) -> Option<Option<String>> {
        match self.object.get(name) {
            None => Some(None),
            Some(Value::String(value)) => Some(Some(value.clone())),
            Some(other) => {
                self.errors.add(
                    name,
                    format!("Expected string, received {}", kind_of(other)),
                );
                None
            }
        }
    }

    // Lengths are UTF-16 code units, the unit browsers use for `minlength`.
    fn text(&mut self, name: &str, min_chars: usize) -> Option<String> {
        let value = self.required_string(name)?;
        if value.encode_utf16().count() < min_chars {
            self.errors.add(
                name,
                format!("String must contain at least {min_chars} character(s)"),
            );
            return None;
        }
        Some(value)
    }

    fn email(&mut self, name: &str) -> Option<String> {
        let value = self.required_string(name)?;
        if !is_email(&value) {
            self.errors.add(name, "Invalid email".to_owned());
            return None;
        }
        Some(value)
    }

    fn required_string(&mut self, name: &str) -> Option<String> {
        match self.string(name)? {
            Some(value) => Some(value),
            None => {
                self.errors.add(name, "Required".to_owned());
                None
            }
        }
    }

    fn optional_text(&mut self, name: &str) -> Option<String> {
        self.string(name).flatten()
    }

    fn optional_bool(&mut self, name: &str) -> Option<bool> {
        match self.object.get(name) {
            None => None,
            Some(Value::Bool(value)) => Some(*value),
            Some(other) => {
                self.errors.add(
                    name,
                    format!("Expected boolean, received {}", kind_of(other)),
                );
                None
            }
        }
    }
}

// RFC 5322 syntax narrowed to plain dot-atoms: no quoted local parts, no
// address literals, and a dotted domain ending in an alphabetic label.
fn is_email(value: &str) -> bool {
    if !email_address::EmailAddress::is_valid(value) {
        return false;
    }
    let Some((local, domain)) = value.rsplit_once('@') else {
        return false;
    };
    is_plain_local_part(local) && is_host_name(domain)
}

fn is_plain_local_part(local: &str) -> bool {
    !local.starts_with('.')
        && !local.ends_with('.')
        && !local.ends_with('\'')
        && !local.contains("..")
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_'+-.".contains(c))
}

fn is_host_name(domain: &str) -> bool {
    let labels: Vec<&str> = domain.split('.').collect();
    let Some((tld, hosts)) = labels.split_last() else {
        return false;
    };
    !hosts.is_empty()
        && hosts.iter().all(|label| {
            label.starts_with(|c: char| c.is_ascii_alphanumeric())
                && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
        && tld.len() >= 2
        && tld.chars().all(|c| c.is_ascii_alphabetic())
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
