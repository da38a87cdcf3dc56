//! Field validation shared by every entity.
//!
//! Each rule exists once here; the category, supply, staff and customer modules
//! compose them instead of carrying their own copies.

use crate::errors::{Error, Result};
use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

#[allow(clippy::expect_used)] // Literal patterns below are always valid
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
    )
    .expect("Email pattern is always valid")
});

#[allow(clippy::expect_used)]
static RFC_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-ZÑ&]{3,4}[0-9]{6}[A-Z0-9]{3}$")
        .expect("RFC pattern is always valid")
});

#[allow(clippy::expect_used)]
static CURP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z]{4}[0-9]{6}[HM][A-Z]{5}[0-9A-Z][0-9]$")
        .expect("CURP pattern is always valid")
});

/// Minimum password length for staff and customers.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Returns true when `value` looks like a deliverable email address.
#[must_use]
pub fn is_valid_email(value: &str) -> bool {
    value.len() <= 254 && EMAIL_RE.is_match(value)
}

/// Trims and upper-cases an RFC or CURP before validation, encryption or hashing.
#[must_use]
pub fn normalize_id_code(value: &str) -> String {
    value.trim().to_uppercase()
}

/// RFC: 12 (company) or 13 (person) characters.
#[must_use]
pub fn is_valid_rfc(value: &str) -> bool {
    let rfc = normalize_id_code(value);
    let len = rfc.chars().count();
    (12..=13).contains(&len) && RFC_RE.is_match(&rfc)
}

/// CURP: exactly 18 characters.
#[must_use]
pub fn is_valid_curp(value: &str) -> bool {
    let curp = normalize_id_code(value);
    curp.chars().count() == 18 && CURP_RE.is_match(&curp)
}

/// Strips every non-digit character (spaces, dashes, parentheses, `+`).
#[must_use]
pub fn digits_only(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// A phone number is 10 to 15 digits with nothing else.
#[must_use]
pub fn is_valid_phone(value: &str) -> bool {
    (10..=15).contains(&value.len()) && value.chars().all(|c| c.is_ascii_digit())
}

/// Trims a required text field and checks its length in characters.
///
/// `label` is the field name used in the error message.
pub fn required_text(value: Option<&str>, label: &str, min: usize, max: usize) -> Result<String> {
    let trimmed = value.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return Err(Error::validation(format!("El campo {label} es requerido")));
    }
    let len = trimmed.chars().count();
    if len < min {
        return Err(Error::validation(format!(
            "El campo {label} debe tener al menos {min} caracteres"
        )));
    }
    if len > max {
        return Err(Error::validation(format!(
            "El campo {label} no puede exceder {max} caracteres"
        )));
    }
    Ok(trimmed.to_string())
}

/// Trims an optional text field; blank becomes `None`.
pub fn optional_text(value: Option<&str>, label: &str, max: usize) -> Result<Option<String>> {
    let Some(trimmed) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    if trimmed.chars().count() > max {
        return Err(Error::validation(format!(
            "El campo {label} no puede exceder {max} caracteres"
        )));
    }
    Ok(Some(trimmed.to_string()))
}

/// Validates and lower-cases an email address.
pub fn email(value: Option<&str>) -> Result<String> {
    let trimmed = value.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() || !is_valid_email(trimmed) {
        return Err(Error::validation("El correo es requerido y debe ser válido"));
    }
    Ok(trimmed.to_lowercase())
}

/// Validates a staff phone number, which must already be digits only.
pub fn phone(value: Option<&str>) -> Result<String> {
    let trimmed = value.map(str::trim).unwrap_or_default();
    if !is_valid_phone(trimmed) {
        return Err(Error::validation(
            "El teléfono es requerido y debe tener entre 10 y 15 dígitos",
        ));
    }
    Ok(trimmed.to_string())
}

/// Rejects passwords shorter than the minimum length.
pub fn password(value: &str) -> Result<()> {
    if value.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::validation(format!(
            "La contraseña debe tener al menos {MIN_PASSWORD_LEN} caracteres"
        )));
    }
    Ok(())
}

/// Validates an RFC and returns it upper-cased without blanks.
pub fn rfc(value: &str) -> Result<String> {
    if !is_valid_rfc(value) {
        return Err(Error::validation(
            "RFC inválido. Debe tener entre 12 y 13 caracteres alfanuméricos",
        ));
    }
    Ok(normalize_id_code(value))
}

/// Validates a CURP and returns it upper-cased without blanks.
pub fn curp(value: &str) -> Result<String> {
    if !is_valid_curp(value) {
        return Err(Error::validation(
            "CURP inválido. Debe tener exactamente 18 caracteres",
        ));
    }
    Ok(normalize_id_code(value))
}

/// Parses an optional `YYYY-MM-DD` date; blank becomes `None`.
pub fn optional_date(value: Option<&str>) -> Result<Option<NaiveDate>> {
    let Some(trimmed) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| Error::validation("Fecha inválida. Use el formato AAAA-MM-DD"))
}

/// Deserializes an optional integer sent either as a JSON number or as a numeric
/// string (`5`, `"5"`, `" 5 "`, `5.7`). Fractions are truncated. Anything else,
/// including non-numeric strings, becomes `None` and is left to the field rules.
pub fn lenient_int<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;
    use serde_json::Value;

    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(truncate)),
        Some(Value::String(s)) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(truncate))
        }
        _ => None,
    })
}

#[allow(clippy::cast_possible_truncation)]
fn truncate(value: f64) -> i64 {
    value.trunc() as i64
}
