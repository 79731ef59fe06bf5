//! Student record DTOs for the CSV sidecar
//!
//! Field names are part of the wire contract and stay as the source service
//! defined them: `Nombre`, `Apellido`, `Calificacion`, `PuntosExtras`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::{Validate, ValidationError};

/// Request body for appending a student row.
///
/// The three required fields accept any JSON value but must be "truthy";
/// `PuntosExtras` is optional and falls back to `0` in the written row.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct CreateStudentRequest {
    #[serde(rename = "Nombre", default)]
    #[validate(custom(function = "validate_truthy"))]
    pub nombre: Value,

    #[serde(rename = "Apellido", default)]
    #[validate(custom(function = "validate_truthy"))]
    pub apellido: Value,

    #[serde(rename = "Calificacion", default)]
    #[validate(custom(function = "validate_truthy"))]
    pub calificacion: Value,

    #[serde(rename = "PuntosExtras", default, skip_serializing_if = "Value::is_null")]
    pub puntos_extras: Value,
}

/// JS-style truthiness: absent, null, empty string, 0 and false all count
/// as missing. The source service gated required fields with `!field`.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn validate_truthy(value: &Value) -> Result<(), ValidationError> {
    if is_truthy(value) {
        Ok(())
    } else {
        Err(ValidationError::new("required"))
    }
}

impl CreateStudentRequest {
    /// Render the row exactly as the source appended it: comma-joined raw
    /// values, `PuntosExtras` replaced by `0` when falsy. Embedded commas are
    /// not escaped (a known fragility of the flat-file format, preserved).
    pub fn to_csv_line(&self) -> String {
        let extras = if is_truthy(&self.puntos_extras) {
            render(&self.puntos_extras)
        } else {
            "0".to_string()
        };
        format!(
            "{},{},{},{}",
            render(&self.nombre),
            render(&self.apellido),
            render(&self.calificacion),
            extras
        )
    }
}

/// Interpolate a JSON value the way a JS template literal would: strings
/// render bare, everything else through its JSON form.
fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
