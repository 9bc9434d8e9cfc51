use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Kind {
    String,
    StringOrNumber,
}

impl Kind {
    fn accepts(self, value: &Value) -> bool {
        match self {
            Kind::String => value.is_string(),
            Kind::StringOrNumber => value.is_string() || value.is_number(),
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Kind::String => "a string",
            Kind::StringOrNumber => "a string or a number",
        }
    }
}

/// Fields every position message must carry. Extra fields are tolerated.
pub const REQUIRED: [(&str, Kind); 9] = [
    ("operator", Kind::String),
    ("lat", Kind::StringOrNumber),
    ("device", Kind::String),
    ("lon", Kind::StringOrNumber),
    ("timestamp", Kind::StringOrNumber),
    ("status", Kind::String),
    ("version", Kind::String),
    ("taxi", Kind::String),
    ("hash", Kind::String),
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("message is not a JSON object")]
    NotAnObject,

    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` must be {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },
}

pub fn validate(value: &Value) -> Result<&Map<String, Value>, SchemaError> {
    let object = value.as_object().ok_or(SchemaError::NotAnObject)?;
    for (field, kind) in REQUIRED {
        let value = object.get(field).ok_or(SchemaError::MissingField(field))?;
        if !kind.accepts(value) {
            return Err(SchemaError::WrongType {
                field,
                expected: kind.describe(),
            });
        }
    }
    Ok(object)
}
