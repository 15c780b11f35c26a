//! Layered error definitions
//!
//! Categorized by source: config file / field validation / io

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== File Errors =====
    /// Configuration parse error (syntax, unsupported format)
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    // ===== Field Errors =====
    /// Enumerated field holds a value outside its accepted set
    #[error("unknown value '{value}' for '{field}', expected one of: {}", .expected.join(", "))]
    UnknownEnumValue {
        field: String,
        value: String,
        expected: Vec<String>,
    },

    /// I2C address outside the 7-bit range
    #[error("i2c address {value} at '{field}' is out of range, expected 1..=127")]
    AddressOutOfRange { field: String, value: i64 },

    /// Sub-sensor declaration that cannot be resolved to its slot metadata
    #[error("malformed sub-sensor at '{field}': {message}")]
    MalformedSubSensor { field: String, message: String },

    /// Key not part of the schema
    #[error("unknown key '{field}'")]
    UnknownKey { field: String },

    /// Value with the wrong type or shape
    #[error("invalid value '{value}' for '{field}': {message}")]
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },

    // ===== Cross-block Errors =====
    /// Configuration validation error spanning several blocks
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create unknown enum value error
    pub fn unknown_enum_value(
        field: impl Into<String>,
        value: impl Into<String>,
        expected: &[&str],
    ) -> Self {
        Self::UnknownEnumValue {
            field: field.into(),
            value: value.into(),
            expected: expected.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Create malformed sub-sensor error
    pub fn malformed_sub_sensor(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedSubSensor {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create unknown key error
    pub fn unknown_key(field: impl Into<String>) -> Self {
        Self::UnknownKey {
            field: field.into(),
        }
    }

    /// Create invalid value error
    pub fn invalid_value(
        field: impl Into<String>,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
            message: message.into(),
        }
    }

    /// Field path the error refers to, if any
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::UnknownEnumValue { field, .. }
            | Self::AddressOutOfRange { field, .. }
            | Self::MalformedSubSensor { field, .. }
            | Self::UnknownKey { field }
            | Self::InvalidValue { field, .. }
            | Self::ConfigValidation { field, .. } => Some(field),
            Self::ConfigParse { .. } | Self::Io(_) => None,
        }
    }

    /// Prefix the field path, used when a block sits inside a list
    pub fn within(self, prefix: &str) -> Self {
        let join = |field: String| {
            if field.starts_with('[') {
                format!("{prefix}{field}")
            } else {
                format!("{prefix}.{field}")
            }
        };
        match self {
            Self::UnknownEnumValue {
                field,
                value,
                expected,
            } => Self::UnknownEnumValue {
                field: join(field),
                value,
                expected,
            },
            Self::AddressOutOfRange { field, value } => Self::AddressOutOfRange {
                field: join(field),
                value,
            },
            Self::MalformedSubSensor { field, message } => Self::MalformedSubSensor {
                field: join(field),
                message,
            },
            Self::UnknownKey { field } => Self::UnknownKey { field: join(field) },
            Self::InvalidValue {
                field,
                value,
                message,
            } => Self::InvalidValue {
                field: join(field),
                value,
                message,
            },
            Self::ConfigValidation { field, message } => Self::ConfigValidation {
                field: join(field),
                message,
            },
            other => other,
        }
    }
}
