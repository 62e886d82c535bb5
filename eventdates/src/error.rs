use jiff::civil::DateTime;

/// All errors produced by eventdates.
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum RecurrenceError {
    /// A malformed rule, a reversed anchor, or anything else the caller
    /// must fix before retrying. Nothing was mutated.
    #[error("invalid recurrence input: {message}")]
    InvalidInput { message: String },

    #[error("unknown timezone '{name}': {message}")]
    UnknownTimezone { name: String, message: String },

    /// The rule never lands inside the horizon (e.g. `feb 30` every year).
    /// Callers should report this as "no upcoming dates", not as a crash.
    #[error("no occurrences on or before {horizon}")]
    NoOccurrences { horizon: DateTime },

    #[error("date arithmetic out of range: {0}")]
    Range(#[from] jiff::Error),

    #[error("invalid configuration: {message}")]
    Config { message: String },
}

impl RecurrenceError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn unknown_timezone(name: impl Into<String>, message: impl ToString) -> Self {
        Self::UnknownTimezone {
            name: name.into(),
            message: message.to_string(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// True for the empty-result condition, which is reportable but not a failure.
    pub fn is_empty_result(&self) -> bool {
        matches!(self, Self::NoOccurrences { .. })
    }
}
