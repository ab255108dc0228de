//! Row predicates for the filter-and-transform pipeline.

use crate::error::StreamError;
use crate::io::csv::CsvRecord;
use regex::Regex;
use std::fmt;

/// Predicate over one named column of a [`CsvRecord`].
///
/// A record lacking the column never matches.
#[derive(Clone, Debug)]
pub enum FieldFilter {
    /// Exact, case-sensitive equality.
    Equals { field: String, value: String },
    /// Regular-expression search anywhere in the value.
    Matches { field: String, pattern: Regex },
    /// Column present with a non-empty value.
    NonEmpty { field: String },
}

impl FieldFilter {
    #[must_use]
    pub fn equals(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Equals {
            field: field.into(),
            value: value.into(),
        }
    }

    /// # Errors
    /// [`StreamError::Config`] if `pattern` is not a valid regex.
    pub fn matches(field: impl Into<String>, pattern: &str) -> Result<Self, StreamError> {
        let pattern = Regex::new(pattern)
            .map_err(|e| StreamError::Config(format!("invalid filter pattern: {e}")))?;
        Ok(Self::Matches {
            field: field.into(),
            pattern,
        })
    }

    #[must_use]
    pub fn non_empty(field: impl Into<String>) -> Self {
        Self::NonEmpty {
            field: field.into(),
        }
    }

    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            Self::Equals { field, .. } | Self::Matches { field, .. } | Self::NonEmpty { field } => {
                field
            }
        }
    }

    #[must_use]
    pub fn test(&self, record: &CsvRecord) -> bool {
        let Some(v) = record.get(self.field()) else {
            return false;
        };
        match self {
            Self::Equals { value, .. } => v == value,
            Self::Matches { pattern, .. } => pattern.is_match(v),
            Self::NonEmpty { .. } => !v.is_empty(),
        }
    }
}

impl fmt::Display for FieldFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equals { field, value } => write!(f, "{field} == {value:?}"),
            Self::Matches { field, pattern } => write!(f, "{field} =~ /{}/", pattern.as_str()),
            Self::NonEmpty { field } => write!(f, "{field} != \"\""),
        }
    }
}
