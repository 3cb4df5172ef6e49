//! Validated identifier types shared across the riskview crates.
//!
//! Both datasets key their rows by integer identifiers. Parsing them once at the edge
//! (form input, CLI argument, CSV cell) keeps malformed input out of the lookup logic.

use std::fmt;
use std::str::FromStr;

/// Errors that can occur when parsing an identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    /// The input was empty or contained only whitespace
    #[error("identifier cannot be empty")]
    Empty,
    /// The input was not a base-10 integer
    #[error("identifier is not an integer: {0:?}")]
    NotAnInteger(String),
}

fn parse_id(input: &str) -> Result<i64, IdError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(IdError::Empty);
    }
    trimmed
        .parse::<i64>()
        .map_err(|_| IdError::NotAnInteger(trimmed.to_owned()))
}

macro_rules! integer_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[derive(serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw integer key.
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the raw integer key.
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl FromStr for $name {
            type Err = IdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_id(s).map(Self)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

integer_id!(
    /// Key of a row in the transactions dataset (`Transaction_ID`).
    TransactionId
);

integer_id!(
    /// Key of a row in the patients dataset (`Patient_ID`).
    ///
    /// Transactions carry one of these as their patient reference.
    PatientId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_whitespace() {
        let id: TransactionId = " 42 ".parse().expect("should parse");
        assert_eq!(id.get(), 42);
    }

    #[test]
    fn test_parse_rejects_empty_input() {
        assert_eq!("   ".parse::<PatientId>(), Err(IdError::Empty));
    }

    #[test]
    fn test_parse_rejects_non_integer() {
        let err = "7.5".parse::<TransactionId>().unwrap_err();
        assert_eq!(err, IdError::NotAnInteger("7.5".into()));
        assert!("abc".parse::<TransactionId>().is_err());
    }

    #[test]
    fn test_serializes_as_bare_integer() {
        let json = serde_json::to_string(&PatientId::new(3)).unwrap();
        assert_eq!(json, "3");
        let back: PatientId = serde_json::from_str("3").unwrap();
        assert_eq!(back, PatientId::new(3));
    }
}
