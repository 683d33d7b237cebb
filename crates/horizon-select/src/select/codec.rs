//! The `selected-index` attribute format.
//!
//! A single index is written as `"2"`, a multi selection as `"1,3,5"`.
//! Integers are read leniently: leading whitespace and a sign are allowed,
//! and parsing stops at the first non-digit, so `" 4px"` reads as `4`.

use std::fmt;
use std::str::FromStr;

/// Result type alias for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;

/// Errors reading a `selected-index` value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// No leading digits.
    #[error("'{0}' is not an integer")]
    NotAnInteger(String),

    /// Too many digits for an index.
    #[error("'{0}' is out of range")]
    OutOfRange(String),
}

/// Read the integer at the start of `text`.
pub fn parse_int(text: &str) -> Result<i64> {
    let trimmed = text.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let digits = &rest[..digits_end];
    if digits.is_empty() {
        return Err(CodecError::NotAnInteger(text.to_string()));
    }

    let magnitude: i64 = digits
        .parse()
        .map_err(|_| CodecError::OutOfRange(text.to_string()))?;
    Ok(if negative { -magnitude } else { magnitude })
}

/// A parsed `selected-index` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexList {
    One(i64),
    Many(Vec<i64>),
}

impl IndexList {
    /// The indices as a slice-like list.
    pub fn to_vec(&self) -> Vec<i64> {
        match self {
            IndexList::One(index) => vec![*index],
            IndexList::Many(indices) => indices.clone(),
        }
    }
}

impl FromStr for IndexList {
    type Err = CodecError;

    fn from_str(text: &str) -> Result<Self> {
        if text.contains(',') {
            text.split(',')
                .map(parse_int)
                .collect::<Result<Vec<_>>>()
                .map(IndexList::Many)
        } else {
            parse_int(text).map(IndexList::One)
        }
    }
}

impl fmt::Display for IndexList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexList::One(index) => write!(f, "{index}"),
            IndexList::Many(indices) => {
                for (i, index) in indices.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{index}")?;
                }
                Ok(())
            }
        }
    }
}
