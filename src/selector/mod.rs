//! Ordering of NAPTR and SRV answers.
//!
//! Both selectors are pure: they never mutate the caller's records and work
//! on an internal copy. The only source of nondeterminism is the random
//! number generator passed to [`select_services`] in
//! [`SelectionMode::Weighted`].
use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;

pub mod pointer;
pub mod service;

pub use pointer::{select_pointers, ServiceTag};
pub use service::{order_by_weight, select_services};

/// How records within one SRV priority tier are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMode {
    /// RFC 2782 weighted random draw.
    #[default]
    Weighted,
    /// Weight descending, then target ascending. Reproducible, but does not
    /// spread load.
    Deterministic,
}

impl SelectionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionMode::Weighted => "weighted",
            SelectionMode::Deterministic => "deterministic",
        }
    }
}

impl FromStr for SelectionMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "weighted" | "random" => Ok(SelectionMode::Weighted),
            "deterministic" => Ok(SelectionMode::Deterministic),
            _ => Err(Error::MalformedInput(format!(
                "unknown selection mode '{}', expected weighted or deterministic",
                s
            ))),
        }
    }
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
