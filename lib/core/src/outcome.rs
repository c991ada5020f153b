//! Fail-soft results for the recommendation pipeline
//!
//! Pipeline operations never surface errors to their callers. An empty
//! result is an explicit variant carrying the reason, so "nothing to
//! recommend" and "something went wrong internally" stay distinguishable
//! without either one aborting the request.

use crate::property::PropertyId;
use serde::Serialize;

/// Why a pipeline operation produced nothing
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum EmptyReason {
    EmptyHistory,
    EmptyPool,
    ZeroLimit,
    UnknownTarget(Option<PropertyId>),
    NoEncoding,
    Failed(String),
}

impl std::fmt::Display for EmptyReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EmptyReason::EmptyHistory => write!(f, "user history is empty"),
            EmptyReason::EmptyPool => write!(f, "property pool is empty"),
            EmptyReason::ZeroLimit => write!(f, "limit is zero"),
            EmptyReason::UnknownTarget(Some(id)) => write!(f, "property {} not found", id),
            EmptyReason::UnknownTarget(None) => write!(f, "no target property given"),
            EmptyReason::NoEncoding => write!(f, "no feature encoding available"),
            EmptyReason::Failed(msg) => write!(f, "internal failure: {}", msg),
        }
    }
}

/// Either a value or the reason there is none
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Found(T),
    Empty(EmptyReason),
}

impl<T> Outcome<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Outcome::Found(_))
    }

    pub fn empty_reason(&self) -> Option<&EmptyReason> {
        match self {
            Outcome::Found(_) => None,
            Outcome::Empty(reason) => Some(reason),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Found(value) => Outcome::Found(f(value)),
            Outcome::Empty(reason) => Outcome::Empty(reason),
        }
    }
}

impl<T: Default> Outcome<T> {
    /// Collapse to the bare value, empty outcomes becoming `T::default()`
    pub fn into_inner(self) -> T {
        match self {
            Outcome::Found(value) => value,
            Outcome::Empty(_) => T::default(),
        }
    }
}
