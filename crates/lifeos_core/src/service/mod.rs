//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls and pure engines into use-case APIs.
//! - Keep UI/FFI layers decoupled from storage details.

use crate::model::journal::ProtocolIdError;
use crate::repo::RepoError;
use chrono::NaiveDate;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod diagnostic_service;
pub mod progression_service;

/// Service error for progression and diagnostic use-cases.
#[derive(Debug)]
pub enum ServiceError {
    InvalidProtocolId(ProtocolIdError),
    /// Completion dated before the protocol's latest journal day.
    CompletionBeforeLatest {
        requested: NaiveDate,
        latest: NaiveDate,
    },
    UnknownMetric(String),
    /// Reading value is NaN or infinite.
    NonFiniteValue,
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidProtocolId(err) => write!(f, "{err}"),
            Self::CompletionBeforeLatest { requested, latest } => write!(
                f,
                "completion date {requested} is before the latest recorded completion {latest}"
            ),
            Self::UnknownMetric(name) => write!(f, "unknown diagnostic metric: `{name}`"),
            Self::NonFiniteValue => write!(f, "reading value must be a finite number"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidProtocolId(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<ProtocolIdError> for ServiceError {
    fn from(value: ProtocolIdError) -> Self {
        Self::InvalidProtocolId(value)
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
