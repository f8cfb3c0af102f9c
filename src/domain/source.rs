// Source results - what each clinical data source produces per fetch
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Appointments,
    Vitals,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Appointments => "appointments",
            SourceKind::Vitals => "vitals",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SourceError {
    #[error("{kind} provider failed: {message}")]
    Provider { kind: SourceKind, message: String },

    #[error("{0} source has no patient bound")]
    Unbound(SourceKind),

    #[error("{0} fetch task was aborted")]
    Aborted(SourceKind),
}

impl SourceError {
    pub fn provider(kind: SourceKind, error: &anyhow::Error) -> Self {
        SourceError::Provider {
            kind,
            message: format!("{:#}", error),
        }
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            SourceError::Provider { kind, .. } => *kind,
            SourceError::Unbound(kind) | SourceError::Aborted(kind) => *kind,
        }
    }
}

/// Exactly one of data or error per completed fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceResult<T> {
    Data(Vec<T>),
    Error(SourceError),
}

impl<T> SourceResult<T> {
    pub fn from_fetch(kind: SourceKind, fetched: anyhow::Result<Vec<T>>) -> Self {
        match fetched {
            Ok(items) => SourceResult::Data(items),
            Err(e) => SourceResult::Error(SourceError::provider(kind, &e)),
        }
    }

    /// Data for display; an error carries no stale data alongside it.
    pub fn data(&self) -> &[T] {
        match self {
            SourceResult::Data(items) => items,
            SourceResult::Error(_) => &[],
        }
    }

    pub fn error(&self) -> Option<&SourceError> {
        match self {
            SourceResult::Data(_) => None,
            SourceResult::Error(e) => Some(e),
        }
    }

    pub fn status(&self) -> Result<(), SourceError> {
        match self {
            SourceResult::Data(_) => Ok(()),
            SourceResult::Error(e) => Err(e.clone()),
        }
    }
}
