//! Error types for widget store operations.

use crate::widget::WidgetId;
use thiserror::Error;

/// Failures surfaced by the widget store.
///
/// The store is left unchanged whenever one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WidgetError {
    /// Malformed or out-of-domain input.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    /// No widget with this id exists at the time of lookup.
    #[error("Widget not found: {0}")]
    NotFound(WidgetId),
}

impl WidgetError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

/// Result type for widget store operations.
pub type WidgetResult<T> = Result<T, WidgetError>;
