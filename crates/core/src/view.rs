//! Load state of a data-backed view.

use std::fmt::Display;

/// What a view shows for one data dependency.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ViewState<T> {
    #[default]
    Loading,
    /// Fetch failed; `message` is rendered inline with a retry action.
    Failed { message: String },
    Ready(T),
}

impl<T> ViewState<T> {
    pub fn from_result<E: Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => ViewState::Ready(value),
            Err(err) => ViewState::Failed {
                message: err.to_string(),
            },
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ViewState<U> {
        match self {
            ViewState::Loading => ViewState::Loading,
            ViewState::Failed { message } => ViewState::Failed { message },
            ViewState::Ready(value) => ViewState::Ready(f(value)),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ViewState::Ready(_))
    }

    pub fn as_ready(&self) -> Option<&T> {
        match self {
            ViewState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            ViewState::Failed { message } => Some(message),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_result_and_map() {
        let ok: ViewState<u32> = ViewState::from_result(Ok::<_, String>(2));
        assert_eq!(ok.clone().map(|n| n * 2), ViewState::Ready(4));
        assert!(ok.is_ready());

        let failed: ViewState<u32> = ViewState::from_result(Err("timeout"));
        assert_eq!(failed.error_message(), Some("timeout"));
        assert_eq!(failed.map(|n| n + 1).as_ready(), None);
        assert!(!ViewState::<u32>::default().is_ready());
    }
}
