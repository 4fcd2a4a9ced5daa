//! Top-level render guard.
//!
//! [`Boundary::render`] runs a render step and turns both returned errors and
//! panics into a [`Fallback`] notice. There is no retry: the only way out of
//! the fallback is the reload action, which starts over from a fresh store.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::error::RenderError;

/// Outcome of a guarded render.
#[derive(Debug)]
pub enum Rendered<T> {
    Content(T),
    Fallback(Fallback),
}

impl<T> Rendered<T> {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Rendered::Fallback(_))
    }
}

/// Generic failure notice shown instead of the failed view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fallback {
    pub title: &'static str,
    pub message: &'static str,
    /// Label of the full-reload action.
    pub action: &'static str,
    /// Error text, only when developer details are enabled.
    pub details: Option<String>,
}

impl Fallback {
    fn new(details: Option<String>) -> Self {
        Self {
            title: "Something went wrong",
            message: "We apologize for the inconvenience. Please try refreshing the page \
                      or contact support if the problem persists.",
            action: "Refresh Page",
            details,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Boundary {
    show_details: bool,
}

impl Boundary {
    pub fn new(show_details: bool) -> Self {
        Self { show_details }
    }

    /// Run `render`, catching errors and panics.
    pub fn render<T>(&self, render: impl FnOnce() -> Result<T, RenderError>) -> Rendered<T> {
        let outcome = panic::catch_unwind(AssertUnwindSafe(render))
            .unwrap_or_else(|payload| Err(RenderError::Panicked(panic_message(payload.as_ref()))));

        match outcome {
            Ok(content) => Rendered::Content(content),
            Err(error) => {
                tracing::error!(%error, "render failed, showing fallback");
                Rendered::Fallback(Fallback::new(self.show_details.then(|| error.to_string())))
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_content_through() {
        let rendered = Boundary::default().render(|| Ok::<_, RenderError>(42));
        assert!(matches!(rendered, Rendered::Content(42)));
    }

    #[test]
    fn error_becomes_fallback_without_details() {
        let rendered =
            Boundary::new(false).render(|| Err::<(), _>(RenderError::Message("boom".into())));
        match rendered {
            Rendered::Fallback(fallback) => {
                assert_eq!(fallback.title, "Something went wrong");
                assert_eq!(fallback.details, None);
            }
            Rendered::Content(()) => panic!("expected fallback"),
        }
    }

    #[test]
    fn panic_is_caught_with_details() {
        let rendered = Boundary::new(true).render(|| -> Result<(), RenderError> {
            panic!("list exploded");
        });
        match rendered {
            Rendered::Fallback(fallback) => {
                assert_eq!(
                    fallback.details.as_deref(),
                    Some("render panicked: list exploded")
                );
            }
            Rendered::Content(()) => panic!("expected fallback"),
        }
    }
}
