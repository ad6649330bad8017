//! What a controller asks the page to do: show a notice, then maybe navigate.

use im_client::{ApiError, REJECTED_MESSAGE};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

impl NoticeKind {
    /// CSS modifier on the `.notification` element.
    pub fn as_class(self) -> &'static str {
        match self {
            NoticeKind::Success => "success",
            NoticeKind::Error => "error",
            NoticeKind::Info => "info",
        }
    }
}

/// A transient toast message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            message: message.into(),
        }
    }

    /// Error notice for a failed call. A rejection without a server message
    /// reads as `fallback` instead of the generic text.
    pub fn from_error(err: &ApiError, fallback: &str) -> Self {
        match err {
            ApiError::Rejected { message } if message == REJECTED_MESSAGE => Self::error(fallback),
            other => Self::error(other.user_message()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Relative or absolute URL.
    To(String),
    Reload,
    /// Run the logout flow (used after a password change).
    Logout,
}

/// Navigation scheduled after a delay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub to: Navigation,
    pub after: Duration,
}

impl Redirect {
    pub fn to(target: impl Into<String>, after: Duration) -> Self {
        Self {
            to: Navigation::To(target.into()),
            after,
        }
    }

    pub fn now(target: impl Into<String>) -> Self {
        Self::to(target, Duration::ZERO)
    }

    pub fn reload(after: Duration) -> Self {
        Self {
            to: Navigation::Reload,
            after,
        }
    }
}

/// Result of submitting a form or pressing an action button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome {
    Success {
        notice: Option<Notice>,
        redirect: Option<Redirect>,
    },
    Failure {
        notice: Notice,
        /// Input element to focus, for locally rejected forms.
        field: Option<&'static str>,
        redirect: Option<Redirect>,
    },
}

impl FormOutcome {
    pub fn success(notice: Notice, redirect: Redirect) -> Self {
        FormOutcome::Success {
            notice: Some(notice),
            redirect: Some(redirect),
        }
    }

    pub fn failure(notice: Notice) -> Self {
        FormOutcome::Failure {
            notice,
            field: None,
            redirect: None,
        }
    }

    pub fn invalid(field: &'static str, message: &str) -> Self {
        FormOutcome::Failure {
            notice: Notice::error(message),
            field: Some(field),
            redirect: None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FormOutcome::Success { .. })
    }

    pub fn notice(&self) -> Option<&Notice> {
        match self {
            FormOutcome::Success { notice, .. } => notice.as_ref(),
            FormOutcome::Failure { notice, .. } => Some(notice),
        }
    }

    pub fn redirect(&self) -> Option<&Redirect> {
        match self {
            FormOutcome::Success { redirect, .. } | FormOutcome::Failure { redirect, .. } => {
                redirect.as_ref()
            }
        }
    }
}
