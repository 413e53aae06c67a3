//! Error and outcome types for the navigator
//!
//! Nothing in here ever escapes to the host: the controller logs every
//! `RouterError` it meets and turns it into a [`NavigationOutcome`].

use std::any::Any;
use thiserror::Error;

// ============================================================================
// Errors
// ============================================================================

/// Errors raised while configuring the router or running a navigation cycle
#[derive(Debug, Error)]
pub enum RouterError {
    /// The mount container could not be located
    #[error("container element '{locator}' not found")]
    ContainerNotFound { locator: String },

    /// A route handler or the not-found handler failed
    #[error("handler for '{path}' failed: {source}")]
    HandlerFailure {
        path: String,
        #[source]
        source: anyhow::Error,
    },

    /// A guard, middleware or post-navigation hook failed
    #[error("{hook} failed on '{path}': {source}")]
    HookFailure {
        hook: String,
        path: String,
        #[source]
        source: anyhow::Error,
    },

    /// A global component slot or a layout failed while composing
    #[error("{component} failed to render: {source}")]
    RenderFailure {
        component: String,
        #[source]
        source: anyhow::Error,
    },

    /// A route pattern could not be compiled
    #[error("invalid route pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A custom global component slot name is empty or reserved
    #[error("invalid global component slot name '{0}'")]
    InvalidSlotName(String),

    /// A custom global component slot was registered twice
    #[error("global component slot '{0}' registered twice")]
    DuplicateSlot(String),
}

/// Turn a caught panic payload into an error
pub(crate) fn panic_error(payload: &(dyn Any + Send)) -> anyhow::Error {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string());
    anyhow::anyhow!("panicked: {message}")
}

// ============================================================================
// Cycle outcomes
// ============================================================================

/// How a single navigation cycle ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// Content was composed into the mount container
    Rendered { path: String },
    /// The cycle completed without touching the container (non-renderable
    /// content or a missing container)
    Skipped { path: String },
    /// A guard or middleware aborted the cycle
    Aborted { path: String, reason: String },
    /// A guard or middleware redirected to another path
    Redirected { from: String, to: String },
    /// A newer cycle was dispatched before this one could render
    Superseded { path: String },
}

impl NavigationOutcome {
    /// Check if content was rendered
    pub fn is_rendered(&self) -> bool {
        matches!(self, NavigationOutcome::Rendered { .. })
    }

    /// Check if the cycle was aborted by a guard
    pub fn is_aborted(&self) -> bool {
        matches!(self, NavigationOutcome::Aborted { .. })
    }

    /// Check if the cycle was superseded by a newer one
    pub fn is_superseded(&self) -> bool {
        matches!(self, NavigationOutcome::Superseded { .. })
    }

    /// Get redirect target if the cycle redirected
    pub fn redirect_path(&self) -> Option<&str> {
        match self {
            NavigationOutcome::Redirected { to, .. } => Some(to),
            _ => None,
        }
    }

    /// Path the cycle was working on
    pub fn path(&self) -> &str {
        match self {
            NavigationOutcome::Rendered { path }
            | NavigationOutcome::Skipped { path }
            | NavigationOutcome::Aborted { path, .. }
            | NavigationOutcome::Superseded { path } => path,
            NavigationOutcome::Redirected { from, .. } => from,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
