//! Navigation guards
//!
//! A guard inspects the target of a navigation (and the navigation it
//! replaces) and decides whether it proceeds, is aborted, or is redirected
//! elsewhere. The router's `before_each` hook is a [`Guard`]; route-level
//! middleware share the same [`GuardResult`] contract.

use crate::context::NavigationContext;
use crate::middleware::Middleware;
use futures::future::LocalBoxFuture;
use futures::FutureExt;
use std::future::Future;

/// Result of a guard check
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum GuardResult {
    /// Continue with the navigation
    #[default]
    Proceed,

    /// Stop the navigation: nothing renders and the current route stays
    Abort {
        /// Reason for aborting (logged)
        reason: String,
    },

    /// Drop this navigation and start a new one
    Redirect {
        /// Path to navigate to instead
        to: String,
    },
}

impl GuardResult {
    pub fn proceed() -> Self {
        GuardResult::Proceed
    }

    pub fn abort(reason: impl Into<String>) -> Self {
        GuardResult::Abort {
            reason: reason.into(),
        }
    }

    pub fn redirect(to: impl Into<String>) -> Self {
        GuardResult::Redirect { to: to.into() }
    }

    pub fn is_proceed(&self) -> bool {
        matches!(self, GuardResult::Proceed)
    }

    pub fn is_abort(&self) -> bool {
        matches!(self, GuardResult::Abort { .. })
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self, GuardResult::Redirect { .. })
    }

    /// Get redirect path if this is a redirect
    pub fn redirect_path(&self) -> Option<&str> {
        match self {
            GuardResult::Redirect { to } => Some(to.as_str()),
            _ => None,
        }
    }
}

/// Pre-navigation guard
///
/// `from` is the route of the last completed navigation, `None` on the first
/// one.
///
/// # Example
///
/// ```
/// use futures::future::LocalBoxFuture;
/// use futures::FutureExt;
/// use spa_navigator::{Guard, GuardResult, NavigationContext};
///
/// struct MaintenanceGuard {
///     enabled: bool,
/// }
///
/// impl Guard for MaintenanceGuard {
///     fn check(
///         &self,
///         to: &NavigationContext,
///         _from: Option<&NavigationContext>,
///     ) -> LocalBoxFuture<'static, GuardResult> {
///         let result = if self.enabled && to.path() != "/maintenance" {
///             GuardResult::redirect("/maintenance")
///         } else {
///             GuardResult::proceed()
///         };
///         async move { result }.boxed_local()
///     }
///
///     fn name(&self) -> &str {
///         "MaintenanceGuard"
///     }
/// }
/// ```
pub trait Guard {
    fn check(
        &self,
        to: &NavigationContext,
        from: Option<&NavigationContext>,
    ) -> LocalBoxFuture<'static, GuardResult>;

    /// Guard name (for logging)
    fn name(&self) -> &str {
        "Guard"
    }
}

/// Create a guard from an async function or closure
///
/// The closure receives owned (cheaply cloned) contexts so the returned future
/// may hold on to them.
///
/// # Example
///
/// ```
/// use spa_navigator::{guard_fn, GuardResult};
///
/// let guard = guard_fn(|to, _from| async move {
///     if to.path().starts_with("/admin") {
///         GuardResult::abort("admin area is closed")
///     } else {
///         GuardResult::proceed()
///     }
/// });
/// ```
pub fn guard_fn<F, Fut>(f: F) -> FnGuard<F>
where
    F: Fn(NavigationContext, Option<NavigationContext>) -> Fut,
    Fut: Future<Output = GuardResult> + 'static,
{
    FnGuard { f }
}

/// Guard created from a function or closure
pub struct FnGuard<F> {
    f: F,
}

impl<F, Fut> Guard for FnGuard<F>
where
    F: Fn(NavigationContext, Option<NavigationContext>) -> Fut,
    Fut: Future<Output = GuardResult> + 'static,
{
    fn check(
        &self,
        to: &NavigationContext,
        from: Option<&NavigationContext>,
    ) -> LocalBoxFuture<'static, GuardResult> {
        (self.f)(to.clone(), from.cloned()).boxed_local()
    }
}

// ============================================================================
// Authentication
// ============================================================================

/// Authentication check; returns `true` when the user is logged in
pub type AuthCheckFn = Box<dyn Fn() -> bool>;

/// Redirects routes that require authentication to a login path
///
/// A route requires authentication when its metadata flag (`requiresAuth` by
/// default) is truthy. Navigations to the login path itself always proceed.
/// Works as a `before_each` guard or as route middleware.
///
/// # Example
///
/// ```
/// use spa_navigator::AuthGuard;
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// let logged_in = Rc::new(Cell::new(false));
/// let state = logged_in.clone();
/// let guard = AuthGuard::new(move || state.get(), "/login");
/// ```
pub struct AuthGuard {
    check_fn: AuthCheckFn,
    redirect_path: String,
    meta_key: String,
}

impl AuthGuard {
    /// Create a new auth guard with a custom check function and redirect path
    pub fn new<F>(check_fn: F, redirect_path: impl Into<String>) -> Self
    where
        F: Fn() -> bool + 'static,
    {
        Self {
            check_fn: Box::new(check_fn),
            redirect_path: redirect_path.into(),
            meta_key: "requiresAuth".to_string(),
        }
    }

    /// Use a different metadata flag to mark protected routes
    #[must_use]
    pub fn with_meta_key(mut self, key: impl Into<String>) -> Self {
        self.meta_key = key.into();
        self
    }

    /// Decide synchronously for a target context
    pub fn evaluate(&self, to: &NavigationContext) -> GuardResult {
        if !to.meta().flag(&self.meta_key) || to.path() == self.redirect_path {
            return GuardResult::proceed();
        }
        if (self.check_fn)() {
            GuardResult::proceed()
        } else {
            GuardResult::redirect(self.redirect_path.clone())
        }
    }
}

impl Guard for AuthGuard {
    fn check(
        &self,
        to: &NavigationContext,
        _from: Option<&NavigationContext>,
    ) -> LocalBoxFuture<'static, GuardResult> {
        futures::future::ready(self.evaluate(to)).boxed_local()
    }

    fn name(&self) -> &str {
        "AuthGuard"
    }
}

impl Middleware for AuthGuard {
    fn run(&self, ctx: &NavigationContext) -> LocalBoxFuture<'static, GuardResult> {
        futures::future::ready(self.evaluate(ctx)).boxed_local()
    }

    fn name(&self) -> &str {
        "AuthGuard"
    }
}
