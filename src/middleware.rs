//! Route middleware and post-navigation hooks
//!
//! Middleware are attached to individual routes and run, in the order they
//! were added, after the global `before_each` guard and before the route
//! handler. They answer with the same [`GuardResult`] as guards, and the
//! first non-proceed result ends the chain.
//!
//! [`AfterEach`] hooks observe completed navigations and cannot change them.
//!
//! # Example
//!
//! ```
//! use spa_navigator::{middleware_fn, GuardResult};
//!
//! let require_query = middleware_fn(|ctx| async move {
//!     if ctx.query().contains("token") {
//!         GuardResult::proceed()
//!     } else {
//!         GuardResult::abort("missing token")
//!     }
//! });
//! ```

use crate::context::NavigationContext;
use crate::guards::GuardResult;
use futures::future::LocalBoxFuture;
use futures::FutureExt;
use std::future::Future;

/// Route-level middleware
pub trait Middleware {
    fn run(&self, ctx: &NavigationContext) -> LocalBoxFuture<'static, GuardResult>;

    /// Middleware name for debugging
    fn name(&self) -> &str {
        "Middleware"
    }
}

/// Helper to create middleware from an async function or closure
pub fn middleware_fn<F, Fut>(f: F) -> FnMiddleware<F>
where
    F: Fn(NavigationContext) -> Fut,
    Fut: Future<Output = GuardResult> + 'static,
{
    FnMiddleware { f }
}

/// Middleware created from a function
pub struct FnMiddleware<F> {
    f: F,
}

impl<F, Fut> Middleware for FnMiddleware<F>
where
    F: Fn(NavigationContext) -> Fut,
    Fut: Future<Output = GuardResult> + 'static,
{
    fn run(&self, ctx: &NavigationContext) -> LocalBoxFuture<'static, GuardResult> {
        (self.f)(ctx.clone()).boxed_local()
    }
}

// ============================================================================
// Post-navigation hooks
// ============================================================================

/// Hook run after every navigation that was not aborted or redirected
///
/// `from` is the route of the previous completed navigation.
pub trait AfterEach {
    fn after(
        &self,
        to: &NavigationContext,
        from: Option<&NavigationContext>,
    ) -> LocalBoxFuture<'static, ()>;
}

/// Create an [`AfterEach`] hook from an async function or closure
///
/// ```
/// use spa_navigator::after_fn;
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// let page_views = Rc::new(RefCell::new(Vec::new()));
/// let views = page_views.clone();
/// let hook = after_fn(move |to, _from| {
///     views.borrow_mut().push(to.path().to_string());
///     async {}
/// });
/// ```
pub fn after_fn<F, Fut>(f: F) -> FnAfterEach<F>
where
    F: Fn(NavigationContext, Option<NavigationContext>) -> Fut,
    Fut: Future<Output = ()> + 'static,
{
    FnAfterEach { f }
}

/// Post-navigation hook created from a function
pub struct FnAfterEach<F> {
    f: F,
}

impl<F, Fut> AfterEach for FnAfterEach<F>
where
    F: Fn(NavigationContext, Option<NavigationContext>) -> Fut,
    Fut: Future<Output = ()> + 'static,
{
    fn after(
        &self,
        to: &NavigationContext,
        from: Option<&NavigationContext>,
    ) -> LocalBoxFuture<'static, ()> {
        (self.f)(to.clone(), from.cloned()).boxed_local()
    }
}
