//! Per-navigation context
//!
//! Every cycle builds a fresh [`NavigationContext`]: the resolved path, the
//! parameters and query, the matched route and its metadata, plus a
//! [`Navigator`] bound to the router that produced it. Contexts are never
//! mutated after the cycle hands them out.

use crate::params::{QueryParams, RouteParams};
use crate::route::{Meta, RouteDefinition};
use crate::router::{Router, RouterInner};
use crate::warn_log;
use std::fmt;
use std::rc::{Rc, Weak};

// ============================================================================
// Navigator
// ============================================================================

/// Navigation actions bound to a router
///
/// Holds a weak handle, so a context that outlives its router turns the
/// actions into logged no-ops instead of keeping the router alive.
#[derive(Clone, Default)]
pub struct Navigator {
    router: Weak<RouterInner>,
}

impl Navigator {
    pub(crate) fn new(router: &Rc<RouterInner>) -> Self {
        Self {
            router: Rc::downgrade(router),
        }
    }

    fn router(&self) -> Option<Router> {
        match self.router.upgrade() {
            Some(inner) => Some(Router::from_inner(inner)),
            None => {
                warn_log!("Navigation requested after the router was dropped");
                None
            }
        }
    }

    /// Navigate to `path`, adding a history entry
    pub fn navigate(&self, path: &str) {
        if let Some(router) = self.router() {
            router.navigate(path);
        }
    }

    /// Navigate to `path`, rewriting the current history entry
    pub fn replace(&self, path: &str) {
        if let Some(router) = self.router() {
            router.replace(path);
        }
    }

    pub fn back(&self) {
        if let Some(router) = self.router() {
            router.back();
        }
    }

    pub fn forward(&self) {
        if let Some(router) = self.router() {
            router.forward();
        }
    }

    /// Whether the router is still alive
    pub fn is_bound(&self) -> bool {
        self.router.strong_count() > 0
    }
}

impl fmt::Debug for Navigator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Navigator")
            .field("bound", &self.is_bound())
            .finish()
    }
}

// ============================================================================
// NavigationContext
// ============================================================================

/// Everything known about one navigation
#[derive(Clone)]
pub struct NavigationContext {
    path: String,
    params: RouteParams,
    query: QueryParams,
    route: Option<Rc<RouteDefinition>>,
    meta: Meta,
    navigator: Navigator,
}

impl NavigationContext {
    pub(crate) fn new(
        path: String,
        params: RouteParams,
        query: QueryParams,
        route: Option<Rc<RouteDefinition>>,
        navigator: Navigator,
    ) -> Self {
        let meta = route
            .as_ref()
            .map(|route| route.meta().clone())
            .unwrap_or_default();
        Self {
            path,
            params,
            query,
            route,
            meta,
            navigator,
        }
    }

    /// A context for `path` that belongs to no router
    ///
    /// Useful for exercising guards, middleware and components on their own;
    /// its navigation actions do nothing.
    ///
    /// # Example
    ///
    /// ```
    /// use spa_navigator::NavigationContext;
    ///
    /// let ctx = NavigationContext::detached("/about");
    /// assert_eq!(ctx.path(), "/about");
    /// assert!(ctx.route().is_none());
    /// assert!(ctx.is_active("/about"));
    /// ```
    pub fn detached(path: impl Into<String>) -> Self {
        Self::new(
            path.into(),
            RouteParams::new(),
            QueryParams::new(),
            None,
            Navigator::default(),
        )
    }

    #[must_use]
    pub fn with_params(mut self, params: RouteParams) -> Self {
        self.params = params;
        self
    }

    #[must_use]
    pub fn with_query(mut self, query: QueryParams) -> Self {
        self.query = query;
        self
    }

    #[must_use]
    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = meta;
        self
    }

    /// Resolved path (without base path or fragment delimiter)
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn params(&self) -> &RouteParams {
        &self.params
    }

    /// Shorthand for `params().get(name)`
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    pub fn query(&self) -> &QueryParams {
        &self.query
    }

    /// The matched route, `None` for a not-found navigation
    pub fn route(&self) -> Option<&Rc<RouteDefinition>> {
        self.route.as_ref()
    }

    /// Metadata of the matched route (empty when nothing matched)
    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn navigate(&self, path: &str) {
        self.navigator.navigate(path);
    }

    pub fn replace(&self, path: &str) {
        self.navigator.replace(path);
    }

    pub fn back(&self) {
        self.navigator.back();
    }

    pub fn forward(&self) {
        self.navigator.forward();
    }

    /// Whether this navigation is at exactly `path` (for active links)
    pub fn is_active(&self, path: &str) -> bool {
        self.path == path
    }
}

impl fmt::Debug for NavigationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NavigationContext")
            .field("path", &self.path)
            .field("params", &self.params)
            .field("query", &self.query)
            .field("route", &self.route.as_ref().map(|r| r.path()))
            .field("meta", &self.meta)
            .finish_non_exhaustive()
    }
}
