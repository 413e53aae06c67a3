//! Route definition and configuration

use crate::context::NavigationContext;
use crate::error::RouterError;
use crate::matcher::PathPattern;
use crate::middleware::Middleware;
use crate::node::{Element, Node};
use futures::future::LocalBoxFuture;
use futures::FutureExt;
use serde_json::{Map, Value};
use std::fmt;
use std::future::Future;
use std::rc::Rc;

// ============================================================================
// Content
// ============================================================================

/// Conversion of a handler's return value into renderable content
///
/// `Ok(None)` is content that is not renderable: the cycle skips rendering
/// without treating it as a failure. `Err` is a handler failure.
pub trait IntoContent {
    fn into_content(self) -> anyhow::Result<Option<Node>>;
}

impl IntoContent for Node {
    fn into_content(self) -> anyhow::Result<Option<Node>> {
        Ok(Some(self))
    }
}

impl IntoContent for Element {
    fn into_content(self) -> anyhow::Result<Option<Node>> {
        Ok(Some(self.into()))
    }
}

impl IntoContent for String {
    fn into_content(self) -> anyhow::Result<Option<Node>> {
        Ok(Some(Node::Text(self)))
    }
}

impl IntoContent for &'static str {
    fn into_content(self) -> anyhow::Result<Option<Node>> {
        Ok(Some(Node::text(self)))
    }
}

impl IntoContent for () {
    fn into_content(self) -> anyhow::Result<Option<Node>> {
        Ok(None)
    }
}

impl<T: IntoContent> IntoContent for Option<T> {
    fn into_content(self) -> anyhow::Result<Option<Node>> {
        match self {
            Some(content) => content.into_content(),
            None => Ok(None),
        }
    }
}

impl<T, E> IntoContent for Result<T, E>
where
    T: IntoContent,
    E: Into<anyhow::Error>,
{
    fn into_content(self) -> anyhow::Result<Option<Node>> {
        self.map_err(Into::into)?.into_content()
    }
}

// ============================================================================
// Handler
// ============================================================================

/// Page handler: builds the content for a navigation
///
/// Implemented for every `Fn(NavigationContext) -> impl Future` whose output
/// is [`IntoContent`]. Wrap synchronous functions with [`sync_handler`].
///
/// # Example
///
/// ```
/// use spa_navigator::{h, Handler, NavigationContext};
///
/// let handler = |ctx: NavigationContext| async move {
///     h("h1").text(format!("Product #{}", ctx.param("id").unwrap_or("?")))
/// };
/// # fn assert_handler(_: impl Handler) {}
/// # assert_handler(handler);
/// ```
pub trait Handler {
    fn call(&self, ctx: NavigationContext) -> LocalBoxFuture<'static, anyhow::Result<Option<Node>>>;
}

impl<F, Fut, R> Handler for F
where
    F: Fn(NavigationContext) -> Fut,
    Fut: Future<Output = R> + 'static,
    R: IntoContent,
{
    fn call(&self, ctx: NavigationContext) -> LocalBoxFuture<'static, anyhow::Result<Option<Node>>> {
        let fut = (self)(ctx);
        async move { fut.await.into_content() }.boxed_local()
    }
}

/// Adapt a synchronous function into a [`Handler`]
///
/// ```
/// use spa_navigator::{h, sync_handler, NavigationContext};
///
/// let about = sync_handler(|_ctx: NavigationContext| h("h1").text("About Us"));
/// ```
pub fn sync_handler<F, R>(f: F) -> SyncHandler<F>
where
    F: Fn(NavigationContext) -> R,
    R: IntoContent,
{
    SyncHandler { f }
}

/// Handler created by [`sync_handler`]
pub struct SyncHandler<F> {
    f: F,
}

impl<F, R> Handler for SyncHandler<F>
where
    F: Fn(NavigationContext) -> R,
    R: IntoContent,
{
    fn call(&self, ctx: NavigationContext) -> LocalBoxFuture<'static, anyhow::Result<Option<Node>>> {
        let content = (self.f)(ctx).into_content();
        futures::future::ready(content).boxed_local()
    }
}

// ============================================================================
// Meta
// ============================================================================

/// Arbitrary per-route metadata, e.g. a page title or an auth requirement
///
/// # Example
///
/// ```
/// use spa_navigator::Meta;
///
/// let mut meta = Meta::new();
/// meta.insert("title", "Dashboard - MySPA");
/// meta.insert("requiresAuth", true);
///
/// assert_eq!(meta.get_str("title"), Some("Dashboard - MySPA"));
/// assert!(meta.flag("requiresAuth"));
/// assert!(!meta.flag("missing"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Meta {
    values: Map<String, Value>,
}

impl Meta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// String value for `key`, if it is a string
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key)?.as_str()
    }

    /// Truthiness of `key`: `true`, non-zero numbers, non-empty strings,
    /// arrays and objects
    pub fn flag(&self, key: &str) -> bool {
        match self.values.get(key) {
            None | Some(Value::Null) => false,
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Array(_)) | Some(Value::Object(_)) => true,
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }
}

impl From<Map<String, Value>> for Meta {
    fn from(values: Map<String, Value>) -> Self {
        Self { values }
    }
}

// ============================================================================
// RouteOptions
// ============================================================================

/// Optional parts of a route registration
///
/// # Example
///
/// ```
/// use spa_navigator::{middleware_fn, GuardResult, RouteOptions};
///
/// let options = RouteOptions::new()
///     .layout("dashboard")
///     .meta("title", "Dashboard")
///     .meta("requiresAuth", true)
///     .middleware(middleware_fn(|_ctx| async { GuardResult::proceed() }));
/// ```
#[derive(Default, Clone)]
pub struct RouteOptions {
    layout: Option<String>,
    meta: Meta,
    middleware: Vec<Rc<dyn Middleware>>,
}

impl RouteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render through the named layout instead of the router default
    pub fn layout(mut self, name: impl Into<String>) -> Self {
        self.layout = Some(name.into());
        self
    }

    pub fn meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.meta.insert(key, value);
        self
    }

    /// Replace all metadata at once
    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = meta;
        self
    }

    /// Append a middleware; middleware run in the order added
    pub fn middleware(mut self, middleware: impl Middleware + 'static) -> Self {
        self.middleware.push(Rc::new(middleware));
        self
    }
}

impl fmt::Debug for RouteOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteOptions")
            .field("layout", &self.layout)
            .field("meta", &self.meta)
            .field("middleware", &middleware_names(&self.middleware))
            .finish()
    }
}

fn middleware_names(middleware: &[Rc<dyn Middleware>]) -> Vec<&str> {
    middleware.iter().map(|m| m.name()).collect()
}

// ============================================================================
// RouteDefinition
// ============================================================================

/// A registered route; immutable once built
pub struct RouteDefinition {
    pattern: PathPattern,
    handler: Rc<dyn Handler>,
    layout: Option<String>,
    meta: Meta,
    middleware: Vec<Rc<dyn Middleware>>,
}

impl RouteDefinition {
    /// Compile `pattern` and bind it to `handler`
    pub fn new(
        pattern: &str,
        handler: impl Handler + 'static,
        options: RouteOptions,
    ) -> Result<Self, RouterError> {
        Ok(Self {
            pattern: PathPattern::compile(pattern)?,
            handler: Rc::new(handler),
            layout: options.layout,
            meta: options.meta,
            middleware: options.middleware,
        })
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    /// Pattern text as registered
    pub fn path(&self) -> &str {
        self.pattern.as_str()
    }

    pub fn handler(&self) -> Rc<dyn Handler> {
        self.handler.clone()
    }

    /// Layout name set at registration, if any
    pub fn layout(&self) -> Option<&str> {
        self.layout.as_deref()
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    pub fn middleware(&self) -> &[Rc<dyn Middleware>] {
        &self.middleware
    }
}

impl fmt::Debug for RouteDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteDefinition")
            .field("pattern", &self.pattern.as_str())
            .field("layout", &self.layout)
            .field("meta", &self.meta)
            .field("middleware", &middleware_names(&self.middleware))
            .finish_non_exhaustive()
    }
}
