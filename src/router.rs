//! Navigation controller
//!
//! [`Router`] owns the route table, the history adapter and the layout
//! composer, and runs one navigation cycle per triggering event:
//!
//! 1. read path and query from the history adapter
//! 2. resolve a route and build a [`NavigationContext`]
//! 3. run the `before_each` guard (abort or redirect ends the cycle)
//! 4. run the route's middleware in order (same contract)
//! 5. invoke the handler, or the not-found handler
//! 6. pick the route's layout, else the default one
//! 7. render renderable content through the layout composer
//! 8. run the `after_each` hook
//! 9. retain the context as the current route
//! 10. scroll to the origin
//!
//! Errors and panics from handlers, hooks, slots and layouts are contained and
//! logged; nothing unwinds into the host's executor.
//!
//! Cycles run as local tasks on the configured [`Spawner`]. Every dispatch
//! takes a new sequence number; a cycle that is no longer the latest discards
//! its work before rendering, so a slow navigation can never overwrite a newer
//! one.

use crate::context::{NavigationContext, Navigator};
use crate::error::{panic_error, NavigationOutcome, RouterError};
use crate::guards::{Guard, GuardResult};
use crate::history::{HistoryAdapter, Mode};
use crate::host::{Host, HostEvent, Spawner};
use crate::layout::{error_content, slot, GlobalComponents, LayoutComposer, LayoutRegistry};
use crate::middleware::AfterEach;
use crate::node::{h, Element, Node};
use crate::params::{QueryParams, RouteParams};
use crate::route::{sync_handler, Handler, RouteDefinition, RouteOptions};
use crate::table::RouteTable;
use crate::{debug_log, error_log, trace_log, warn_log};
use futures::future::LocalBoxFuture;
use futures::FutureExt;
use serde::Deserialize;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

// ============================================================================
// Configuration
// ============================================================================

/// Serializable router settings
///
/// # Example
///
/// ```
/// use spa_navigator::{Mode, RouterConfig};
///
/// let config: RouterConfig = serde_json::from_str(
///     r#"{ "mode": "history", "basePath": "/my-app" }"#,
/// ).unwrap();
///
/// assert_eq!(config.mode, Mode::History);
/// assert_eq!(config.base_path, "/my-app");
/// assert_eq!(config.container, "#app");
/// assert_eq!(config.layout, "default");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Locator of the mount container
    pub container: String,
    /// Which part of the location holds the routable path
    pub mode: Mode,
    /// Prefix stripped from and re-applied to paths in history mode
    #[serde(alias = "basePath")]
    pub base_path: String,
    /// Layout used by routes that name none
    pub layout: String,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            container: "#app".to_string(),
            mode: Mode::Hash,
            base_path: String::new(),
            layout: "default".to_string(),
        }
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`Router`]
pub struct RouterBuilder {
    host: Rc<dyn Host>,
    spawner: Rc<dyn Spawner>,
    config: RouterConfig,
    components: GlobalComponents,
    extra_components: Vec<(String, crate::layout::SlotFn)>,
    layouts: LayoutRegistry,
    before_each: Option<Rc<dyn Guard>>,
    after_each: Option<Rc<dyn AfterEach>>,
    not_found: Option<Rc<dyn Handler>>,
}

impl RouterBuilder {
    fn new(host: Rc<dyn Host>, spawner: Rc<dyn Spawner>) -> Self {
        Self {
            host,
            spawner,
            config: RouterConfig::default(),
            components: GlobalComponents::new(),
            extra_components: Vec::new(),
            layouts: LayoutRegistry::new(),
            before_each: None,
            after_each: None,
            not_found: None,
        }
    }

    /// Apply a whole configuration
    pub fn config(mut self, config: RouterConfig) -> Self {
        self.config = config;
        self
    }

    pub fn container(mut self, locator: impl Into<String>) -> Self {
        self.config.container = locator.into();
        self
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.config.mode = mode;
        self
    }

    pub fn base_path(mut self, base_path: impl Into<String>) -> Self {
        self.config.base_path = base_path.into();
        self
    }

    /// Layout used by routes that name none
    pub fn default_layout(mut self, name: impl Into<String>) -> Self {
        self.config.layout = name.into();
        self
    }

    pub fn header<F, R>(mut self, f: F) -> Self
    where
        F: Fn(Option<&NavigationContext>) -> R + 'static,
        R: Into<Option<Node>>,
    {
        self.components = self.components.with_header(slot(f));
        self
    }

    pub fn footer<F, R>(mut self, f: F) -> Self
    where
        F: Fn(Option<&NavigationContext>) -> R + 'static,
        R: Into<Option<Node>>,
    {
        self.components = self.components.with_footer(slot(f));
        self
    }

    pub fn sidebar<F, R>(mut self, f: F) -> Self
    where
        F: Fn(Option<&NavigationContext>) -> R + 'static,
        R: Into<Option<Node>>,
    {
        self.components = self.components.with_sidebar(slot(f));
        self
    }

    /// Add an extra global component for custom layouts; the name is
    /// validated by [`build`](Self::build)
    pub fn component<F, R>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Option<&NavigationContext>) -> R + 'static,
        R: Into<Option<Node>>,
    {
        self.extra_components.push((name.into(), slot(f)));
        self
    }

    /// Register a custom layout
    pub fn layout<F, R>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Node, &GlobalComponents, &NavigationContext) -> R + 'static,
        R: Into<Node>,
    {
        self.layouts.register(
            name,
            Rc::new(
                move |content: Node, components: &GlobalComponents, ctx: &NavigationContext| -> Node {
                    f(content, components, ctx).into()
                },
            ),
        );
        self
    }

    /// Guard run before every navigation
    pub fn before_each(mut self, guard: impl Guard + 'static) -> Self {
        self.before_each = Some(Rc::new(guard));
        self
    }

    /// Hook run after every navigation that was not aborted or redirected
    pub fn after_each(mut self, hook: impl AfterEach + 'static) -> Self {
        self.after_each = Some(Rc::new(hook));
        self
    }

    /// Handler for paths no route matches
    pub fn not_found(mut self, handler: impl Handler + 'static) -> Self {
        self.not_found = Some(Rc::new(handler));
        self
    }

    /// Validate the global components and create the router
    pub fn build(self) -> Result<Router, RouterError> {
        let mut components = self.components;
        for (name, f) in self.extra_components {
            components.add(&name, f)?;
        }

        let not_found = self.not_found.unwrap_or_else(|| -> Rc<dyn Handler> {
            Rc::new(sync_handler(|ctx: NavigationContext| default_not_found(&ctx)))
        });

        let inner = RouterInner {
            host: self.host,
            spawner: self.spawner,
            history: HistoryAdapter::new(self.config.mode, &self.config.base_path),
            default_layout: self.config.layout,
            table: RefCell::new(RouteTable::new()),
            composer: LayoutComposer::new(self.config.container, self.layouts, components),
            before_each: self.before_each,
            after_each: self.after_each,
            not_found,
            current: RefCell::new(None),
            last_outcome: RefCell::new(None),
            sequence: Cell::new(0),
            started: Cell::new(false),
        };

        Ok(Router {
            inner: Rc::new(inner),
        })
    }
}

// ============================================================================
// Router
// ============================================================================

pub(crate) struct RouterInner {
    host: Rc<dyn Host>,
    spawner: Rc<dyn Spawner>,
    history: HistoryAdapter,
    default_layout: String,
    table: RefCell<RouteTable>,
    composer: LayoutComposer,
    before_each: Option<Rc<dyn Guard>>,
    after_each: Option<Rc<dyn AfterEach>>,
    not_found: Rc<dyn Handler>,
    current: RefCell<Option<NavigationContext>>,
    last_outcome: RefCell<Option<NavigationOutcome>>,
    sequence: Cell<u64>,
    started: Cell<bool>,
}

/// The navigation controller
///
/// Cheap to clone; clones share the same state.
///
/// # Example
///
/// ```
/// use futures::executor::LocalPool;
/// use spa_navigator::{h, sync_handler, MemoryHost, Mode, RouteOptions, Router};
/// use std::rc::Rc;
///
/// let host = Rc::new(MemoryHost::new("/").with_mount("#app"));
/// let mut pool = LocalPool::new();
///
/// let router = Router::builder(host.clone(), Rc::new(pool.spawner()))
///     .mode(Mode::History)
///     .build()
///     .unwrap();
///
/// router
///     .route("/", sync_handler(|_| h("h1").text("Home")), RouteOptions::new())
///     .route(
///         "/products/:id",
///         sync_handler(|ctx| h("h1").text(format!("Product #{}", ctx.param("id").unwrap_or("")))),
///         RouteOptions::new().meta("title", "Product Detail"),
///     );
///
/// router.start();
/// pool.run_until_stalled();
/// assert!(host.html("#app").unwrap().contains("Home"));
///
/// router.navigate("/products/42");
/// pool.run_until_stalled();
/// assert!(host.html("#app").unwrap().contains("Product #42"));
/// ```
#[derive(Clone)]
pub struct Router {
    inner: Rc<RouterInner>,
}

impl Router {
    /// Start configuring a router for `host`, running cycles on `spawner`
    pub fn builder(host: Rc<dyn Host>, spawner: Rc<dyn Spawner>) -> RouterBuilder {
        RouterBuilder::new(host, spawner)
    }

    pub(crate) fn from_inner(inner: Rc<RouterInner>) -> Self {
        Self { inner }
    }

    // ------------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------------

    /// Register a route; returns the router for chained registration
    ///
    /// Routes are matched in registration order and the first match wins.
    ///
    /// # Panics
    ///
    /// Panics if `pattern` cannot be compiled. Use [`try_route`](Self::try_route)
    /// to handle that case.
    pub fn route(
        &self,
        pattern: &str,
        handler: impl Handler + 'static,
        options: RouteOptions,
    ) -> &Self {
        if let Err(err) = self.try_route(pattern, handler, options) {
            panic!("{err}");
        }
        self
    }

    /// Register a route, reporting an uncompilable pattern as an error
    pub fn try_route(
        &self,
        pattern: &str,
        handler: impl Handler + 'static,
        options: RouteOptions,
    ) -> Result<&Self, RouterError> {
        let definition = RouteDefinition::new(pattern, handler, options)?;
        self.inner.table.borrow_mut().register(definition);
        Ok(self)
    }

    // ------------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------------

    /// Subscribe to host events and run the initial navigation
    ///
    /// History mode follows `PopState` and intercepts clicks on elements
    /// marked `data-link`; hash mode follows `HashChange`. Navigations
    /// requested before `start` only update the location.
    pub fn start(&self) {
        if self.inner.started.replace(true) {
            warn_log!("Router already started; ignoring start()");
            return;
        }

        let router = Rc::downgrade(&self.inner);
        let mode = self.inner.history.mode();
        self.inner
            .host
            .add_listener(Rc::new(move |event: &HostEvent<'_>| -> bool {
                let Some(inner) = router.upgrade() else {
                    return false;
                };
                let router = Router::from_inner(inner);
                match (mode, event) {
                    (Mode::History, HostEvent::PopState) | (Mode::Hash, HostEvent::HashChange) => {
                        router.dispatch();
                        false
                    }
                    (Mode::History, HostEvent::Click { composed_path }) => {
                        router.intercept_click(composed_path)
                    }
                    _ => false,
                }
            }));

        debug_log!("Router started in {:?} mode", mode);
        self.dispatch();
    }

    pub fn is_started(&self) -> bool {
        self.inner.started.get()
    }

    // ------------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------------

    /// Navigate to `path`, adding a history entry
    pub fn navigate(&self, path: &str) {
        trace_log!("navigate('{}')", path);
        self.inner.history.push(&*self.inner.host, path);
        self.dispatch_after_write();
    }

    /// Navigate to `path`, rewriting the current history entry
    pub fn replace(&self, path: &str) {
        trace_log!("replace('{}')", path);
        self.inner.history.replace(&*self.inner.host, path);
        self.dispatch_after_write();
    }

    /// Go back one history entry; the host's notification starts the cycle
    pub fn back(&self) {
        self.inner.history.back(&*self.inner.host);
    }

    /// Go forward one history entry; the host's notification starts the cycle
    pub fn forward(&self) {
        self.inner.history.forward(&*self.inner.host);
    }

    /// Navigation actions bound to this router
    pub fn navigator(&self) -> Navigator {
        Navigator::new(&self.inner)
    }

    // ------------------------------------------------------------------------
    // Global components
    // ------------------------------------------------------------------------

    /// Replace a global component and re-run navigation for the current
    /// location (once started)
    pub fn update_global_component<F, R>(&self, name: &str, f: F) -> Result<(), RouterError>
    where
        F: Fn(Option<&NavigationContext>) -> R + 'static,
        R: Into<Option<Node>>,
    {
        self.inner.composer.update_component(name, Some(slot(f)))?;
        debug_log!("Global component '{}' updated", name);
        self.rerender();
        Ok(())
    }

    /// Unset a global component and re-run navigation for the current
    /// location (once started)
    pub fn remove_global_component(&self, name: &str) -> Result<(), RouterError> {
        self.inner.composer.update_component(name, None)?;
        debug_log!("Global component '{}' removed", name);
        self.rerender();
        Ok(())
    }

    /// Snapshot of the global components
    pub fn global_components(&self) -> GlobalComponents {
        self.inner.composer.components()
    }

    // ------------------------------------------------------------------------
    // State
    // ------------------------------------------------------------------------

    /// Context of the last completed navigation
    pub fn current_route(&self) -> Option<NavigationContext> {
        self.inner.current.borrow().clone()
    }

    /// Outcome of the most recently finished cycle
    pub fn last_outcome(&self) -> Option<NavigationOutcome> {
        self.inner.last_outcome.borrow().clone()
    }

    /// Routable path of the host's current location
    pub fn current_path(&self) -> String {
        self.inner.history.path(&*self.inner.host)
    }

    pub fn mode(&self) -> Mode {
        self.inner.history.mode()
    }

    pub fn history(&self) -> &HistoryAdapter {
        &self.inner.history
    }

    pub fn route_count(&self) -> usize {
        self.inner.table.borrow().len()
    }

    /// Route resolution cache statistics
    #[cfg(feature = "cache")]
    pub fn cache_stats(&self) -> crate::cache::CacheStats {
        self.inner.table.borrow().cache_stats()
    }

    // ------------------------------------------------------------------------
    // Cycle
    // ------------------------------------------------------------------------

    /// History writes are silent, so history mode starts the cycle itself;
    /// fragment writes come back as `HashChange`
    fn dispatch_after_write(&self) {
        if self.inner.started.get() && !self.inner.history.writes_notify() {
            self.dispatch();
        }
    }

    fn rerender(&self) {
        if self.inner.started.get() {
            self.dispatch();
        }
    }

    /// Handle a click in history mode; returns `true` to suppress the default
    fn intercept_click(&self, composed_path: &[Node]) -> bool {
        let Some(link) = composed_path
            .iter()
            .filter_map(Node::as_element)
            .find(|el| el.has_attr("data-link"))
        else {
            return false;
        };

        match link.get_attr("href") {
            Some(href) => self.navigate(href),
            None => {
                debug_log!("Ignoring click on <{}> marked data-link without href", link.tag());
            }
        }
        true
    }

    /// Capture the location and spawn a cycle for it
    fn dispatch(&self) {
        let seq = self.inner.sequence.get() + 1;
        self.inner.sequence.set(seq);

        let host = &*self.inner.host;
        let path = self.inner.history.path(host);
        let query = self.inner.history.query(host);
        trace_log!("Dispatching cycle #{} for '{}'", seq, path);

        let router = self.clone();
        self.inner.spawner.spawn(
            async move {
                router.run_cycle(seq, path, query).await;
            }
            .boxed_local(),
        );
    }

    fn is_latest(&self, seq: u64) -> bool {
        self.inner.sequence.get() == seq
    }

    async fn run_cycle(self, seq: u64, path: String, query: QueryParams) -> NavigationOutcome {
        let outcome = self.cycle(seq, path, query).await;
        trace_log!("Cycle #{} finished: {:?}", seq, outcome);
        *self.inner.last_outcome.borrow_mut() = Some(outcome.clone());
        outcome
    }

    async fn cycle(&self, seq: u64, path: String, query: QueryParams) -> NavigationOutcome {
        let inner = &self.inner;

        let resolved = inner.table.borrow().resolve(&path);
        let (route, params) = match resolved {
            Some(found) => (Some(found.route), found.params),
            None => (None, RouteParams::new()),
        };
        let ctx = NavigationContext::new(
            path.clone(),
            params,
            query,
            route.clone(),
            Navigator::new(inner),
        );

        if let Some(guard) = inner.before_each.clone() {
            let previous = self.current_route();
            let result = contain(|| guard.check(&ctx, previous.as_ref()))
                .await
                .unwrap_or_else(|source| hook_failed(guard.name(), &path, source));
            if let Some(outcome) = self.apply_guard(seq, &path, guard.name(), result) {
                return outcome;
            }
        }

        if let Some(route) = &route {
            for middleware in route.middleware() {
                let result = contain(|| middleware.run(&ctx))
                    .await
                    .unwrap_or_else(|source| hook_failed(middleware.name(), &path, source));
                if let Some(outcome) = self.apply_guard(seq, &path, middleware.name(), result) {
                    return outcome;
                }
            }
        }

        let handler = match &route {
            Some(route) => route.handler(),
            None => {
                debug_log!("No route matches '{}'", path);
                inner.not_found.clone()
            }
        };
        let content = invoke(handler, &ctx).await;

        let layout = route
            .as_ref()
            .and_then(|route| route.layout())
            .unwrap_or(inner.default_layout.as_str())
            .to_string();

        if !self.is_latest(seq) {
            debug_log!("Cycle #{} for '{}' superseded before render", seq, path);
            return NavigationOutcome::Superseded { path };
        }

        let outcome = match content {
            Some(content) => match inner.composer.render(&*inner.host, content, &layout, &ctx) {
                Ok(()) => NavigationOutcome::Rendered { path: path.clone() },
                Err(err) => {
                    error_log!("{}", err);
                    NavigationOutcome::Skipped { path: path.clone() }
                }
            },
            None => {
                debug_log!("Content for '{}' is not renderable; skipping render", path);
                NavigationOutcome::Skipped { path: path.clone() }
            }
        };

        if let Some(hook) = inner.after_each.clone() {
            let previous = self.current_route();
            if let Err(source) = contain(|| hook.after(&ctx, previous.as_ref())).await {
                let err = RouterError::HookFailure {
                    hook: "after_each".to_string(),
                    path: path.clone(),
                    source,
                };
                error_log!("{}", err);
            }
        }

        if self.is_latest(seq) {
            *inner.current.borrow_mut() = Some(ctx);
        } else {
            debug_log!(
                "Cycle #{} for '{}' superseded after render; keeping current route",
                seq,
                path
            );
        }

        inner.host.scroll_to(0, 0);
        outcome
    }

    /// Turn a guard or middleware answer into an early cycle outcome
    fn apply_guard(
        &self,
        seq: u64,
        path: &str,
        source: &str,
        result: GuardResult,
    ) -> Option<NavigationOutcome> {
        if result.is_proceed() {
            return None;
        }
        if !self.is_latest(seq) {
            debug_log!("Cycle #{} for '{}' superseded during {}", seq, path, source);
            return Some(NavigationOutcome::Superseded {
                path: path.to_string(),
            });
        }

        match result {
            GuardResult::Proceed => None,
            GuardResult::Abort { reason } => {
                debug_log!("{} aborted navigation to '{}': {}", source, path, reason);
                Some(NavigationOutcome::Aborted {
                    path: path.to_string(),
                    reason,
                })
            }
            GuardResult::Redirect { to } => {
                debug_log!("{} redirected '{}' to '{}'", source, path, to);
                self.navigate(&to);
                Some(NavigationOutcome::Redirected {
                    from: path.to_string(),
                    to,
                })
            }
        }
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("history", &self.inner.history)
            .field("container", &self.inner.composer.container())
            .field("default_layout", &self.inner.default_layout)
            .field("routes", &self.route_count())
            .field("started", &self.is_started())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Handler invocation
// ============================================================================

/// Run a handler, containing both errors and panics
async fn invoke(handler: Rc<dyn Handler>, ctx: &NavigationContext) -> Option<Node> {
    match contain(|| handler.call(ctx.clone())).await.and_then(|result| result) {
        Ok(content) => content,
        Err(source) => {
            let err = RouterError::HandlerFailure {
                path: ctx.path().to_string(),
                source,
            };
            error_log!("{}", err);
            Some(error_content().into())
        }
    }
}

/// Call a hook and await its future, turning a panic in either into an error
async fn contain<T>(call: impl FnOnce() -> LocalBoxFuture<'static, T>) -> anyhow::Result<T> {
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(fut) => AssertUnwindSafe(fut)
            .catch_unwind()
            .await
            .map_err(|payload| panic_error(&*payload)),
        Err(payload) => Err(panic_error(&*payload)),
    }
}

/// Log a failed guard or middleware; the navigation is aborted
fn hook_failed(hook: &str, path: &str, source: anyhow::Error) -> GuardResult {
    let err = RouterError::HookFailure {
        hook: hook.to_string(),
        path: path.to_string(),
        source,
    };
    error_log!("{}", err);
    GuardResult::abort(err.to_string())
}

/// Content shown for unmatched paths when no not-found handler is set
pub fn default_not_found(ctx: &NavigationContext) -> Element {
    h("div")
        .class("not-found")
        .child(h("h1").text("404"))
        .child(h("p").text(format!("Page \"{}\" not found", ctx.path())))
        .child(h("a").attr("href", "/").data("link", "").text("Go Home"))
}
