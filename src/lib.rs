//! # SPA Navigator
//!
//! A client-side navigation engine for single-page applications:
//!
//! - **Path Matching** - Patterns with `:name` parameters and `*` wildcards
//! - **History Modes** - Path-based history with a base path, or fragment-based
//! - **Route Table** - First-registered-wins resolution with an optional LRU cache
//! - **Guards & Middleware** - Global `before_each`, per-route middleware, `after_each`
//! - **Layouts** - Header, footer and sidebar slots plus custom named layouts
//! - **Failure Containment** - Errors and panics in handlers, hooks and layouts never reach the host
//!
//! The engine never touches a real browser directly. Everything it needs from
//! the environment goes through the [`Host`] trait; [`MemoryHost`] is an
//! in-memory implementation for tests and headless use.
//!
//! # Quick Start
//!
//! ```
//! use futures::executor::LocalPool;
//! use spa_navigator::*;
//! use std::rc::Rc;
//!
//! let host = Rc::new(MemoryHost::new("/").with_mount("#app"));
//! let mut pool = LocalPool::new();
//!
//! let router = Router::builder(host.clone(), Rc::new(pool.spawner()))
//!     .mode(Mode::History)
//!     .header(|_ctx| h("nav").child(h("a").attr("href", "/about").data("link", "").text("About")))
//!     .build()
//!     .unwrap();
//!
//! router
//!     .route("/", sync_handler(|_| h("h1").text("Home")), RouteOptions::new())
//!     .route("/about", sync_handler(|_| h("h1").text("About")), RouteOptions::new());
//!
//! router.start();
//! pool.run_until_stalled();
//! assert!(host.html("#app").unwrap().contains("<h1>Home</h1>"));
//!
//! router.navigate("/about");
//! pool.run_until_stalled();
//! assert!(host.html("#app").unwrap().contains("<h1>About</h1>"));
//! ```
//!
//! # Guards
//!
//! ```
//! use spa_navigator::*;
//!
//! let guard = AuthGuard::new(|| false, "/login");
//! let options = RouteOptions::new().meta("requiresAuth", true).middleware(guard);
//! ```
//!
//! # Feature Flags
//!
//! - `log` (default) - Uses the standard `log` crate for logging
//! - `tracing` - Uses the `tracing` crate for structured logging (mutually exclusive with `log`)
//! - `cache` (default) - LRU cache for route resolution

#![doc(html_root_url = "https://docs.rs/spa-navigator/0.1.0")]
#![cfg_attr(docsrs, feature(doc_cfg))]
// Lints are configured in Cargo.toml [lints] section

// Logging abstraction
pub mod logging;

// Cache (optional)
#[cfg(feature = "cache")]
pub mod cache;

// Error handling
pub mod error;

// Content and host boundary
pub mod host;
pub mod memory;
pub mod node;

// Core routing modules
pub mod history;
pub mod matcher;
pub mod params;
pub mod route;
pub mod table;

// Navigation hooks
pub mod guards;
pub mod middleware;

// Composition and control
pub mod context;
pub mod layout;
pub mod router;

// Re-export main types for convenient access
#[cfg(feature = "cache")]
pub use cache::{CacheStats, RouteCache};
pub use context::{NavigationContext, Navigator};
pub use error::{NavigationOutcome, RouterError};
pub use guards::{guard_fn, AuthCheckFn, AuthGuard, FnGuard, Guard, GuardResult};
pub use history::{normalize_base_path, HistoryAdapter, Mode};
pub use host::{spawner_fn, FnSpawner, Host, HostEvent, Listener, Location, MountPoint, Spawner};
pub use layout::{
    error_content, slot, GlobalComponents, LayoutComposer, LayoutFn, LayoutRegistry, SlotFn,
    RESERVED_SLOTS,
};
pub use matcher::PathPattern;
pub use memory::{MemoryHost, MemoryMount, SessionHistory};
pub use middleware::{after_fn, middleware_fn, AfterEach, FnAfterEach, FnMiddleware, Middleware};
pub use node::{h, Element, Node};
pub use params::{QueryParams, RouteParams};
pub use route::{
    sync_handler, Handler, IntoContent, Meta, RouteDefinition, RouteOptions, SyncHandler,
};
pub use router::{default_not_found, Router, RouterBuilder, RouterConfig};
pub use table::{RouteMatch, RouteTable};
