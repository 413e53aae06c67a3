//! Host environment boundary
//!
//! The navigator never touches a browser directly. Everything it needs from
//! the environment (the location, the session history stack, mount points,
//! scrolling and event delivery) goes through [`Host`]. Async work is handed
//! to a [`Spawner`] so cycles run as cooperative local tasks.
//!
//! [`MemoryHost`](crate::MemoryHost) implements `Host` in memory.

use crate::node::Node;
use crate::warn_log;
use futures::future::LocalBoxFuture;
use futures::task::LocalSpawnExt;
use std::rc::Rc;

// ============================================================================
// Location
// ============================================================================

/// The three navigable parts of a location
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    /// Real path, e.g. `/app/products/42`
    pub pathname: String,
    /// Query string without the leading `?`
    pub search: String,
    /// Fragment without the leading `#`
    pub fragment: String,
}

impl Location {
    /// Parse a URL reference of the form `path?query#fragment`
    ///
    /// A scheme and authority, if present, are skipped. An empty path reads
    /// as `/`.
    ///
    /// # Example
    ///
    /// ```
    /// use spa_navigator::Location;
    ///
    /// let loc = Location::parse("/app/about?tab=team#top");
    /// assert_eq!(loc.pathname, "/app/about");
    /// assert_eq!(loc.search, "tab=team");
    /// assert_eq!(loc.fragment, "top");
    /// ```
    pub fn parse(url: &str) -> Self {
        let url = match url.find("://") {
            Some(scheme_end) => {
                let rest = &url[scheme_end + 3..];
                rest.find(['/', '?', '#']).map_or("", |i| &rest[i..])
            }
            None => url,
        };

        let (before_fragment, fragment) = url.split_once('#').unwrap_or((url, ""));
        let (pathname, search) = before_fragment
            .split_once('?')
            .unwrap_or((before_fragment, ""));

        Self {
            pathname: if pathname.is_empty() {
                "/".to_string()
            } else {
                pathname.to_string()
            },
            search: search.to_string(),
            fragment: fragment.to_string(),
        }
    }

    /// Format back into `path?query#fragment`, omitting empty parts
    pub fn href(&self) -> String {
        let mut href = self.pathname.clone();
        if !self.search.is_empty() {
            href.push('?');
            href.push_str(&self.search);
        }
        if !self.fragment.is_empty() {
            href.push('#');
            href.push_str(&self.fragment);
        }
        href
    }
}

// ============================================================================
// Events
// ============================================================================

/// Events the host delivers to its listeners
#[derive(Debug)]
pub enum HostEvent<'a> {
    /// The active session history entry changed through traversal
    PopState,
    /// The location fragment changed
    HashChange,
    /// An element was activated; `composed_path` runs from the target
    /// outwards to the root
    Click { composed_path: &'a [Node] },
}

/// Event listener; returning `true` suppresses the default activation
pub type Listener = Rc<dyn Fn(&HostEvent<'_>) -> bool>;

// ============================================================================
// Host
// ============================================================================

/// A mount point whose contents the navigator replaces wholesale
pub trait MountPoint {
    /// Remove every child
    fn clear(&self);

    /// Append a node as the last child
    fn append(&self, node: Node);
}

/// The environment a router runs in
///
/// Writes through `push_url`/`replace_url` never notify listeners, matching
/// `history.pushState`/`replaceState`. Fragment writes and traversal do.
pub trait Host {
    /// Current location
    fn location(&self) -> Location;

    /// Add a new session history entry for `url` (no notification)
    fn push_url(&self, url: &str);

    /// Rewrite the current session history entry (no notification)
    fn replace_url(&self, url: &str);

    /// Set the fragment, creating a new history entry
    fn assign_fragment(&self, fragment: &str);

    /// Set the fragment in place, without a new history entry
    fn replace_fragment(&self, fragment: &str);

    /// Traverse session history by `delta` entries; out-of-range is a no-op
    fn go(&self, delta: isize);

    /// Number of entries in the session history
    fn history_length(&self) -> usize;

    /// Locate a mount point, e.g. `#app`
    fn mount_point(&self, locator: &str) -> Option<Rc<dyn MountPoint>>;

    /// Scroll the viewport
    fn scroll_to(&self, x: i32, y: i32);

    /// Register an event listener
    fn add_listener(&self, listener: Listener);
}

// ============================================================================
// Spawner
// ============================================================================

/// Runs navigation cycles as local (non-`Send`) tasks
pub trait Spawner {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>);
}

impl Spawner for futures::executor::LocalSpawner {
    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        if let Err(err) = self.spawn_local(task) {
            warn_log!("Failed to spawn navigation task: {}", err);
        }
    }
}

/// Create a spawner from a closure, e.g. one calling `tokio::task::spawn_local`
///
/// # Example
///
/// ```no_run
/// use spa_navigator::spawner_fn;
///
/// let spawner = spawner_fn(|task| {
///     tokio::task::spawn_local(task);
/// });
/// ```
pub fn spawner_fn<F>(f: F) -> FnSpawner<F>
where
    F: Fn(LocalBoxFuture<'static, ()>),
{
    FnSpawner { f }
}

/// Spawner created from a closure
pub struct FnSpawner<F> {
    f: F,
}

impl<F> Spawner for FnSpawner<F>
where
    F: Fn(LocalBoxFuture<'static, ()>),
{
    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        (self.f)(task);
    }
}
