//! In-memory host
//!
//! [`MemoryHost`] behaves like a single browser tab: a session history stack
//! of [`Location`]s, a set of mount points addressed by locator, a scroll
//! position and event listeners. Tests drive routers through it, and it is
//! usable as-is for headless embedding.

use crate::host::{Host, HostEvent, Listener, Location, MountPoint};
use crate::node::Node;
use crate::trace_log;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

// ============================================================================
// Session history
// ============================================================================

/// Session history stack
#[derive(Debug, Clone)]
pub struct SessionHistory {
    entries: Vec<Location>,
    current: usize,
    /// Maximum number of entries (0 = unlimited)
    max_size: usize,
}

impl SessionHistory {
    /// Create a history holding one entry
    pub fn new(initial: Location) -> Self {
        Self::with_max_size(initial, 1000)
    }

    /// Create with a custom size limit
    pub fn with_max_size(initial: Location, max_size: usize) -> Self {
        Self {
            entries: vec![initial],
            current: 0,
            max_size,
        }
    }

    pub fn current(&self) -> &Location {
        &self.entries[self.current]
    }

    /// Push a new entry, dropping any forward entries
    pub fn push(&mut self, location: Location) {
        self.entries.truncate(self.current + 1);
        self.entries.push(location);
        self.current += 1;
        self.enforce_size_limit();
    }

    /// Overwrite the current entry
    pub fn replace(&mut self, location: Location) {
        self.entries[self.current] = location;
    }

    /// Move by `delta` entries
    ///
    /// Returns the entries left and entered, or `None` when the target is out
    /// of range or `delta` is zero.
    pub fn go(&mut self, delta: isize) -> Option<(Location, Location)> {
        let target = self.current.checked_add_signed(delta)?;
        if delta == 0 || target >= self.entries.len() {
            return None;
        }
        let from = self.current().clone();
        self.current = target;
        Some((from, self.current().clone()))
    }

    pub fn can_go_back(&self) -> bool {
        self.current > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.current + 1 < self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    fn enforce_size_limit(&mut self) {
        if self.max_size > 0 && self.entries.len() > self.max_size {
            let excess = self.entries.len() - self.max_size;
            self.entries.drain(0..excess);
            self.current = self.current.saturating_sub(excess);
        }
    }
}

// ============================================================================
// Mount points
// ============================================================================

/// In-memory mount point
#[derive(Debug, Default)]
pub struct MemoryMount {
    children: RefCell<Vec<Node>>,
    clears: Cell<usize>,
}

impl MemoryMount {
    /// Snapshot of the current children
    pub fn children(&self) -> Vec<Node> {
        self.children.borrow().clone()
    }

    /// Serialized contents
    pub fn html(&self) -> String {
        self.children.borrow().iter().map(Node::to_html).collect()
    }

    /// How many times the contents were cleared
    pub fn clear_count(&self) -> usize {
        self.clears.get()
    }
}

impl MountPoint for MemoryMount {
    fn clear(&self) {
        self.children.borrow_mut().clear();
        self.clears.set(self.clears.get() + 1);
    }

    fn append(&self, node: Node) {
        self.children.borrow_mut().push(node);
    }
}

// ============================================================================
// MemoryHost
// ============================================================================

/// In-memory, browser-like host
///
/// # Example
///
/// ```
/// use spa_navigator::{Host, MemoryHost};
///
/// let host = MemoryHost::new("/app/products?sort=price").with_mount("#app");
/// host.push_url("/app/about");
///
/// assert_eq!(host.location().pathname, "/app/about");
/// assert_eq!(host.history_length(), 2);
/// assert!(host.mount("#app").is_some());
/// ```
pub struct MemoryHost {
    history: RefCell<SessionHistory>,
    mounts: RefCell<HashMap<String, Rc<MemoryMount>>>,
    scroll: Cell<(i32, i32)>,
    listeners: RefCell<Vec<Listener>>,
    page_loads: Cell<usize>,
}

impl MemoryHost {
    /// Create a host whose first history entry is `url`
    pub fn new(url: &str) -> Self {
        Self {
            history: RefCell::new(SessionHistory::new(Location::parse(url))),
            mounts: RefCell::new(HashMap::new()),
            scroll: Cell::new((0, 0)),
            listeners: RefCell::new(Vec::new()),
            page_loads: Cell::new(0),
        }
    }

    /// Add a mount point addressable by `locator`
    pub fn with_mount(self, locator: &str) -> Self {
        self.add_mount(locator);
        self
    }

    /// Add (or reset) a mount point
    pub fn add_mount(&self, locator: &str) -> Rc<MemoryMount> {
        let mount = Rc::new(MemoryMount::default());
        self.mounts
            .borrow_mut()
            .insert(locator.to_string(), mount.clone());
        mount
    }

    /// Remove a mount point
    pub fn remove_mount(&self, locator: &str) {
        self.mounts.borrow_mut().remove(locator);
    }

    /// Concrete handle to a mount point
    pub fn mount(&self, locator: &str) -> Option<Rc<MemoryMount>> {
        self.mounts.borrow().get(locator).cloned()
    }

    /// Serialized contents of a mount point
    pub fn html(&self, locator: &str) -> Option<String> {
        self.mount(locator).map(|m| m.html())
    }

    pub fn scroll_position(&self) -> (i32, i32) {
        self.scroll.get()
    }

    /// Simulate the user scrolling
    pub fn set_scroll_position(&self, x: i32, y: i32) {
        self.scroll.set((x, y));
    }

    /// Index of the active entry in the session history
    pub fn history_index(&self) -> usize {
        self.history.borrow().current_index()
    }

    /// Number of full page loads caused by unprevented link activations
    pub fn page_loads(&self) -> usize {
        self.page_loads.get()
    }

    /// Simulate the user activating an element
    ///
    /// `composed_path` runs from the clicked node outwards. Listeners see the
    /// click first; if none suppresses it and the closest anchor has an
    /// `href`, the default activation follows: fragment links assign the
    /// fragment, anything else is a full page load.
    ///
    /// Returns `true` when a listener suppressed the default.
    pub fn click(&self, composed_path: &[Node]) -> bool {
        let prevented = self.emit(&HostEvent::Click { composed_path });
        if prevented {
            return true;
        }

        let href = composed_path
            .iter()
            .filter_map(Node::as_element)
            .find(|el| el.tag() == "a" && el.has_attr("href"))
            .and_then(|el| el.get_attr("href"))
            .map(str::to_string);

        match href {
            Some(href) if href.starts_with('#') => self.assign_fragment(&href[1..]),
            Some(href) => {
                trace_log!("Full page load to '{}'", href);
                self.page_loads.set(self.page_loads.get() + 1);
                self.history.borrow_mut().push(Location::parse(&href));
            }
            None => {}
        }
        false
    }

    /// Simulate the user editing the address bar fragment
    pub fn set_fragment_externally(&self, fragment: &str) {
        self.assign_fragment(fragment);
    }

    /// Deliver an event to every listener; any `true` answer wins
    fn emit(&self, event: &HostEvent<'_>) -> bool {
        let listeners: Vec<Listener> = self.listeners.borrow().clone();
        listeners
            .iter()
            .fold(false, |prevented, listener| listener(event) || prevented)
    }

    fn write_fragment(&self, fragment: &str, new_entry: bool) {
        let changed = {
            let mut history = self.history.borrow_mut();
            let mut next = history.current().clone();
            let changed = next.fragment != fragment;
            next.fragment = fragment.to_string();
            if new_entry && changed {
                history.push(next);
            } else {
                history.replace(next);
            }
            changed
        };

        if changed {
            self.emit(&HostEvent::HashChange);
        }
    }
}

impl Host for MemoryHost {
    fn location(&self) -> Location {
        self.history.borrow().current().clone()
    }

    fn push_url(&self, url: &str) {
        self.history.borrow_mut().push(Location::parse(url));
    }

    fn replace_url(&self, url: &str) {
        self.history.borrow_mut().replace(Location::parse(url));
    }

    fn assign_fragment(&self, fragment: &str) {
        self.write_fragment(fragment, true);
    }

    fn replace_fragment(&self, fragment: &str) {
        self.write_fragment(fragment, false);
    }

    fn go(&self, delta: isize) {
        let moved = self.history.borrow_mut().go(delta);
        if let Some((from, to)) = moved {
            self.emit(&HostEvent::PopState);
            if from.fragment != to.fragment {
                self.emit(&HostEvent::HashChange);
            }
        }
    }

    fn history_length(&self) -> usize {
        self.history.borrow().len()
    }

    fn mount_point(&self, locator: &str) -> Option<Rc<dyn MountPoint>> {
        self.mount(locator).map(|m| m as Rc<dyn MountPoint>)
    }

    fn scroll_to(&self, x: i32, y: i32) {
        self.scroll.set((x, y));
    }

    fn add_listener(&self, listener: Listener) {
        self.listeners.borrow_mut().push(listener);
    }
}
