//! Layout composition
//!
//! Every render replaces the mount container's contents wholesale. Content is
//! wrapped either by a named layout from the [`LayoutRegistry`] or by the
//! default composition:
//!
//! ```text
//! div.app-layout
//! ├── header slot            (if set)
//! ├── div.layout-with-sidebar (if a sidebar slot is set)
//! │   ├── sidebar slot
//! │   └── main.main-content#main-content > content
//! │   ── or, without sidebar ──
//! ├── main.main-content#main-content > content
//! └── footer slot            (if set)
//! ```
//!
//! Unset slots leave no placeholder element behind.

use crate::context::NavigationContext;
use crate::error::{panic_error, RouterError};
use crate::host::Host;
use crate::node::{h, Element, Node};
use crate::{error_log, trace_log};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

/// A global component: renders against the current navigation, if any
pub type SlotFn = Rc<dyn Fn(Option<&NavigationContext>) -> Option<Node>>;

/// A custom layout: wraps page content with its own structure
pub type LayoutFn = Rc<dyn Fn(Node, &GlobalComponents, &NavigationContext) -> Node>;

/// Slot names with a dedicated place in the default composition
pub const RESERVED_SLOTS: [&str; 3] = ["header", "footer", "sidebar"];

/// Wrap a closure as a [`SlotFn`]
///
/// The closure may return a [`Node`] or an `Option<Node>`.
///
/// ```
/// use spa_navigator::{h, slot, Node};
///
/// let footer = slot(|_ctx| Node::from(h("footer").class("footer").text("© MySPA")));
/// let breadcrumb = slot(|ctx| ctx.map(|ctx| Node::text(ctx.path())));
/// ```
pub fn slot<F, R>(f: F) -> SlotFn
where
    F: Fn(Option<&NavigationContext>) -> R + 'static,
    R: Into<Option<Node>>,
{
    Rc::new(move |ctx: Option<&NavigationContext>| -> Option<Node> { f(ctx).into() })
}

// ============================================================================
// GlobalComponents
// ============================================================================

/// Route-independent render slots
///
/// Three named slots used by the default composition, plus any number of
/// extra slots for custom layouts. Extra slot names must be non-empty, must not
/// reuse a reserved name and must be unique.
#[derive(Clone, Default)]
pub struct GlobalComponents {
    header: Option<SlotFn>,
    footer: Option<SlotFn>,
    sidebar: Option<SlotFn>,
    extra: BTreeMap<String, SlotFn>,
}

impl GlobalComponents {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_header(mut self, f: SlotFn) -> Self {
        self.header = Some(f);
        self
    }

    #[must_use]
    pub fn with_footer(mut self, f: SlotFn) -> Self {
        self.footer = Some(f);
        self
    }

    #[must_use]
    pub fn with_sidebar(mut self, f: SlotFn) -> Self {
        self.sidebar = Some(f);
        self
    }

    /// Add an extra slot
    ///
    /// # Errors
    ///
    /// [`RouterError::InvalidSlotName`] for an empty or reserved name,
    /// [`RouterError::DuplicateSlot`] when the name is already taken.
    pub fn add(&mut self, name: &str, f: SlotFn) -> Result<(), RouterError> {
        if name.is_empty() || RESERVED_SLOTS.contains(&name) {
            return Err(RouterError::InvalidSlotName(name.to_string()));
        }
        if self.extra.contains_key(name) {
            return Err(RouterError::DuplicateSlot(name.to_string()));
        }
        self.extra.insert(name.to_string(), f);
        Ok(())
    }

    /// Set, replace or (with `None`) unset any slot, reserved or extra
    ///
    /// # Errors
    ///
    /// [`RouterError::InvalidSlotName`] for an empty name.
    pub fn set(&mut self, name: &str, f: Option<SlotFn>) -> Result<(), RouterError> {
        match name {
            "" => return Err(RouterError::InvalidSlotName(String::new())),
            "header" => self.header = f,
            "footer" => self.footer = f,
            "sidebar" => self.sidebar = f,
            _ => match f {
                Some(f) => {
                    self.extra.insert(name.to_string(), f);
                }
                None => {
                    self.extra.remove(name);
                }
            },
        }
        Ok(())
    }

    pub fn header(&self) -> Option<&SlotFn> {
        self.header.as_ref()
    }

    pub fn footer(&self) -> Option<&SlotFn> {
        self.footer.as_ref()
    }

    pub fn sidebar(&self) -> Option<&SlotFn> {
        self.sidebar.as_ref()
    }

    /// Look up any slot by name
    pub fn get(&self, name: &str) -> Option<&SlotFn> {
        match name {
            "header" => self.header(),
            "footer" => self.footer(),
            "sidebar" => self.sidebar(),
            _ => self.extra.get(name),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Render a slot; `None` when it is unset or renders nothing
    ///
    /// A panicking slot is logged and rendered as [`error_content`].
    pub fn render(&self, name: &str, ctx: Option<&NavigationContext>) -> Option<Node> {
        let f = self.get(name)?;
        match panic::catch_unwind(AssertUnwindSafe(|| f(ctx))) {
            Ok(node) => node,
            Err(payload) => {
                let err = RouterError::RenderFailure {
                    component: format!("slot '{name}'"),
                    source: panic_error(&*payload),
                };
                error_log!("{}", err);
                Some(error_content().into())
            }
        }
    }

    /// Names of all set slots, reserved ones first
    pub fn names(&self) -> Vec<&str> {
        RESERVED_SLOTS
            .iter()
            .copied()
            .filter(|name| self.contains(name))
            .chain(self.extra.keys().map(String::as_str))
            .collect()
    }
}

impl fmt::Debug for GlobalComponents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GlobalComponents")
            .field("slots", &self.names())
            .finish()
    }
}

// ============================================================================
// LayoutRegistry
// ============================================================================

/// Named custom layouts
#[derive(Clone, Default)]
pub struct LayoutRegistry {
    layouts: HashMap<String, LayoutFn>,
}

impl LayoutRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a layout, replacing any earlier one with the same name
    pub fn register(&mut self, name: impl Into<String>, layout: LayoutFn) {
        self.layouts.insert(name.into(), layout);
    }

    pub fn get(&self, name: &str) -> Option<&LayoutFn> {
        self.layouts.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.layouts.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }
}

impl fmt::Debug for LayoutRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.layouts.keys().collect();
        names.sort();
        f.debug_struct("LayoutRegistry")
            .field("layouts", &names)
            .finish()
    }
}

/// Content shown in place of a failed handler, slot or layout
pub fn error_content() -> Element {
    h("div")
        .class("error")
        .child(h("h1").text("Error"))
        .child(h("p").text("An error occurred while loading this page."))
}

// ============================================================================
// LayoutComposer
// ============================================================================

/// Builds the container contents for a render
#[derive(Debug)]
pub struct LayoutComposer {
    container: String,
    layouts: LayoutRegistry,
    components: RefCell<GlobalComponents>,
}

impl LayoutComposer {
    pub fn new(
        container: impl Into<String>,
        layouts: LayoutRegistry,
        components: GlobalComponents,
    ) -> Self {
        Self {
            container: container.into(),
            layouts,
            components: RefCell::new(components),
        }
    }

    /// Locator of the mount container
    pub fn container(&self) -> &str {
        &self.container
    }

    pub fn layouts(&self) -> &LayoutRegistry {
        &self.layouts
    }

    /// Snapshot of the global components
    pub fn components(&self) -> GlobalComponents {
        self.components.borrow().clone()
    }

    /// Change one global component
    pub fn update_component(&self, name: &str, f: Option<SlotFn>) -> Result<(), RouterError> {
        self.components.borrow_mut().set(name, f)
    }

    /// Wrap `content` with the named layout, or the default composition when
    /// no layout of that name is registered
    pub fn compose(&self, content: Node, layout_name: &str, ctx: &NavigationContext) -> Node {
        // Snapshot so slot functions may update components while rendering
        let components = self.components();

        if let Some(layout) = self.layouts.get(layout_name) {
            trace_log!("Rendering '{}' with layout '{}'", ctx.path(), layout_name);
            let composed =
                panic::catch_unwind(AssertUnwindSafe(|| layout(content, &components, ctx)));
            return match composed {
                Ok(tree) => tree,
                Err(payload) => {
                    let err = RouterError::RenderFailure {
                        component: format!("layout '{layout_name}'"),
                        source: panic_error(&*payload),
                    };
                    error_log!("{}", err);
                    error_content().into()
                }
            };
        }

        let main: Node = h("main")
            .class("main-content")
            .id("main-content")
            .child(content)
            .into();

        let body: Node = if components.sidebar().is_some() {
            h("div")
                .class("layout-with-sidebar")
                .children(components.render("sidebar", Some(ctx)))
                .child(main)
                .into()
        } else {
            main
        };

        h("div")
            .class("app-layout")
            .children(components.render("header", Some(ctx)))
            .child(body)
            .children(components.render("footer", Some(ctx)))
            .into()
    }

    /// Replace the container contents with the composed layout
    ///
    /// # Errors
    ///
    /// [`RouterError::ContainerNotFound`] when the host has no mount point for
    /// the configured locator; nothing is rendered then.
    pub fn render(
        &self,
        host: &dyn Host,
        content: Node,
        layout_name: &str,
        ctx: &NavigationContext,
    ) -> Result<(), RouterError> {
        let mount = host
            .mount_point(&self.container)
            .ok_or_else(|| RouterError::ContainerNotFound {
                locator: self.container.clone(),
            })?;

        let tree = self.compose(content, layout_name, ctx);
        mount.clear();
        mount.append(tree);
        Ok(())
    }
}
