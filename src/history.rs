//! History adapter
//!
//! Reads the routable path and query from the host and writes navigations back
//! to it, in one of two modes:
//!
//! - **History** - the real location path, minus a configured base path.
//!   Pushes and replaces go through the session history without notification,
//!   so the router runs the cycle itself.
//! - **Hash** - the location fragment. Writes change the fragment, and the
//!   host's `HashChange` notification starts the cycle.
//!
//! Both modes read query parameters from the real query string.

use crate::host::Host;
use crate::params::QueryParams;
use serde::Deserialize;

/// Which part of the location holds the routable path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Real path, written with push/replace state
    History,
    /// Fragment after `#`
    #[default]
    Hash,
}

/// Normalize a base path: leading `/`, no trailing `/`, `/` alone becomes empty
///
/// # Example
///
/// ```
/// use spa_navigator::history::normalize_base_path;
///
/// assert_eq!(normalize_base_path("app/"), "/app");
/// assert_eq!(normalize_base_path("/projects/spa"), "/projects/spa");
/// assert_eq!(normalize_base_path("/"), "");
/// assert_eq!(normalize_base_path(""), "");
/// ```
pub fn normalize_base_path(base: &str) -> String {
    let trimmed = base.trim_end_matches('/');
    if trimmed.is_empty() {
        return String::new();
    }
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// Mode-specific access to the host location
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryAdapter {
    /// Real-path mode with a normalized base path
    Path { base_path: String },
    /// Fragment mode
    Fragment,
}

impl HistoryAdapter {
    /// Build the adapter for a mode; the base path only applies to
    /// [`Mode::History`]
    pub fn new(mode: Mode, base_path: &str) -> Self {
        match mode {
            Mode::History => HistoryAdapter::Path {
                base_path: normalize_base_path(base_path),
            },
            Mode::Hash => HistoryAdapter::Fragment,
        }
    }

    pub fn mode(&self) -> Mode {
        match self {
            HistoryAdapter::Path { .. } => Mode::History,
            HistoryAdapter::Fragment => Mode::Hash,
        }
    }

    /// Current routable path; never empty
    pub fn path(&self, host: &dyn Host) -> String {
        let location = host.location();
        let path = match self {
            HistoryAdapter::Path { base_path } => strip_base(&location.pathname, base_path),
            HistoryAdapter::Fragment => location.fragment,
        };

        if path.is_empty() {
            "/".to_string()
        } else {
            path
        }
    }

    /// Query parameters from the real query string
    pub fn query(&self, host: &dyn Host) -> QueryParams {
        QueryParams::from_query_string(&host.location().search)
    }

    /// The host URL for a routable path (base path re-applied in history mode)
    pub fn full_path(&self, path: &str) -> String {
        match self {
            HistoryAdapter::Path { base_path } => format!("{base_path}{path}"),
            HistoryAdapter::Fragment => path.to_string(),
        }
    }

    /// Navigate with a new history entry
    pub fn push(&self, host: &dyn Host, path: &str) {
        match self {
            HistoryAdapter::Path { .. } => host.push_url(&self.full_path(path)),
            HistoryAdapter::Fragment => host.assign_fragment(path),
        }
    }

    /// Navigate by rewriting the current history entry
    pub fn replace(&self, host: &dyn Host, path: &str) {
        match self {
            HistoryAdapter::Path { .. } => host.replace_url(&self.full_path(path)),
            HistoryAdapter::Fragment => host.replace_fragment(path),
        }
    }

    pub fn back(&self, host: &dyn Host) {
        host.go(-1);
    }

    pub fn forward(&self, host: &dyn Host) {
        host.go(1);
    }

    /// Whether the host reports writes back as events (so the router must not
    /// start a cycle of its own)
    pub fn writes_notify(&self) -> bool {
        matches!(self, HistoryAdapter::Fragment)
    }
}

/// Strip `base` from `pathname` when it is a whole-segment prefix
fn strip_base(pathname: &str, base: &str) -> String {
    if base.is_empty() {
        return pathname.to_string();
    }
    match pathname.strip_prefix(base) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.to_string(),
        _ => pathname.to_string(),
    }
}
