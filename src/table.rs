//! Route table
//!
//! Routes are kept in registration order and never reordered. Resolution
//! returns the first route whose pattern accepts the whole path; there is no
//! specificity ranking, so a catch-all registered early shadows everything
//! after it.

#[cfg(feature = "cache")]
use crate::cache::{CacheStats, RouteCache};
use crate::params::RouteParams;
use crate::route::RouteDefinition;
use crate::trace_log;
#[cfg(feature = "cache")]
use std::cell::RefCell;
use std::rc::Rc;

/// A resolved route with the parameters taken from the path
#[derive(Debug, Clone)]
pub struct RouteMatch {
    pub route: Rc<RouteDefinition>,
    pub params: RouteParams,
}

/// Ordered registry of route definitions
#[derive(Debug, Default)]
pub struct RouteTable {
    routes: Vec<Rc<RouteDefinition>>,
    #[cfg(feature = "cache")]
    cache: RefCell<RouteCache>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a route; returns the table for chained registration
    pub fn register(&mut self, route: RouteDefinition) -> &mut Self {
        trace_log!(
            "Registered route #{} '{}'",
            self.routes.len(),
            route.path()
        );
        self.routes.push(Rc::new(route));
        #[cfg(feature = "cache")]
        self.cache.borrow_mut().clear();
        self
    }

    /// Resolve `path` to the first registered route that matches it
    pub fn resolve(&self, path: &str) -> Option<RouteMatch> {
        #[cfg(feature = "cache")]
        {
            let cached = self.cache.borrow_mut().get(path);
            match cached {
                Some(None) => return None,
                Some(Some(index)) => {
                    if let Some(found) = self.match_at(index, path) {
                        return Some(found);
                    }
                }
                None => {}
            }
        }

        let found = self
            .routes
            .iter()
            .enumerate()
            .find_map(|(index, route)| {
                route
                    .pattern()
                    .extract_params(path)
                    .map(|params| (index, params))
            });

        #[cfg(feature = "cache")]
        self.cache
            .borrow_mut()
            .insert(path.to_string(), found.as_ref().map(|(index, _)| *index));

        found.map(|(index, params)| RouteMatch {
            route: self.routes[index].clone(),
            params,
        })
    }

    #[cfg(feature = "cache")]
    fn match_at(&self, index: usize, path: &str) -> Option<RouteMatch> {
        let route = self.routes.get(index)?;
        let params = route.pattern().extract_params(path)?;
        Some(RouteMatch {
            route: route.clone(),
            params,
        })
    }

    /// All routes in registration order
    pub fn routes(&self) -> &[Rc<RouteDefinition>] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Resolution cache statistics
    #[cfg(feature = "cache")]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.borrow().stats().clone()
    }
}
