//! Integration tests for spa-navigator
//!
//! These tests drive complete navigation cycles against the in-memory host:
//! route resolution, guards and middleware, layouts, history modes, failure
//! containment and stale-cycle handling.

use futures::executor::LocalPool;
use spa_navigator::*;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

type Log = Rc<RefCell<Vec<String>>>;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn new_log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

fn app(
    host: MemoryHost,
    configure: impl FnOnce(RouterBuilder) -> RouterBuilder,
) -> (Rc<MemoryHost>, LocalPool, Router) {
    init_logging();
    let host = Rc::new(host);
    let pool = LocalPool::new();
    let builder = Router::builder(host.clone(), Rc::new(pool.spawner()));
    let router = configure(builder).build().unwrap();
    (host, pool, router)
}

fn history_app(url: &str) -> (Rc<MemoryHost>, LocalPool, Router) {
    app(MemoryHost::new(url).with_mount("#app"), |b| b.mode(Mode::History))
}

fn hash_app(url: &str) -> (Rc<MemoryHost>, LocalPool, Router) {
    app(MemoryHost::new(url).with_mount("#app"), |b| b.mode(Mode::Hash))
}

fn page(title: &'static str) -> impl Handler {
    sync_handler(move |_| h("h1").text(title))
}

fn counting_page(title: &'static str, calls: &Rc<Cell<usize>>) -> impl Handler {
    let calls = calls.clone();
    sync_handler(move |_| {
        calls.set(calls.get() + 1);
        h("h1").text(title)
    })
}

fn link(href: &str) -> Node {
    h("a").attr("href", href).data("link", "").text("go").into()
}

// ============================================================================
// Route Resolution Tests
// ============================================================================

#[test]
fn test_params_are_extracted_and_decoded() {
    let (host, mut pool, router) = history_app("/");
    router
        .route("/", page("Home"), RouteOptions::new())
        .route(
            "/products/:id",
            sync_handler(|ctx| h("h1").text(format!("Product #{}", ctx.param("id").unwrap_or("")))),
            RouteOptions::new(),
        )
        .route(
            "/users/:name",
            sync_handler(|ctx| h("h1").text(format!("User {}", ctx.param("name").unwrap_or("")))),
            RouteOptions::new(),
        );
    router.start();

    router.navigate("/products/42");
    pool.run_until_stalled();
    assert!(host.html("#app").unwrap().contains("<h1>Product #42</h1>"));
    assert_eq!(router.current_route().unwrap().param("id"), Some("42"));

    router.navigate("/users/John%20Doe");
    pool.run_until_stalled();
    assert!(host.html("#app").unwrap().contains("<h1>User John Doe</h1>"));
}

#[test]
fn test_query_params_reach_the_handler() {
    let (host, mut pool, router) = history_app("/");
    router.route(
        "/search",
        sync_handler(|ctx| {
            h("p").text(format!(
                "{} page {}",
                ctx.query().get("q").unwrap_or(""),
                ctx.query().get_as::<u32>("page").unwrap_or(1)
            ))
        }),
        RouteOptions::new(),
    );
    router.start();

    router.navigate("/search?q=rust&page=2");
    pool.run_until_stalled();

    assert_eq!(host.location().pathname, "/search");
    assert!(host.html("#app").unwrap().contains("<p>rust page 2</p>"));
    assert_eq!(router.current_route().unwrap().path(), "/search");
}

#[test]
fn test_first_registered_route_wins() {
    let (host, mut pool, router) = history_app("/a");
    router
        .route("/a", page("first"), RouteOptions::new())
        .route("/a", page("second"), RouteOptions::new());
    router.start();
    pool.run_until_stalled();

    let html = host.html("#app").unwrap();
    assert!(html.contains("first"));
    assert!(!html.contains("second"));
}

#[test]
fn test_custom_not_found_runs_once() {
    let calls = Rc::new(Cell::new(0));
    let not_found_calls = calls.clone();
    let (host, mut pool, router) = app(MemoryHost::new("/").with_mount("#app"), |b| {
        b.mode(Mode::History).not_found(sync_handler(move |ctx| {
            not_found_calls.set(not_found_calls.get() + 1);
            h("h1").text(format!("Nothing at {}", ctx.path()))
        }))
    });
    router.route("/", page("Home"), RouteOptions::new());
    router.start();
    pool.run_until_stalled();
    assert_eq!(calls.get(), 0);

    router.navigate("/missing");
    pool.run_until_stalled();

    assert_eq!(calls.get(), 1);
    assert!(host.html("#app").unwrap().contains("<h1>Nothing at /missing</h1>"));
    let current = router.current_route().unwrap();
    assert!(current.route().is_none());
    assert!(current.meta().is_empty());
}

#[test]
fn test_default_not_found_in_hash_mode() {
    let (host, mut pool, router) = hash_app("/#/nope");
    router.route("/", page("Home"), RouteOptions::new());
    router.start();
    pool.run_until_stalled();

    let html = host.html("#app").unwrap();
    assert!(html.contains("<h1>404</h1>"));
    assert!(html.contains("<p>Page \"/nope\" not found</p>"));
    assert!(html.contains("Go Home"));
}

#[test]
fn test_handler_initiated_navigation_supersedes_current_cycle() {
    let (host, mut pool, router) = history_app("/");
    router
        .route("/", page("Home"), RouteOptions::new())
        .route(
            "/old",
            sync_handler(|ctx| {
                ctx.replace("/new");
                h("h1").text("Old")
            }),
            RouteOptions::new(),
        )
        .route("/new", page("New"), RouteOptions::new());
    router.start();
    pool.run_until_stalled();

    router.navigate("/old");
    pool.run_until_stalled();

    let html = host.html("#app").unwrap();
    assert!(html.contains("<h1>New</h1>"));
    assert!(!html.contains("Old"));
    assert_eq!(router.current_route().unwrap().path(), "/new");
    assert_eq!(host.history_length(), 2);
}

#[cfg(feature = "cache")]
#[test]
fn test_repeated_navigation_uses_route_cache() {
    let (_host, mut pool, router) = history_app("/");
    router
        .route("/", page("Home"), RouteOptions::new())
        .route("/about", page("About"), RouteOptions::new());
    router.start();

    router.navigate("/about");
    router.navigate("/");
    router.navigate("/about");
    pool.run_until_stalled();

    assert!(router.cache_stats().hits >= 2);
}

// ============================================================================
// Guard Tests
// ============================================================================

#[test]
fn test_aborting_before_each_skips_the_rest_of_the_cycle() {
    let events = new_log();
    let guard_events = events.clone();
    let after_events = events.clone();

    let (host, mut pool, router) = app(MemoryHost::new("/").with_mount("#app"), move |b| {
        b.mode(Mode::History)
            .before_each(guard_fn(move |to, _from| {
                guard_events.borrow_mut().push(format!("guard {}", to.path()));
                let blocked = to.path().starts_with("/admin");
                async move {
                    if blocked {
                        GuardResult::abort("admin area is closed")
                    } else {
                        GuardResult::proceed()
                    }
                }
            }))
            .after_each(after_fn(move |to, _from| {
                after_events.borrow_mut().push(format!("after {}", to.path()));
                async {}
            }))
    });

    let middleware_events = events.clone();
    let handler_events = events.clone();
    router.route("/", page("Home"), RouteOptions::new()).route(
        "/admin",
        sync_handler(move |_| {
            handler_events.borrow_mut().push("handler".to_string());
            h("h1").text("Admin")
        }),
        RouteOptions::new().middleware(middleware_fn(move |_ctx| {
            middleware_events.borrow_mut().push("middleware".to_string());
            async { GuardResult::proceed() }
        })),
    );
    router.start();
    pool.run_until_stalled();
    host.set_scroll_position(0, 300);

    router.navigate("/admin");
    pool.run_until_stalled();

    assert_eq!(
        *events.borrow(),
        vec!["guard /", "after /", "guard /admin"]
    );
    assert!(host.html("#app").unwrap().contains("<h1>Home</h1>"));
    assert_eq!(router.current_route().unwrap().path(), "/");
    assert_eq!(
        router.last_outcome(),
        Some(NavigationOutcome::Aborted {
            path: "/admin".to_string(),
            reason: "admin area is closed".to_string(),
        })
    );
    assert_eq!(host.scroll_position(), (0, 300));
}

#[test]
fn test_before_each_redirect() {
    let handled = new_log();
    let handled_private = handled.clone();

    let (host, mut pool, router) = app(MemoryHost::new("/").with_mount("#app"), |b| {
        b.mode(Mode::History).before_each(guard_fn(|to, _from| async move {
            if to.path() == "/private" {
                GuardResult::redirect("/login")
            } else {
                GuardResult::proceed()
            }
        }))
    });
    router
        .route("/", page("Home"), RouteOptions::new())
        .route(
            "/private",
            sync_handler(move |_| {
                handled_private.borrow_mut().push("private".to_string());
                h("h1").text("Private")
            }),
            RouteOptions::new(),
        )
        .route("/login", page("Login"), RouteOptions::new());
    router.start();
    pool.run_until_stalled();

    router.navigate("/private");
    pool.run_until_stalled();

    assert!(handled.borrow().is_empty());
    assert_eq!(host.location().pathname, "/login");
    assert!(host.html("#app").unwrap().contains("<h1>Login</h1>"));
    assert_eq!(router.current_route().unwrap().path(), "/login");
    assert_eq!(host.history_length(), 3);
}

#[test]
fn test_before_each_sees_previous_route() {
    let seen = new_log();
    let guard_seen = seen.clone();

    let (_host, mut pool, router) = app(MemoryHost::new("/").with_mount("#app"), move |b| {
        b.mode(Mode::History).before_each(guard_fn(move |to, from| {
            guard_seen.borrow_mut().push(format!(
                "{} <- {}",
                to.path(),
                from.map(|f| f.path().to_string()).unwrap_or_default()
            ));
            async { GuardResult::proceed() }
        }))
    });
    router
        .route("/", page("Home"), RouteOptions::new())
        .route("/about", page("About"), RouteOptions::new());
    router.start();
    pool.run_until_stalled();
    router.navigate("/about");
    pool.run_until_stalled();

    assert_eq!(*seen.borrow(), vec!["/ <- ", "/about <- /"]);
}

#[test]
fn test_auth_guard_as_before_each() {
    let (host, mut pool, router) = app(MemoryHost::new("/").with_mount("#app"), |b| {
        b.mode(Mode::History)
            .before_each(AuthGuard::new(|| false, "/login"))
    });
    router
        .route("/", page("Home"), RouteOptions::new())
        .route(
            "/secret",
            page("Secret"),
            RouteOptions::new().meta("requiresAuth", true),
        )
        .route(
            "/login",
            page("Login"),
            RouteOptions::new().meta("requiresAuth", true),
        );
    router.start();
    pool.run_until_stalled();
    assert!(host.html("#app").unwrap().contains("<h1>Home</h1>"));

    router.navigate("/secret");
    pool.run_until_stalled();

    assert_eq!(router.current_route().unwrap().path(), "/login");
    assert!(host.html("#app").unwrap().contains("<h1>Login</h1>"));
}

// ============================================================================
// Middleware Tests
// ============================================================================

fn recording(log: &Log, name: &'static str, result: GuardResult) -> impl Middleware {
    let log = log.clone();
    middleware_fn(move |_ctx| {
        log.borrow_mut().push(name.to_string());
        let result = result.clone();
        async move { result }
    })
}

#[test]
fn test_middleware_runs_in_declared_order() {
    let log = new_log();
    let handler_log = log.clone();
    let (host, mut pool, router) = history_app("/dashboard");
    router.route(
        "/dashboard",
        sync_handler(move |_| {
            handler_log.borrow_mut().push("handler".to_string());
            h("h1").text("Dashboard")
        }),
        RouteOptions::new()
            .middleware(recording(&log, "first", GuardResult::proceed()))
            .middleware(recording(&log, "second", GuardResult::proceed())),
    );
    router.start();
    pool.run_until_stalled();

    assert_eq!(*log.borrow(), vec!["first", "second", "handler"]);
    assert!(host.html("#app").unwrap().contains("Dashboard"));
}

fn ordered_app(block_all: bool) -> (Rc<MemoryHost>, LocalPool, Router, Log) {
    let log = new_log();
    let guard_log = log.clone();
    let (host, pool, router) = app(MemoryHost::new("/dashboard").with_mount("#app"), move |b| {
        b.mode(Mode::History).before_each(guard_fn(move |_to, _from| {
            guard_log.borrow_mut().push("before_each".to_string());
            async move {
                if block_all {
                    GuardResult::abort("maintenance")
                } else {
                    GuardResult::proceed()
                }
            }
        }))
    });

    let handler_log = log.clone();
    router.route(
        "/dashboard",
        sync_handler(move |_| {
            handler_log.borrow_mut().push("handler".to_string());
            h("h1").text("Dashboard")
        }),
        RouteOptions::new()
            .middleware(recording(&log, "first", GuardResult::proceed()))
            .middleware(recording(&log, "second", GuardResult::proceed())),
    );
    (host, pool, router, log)
}

#[test]
fn test_middleware_runs_between_before_each_and_handler() {
    let (host, mut pool, router, log) = ordered_app(false);
    router.start();
    pool.run_until_stalled();

    assert_eq!(*log.borrow(), vec!["before_each", "first", "second", "handler"]);
    assert!(host.html("#app").unwrap().contains("Dashboard"));
}

#[test]
fn test_before_each_abort_skips_route_middleware() {
    let (host, mut pool, router, log) = ordered_app(true);
    router.start();
    pool.run_until_stalled();

    assert_eq!(*log.borrow(), vec!["before_each"]);
    assert!(host.html("#app").unwrap().is_empty());
    assert!(router.last_outcome().unwrap().is_aborted());
}

#[test]
fn test_middleware_abort_stops_the_chain() {
    let log = new_log();
    let (host, mut pool, router) = history_app("/");
    router.route("/", page("Home"), RouteOptions::new()).route(
        "/blocked",
        page("Blocked"),
        RouteOptions::new()
            .middleware(recording(&log, "first", GuardResult::abort("no")))
            .middleware(recording(&log, "second", GuardResult::proceed())),
    );
    router.start();
    pool.run_until_stalled();

    router.navigate("/blocked");
    pool.run_until_stalled();

    assert_eq!(*log.borrow(), vec!["first"]);
    assert!(host.html("#app").unwrap().contains("Home"));
    assert!(router.last_outcome().unwrap().is_aborted());
}

#[test]
fn test_middleware_redirect() {
    let log = new_log();
    let old_calls = Rc::new(Cell::new(0));
    let (host, mut pool, router) = history_app("/");
    router
        .route("/", page("Home"), RouteOptions::new())
        .route(
            "/old-dashboard",
            counting_page("Old", &old_calls),
            RouteOptions::new().middleware(recording(&log, "moved", GuardResult::redirect("/dashboard"))),
        )
        .route("/dashboard", page("Dashboard"), RouteOptions::new());
    router.start();
    pool.run_until_stalled();

    router.navigate("/old-dashboard");
    pool.run_until_stalled();

    assert_eq!(*log.borrow(), vec!["moved"]);
    assert_eq!(old_calls.get(), 0);
    assert_eq!(host.location().pathname, "/dashboard");
    let html = host.html("#app").unwrap();
    assert!(html.contains("<h1>Dashboard</h1>"));
    assert!(!html.contains("Old"));
}

#[test]
fn test_auth_guard_as_route_middleware() {
    let logged_in = Rc::new(Cell::new(false));
    let check = logged_in.clone();

    let (host, mut pool, router) = history_app("/");
    router
        .route("/", page("Home"), RouteOptions::new())
        .route(
            "/account",
            page("Account"),
            RouteOptions::new()
                .meta("requiresAuth", true)
                .middleware(AuthGuard::new(move || check.get(), "/login")),
        )
        .route("/login", page("Login"), RouteOptions::new());
    router.start();
    pool.run_until_stalled();

    router.navigate("/account");
    pool.run_until_stalled();
    assert!(host.html("#app").unwrap().contains("<h1>Login</h1>"));

    logged_in.set(true);
    router.navigate("/account");
    pool.run_until_stalled();
    assert!(host.html("#app").unwrap().contains("<h1>Account</h1>"));
}

// ============================================================================
// After Hook Tests
// ============================================================================

#[test]
fn test_after_each_receives_previous_route() {
    let log = new_log();
    let hook_log = log.clone();
    let (_host, mut pool, router) = app(MemoryHost::new("/").with_mount("#app"), move |b| {
        b.mode(Mode::History).after_each(after_fn(move |to, from| {
            hook_log.borrow_mut().push(format!(
                "{} from {}",
                to.path(),
                from.map(|f| f.path().to_string())
                    .unwrap_or_else(|| "nowhere".to_string())
            ));
            async {}
        }))
    });
    router
        .route("/", page("Home"), RouteOptions::new())
        .route("/about", page("About"), RouteOptions::new());
    router.start();
    pool.run_until_stalled();
    router.navigate("/about");
    pool.run_until_stalled();

    assert_eq!(*log.borrow(), vec!["/ from nowhere", "/about from /"]);
}

// ============================================================================
// Layout Tests
// ============================================================================

#[test]
fn test_default_layout_with_header_and_footer() {
    let (host, mut pool, router) = app(MemoryHost::new("/").with_mount("#app"), |b| {
        b.mode(Mode::History)
            .header(|_ctx| h("header").text("H"))
            .footer(|_ctx| h("footer").text("F"))
    });
    router.route("/", page("Home"), RouteOptions::new());
    router.start();
    pool.run_until_stalled();

    assert_eq!(
        host.html("#app").unwrap(),
        "<div class=\"app-layout\"><header>H</header>\
         <main class=\"main-content\" id=\"main-content\"><h1>Home</h1></main>\
         <footer>F</footer></div>"
    );
}

#[test]
fn test_sidebar_wraps_main_content() {
    let (host, mut pool, router) = app(MemoryHost::new("/").with_mount("#app"), |b| {
        b.mode(Mode::History)
            .sidebar(|ctx| ctx.map(|ctx| Node::from(h("aside").text(format!("at {}", ctx.path())))))
    });
    router.route("/", page("Home"), RouteOptions::new());
    router.start();
    pool.run_until_stalled();

    assert_eq!(
        host.html("#app").unwrap(),
        "<div class=\"app-layout\"><div class=\"layout-with-sidebar\"><aside>at /</aside>\
         <main class=\"main-content\" id=\"main-content\"><h1>Home</h1></main></div></div>"
    );
}

#[test]
fn test_named_layout_and_fallback() {
    let (host, mut pool, router) = app(MemoryHost::new("/").with_mount("#app"), |b| {
        b.mode(Mode::History)
            .header(|_ctx| h("header").text("H"))
            .component("breadcrumb", |ctx| ctx.map(|ctx| Node::text(ctx.path())))
            .layout("dashboard", |content, components, ctx| {
                h("div")
                    .class("dashboard")
                    .children(components.render("header", Some(ctx)))
                    .child(h("nav").children(components.render("breadcrumb", Some(ctx))))
                    .child(content)
            })
    });
    router
        .route("/", page("Home"), RouteOptions::new())
        .route("/admin", page("Admin"), RouteOptions::new().layout("dashboard"))
        .route("/odd", page("Odd"), RouteOptions::new().layout("missing"));
    router.start();
    pool.run_until_stalled();

    let home = host.html("#app").unwrap();
    assert!(home.starts_with("<div class=\"app-layout\">"));
    assert!(!home.contains("layout-with-sidebar"));

    router.navigate("/admin");
    pool.run_until_stalled();
    assert_eq!(
        host.html("#app").unwrap(),
        "<div class=\"dashboard\"><header>H</header><nav>/admin</nav><h1>Admin</h1></div>"
    );

    router.navigate("/odd");
    pool.run_until_stalled();
    assert!(host.html("#app").unwrap().starts_with("<div class=\"app-layout\">"));
}

#[test]
fn test_configured_default_layout() {
    let (host, mut pool, router) = app(MemoryHost::new("/").with_mount("#app"), |b| {
        b.mode(Mode::History)
            .default_layout("bare")
            .layout("bare", |content, _components, _ctx| content)
    });
    router.route("/", page("Home"), RouteOptions::new());
    router.start();
    pool.run_until_stalled();

    assert_eq!(host.html("#app").unwrap(), "<h1>Home</h1>");
}

#[test]
fn test_update_global_component_rerenders() {
    let calls = Rc::new(Cell::new(0));
    let (host, mut pool, router) = app(MemoryHost::new("/").with_mount("#app"), |b| {
        b.mode(Mode::History).header(|_ctx| h("header").text("Guest"))
    });
    router.route("/", counting_page("Home", &calls), RouteOptions::new());
    router.start();
    pool.run_until_stalled();
    assert!(host.html("#app").unwrap().contains("Guest"));

    router
        .update_global_component("header", |_ctx| h("header").text("Alice"))
        .unwrap();
    pool.run_until_stalled();

    let html = host.html("#app").unwrap();
    assert!(html.contains("Alice"));
    assert!(!html.contains("Guest"));
    assert_eq!(calls.get(), 2);

    router.remove_global_component("header").unwrap();
    pool.run_until_stalled();
    assert!(!host.html("#app").unwrap().contains("<header>"));
    assert_eq!(calls.get(), 3);
}

#[test]
fn test_update_global_component_before_start_does_not_navigate() {
    let calls = Rc::new(Cell::new(0));
    let (host, mut pool, router) = history_app("/");
    router.route("/", counting_page("Home", &calls), RouteOptions::new());

    router
        .update_global_component("header", |_ctx| h("header").text("Early"))
        .unwrap();
    router.remove_global_component("footer").unwrap();
    pool.run_until_stalled();

    assert_eq!(calls.get(), 0);
    assert!(router.last_outcome().is_none());
    assert!(host.html("#app").unwrap().is_empty());

    router.start();
    pool.run_until_stalled();
    assert_eq!(calls.get(), 1);
    assert!(host.html("#app").unwrap().contains("<header>Early</header>"));
}

#[test]
fn test_update_global_component_rejects_empty_name() {
    let calls = Rc::new(Cell::new(0));
    let (_host, mut pool, router) = history_app("/");
    router.route("/", counting_page("Home", &calls), RouteOptions::new());
    router.start();
    pool.run_until_stalled();

    let result = router.update_global_component("", |_ctx| None::<Node>);
    pool.run_until_stalled();

    assert!(matches!(result, Err(RouterError::InvalidSlotName(_))));
    assert_eq!(calls.get(), 1);
}

// ============================================================================
// History Mode Tests
// ============================================================================

#[test]
fn test_hash_navigate_runs_exactly_one_cycle() {
    let calls = Rc::new(Cell::new(0));
    let (host, mut pool, router) = hash_app("/");
    router
        .route("/", page("Home"), RouteOptions::new())
        .route("/about", counting_page("About", &calls), RouteOptions::new());
    router.start();
    pool.run_until_stalled();

    router.navigate("/about");
    pool.run_until_stalled();

    assert_eq!(host.location().fragment, "/about");
    assert_eq!(host.location().pathname, "/");
    assert_eq!(calls.get(), 1);
    assert_eq!(host.history_length(), 2);
    assert!(host.html("#app").unwrap().contains("About"));
}

#[test]
fn test_hash_mode_follows_external_fragment_changes() {
    let (host, mut pool, router) = hash_app("/");
    router
        .route("/", page("Home"), RouteOptions::new())
        .route("/contact", page("Contact"), RouteOptions::new());
    router.start();
    pool.run_until_stalled();

    host.set_fragment_externally("/contact");
    pool.run_until_stalled();

    assert!(host.html("#app").unwrap().contains("Contact"));
    assert_eq!(router.current_path(), "/contact");
}

#[test]
fn test_history_mode_with_base_path() {
    let (host, mut pool, router) = app(MemoryHost::new("/app/").with_mount("#app"), |b| {
        b.mode(Mode::History).base_path("/app")
    });
    router
        .route("/", page("Home"), RouteOptions::new())
        .route("/about", page("About"), RouteOptions::new());
    router.start();
    pool.run_until_stalled();
    assert!(host.html("#app").unwrap().contains("Home"));

    router.navigate("/about");
    pool.run_until_stalled();

    assert_eq!(host.location().pathname, "/app/about");
    assert_eq!(router.current_path(), "/about");
    assert_eq!(router.current_route().unwrap().path(), "/about");
    assert!(host.html("#app").unwrap().contains("About"));
}

#[test]
fn test_router_from_json_config() {
    let config: RouterConfig = serde_json::from_str(
        r##"{ "mode": "history", "basePath": "/shop", "container": "#root" }"##,
    )
    .unwrap();
    let (host, mut pool, router) = app(MemoryHost::new("/shop/cart").with_mount("#root"), |b| {
        b.config(config)
    });
    router.route("/cart", page("Cart"), RouteOptions::new());
    router.start();
    pool.run_until_stalled();

    assert_eq!(router.mode(), Mode::History);
    assert!(host.html("#root").unwrap().contains("Cart"));
}

#[test]
fn test_replace_never_grows_history() {
    for mode in [Mode::History, Mode::Hash] {
        let (host, mut pool, router) =
            app(MemoryHost::new("/").with_mount("#app"), |b| b.mode(mode));
        router
            .route("/", page("Home"), RouteOptions::new())
            .route("/about", page("About"), RouteOptions::new());
        router.start();
        pool.run_until_stalled();

        router.replace("/about");
        pool.run_until_stalled();

        assert_eq!(host.history_length(), 1, "mode {mode:?}");
        assert_eq!(router.current_path(), "/about", "mode {mode:?}");
        assert!(host.html("#app").unwrap().contains("About"), "mode {mode:?}");
    }
}

#[test]
fn test_back_and_forward() {
    for mode in [Mode::History, Mode::Hash] {
        let calls = Rc::new(Cell::new(0));
        let (host, mut pool, router) =
            app(MemoryHost::new("/").with_mount("#app"), |b| b.mode(mode));
        router
            .route("/", page("Home"), RouteOptions::new())
            .route("/a", counting_page("A", &calls), RouteOptions::new())
            .route("/b", page("B"), RouteOptions::new());
        router.start();
        router.navigate("/a");
        router.navigate("/b");
        pool.run_until_stalled();
        assert_eq!(calls.get(), 1, "mode {mode:?}");

        router.back();
        pool.run_until_stalled();
        assert_eq!(calls.get(), 2, "mode {mode:?}");
        assert!(host.html("#app").unwrap().contains("<h1>A</h1>"));

        router.forward();
        pool.run_until_stalled();
        assert!(host.html("#app").unwrap().contains("<h1>B</h1>"));
        assert_eq!(router.current_route().unwrap().path(), "/b");
    }
}

#[test]
fn test_start_twice_registers_one_listener() {
    let calls = Rc::new(Cell::new(0));
    let (_host, mut pool, router) = hash_app("/");
    router
        .route("/", page("Home"), RouteOptions::new())
        .route("/about", counting_page("About", &calls), RouteOptions::new());
    router.start();
    router.start();
    pool.run_until_stalled();

    router.navigate("/about");
    pool.run_until_stalled();
    assert_eq!(calls.get(), 1);
}

// ============================================================================
// Link Interception Tests
// ============================================================================

#[test]
fn test_data_link_clicks_are_intercepted_in_history_mode() {
    let (host, mut pool, router) = history_app("/");
    router
        .route("/", page("Home"), RouteOptions::new())
        .route("/about", page("About"), RouteOptions::new());
    router.start();
    pool.run_until_stalled();

    let inner: Node = h("span").text("About us").into();
    let prevented = host.click(&[inner, link("/about")]);
    pool.run_until_stalled();

    assert!(prevented);
    assert_eq!(host.page_loads(), 0);
    assert_eq!(host.location().pathname, "/about");
    assert!(host.html("#app").unwrap().contains("<h1>About</h1>"));
}

#[test]
fn test_plain_links_are_not_intercepted() {
    let (host, mut pool, router) = history_app("/");
    router.route("/", page("Home"), RouteOptions::new());
    router.start();
    pool.run_until_stalled();

    let plain: Node = h("a").attr("href", "/elsewhere").text("out").into();
    let prevented = host.click(&[plain]);

    assert!(!prevented);
    assert_eq!(host.page_loads(), 1);
}

#[test]
fn test_hash_mode_leaves_clicks_to_the_host() {
    let (host, mut pool, router) = hash_app("/");
    router
        .route("/", page("Home"), RouteOptions::new())
        .route("/about", page("About"), RouteOptions::new());
    router.start();
    pool.run_until_stalled();

    let prevented = host.click(&[link("#/about")]);
    pool.run_until_stalled();

    assert!(!prevented);
    assert_eq!(host.location().fragment, "/about");
    assert!(host.html("#app").unwrap().contains("<h1>About</h1>"));
}

// ============================================================================
// Failure Containment Tests
// ============================================================================

const ERROR_VIEW: &str =
    "<div class=\"error\"><h1>Error</h1><p>An error occurred while loading this page.</p></div>";

fn after_log(log: &Log) -> impl AfterEach {
    let log = log.clone();
    after_fn(move |to, _from| {
        log.borrow_mut().push(to.path().to_string());
        async {}
    })
}

#[test]
fn test_handler_error_renders_error_view() {
    let log = new_log();
    let (host, mut pool, router) = app(MemoryHost::new("/fail").with_mount("#app"), |b| {
        b.mode(Mode::History).after_each(after_log(&log))
    });
    router.route(
        "/fail",
        |_ctx: NavigationContext| async { Err::<Node, _>(anyhow::anyhow!("database unavailable")) },
        RouteOptions::new(),
    );
    router.start();
    pool.run_until_stalled();

    assert!(host.html("#app").unwrap().contains(ERROR_VIEW));
    assert_eq!(*log.borrow(), vec!["/fail"]);
    assert_eq!(router.current_route().unwrap().path(), "/fail");
}

#[test]
fn test_handler_panics_are_contained() {
    let log = new_log();
    let (host, mut pool, router) = app(MemoryHost::new("/").with_mount("#app"), |b| {
        b.mode(Mode::History).after_each(after_log(&log))
    });
    router
        .route("/", page("Home"), RouteOptions::new())
        .route("/sync", sync_handler(|_| -> Node { panic!("sync kaboom") }), RouteOptions::new())
        .route(
            "/async",
            |_ctx: NavigationContext| async {
                let fail = true;
                if fail {
                    panic!("async kaboom");
                }
                h("p").text("unreachable")
            },
            RouteOptions::new(),
        );
    router.start();
    pool.run_until_stalled();

    router.navigate("/sync");
    pool.run_until_stalled();
    assert!(host.html("#app").unwrap().contains(ERROR_VIEW));

    router.navigate("/async");
    pool.run_until_stalled();
    assert!(host.html("#app").unwrap().contains(ERROR_VIEW));
    assert!(router.last_outcome().unwrap().is_rendered());

    assert_eq!(*log.borrow(), vec!["/", "/sync", "/async"]);
}

#[test]
fn test_missing_container_skips_render() {
    let log = new_log();
    let (host, mut pool, router) = app(MemoryHost::new("/"), |b| {
        b.mode(Mode::History).after_each(after_log(&log))
    });
    router.route("/", page("Home"), RouteOptions::new());
    router.start();
    pool.run_until_stalled();

    assert!(host.html("#app").is_none());
    assert_eq!(
        router.last_outcome(),
        Some(NavigationOutcome::Skipped {
            path: "/".to_string()
        })
    );
    assert_eq!(*log.borrow(), vec!["/"]);
    assert_eq!(router.current_route().unwrap().path(), "/");

    host.add_mount("#app");
    router.navigate("/");
    pool.run_until_stalled();
    assert!(host.html("#app").unwrap().contains("Home"));
}

#[test]
fn test_scroll_resets_after_navigation() {
    let (host, mut pool, router) = history_app("/");
    router
        .route("/", page("Home"), RouteOptions::new())
        .route("/long", page("Long"), RouteOptions::new());
    router.start();
    pool.run_until_stalled();

    host.set_scroll_position(0, 500);
    router.navigate("/long");
    pool.run_until_stalled();

    assert_eq!(host.scroll_position(), (0, 0));
}

#[test]
fn test_panicking_before_each_aborts_navigation() {
    let (host, mut pool, router) = app(MemoryHost::new("/").with_mount("#app"), |b| {
        b.mode(Mode::History).before_each(guard_fn(|_to, _from| async {
            let fail = true;
            if fail {
                panic!("guard exploded");
            }
            GuardResult::proceed()
        }))
    });
    let calls = Rc::new(Cell::new(0));
    router.route("/", counting_page("Home", &calls), RouteOptions::new());
    router.start();
    pool.run_until_stalled();

    assert_eq!(calls.get(), 0);
    assert!(host.html("#app").unwrap().is_empty());
    assert!(router.current_route().is_none());
    match router.last_outcome() {
        Some(NavigationOutcome::Aborted { path, reason }) => {
            assert_eq!(path, "/");
            assert!(reason.contains("guard exploded"));
        }
        other => panic!("expected an aborted navigation, got {other:?}"),
    }
}

#[test]
fn test_panicking_middleware_aborts_navigation() {
    let log = new_log();
    let calls = Rc::new(Cell::new(0));
    let (host, mut pool, router) = history_app("/");
    router.route("/", page("Home"), RouteOptions::new()).route(
        "/reports",
        counting_page("Reports", &calls),
        RouteOptions::new()
            .middleware(middleware_fn(|_ctx| -> futures::future::Ready<GuardResult> {
                panic!("middleware exploded")
            }))
            .middleware(recording(&log, "after panic", GuardResult::proceed())),
    );
    router.start();
    pool.run_until_stalled();

    router.navigate("/reports");
    pool.run_until_stalled();

    assert_eq!(calls.get(), 0);
    assert!(log.borrow().is_empty());
    assert!(router.last_outcome().unwrap().is_aborted());
    assert!(host.html("#app").unwrap().contains("<h1>Home</h1>"));
    assert_eq!(router.current_route().unwrap().path(), "/");
}

#[test]
fn test_panicking_after_each_still_completes_the_cycle() {
    let (host, mut pool, router) = app(MemoryHost::new("/").with_mount("#app"), |b| {
        b.mode(Mode::History).after_each(after_fn(|_to, _from| async {
            let fail = true;
            if fail {
                panic!("analytics exploded");
            }
        }))
    });
    router
        .route("/", page("Home"), RouteOptions::new())
        .route("/about", page("About"), RouteOptions::new());
    router.start();
    pool.run_until_stalled();

    host.set_scroll_position(0, 250);
    router.navigate("/about");
    pool.run_until_stalled();

    assert!(host.html("#app").unwrap().contains("<h1>About</h1>"));
    assert_eq!(router.current_route().unwrap().path(), "/about");
    assert_eq!(host.scroll_position(), (0, 0));
    assert!(router.last_outcome().unwrap().is_rendered());
}

#[test]
fn test_panicking_slot_renders_error_view() {
    let (host, mut pool, router) = app(MemoryHost::new("/").with_mount("#app"), |b| {
        b.mode(Mode::History)
            .header(|_ctx| -> Option<Node> { panic!("header exploded") })
            .footer(|_ctx| h("footer").text("F"))
    });
    router.route("/", page("Home"), RouteOptions::new());
    router.start();
    pool.run_until_stalled();

    let html = host.html("#app").unwrap();
    assert!(html.starts_with(&format!("<div class=\"app-layout\">{ERROR_VIEW}")));
    assert!(html.contains("<h1>Home</h1>"));
    assert!(html.contains("<footer>F</footer>"));
    assert!(router.last_outcome().unwrap().is_rendered());
}

#[test]
fn test_panicking_layout_renders_error_view() {
    let (host, mut pool, router) = app(MemoryHost::new("/").with_mount("#app"), |b| {
        b.mode(Mode::History)
            .layout("broken", |_content, _components, _ctx| -> Node { panic!("layout exploded") })
    });
    router
        .route("/", page("Home"), RouteOptions::new())
        .route("/admin", page("Admin"), RouteOptions::new().layout("broken"));
    router.start();
    pool.run_until_stalled();

    router.navigate("/admin");
    pool.run_until_stalled();

    assert_eq!(host.html("#app").unwrap(), ERROR_VIEW);
    assert_eq!(router.current_route().unwrap().path(), "/admin");
}

// ============================================================================
// Stale Cycle Tests
// ============================================================================

#[test]
fn test_cycle_stale_after_render_keeps_newer_route() {
    let (gate_tx, gate_rx) = futures::channel::oneshot::channel::<()>();
    let gate = Rc::new(RefCell::new(Some(gate_rx)));

    let (host, mut pool, router) = app(MemoryHost::new("/").with_mount("#app"), move |b| {
        b.mode(Mode::History).after_each(after_fn(move |_to, _from| {
            let pending = gate.borrow_mut().take();
            async move {
                if let Some(rx) = pending {
                    let _ = rx.await;
                }
            }
        }))
    });
    router
        .route("/", page("Home"), RouteOptions::new())
        .route("/about", page("About"), RouteOptions::new());
    router.start();
    pool.run_until_stalled();
    assert!(router.current_route().is_none());

    router.navigate("/about");
    pool.run_until_stalled();
    assert_eq!(router.current_route().unwrap().path(), "/about");

    gate_tx.send(()).unwrap();
    pool.run_until_stalled();

    assert_eq!(router.current_route().unwrap().path(), "/about");
    assert!(host.html("#app").unwrap().contains("About"));
}

#[tokio::test]
async fn test_slow_handler_never_overwrites_newer_navigation() {
    init_logging();
    let local = tokio::task::LocalSet::new();
    local
        .run_until(async {
            let host = Rc::new(MemoryHost::new("/").with_mount("#app"));
            let spawner = spawner_fn(|task| {
                tokio::task::spawn_local(task);
            });
            let router = Router::builder(host.clone(), Rc::new(spawner))
                .mode(Mode::History)
                .build()
                .unwrap();

            router
                .route("/", page("Home"), RouteOptions::new())
                .route(
                    "/slow",
                    |_ctx: NavigationContext| async {
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        h("h1").text("Slow")
                    },
                    RouteOptions::new(),
                )
                .route("/fast", page("Fast"), RouteOptions::new());
            router.start();
            router.navigate("/slow");
            router.navigate("/fast");

            tokio::time::sleep(Duration::from_millis(150)).await;

            let html = host.html("#app").unwrap();
            assert!(html.contains("<h1>Fast</h1>"));
            assert!(!html.contains("Slow"));
            assert_eq!(router.current_route().unwrap().path(), "/fast");
            assert_eq!(
                router.last_outcome(),
                Some(NavigationOutcome::Superseded {
                    path: "/slow".to_string()
                })
            );
        })
        .await;
}
