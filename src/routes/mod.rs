//! Auth route table.
//!
//! Builds the scoped auth router from a [`Config`] and a controller's
//! handler slots. The builder returns the router, its ordered bindings and
//! the global `refresh` middleware separately; composing them onto an
//! application is the caller's job ([`AuthRoutes::attach`]).

pub mod health;

use axum::Router;
use axum::extract::{FromRequest, Path, Request};
use axum::http::Method;
use axum::middleware::{Next, from_fn};
use axum::response::IntoResponse;
use axum::routing::{MethodRouter, get, post};
use axum::Json;
use std::fmt;

use crate::audit;
use crate::config::{BasePath, Config};
use crate::controller::{
    Capability, HandlerTable, HandlerTableBuilder, MiddlewareHandler, RequestHandler,
    ServiceHandler,
};
use crate::error::{AppError, RouteError};
use crate::middleware::cache::cache_guard;

/// Work done on a matched request before its terminal handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreHandler {
    /// Response headers that disable browser/proxy caching.
    CachePrevention,
    /// Request body parsed as JSON; malformed bodies never reach the handler.
    JsonBody,
}

/// One registered route: method, full path pattern, pre-handlers, handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteBinding {
    pub method: Method,
    pub path: String,
    pub pre_handlers: &'static [PreHandler],
    pub capability: Capability,
}

impl fmt::Display for RouteBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} -> {}", self.method, self.path, self.capability)
    }
}

#[derive(Clone, Copy)]
enum Verb {
    Get,
    Post,
}

impl Verb {
    fn method(self) -> Method {
        match self {
            Verb::Get => Method::GET,
            Verb::Post => Method::POST,
        }
    }
}

struct RouteDef {
    verb: Verb,
    suffix: &'static str,
    pre_handlers: &'static [PreHandler],
    capability: Capability,
    bind: fn(&HandlerTable) -> MethodRouter,
}

const GUARDED: &[PreHandler] = &[PreHandler::CachePrevention];

// Registration order matters to first-match routers: the literal
// `/login/callback` goes before the `/login/{service}` wildcard.
const AUTH_ROUTES: &[RouteDef] = &[
    RouteDef {
        verb: Verb::Get,
        suffix: "/login/callback",
        pre_handlers: GUARDED,
        capability: Capability::Callback,
        bind: bind_callback,
    },
    RouteDef {
        verb: Verb::Get,
        suffix: "/login/{service}",
        pre_handlers: GUARDED,
        capability: Capability::Login,
        bind: bind_login,
    },
    RouteDef {
        verb: Verb::Get,
        suffix: "/logout/{service}",
        pre_handlers: GUARDED,
        capability: Capability::Logout,
        bind: bind_logout,
    },
    RouteDef {
        verb: Verb::Get,
        suffix: "/isloggedin/{service}",
        pre_handlers: GUARDED,
        capability: Capability::IsLoggedInService,
        bind: bind_is_logged_in_service,
    },
    RouteDef {
        verb: Verb::Get,
        suffix: "/isloggedin",
        pre_handlers: GUARDED,
        capability: Capability::IsLoggedIn,
        bind: bind_is_logged_in,
    },
    RouteDef {
        verb: Verb::Get,
        suffix: "/logout/callback/{service}",
        pre_handlers: GUARDED,
        capability: Capability::LogoutCallback,
        bind: bind_logout_callback,
    },
    RouteDef {
        verb: Verb::Post,
        suffix: "/event/loggedout/{service}",
        pre_handlers: &[PreHandler::JsonBody],
        capability: Capability::LoggedOut,
        bind: bind_logged_out,
    },
];

fn request_route(handler: &RequestHandler) -> MethodRouter {
    let handler = handler.clone();
    get(move |req: Request| handler(req))
}

fn service_route(handler: &ServiceHandler) -> MethodRouter {
    let handler = handler.clone();
    get(move |Path(service): Path<String>, req: Request| handler(service, req))
}

fn bind_callback(table: &HandlerTable) -> MethodRouter {
    request_route(&table.callback)
}

fn bind_login(table: &HandlerTable) -> MethodRouter {
    service_route(&table.login)
}

fn bind_logout(table: &HandlerTable) -> MethodRouter {
    service_route(&table.logout)
}

fn bind_is_logged_in_service(table: &HandlerTable) -> MethodRouter {
    service_route(&table.is_logged_in_service)
}

fn bind_is_logged_in(table: &HandlerTable) -> MethodRouter {
    request_route(&table.is_logged_in)
}

fn bind_logout_callback(table: &HandlerTable) -> MethodRouter {
    service_route(&table.logout_callback)
}

// The handler gets the request head alongside the parsed body.
fn bind_logged_out(table: &HandlerTable) -> MethodRouter {
    let handler = table.logged_out.clone();
    post(
        move |Path(service): Path<String>, req: Request| {
            let handler = handler.clone();
            async move {
                let (parts, body) = req.into_parts();
                let head = parts.clone();
                let parsed =
                    Json::<serde_json::Value>::from_request(Request::from_parts(parts, body), &())
                        .await;
                match parsed {
                    Ok(Json(event)) => handler(service, head, event).await,
                    Err(rejection) => {
                        tracing::warn!(
                            service = %service,
                            error = %rejection.body_text(),
                            "rejected logged-out event body"
                        );
                        AppError::InvalidEvent {
                            status: rejection.status(),
                            message: rejection.body_text(),
                        }
                        .into_response()
                    }
                }
            }
        },
    )
}

/// The ordered bindings for a base path, without building anything.
pub fn route_bindings(base_path: &BasePath) -> Vec<RouteBinding> {
    AUTH_ROUTES
        .iter()
        .map(|route| RouteBinding {
            method: route.verb.method(),
            path: base_path.join(route.suffix),
            pre_handlers: route.pre_handlers,
            capability: route.capability,
        })
        .collect()
}

/// Middleware that runs for every request on the composed application.
#[derive(Clone)]
pub struct GlobalMiddleware {
    capability: Capability,
    handler: MiddlewareHandler,
}

impl GlobalMiddleware {
    pub fn capability(&self) -> Capability {
        self.capability
    }

    /// Layer this middleware over every route and the fallback of `app`.
    /// Routes added to `app` afterwards are not covered.
    pub fn apply(&self, app: Router) -> Router {
        let handler = self.handler.clone();
        app.layer(from_fn(move |req: Request, next: Next| handler(req, next)))
    }
}

/// Output of the route table builder.
pub struct AuthRoutes {
    router: Router,
    bindings: Vec<RouteBinding>,
    global: GlobalMiddleware,
}

impl AuthRoutes {
    pub fn bindings(&self) -> &[RouteBinding] {
        &self.bindings
    }

    pub fn global(&self) -> &GlobalMiddleware {
        &self.global
    }

    /// Split into the scoped router and the global middleware.
    pub fn into_parts(self) -> (Router, GlobalMiddleware) {
        (self.router, self.global)
    }

    /// Merge the auth routes into `app`, then run `refresh` over all of it.
    pub fn attach(self, app: Router) -> Router {
        let (router, global) = self.into_parts();
        global.apply(app.merge(router))
    }
}

/// Build the auth route table with the default cache-prevention guard.
pub fn build_routes(
    config: &Config,
    handlers: HandlerTableBuilder,
) -> Result<AuthRoutes, RouteError> {
    build_routes_with_guard(config, handlers, cache_guard())
}

/// Build the auth route table with a caller-supplied cache-prevention guard.
///
/// Fails before registering anything if the controller lacks a capability.
pub fn build_routes_with_guard(
    config: &Config,
    handlers: HandlerTableBuilder,
    guard: MiddlewareHandler,
) -> Result<AuthRoutes, RouteError> {
    let table = handlers.build()?;
    let bindings = route_bindings(&config.base_path);

    let mut router = Router::new();
    for (route, binding) in AUTH_ROUTES.iter().zip(&bindings) {
        let mut method_router = (route.bind)(&table);

        // `route_layer` keeps both layers off the 405 method fallback.
        if route.pre_handlers.contains(&PreHandler::CachePrevention) {
            let guard = guard.clone();
            method_router = method_router
                .route_layer(from_fn(move |req: Request, next: Next| guard(req, next)));
        }

        let capability = route.capability;
        method_router = method_router.route_layer(from_fn(move |req: Request, next: Next| {
            audit::audit_dispatch(capability, req, next)
        }));

        tracing::debug!(route = %binding, "registered auth route");
        router = router.route(&binding.path, method_router);
    }

    Ok(AuthRoutes {
        router,
        bindings,
        global: GlobalMiddleware {
            capability: Capability::Refresh,
            handler: table.refresh,
        },
    })
}
