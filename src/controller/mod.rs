//! Controller capabilities bound by the route table.
//!
//! A controller supplies eight named handlers. Implement [`AuthController`]
//! to get all of them checked by the compiler, or fill a
//! [`HandlerTableBuilder`] slot by slot; `build()` then reports the first
//! empty slot as [`RouteError::MissingCapability`].

pub mod recording;

use axum::extract::Request;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use futures_util::future::BoxFuture;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crate::error::RouteError;

/// One of the eight handler slots a controller must provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Callback,
    Login,
    Logout,
    IsLoggedInService,
    IsLoggedIn,
    LogoutCallback,
    LoggedOut,
    Refresh,
}

impl Capability {
    /// Canonical order, also the order `HandlerTableBuilder::build` checks.
    pub const ALL: [Capability; 8] = [
        Capability::Callback,
        Capability::Login,
        Capability::Logout,
        Capability::IsLoggedInService,
        Capability::IsLoggedIn,
        Capability::LogoutCallback,
        Capability::LoggedOut,
        Capability::Refresh,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Capability::Callback => "callback",
            Capability::Login => "login",
            Capability::Logout => "logout",
            Capability::IsLoggedInService => "isLoggedinInService",
            Capability::IsLoggedIn => "isLoggedin",
            Capability::LogoutCallback => "logoutCallback",
            Capability::LoggedOut => "loggedout",
            Capability::Refresh => "refresh",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal handler that sees only the request.
pub type RequestHandler = Arc<dyn Fn(Request) -> BoxFuture<'static, Response> + Send + Sync>;

/// Terminal handler for routes carrying a `{service}` segment.
pub type ServiceHandler =
    Arc<dyn Fn(String, Request) -> BoxFuture<'static, Response> + Send + Sync>;

/// Terminal handler for the logged-out webhook: service, request head
/// (method, URI, headers) and the parsed JSON body.
pub type EventHandler =
    Arc<dyn Fn(String, Parts, serde_json::Value) -> BoxFuture<'static, Response> + Send + Sync>;

/// Middleware slot: may inspect the request, must call `next` to continue.
pub type MiddlewareHandler =
    Arc<dyn Fn(Request, Next) -> BoxFuture<'static, Response> + Send + Sync>;

/// Authentication controller.
///
/// The `service` argument is the raw path segment (an OAuth provider name,
/// say). It is not validated before it gets here.
pub trait AuthController: Send + Sync + 'static {
    /// `GET {base}/login/callback`
    fn callback(&self, req: Request) -> impl Future<Output = Response> + Send;

    /// `GET {base}/login/{service}`
    fn login(&self, service: String, req: Request) -> impl Future<Output = Response> + Send;

    /// `GET {base}/logout/{service}`
    fn logout(&self, service: String, req: Request) -> impl Future<Output = Response> + Send;

    /// `GET {base}/isloggedin/{service}`
    fn is_logged_in_service(
        &self,
        service: String,
        req: Request,
    ) -> impl Future<Output = Response> + Send;

    /// `GET {base}/isloggedin`
    fn is_logged_in(&self, req: Request) -> impl Future<Output = Response> + Send;

    /// `GET {base}/logout/callback/{service}`
    fn logout_callback(
        &self,
        service: String,
        req: Request,
    ) -> impl Future<Output = Response> + Send;

    /// `POST {base}/event/loggedout/{service}`
    ///
    /// `parts` carries the caller's headers, so the controller can
    /// authenticate the webhook before acting on `event`.
    fn logged_out(
        &self,
        service: String,
        parts: Parts,
        event: serde_json::Value,
    ) -> impl Future<Output = Response> + Send;

    /// Runs on every request, matched or not.
    fn refresh(&self, req: Request, next: Next) -> impl Future<Output = Response> + Send;
}

/// Complete set of type-erased handlers, one per capability.
#[derive(Clone)]
pub struct HandlerTable {
    pub(crate) callback: RequestHandler,
    pub(crate) login: ServiceHandler,
    pub(crate) logout: ServiceHandler,
    pub(crate) is_logged_in_service: ServiceHandler,
    pub(crate) is_logged_in: RequestHandler,
    pub(crate) logout_callback: ServiceHandler,
    pub(crate) logged_out: EventHandler,
    pub(crate) refresh: MiddlewareHandler,
}

/// Collects handler slots; every slot must be filled before `build`.
#[derive(Default, Clone)]
pub struct HandlerTableBuilder {
    callback: Option<RequestHandler>,
    login: Option<ServiceHandler>,
    logout: Option<ServiceHandler>,
    is_logged_in_service: Option<ServiceHandler>,
    is_logged_in: Option<RequestHandler>,
    logout_callback: Option<ServiceHandler>,
    logged_out: Option<EventHandler>,
    refresh: Option<MiddlewareHandler>,
}

fn request_handler<F, Fut>(f: F) -> RequestHandler
where
    F: Fn(Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    Arc::new(move |req: Request| -> BoxFuture<'static, Response> { Box::pin(f(req)) })
}

fn service_handler<F, Fut>(f: F) -> ServiceHandler
where
    F: Fn(String, Request) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    Arc::new(move |service: String, req: Request| -> BoxFuture<'static, Response> {
        Box::pin(f(service, req))
    })
}

fn event_handler<F, Fut>(f: F) -> EventHandler
where
    F: Fn(String, Parts, serde_json::Value) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    Arc::new(
        move |service: String,
              parts: Parts,
              event: serde_json::Value|
              -> BoxFuture<'static, Response> { Box::pin(f(service, parts, event)) },
    )
}

/// Wrap an async `(Request, Next) -> Response` function as a middleware slot.
pub fn middleware_handler<F, Fut>(f: F) -> MiddlewareHandler
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    Arc::new(move |req: Request, next: Next| -> BoxFuture<'static, Response> {
        Box::pin(f(req, next))
    })
}

impl HandlerTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill every slot from a controller implementation.
    pub fn from_controller<C: AuthController>(controller: Arc<C>) -> Self {
        let c = controller.clone();
        let callback = request_handler(move |req| {
            let c = c.clone();
            async move { c.callback(req).await }
        });
        let c = controller.clone();
        let login = service_handler(move |service, req| {
            let c = c.clone();
            async move { c.login(service, req).await }
        });
        let c = controller.clone();
        let logout = service_handler(move |service, req| {
            let c = c.clone();
            async move { c.logout(service, req).await }
        });
        let c = controller.clone();
        let is_logged_in_service = service_handler(move |service, req| {
            let c = c.clone();
            async move { c.is_logged_in_service(service, req).await }
        });
        let c = controller.clone();
        let is_logged_in = request_handler(move |req| {
            let c = c.clone();
            async move { c.is_logged_in(req).await }
        });
        let c = controller.clone();
        let logout_callback = service_handler(move |service, req| {
            let c = c.clone();
            async move { c.logout_callback(service, req).await }
        });
        let c = controller.clone();
        let logged_out = event_handler(move |service, parts, event| {
            let c = c.clone();
            async move { c.logged_out(service, parts, event).await }
        });
        let c = controller;
        let refresh = middleware_handler(move |req, next| {
            let c = c.clone();
            async move { c.refresh(req, next).await }
        });

        Self {
            callback: Some(callback),
            login: Some(login),
            logout: Some(logout),
            is_logged_in_service: Some(is_logged_in_service),
            is_logged_in: Some(is_logged_in),
            logout_callback: Some(logout_callback),
            logged_out: Some(logged_out),
            refresh: Some(refresh),
        }
    }

    pub fn callback<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.callback = Some(request_handler(f));
        self
    }

    pub fn login<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(String, Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.login = Some(service_handler(f));
        self
    }

    pub fn logout<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(String, Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.logout = Some(service_handler(f));
        self
    }

    pub fn is_logged_in_service<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(String, Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.is_logged_in_service = Some(service_handler(f));
        self
    }

    pub fn is_logged_in<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.is_logged_in = Some(request_handler(f));
        self
    }

    pub fn logout_callback<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(String, Request) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.logout_callback = Some(service_handler(f));
        self
    }

    pub fn logged_out<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(String, Parts, serde_json::Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.logged_out = Some(event_handler(f));
        self
    }

    pub fn refresh<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Response> + Send + 'static,
    {
        self.refresh = Some(middleware_handler(f));
        self
    }

    /// Drop a slot. Lets callers start from a controller and knock out one
    /// capability.
    pub fn without(mut self, capability: Capability) -> Self {
        match capability {
            Capability::Callback => self.callback = None,
            Capability::Login => self.login = None,
            Capability::Logout => self.logout = None,
            Capability::IsLoggedInService => self.is_logged_in_service = None,
            Capability::IsLoggedIn => self.is_logged_in = None,
            Capability::LogoutCallback => self.logout_callback = None,
            Capability::LoggedOut => self.logged_out = None,
            Capability::Refresh => self.refresh = None,
        }
        self
    }

    /// Capabilities with no handler yet, in canonical order.
    pub fn missing(&self) -> Vec<Capability> {
        Capability::ALL
            .into_iter()
            .filter(|c| !self.has(*c))
            .collect()
    }

    fn has(&self, capability: Capability) -> bool {
        match capability {
            Capability::Callback => self.callback.is_some(),
            Capability::Login => self.login.is_some(),
            Capability::Logout => self.logout.is_some(),
            Capability::IsLoggedInService => self.is_logged_in_service.is_some(),
            Capability::IsLoggedIn => self.is_logged_in.is_some(),
            Capability::LogoutCallback => self.logout_callback.is_some(),
            Capability::LoggedOut => self.logged_out.is_some(),
            Capability::Refresh => self.refresh.is_some(),
        }
    }

    /// Finish the table, failing on the first empty slot.
    pub fn build(self) -> Result<HandlerTable, RouteError> {
        use Capability::*;
        let missing = RouteError::MissingCapability;

        Ok(HandlerTable {
            callback: self.callback.ok_or(missing(Callback))?,
            login: self.login.ok_or(missing(Login))?,
            logout: self.logout.ok_or(missing(Logout))?,
            is_logged_in_service: self
                .is_logged_in_service
                .ok_or(missing(IsLoggedInService))?,
            is_logged_in: self.is_logged_in.ok_or(missing(IsLoggedIn))?,
            logout_callback: self.logout_callback.ok_or(missing(LogoutCallback))?,
            logged_out: self.logged_out.ok_or(missing(LoggedOut))?,
            refresh: self.refresh.ok_or(missing(Refresh))?,
        })
    }
}
