use axum::{extract::FromRef, middleware::from_fn_with_state, Router};
use axum_session::SessionLayer;

use crate::{
    html_state::HtmlState,
    middlewares::{
        compression::compression_layer, response_middleware::with_template_response,
        session_middleware::require_session,
    },
};

pub type MiddleWareVecType<S> = Vec<Box<dyn FnOnce(Router<S>) -> Router<S> + Send>>;

pub struct RouterFactory<S> {
    app_state: HtmlState,
    public_routers: Vec<Router<S>>,
    protected_routers: Vec<Router<S>>,
    custom_middleware: MiddleWareVecType<S>,
    compression_enabled: bool,
}

impl<S> RouterFactory<S>
where
    S: Clone + Send + Sync + 'static,
    HtmlState: FromRef<S>,
{
    pub fn new(app_state: &HtmlState) -> Self {
        Self {
            app_state: app_state.to_owned(),
            public_routers: Vec::new(),
            protected_routers: Vec::new(),
            custom_middleware: Vec::new(),
            compression_enabled: false,
        }
    }

    // Add a public router that will be merged at the root level
    pub fn add_public_routes(mut self, routes: Router<S>) -> Self {
        self.public_routers.push(routes);
        self
    }

    // Add a router that requires an established session
    pub fn add_protected_routes(mut self, routes: Router<S>) -> Self {
        self.protected_routers.push(routes);
        self
    }

    // Add custom middleware to be applied before the standard ones
    pub fn with_middleware<F>(mut self, middleware_fn: F) -> Self
    where
        F: FnOnce(Router<S>) -> Router<S> + Send + 'static,
    {
        self.custom_middleware.push(Box::new(middleware_fn));
        self
    }

    /// Enables response compression when building the router.
    pub const fn with_compression(mut self) -> Self {
        self.compression_enabled = true;
        self
    }

    pub fn build(self) -> Router<S> {
        let mut app_router = Router::new();

        for router in self.public_routers {
            app_router = app_router.merge(router);
        }

        let mut protected_router = Router::new();
        let has_protected_routes = !self.protected_routers.is_empty();

        for router in self.protected_routers {
            protected_router = protected_router.merge(router);
        }

        if has_protected_routes {
            protected_router = protected_router
                .route_layer(from_fn_with_state(self.app_state.clone(), require_session));
        }

        app_router = app_router.merge(protected_router);

        for middleware_fn in self.custom_middleware {
            app_router = middleware_fn(app_router);
        }

        // Template rendering happens outside the session lookup so redirects
        // from the session middleware still render properly
        app_router = app_router.layer(from_fn_with_state(
            self.app_state.clone(),
            with_template_response::<HtmlState>,
        ));
        app_router = app_router.layer(SessionLayer::new((*self.app_state.session_store).clone()));

        if self.compression_enabled {
            app_router = app_router.layer(compression_layer());
        }

        app_router
    }
}
