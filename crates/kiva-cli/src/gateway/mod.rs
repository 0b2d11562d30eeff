//! Development request gateway.
//!
//! Every request ends in exactly one of three ways, tried in order:
//!
//! 1. **Mock**: a GET under the mock prefix while fixtures are loaded is
//!    answered from the fixture set (200 + rendered JSON, or 404 + `{}`).
//! 2. **Proxy**: a path under a proxy context is forwarded upstream.
//! 3. **Pass-through**: anything else is served from the content base, with
//!    history fallback to the index page.

pub mod fixtures;
pub mod mock;
pub mod proxy;

use std::path::Path;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Request, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};
use kiva_config::{DevServerOptions, MockOptions, ProxyRoute};
use reqwest::Client;
use serde_json::json;
use tokio::net::TcpListener;
use tower::ServiceExt;
use tower_http::{
    compression::CompressionLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::error::{CliError, Result};

pub use fixtures::{FixtureError, FixtureSet};
pub use mock::{MockRenderer, MockTemplate};
pub use proxy::ProxyError;

/// How a request will be answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteKind {
    /// Fixture lookup by URL suffix
    Mock(String),
    /// Index into the proxy route table
    Proxy(usize),
    PassThrough,
}

enum StaticFiles {
    History(ServeDir<ServeFile>),
    Plain(ServeDir),
}

impl StaticFiles {
    fn new(options: &DevServerOptions, root: &Path) -> Self {
        let base = root.join(&options.content_base);
        let dir = ServeDir::new(&base);
        if options.history_api_fallback {
            StaticFiles::History(dir.fallback(ServeFile::new(base.join(&options.index))))
        } else {
            StaticFiles::Plain(dir)
        }
    }

    async fn serve(&self, req: Request) -> Response {
        match self {
            StaticFiles::History(dir) => dir.clone().oneshot(req).await.into_response(),
            StaticFiles::Plain(dir) => dir.clone().oneshot(req).await.into_response(),
        }
    }
}

/// The development gateway.
pub struct Gateway {
    mock: MockOptions,
    fixtures: Option<FixtureSet>,
    renderer: Arc<dyn MockRenderer>,
    routes: Vec<ProxyRoute>,
    client: Client,
    static_files: StaticFiles,
    compress: bool,
}

impl Gateway {
    /// Build a gateway. `fixtures` is `None` when no fixture file exists,
    /// in which case mock requests fall through like any other path.
    pub fn new(options: &DevServerOptions, root: &Path, fixtures: Option<FixtureSet>) -> Result<Self> {
        let routes = options.proxy_routes()?;
        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| CliError::Server(format!("Failed to create proxy client: {e}")))?;

        Ok(Self {
            mock: options.mock.clone(),
            fixtures,
            renderer: Arc::new(MockTemplate),
            routes,
            client,
            static_files: StaticFiles::new(options, root),
            compress: options.compress,
        })
    }

    /// Replace the fixture renderer.
    pub fn with_renderer(mut self, renderer: impl MockRenderer + 'static) -> Self {
        self.renderer = Arc::new(renderer);
        self
    }

    pub fn has_fixtures(&self) -> bool {
        self.fixtures.is_some()
    }

    pub fn classify(&self, method: &Method, path: &str) -> RouteKind {
        if self.fixtures.is_some() && method == Method::GET {
            if let Some(suffix) = self.mock.suffix(path) {
                return RouteKind::Mock(suffix.to_string());
            }
        }

        match self.routes.iter().position(|route| route.matches(path)) {
            Some(index) => RouteKind::Proxy(index),
            None => RouteKind::PassThrough,
        }
    }

    fn mock_response(&self, suffix: &str) -> Response {
        match self.fixtures.as_ref().and_then(|set| set.get(suffix)) {
            Some(template) => (StatusCode::OK, Json(self.renderer.render(template))).into_response(),
            None => {
                tracing::debug!("No fixture for {suffix}");
                (StatusCode::NOT_FOUND, Json(json!({}))).into_response()
            }
        }
    }

    pub fn router(self) -> Router {
        let compress = self.compress;
        let router = Router::new()
            .fallback(dispatch)
            .with_state(Arc::new(self))
            .layer(TraceLayer::new_for_http());

        if compress {
            router.layer(CompressionLayer::new())
        } else {
            router
        }
    }

    /// Serve until Ctrl-C.
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| CliError::Server(format!("Server error: {e}")))
    }
}

async fn dispatch(State(gateway): State<Arc<Gateway>>, req: Request) -> Response {
    match gateway.classify(req.method(), req.uri().path()) {
        RouteKind::Mock(suffix) => gateway.mock_response(&suffix),
        RouteKind::Proxy(index) => proxy::forward(&gateway.client, &gateway.routes[index], req)
            .await
            .into_response(),
        RouteKind::PassThrough => gateway.static_files.serve(req).await,
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down gateway");
}
