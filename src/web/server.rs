//! Web server for roomcast.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;

use crate::config::{Config, WebConfig};
use crate::relay::RoomRegistry;

use super::handlers::AppState;
use super::router::{create_health_router, create_router, create_static_router};

/// Web server hosting the pages and the relay endpoint.
pub struct WebServer {
    /// Address to bind, as `host:port`.
    bind_addr: String,
    /// Application state.
    app_state: Arc<AppState>,
    /// Web configuration.
    web_config: WebConfig,
}

impl WebServer {
    /// Create a new web server with a fresh room registry.
    pub fn new(config: &Config) -> Self {
        Self::with_registry(config, Arc::new(RoomRegistry::new()))
    }

    /// Create a new web server around an existing room registry.
    pub fn with_registry(config: &Config, registry: Arc<RoomRegistry>) -> Self {
        Self {
            bind_addr: config.bind_addr(),
            app_state: Arc::new(AppState::new(registry, config)),
            web_config: config.web.clone(),
        }
    }

    /// Get the configured bind address.
    pub fn bind_addr(&self) -> &str {
        &self.bind_addr
    }

    /// Get the room registry.
    pub fn registry(&self) -> Arc<RoomRegistry> {
        Arc::clone(&self.app_state.registry)
    }

    fn build_router(self) -> Router {
        let mut router = create_router(self.app_state).merge(create_health_router());

        // Add static file serving if enabled
        if self.web_config.serve_static {
            if let Some(static_router) = create_static_router(&self.web_config.static_path) {
                router = router.merge(static_router);
            }
        }

        router.layer(CompressionLayer::new())
    }

    async fn bind(&self) -> Result<(TcpListener, SocketAddr), std::io::Error> {
        let listener = TcpListener::bind(&self.bind_addr).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!("Web server listening on http://{}", local_addr);
        Ok((listener, local_addr))
    }

    /// Run the web server.
    pub async fn run(self) -> Result<(), std::io::Error> {
        let (listener, _) = self.bind().await?;
        axum::serve(listener, self.build_router()).await
    }

    /// Run the server in the background and return the actual bound address.
    ///
    /// This is useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> Result<SocketAddr, std::io::Error> {
        let (listener, local_addr) = self.bind().await?;
        let router = self.build_router();

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}
