use std::{future::Future, net::SocketAddr};

use axum::Router;
use configs::AppConfig;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::routes;
use service::runtime::{self, Services};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Host/port from the normalized config (env overrides already applied).
fn bind_addr(cfg: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(format!("{}:{}", cfg.server.host, cfg.server.port).parse()?)
}

/// Router over already-opened services.
pub fn app(services: Services) -> Router {
    routes::build_router(services, build_cors())
}

/// Open the configured stores, bind and serve until `shutdown` resolves.
pub async fn run<S>(cfg: AppConfig, shutdown: S) -> anyhow::Result<()>
where
    S: Future<Output = ()> + Send + 'static,
{
    let services = runtime::open_services(&cfg).await?;
    let app = app(services);

    let addr = bind_addr(&cfg)?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, backend = ?cfg.storage.backend, "starting roster server");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    info!("server stopped accepting connections");
    Ok(())
}
