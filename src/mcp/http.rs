//! Streamable HTTP transport.

use axum::{routing::get, Json, Router};
use rmcp::transport::streamable_http_server::{
    session::local::LocalSessionManager, StreamableHttpServerConfig, StreamableHttpService,
};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use super::ZohoMcpServer;
use crate::client::ZohoClient;

/// Router serving MCP at `/mcp` and a liveness check at `/health`.
///
/// Every session gets its own handler, all sharing one client and credential store.
pub fn create_router(client: ZohoClient, portal_id: String) -> Router {
    let service = StreamableHttpService::new(
        move || Ok(ZohoMcpServer::new(client.clone(), portal_id.clone())),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig::default(),
    );

    Router::new()
        .route("/health", get(health))
        .nest_service("/mcp", service)
        .layer(TraceLayer::new_for_http())
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn run_http_server(client: ZohoClient, portal_id: String, port: u16) -> anyhow::Result<()> {
    let app = create_router(client, portal_id);

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    tracing::info!("MCP server listening on http://127.0.0.1:{}/mcp", port);

    axum::serve(listener, app).await?;
    Ok(())
}
