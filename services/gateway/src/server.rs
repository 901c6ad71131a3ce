//! Bootstraps both gateway surfaces: the native gRPC listener and the
//! HTTP/JSON mirror, "two ports: native RPC and HTTP-gateway-with-JSON" per
//! the RPC surface section. Stateless beyond the shared use-case; logging
//! follows the teacher's pattern of narrating each fallible bootstrap step.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use oms::usecase::OrderUseCase;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::grpc::OrderManagementService;
use crate::pb::order_management_server::OrderManagementServer;

/// Run the gRPC and HTTP/JSON gateways concurrently until either exits.
pub async fn serve(
    use_case: Arc<OrderUseCase>,
    grpc_addr: SocketAddr,
    http_addr: SocketAddr,
) -> Result<()> {
    let grpc_service = OrderManagementService::new(use_case.clone());
    let http_app = crate::http::router(use_case).layer(TraceLayer::new_for_http());

    info!(%grpc_addr, "starting gRPC gateway listener");
    info!(%http_addr, "starting HTTP/JSON gateway listener");

    let grpc_server = tonic::transport::Server::builder()
        .add_service(OrderManagementServer::new(grpc_service))
        .serve(grpc_addr);

    let http_listener = tokio::net::TcpListener::bind(http_addr)
        .await
        .with_context(|| format!("failed to bind HTTP listener on {http_addr}"))?;
    let http_server = axum::serve(http_listener, http_app);

    tokio::try_join!(
        async { grpc_server.await.context("gRPC server exited with an error") },
        async { http_server.await.context("HTTP server exited with an error") },
    )?;

    Ok(())
}
