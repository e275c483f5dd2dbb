//! Axum-based HTTP server.

use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tracing::info;

use explorer_index::IndexedStore;
use explorer_types::ChainId;

use crate::error::RpcError;
use crate::handlers;

/// Everything a request handler needs, built once at startup.
pub struct ExplorerContext {
    pub store: Arc<IndexedStore>,
    pub chain_id: ChainId,
}

impl ExplorerContext {
    pub fn new(store: Arc<IndexedStore>, chain_id: ChainId) -> Self {
        Self { store, chain_id }
    }
}

pub fn router(ctx: Arc<ExplorerContext>) -> Router {
    Router::new()
        .route("/chain", get(handlers::chain_info))
        .route("/tx-references", get(handlers::tx_references))
        .route("/transactions/:tx_id/block", get(handlers::block_of_transaction))
        .route("/signers/:address/transactions", get(handlers::signer_transactions))
        .route(
            "/addresses/:address/transactions",
            get(handlers::updated_address_transactions),
        )
        .with_state(ctx)
}

pub struct RpcServer {
    pub bind_address: String,
    pub context: Arc<ExplorerContext>,
}

impl RpcServer {
    pub fn new(bind_address: impl Into<String>, context: Arc<ExplorerContext>) -> Self {
        Self {
            bind_address: bind_address.into(),
            context,
        }
    }

    /// Serve until the process is stopped.
    pub async fn start(&self) -> Result<(), RpcError> {
        let app = router(Arc::clone(&self.context));
        let listener = tokio::net::TcpListener::bind(&self.bind_address)
            .await
            .map_err(|e| RpcError::Server(format!("bind {}: {e}", self.bind_address)))?;
        info!(
            address = %self.bind_address,
            chain = %self.context.chain_id,
            "explorer API listening"
        );
        axum::serve(listener, app)
            .await
            .map_err(|e| RpcError::Server(e.to_string()))
    }
}
