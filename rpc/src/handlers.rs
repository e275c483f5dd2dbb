//! RPC request handlers.
//!
//! Index reads hit the storage engine synchronously, so every handler runs its
//! query on the blocking pool.

use std::str::FromStr;
use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::response::Json;
use serde::{Deserialize, Serialize};

use explorer_index::{IndexError, IndexedStore, Order, Page};
use explorer_store::BlockStore;
use explorer_types::{Address, TxId};

use crate::error::RpcError;
use crate::pagination::{ListParams, PageMeta};
use crate::server::ExplorerContext;

type Ctx = State<Arc<ExplorerContext>>;

/// Query string extraction whose rejection is answered with a JSON error body.
type QueryParams<T> = Result<Query<T>, QueryRejection>;

async fn blocking<T, F>(store: &Arc<IndexedStore>, query: F) -> Result<T, RpcError>
where
    T: Send + 'static,
    F: FnOnce(&IndexedStore) -> Result<T, RpcError> + Send + 'static,
{
    let store = Arc::clone(store);
    tokio::task::spawn_blocking(move || query(store.as_ref()))
        .await
        .map_err(|e| RpcError::Server(format!("query task failed: {e}")))?
}

fn parse<T: FromStr>(what: &str, value: &str) -> Result<T, RpcError>
where
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| RpcError::InvalidRequest(format!("{what} {value:?}: {e}")))
}

// ── Chain ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct ChainResponse {
    pub chain_id: String,
    pub block_count: u64,
    pub tx_references: u64,
    pub signer_references: u64,
    pub updated_address_references: u64,
}

pub async fn chain_info(State(ctx): Ctx) -> Result<Json<ChainResponse>, RpcError> {
    let chain_id = ctx.chain_id.to_string();
    let response = blocking(&ctx.store, move |store| {
        let block_count = store.base().block_count()?;
        let counts = store.index_counts()?;
        Ok(ChainResponse {
            chain_id,
            block_count,
            tx_references: counts.tx_references,
            signer_references: counts.signer_references,
            updated_address_references: counts.updated_address_references,
        })
    })
    .await?;
    Ok(Json(response))
}

// ── Forward references ───────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TxReferencesQuery {
    pub tx_id: Option<String>,
    pub desc: Option<bool>,
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

impl TxReferencesQuery {
    fn list(&self) -> ListParams {
        ListParams {
            desc: self.desc,
            offset: self.offset,
            limit: self.limit,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TxReference {
    pub tx_id: String,
    pub block_hash: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TxReferencesResponse {
    pub references: Vec<TxReference>,
    #[serde(flatten)]
    pub page: PageMeta,
}

pub async fn tx_references(
    State(ctx): Ctx,
    query: QueryParams<TxReferencesQuery>,
) -> Result<Json<TxReferencesResponse>, RpcError> {
    let Query(query) = query?;
    let tx_id = query
        .tx_id
        .as_deref()
        .map(|id| parse::<TxId>("transaction id", id))
        .transpose()?;
    let list = query.list();
    let order = list.order();
    let page = list.page()?;

    let references = blocking(&ctx.store, move |store| {
        Ok(store.tx_references(tx_id.as_ref(), order, page)?)
    })
    .await?;

    Ok(Json(TxReferencesResponse {
        page: PageMeta::new(page, references.len()),
        references: references
            .into_iter()
            .map(|(tx_id, block_hash)| TxReference {
                tx_id: tx_id.to_string(),
                block_hash: block_hash.to_string(),
            })
            .collect(),
    }))
}

pub async fn block_of_transaction(
    State(ctx): Ctx,
    Path(tx_id): Path<String>,
) -> Result<Json<TxReference>, RpcError> {
    let id: TxId = parse("transaction id", &tx_id)?;
    let block = blocking(&ctx.store, move |store| Ok(store.block_of(&id)?)).await?;
    match block {
        Some(block_hash) => Ok(Json(TxReference {
            tx_id: id.to_string(),
            block_hash: block_hash.to_string(),
        })),
        None => Err(RpcError::NotFound(format!("no block references transaction {id}"))),
    }
}

// ── Address references ───────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct AddressTransactionsResponse {
    pub address: String,
    pub transactions: Vec<String>,
    #[serde(flatten)]
    pub page: PageMeta,
}

async fn address_transactions<F>(
    ctx: Arc<ExplorerContext>,
    address: String,
    list: ListParams,
    query: F,
) -> Result<Json<AddressTransactionsResponse>, RpcError>
where
    F: FnOnce(&IndexedStore, &Address, Order, Page) -> Result<Vec<TxId>, IndexError> + Send + 'static,
{
    let address: Address = parse("address", &address)?;
    let order = list.order();
    let page = list.page()?;

    let ids = blocking(&ctx.store, move |store| Ok(query(store, &address, order, page)?)).await?;

    Ok(Json(AddressTransactionsResponse {
        address: address.to_string(),
        page: PageMeta::new(page, ids.len()),
        transactions: ids.iter().map(TxId::to_string).collect(),
    }))
}

pub async fn signer_transactions(
    State(ctx): Ctx,
    Path(address): Path<String>,
    list: QueryParams<ListParams>,
) -> Result<Json<AddressTransactionsResponse>, RpcError> {
    let Query(list) = list?;
    address_transactions(ctx, address, list, |store, signer, order, page| {
        store.signer_references(signer, order, page)
    })
    .await
}

pub async fn updated_address_transactions(
    State(ctx): Ctx,
    Path(address): Path<String>,
    list: QueryParams<ListParams>,
) -> Result<Json<AddressTransactionsResponse>, RpcError> {
    let Query(list) = list?;
    address_transactions(ctx, address, list, |store, address, order, page| {
        store.updated_address_references(address, order, page)
    })
    .await
}
