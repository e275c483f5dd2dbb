//! Router behaviour, driven in-process through `tower::ServiceExt`.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use explorer_index::IndexedStore;
use explorer_nullables::{NullBaseStore, NullDocumentStore};
use explorer_rpc::{router, ExplorerContext};
use explorer_types::{Address, Block, BlockHash, ChainId, Transaction, TxId};

const SIGNER: [u8; 20] = [0x5e; 20];
const TOUCHED: [u8; 20] = [0xab; 20];

struct Fixture {
    app: Router,
    docs: Arc<NullDocumentStore>,
    t1: TxId,
    t2: TxId,
    b1: BlockHash,
    b2: BlockHash,
}

fn fixture() -> Fixture {
    let docs = Arc::new(NullDocumentStore::new());
    let store = IndexedStore::new(Arc::new(NullBaseStore::new()), docs.clone());
    let chain_id = ChainId::from_bytes([1; 16]);
    let signer = Address::new(SIGNER);
    let touched = Address::new(TOUCHED);

    let t1 = Transaction::new(TxId::new([1; 32]), 0, signer, [touched]);
    let t2 = Transaction::new(TxId::new([2; 32]), 1, signer, [touched]);
    let b1 = Block {
        hash: BlockHash::new([0xb1; 32]),
        height: 1,
        chain_id,
        transactions: vec![t1.clone()],
    };
    let b2 = Block {
        hash: BlockHash::new([0xb2; 32]),
        height: 2,
        chain_id,
        transactions: vec![t2.clone()],
    };
    store.put_block(&b1).unwrap();
    store.put_block(&b2).unwrap();

    let ctx = Arc::new(ExplorerContext::new(Arc::new(store), chain_id));
    Fixture {
        app: router(ctx),
        docs,
        t1: t1.id,
        t2: t2.id,
        b1: b1.hash,
        b2: b2.hash,
    }
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn strings(value: &Value) -> Vec<String> {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn chain_reports_counts() {
    let f = fixture();
    let (status, body) = get(&f.app, "/chain").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["block_count"], 2);
    assert_eq!(body["tx_references"], 2);
    assert_eq!(body["signer_references"], 2);
    assert_eq!(body["chain_id"], ChainId::from_bytes([1; 16]).to_string());
}

#[tokio::test]
async fn signer_transactions_in_both_orders() {
    let f = fixture();
    let signer = Address::new(SIGNER);

    let (status, body) = get(&f.app, &format!("/signers/{signer}/transactions")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(strings(&body["transactions"]), vec![f.t1.to_string(), f.t2.to_string()]);

    let (_, body) = get(&f.app, &format!("/signers/{signer}/transactions?desc=true")).await;
    assert_eq!(strings(&body["transactions"]), vec![f.t2.to_string(), f.t1.to_string()]);
}

#[tokio::test]
async fn address_lookup_ignores_case() {
    let f = fixture();
    let upper = format!("0x{}", hex_upper(&TOUCHED));
    let (status, body) = get(&f.app, &format!("/addresses/{upper}/transactions")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(strings(&body["transactions"]), vec![f.t1.to_string(), f.t2.to_string()]);
    assert_eq!(body["address"], Address::new(TOUCHED).to_string());
}

fn hex_upper(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02X}")).collect()
}

#[tokio::test]
async fn tx_references_page_and_filter() {
    let f = fixture();

    let (status, body) = get(&f.app, "/tx-references?desc=true&limit=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["references"][0]["tx_id"], f.t2.to_string());
    assert_eq!(body["references"][0]["block_hash"], f.b2.to_string());
    assert_eq!(body["next_offset"], 1);

    let (_, body) = get(&f.app, &format!("/tx-references?tx_id={}", f.t1)).await;
    assert_eq!(body["references"].as_array().unwrap().len(), 1);
    assert_eq!(body["references"][0]["block_hash"], f.b1.to_string());
    assert!(body.get("next_offset").is_none());
}

#[tokio::test]
async fn block_of_transaction() {
    let f = fixture();
    let (status, body) = get(&f.app, &format!("/transactions/{}/block", f.t2)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["block_hash"], f.b2.to_string());

    let unknown = TxId::new([0x77; 32]);
    let (status, _) = get(&f.app, &format!("/transactions/{unknown}/block")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn bad_input_is_rejected() {
    let f = fixture();
    let signer = Address::new(SIGNER);

    let (status, body) = get(&f.app, &format!("/signers/{signer}/transactions?offset=-1")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("offset"));

    let (status, _) = get(&f.app, &format!("/signers/{signer}/transactions?limit=-5")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(&f.app, "/signers/0x1234/transactions").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(&f.app, "/transactions/not-hex/block").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_query_strings_get_json_errors() {
    let f = fixture();
    let signer = Address::new(SIGNER);

    for uri in [
        format!("/signers/{signer}/transactions?offset=abc"),
        format!("/addresses/{signer}/transactions?desc=1"),
        "/tx-references?limit=ten".to_string(),
    ] {
        let (status, body) = get(&f.app, &uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(body["error"].is_string(), "{uri}: {body}");
    }
}

#[tokio::test]
async fn storage_failure_fails_only_that_request() {
    let f = fixture();
    let signer = Address::new(SIGNER);

    f.docs.set_fail_reads(true);
    let (status, body) = get(&f.app, &format!("/signers/{signer}/transactions")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());

    f.docs.set_fail_reads(false);
    let (status, _) = get(&f.app, &format!("/signers/{signer}/transactions")).await;
    assert_eq!(status, StatusCode::OK);
}
