//! End-to-end behaviour of the indexed store over in-memory backends.

use std::sync::Arc;

use explorer_index::{IndexedStore, Order, Page};
use explorer_nullables::{NullBaseStore, NullDocumentStore};
use explorer_types::{Address, Block, BlockHash, ChainId, Transaction, TxId};

fn indexed_store() -> IndexedStore {
    IndexedStore::new(
        Arc::new(NullBaseStore::new()),
        Arc::new(NullDocumentStore::new()),
    )
}

fn block(hash: u8, height: u64, transactions: Vec<Transaction>) -> Block {
    Block {
        hash: BlockHash::new([hash; 32]),
        height,
        chain_id: ChainId::from_bytes([7; 16]),
        transactions,
    }
}

#[test]
fn two_blocks_same_signer() {
    let store = indexed_store();
    let signer = Address::new([0x5e; 20]);
    let touched = Address::new([0xaa; 20]);
    let t1 = Transaction::new(TxId::new([1; 32]), 0, signer, [touched]);
    let t2 = Transaction::new(TxId::new([2; 32]), 1, signer, [touched]);
    let b1 = block(0xb1, 1, vec![t1.clone()]);
    let b2 = block(0xb2, 2, vec![t2.clone()]);

    store.put_block(&b1).unwrap();
    store.put_block(&b2).unwrap();

    assert_eq!(store.block_of(&t1.id).unwrap(), Some(b1.hash));
    assert_eq!(store.block_of(&t2.id).unwrap(), Some(b2.hash));
    assert_eq!(
        store.signer_references(&signer, Order::Ascending, Page::ALL).unwrap(),
        vec![t1.id, t2.id]
    );
    assert_eq!(
        store.signer_references(&signer, Order::Descending, Page::ALL).unwrap(),
        vec![t2.id, t1.id]
    );
    assert_eq!(
        store
            .updated_address_references(&touched, Order::Ascending, Page::ALL)
            .unwrap(),
        vec![t1.id, t2.id]
    );
    assert_eq!(
        store.tx_references(None, Order::Ascending, Page::ALL).unwrap(),
        vec![(t1.id, b1.hash), (t2.id, b2.hash)]
    );
}

#[test]
fn signer_is_referenced_exactly_once() {
    let store = indexed_store();
    let signer = Address::new([0x01; 20]);
    let tx = Transaction::new(TxId::new([3; 32]), 4, signer, [signer]);
    store.put_transaction(&tx).unwrap();
    store.put_block(&block(0x10, 10, vec![tx.clone()])).unwrap();

    let refs = store
        .signer_references(&signer, Order::Ascending, Page::ALL)
        .unwrap();
    assert_eq!(refs, vec![tx.id]);
    assert_eq!(store.index_counts().unwrap().signer_references, 1);
}

#[test]
fn transaction_moved_to_a_later_block() {
    let store = indexed_store();
    let tx = Transaction::new(TxId::new([9; 32]), 0, Address::new([2; 20]), []);
    let b1 = block(0x01, 5, vec![tx.clone()]);
    let b2 = block(0x02, 6, vec![tx.clone()]);

    store.put_block(&b1).unwrap();
    store.put_block(&b2).unwrap();

    assert_eq!(store.block_of(&tx.id).unwrap(), Some(b2.hash));
    assert_eq!(store.index_counts().unwrap().tx_references, 1);
}

#[test]
fn mixed_case_addresses_resolve_to_one_entry() {
    let store = indexed_store();
    let upper: Address = "0xABCDEFABCDEFABCDEFABCDEFABCDEFABCDEFABCD".parse().unwrap();
    let tx = Transaction::new(TxId::new([4; 32]), 0, Address::new([1; 20]), [upper]);
    store.put_transaction(&tx).unwrap();

    for casing in [
        "0xabcdefabcdefabcdefabcdefabcdefabcdefabcd",
        "0xAbCdEfAbCdEfAbCdEfAbCdEfAbCdEfAbCdEfAbCd",
        "ABCDEFABCDEFABCDEFABCDEFABCDEFABCDEFABCD",
    ] {
        let address: Address = casing.parse().unwrap();
        assert_eq!(
            store
                .updated_address_references(&address, Order::Ascending, Page::ALL)
                .unwrap(),
            vec![tx.id],
            "lookup via {casing}"
        );
    }
}

#[test]
fn rebuild_restores_a_wiped_index() {
    let base = Arc::new(NullBaseStore::new());
    let first = IndexedStore::new(base.clone(), Arc::new(NullDocumentStore::new()));
    let signer = Address::new([0x33; 20]);
    let t1 = Transaction::new(TxId::new([1; 32]), 0, signer, [signer]);
    let t2 = Transaction::new(TxId::new([2; 32]), 1, signer, []);
    first.put_block(&block(0x01, 1, vec![t1.clone()])).unwrap();
    first.put_transaction(&t2).unwrap();

    let fresh = IndexedStore::new(base, Arc::new(NullDocumentStore::new()));
    assert!(fresh
        .signer_references(&signer, Order::Ascending, Page::ALL)
        .unwrap()
        .is_empty());

    let report = fresh.rebuild().unwrap();
    assert_eq!(report.blocks, 1);
    assert_eq!(report.transactions, 2);
    assert_eq!(
        fresh.index_counts().unwrap(),
        first.index_counts().unwrap()
    );
    assert_eq!(
        fresh.signer_references(&signer, Order::Ascending, Page::ALL).unwrap(),
        vec![t1.id, t2.id]
    );
}

#[test]
fn read_failure_does_not_poison_later_queries() {
    let docs = Arc::new(NullDocumentStore::new());
    let store = IndexedStore::new(Arc::new(NullBaseStore::new()), docs.clone());
    let tx = Transaction::new(TxId::new([1; 32]), 0, Address::new([1; 20]), []);
    store.put_transaction(&tx).unwrap();

    docs.set_fail_reads(true);
    assert!(store
        .signer_references(&tx.signer, Order::Ascending, Page::ALL)
        .is_err());
    docs.set_fail_reads(false);
    assert_eq!(
        store
            .signer_references(&tx.signer, Order::Ascending, Page::ALL)
            .unwrap(),
        vec![tx.id]
    );
}
