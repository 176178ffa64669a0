use relay_core::{
    construct_from_tags, hash_tx, sign_tx_with_key, transform,
    hash::bytes_to_hex_str,
    signer::{parse_public_key, BcsCodec, JsonCodec},
    tags::{find_tag, QCP_HASH},
    verify, CrossChainTx, RelayEvent,
};

const PRIVATE_KEY: &str = "a328891040aa18a9fea8baf6ad2b1502391969324258ec8562163adf4e138eb83e0dbd63b60f3521e8dfd13d533b901aaadaedf345b26d400a0fd5fd65c24f7bf66cbfef81";
const PUBLIC_KEY: &str = "1624de64200f3521e8dfd13d533b901aaadaedf345b26d400a0fd5fd65c24f7bf66cbfef81";

fn hash_tag(event: &RelayEvent) -> String {
    let value = find_tag(&event.tags, QCP_HASH).expect("hash tag");
    String::from_utf8(value.to_vec()).expect("utf8 hash tag")
}

fn hash_hex(tx: &CrossChainTx) -> String {
    bytes_to_hex_str(&hash_tx(tx))
}

#[test]
fn transform_and_reconstruct() {
    let tx = CrossChainTx::new("abc", "xyz", 1, 99);
    let event = transform(&tx).unwrap();

    assert_eq!(tx.block_height, event.height);
    assert_eq!(tx.tx_index, event.index as i64);

    let ca = construct_from_tags(&event.tags).unwrap();
    assert_eq!(ca.from, tx.from);
    assert_eq!(ca.to, tx.to);
    assert_eq!(ca.sequence, tx.sequence);
    assert!(verify(&tx, &ca.hash));
}

#[test]
fn hash_tag_matches_independent_hash() {
    let event = transform(&CrossChainTx::new("abc", "xyz", 1, 99)).unwrap();
    let other = CrossChainTx::new("abc", "xyz", 1, 99);
    assert_eq!(hash_tag(&event), hash_hex(&other));
}

#[test]
fn hash_tag_detects_field_changes() {
    let event = transform(&CrossChainTx::new("abc", "xyz", 1, 99)).unwrap();
    let h1 = hash_tag(&event);

    let changed = [
        CrossChainTx::new("abc", "xyz", 1, 2),
        CrossChainTx::new("abcd", "xyz", 1, 99),
        CrossChainTx::new("abc", "axyz", 1, 99),
        CrossChainTx::new("abc", "xyz", 11, 99),
    ];
    for tx in &changed {
        assert_ne!(h1, hash_hex(tx), "{:?}", tx);
    }

    let reindexed = CrossChainTx::new("abc", "xyz", 1, 99).with_index(42);
    assert_eq!(h1, hash_hex(&reindexed));
}

#[test]
fn sign_with_known_key() {
    let mut tx = CrossChainTx::new("abc", "xyz", 1, 99);
    sign_tx_with_key(&mut tx, PRIVATE_KEY, &BcsCodec).unwrap();

    let expected = parse_public_key(&hex::decode(PUBLIC_KEY).unwrap()).unwrap();
    let embedded = parse_public_key(&tx.signature.as_ref().unwrap().pubkey).unwrap();
    assert_eq!(embedded, expected);

    let mut again = CrossChainTx::new("qsc", "qos", 7, 3);
    sign_tx_with_key(&mut again, PRIVATE_KEY, &JsonCodec).unwrap();
    assert_eq!(
        again.signature.unwrap().pubkey,
        tx.signature.unwrap().pubkey
    );
}

#[test]
fn event_serializes_for_transport() {
    let tx = CrossChainTx::new("abc", "xyz", 1, 99);
    let event = transform(&tx).unwrap();
    let wire = serde_json::to_string(&event).unwrap();
    let received: RelayEvent = serde_json::from_str(&wire).unwrap();
    assert_eq!(received, event);
}
