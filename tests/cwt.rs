//! Tests for Status List Tokens in CWT format.

use ciborium::Value;
use coset::{CoseSign1, TaggedCborSerializable};
use rstest::rstest;
use test_utils::keystore::{IssuerKeystore, ISSUER_KID};
use test_utils::sample::{self, ISSUED_AT, STATUS_LIST_URI};
use token_status_list::cwt::{self, PayloadOptions};
use token_status_list::error::Err;
use token_status_list::BitsPerStatus;

fn options() -> PayloadOptions {
    PayloadOptions {
        exp: Some(2_000_000),
        ttl: Some(3600),
        aggregation_uri: None,
    }
}

fn to_vec(value: &Value) -> Vec<u8> {
    let mut buf = Vec::new();
    ciborium::into_writer(value, &mut buf).expect("should encode");
    buf
}

// Re-key a map's integer labels as decimal strings, as an encoder working from
// a plain keyed structure would.
fn stringify_labels(value: Value) -> Value {
    let Value::Map(entries) = value else {
        return value;
    };
    Value::Map(
        entries
            .into_iter()
            .map(|(k, v)| {
                let k = match k {
                    Value::Integer(i) => Value::Text(i128::from(i).to_string()),
                    other => other,
                };
                (k, stringify_labels(v))
            })
            .collect(),
    )
}

#[rstest]
#[case::one_bit(BitsPerStatus::One)]
#[case::two_bits(BitsPerStatus::Two)]
#[case::four_bits(BitsPerStatus::Four)]
#[case::eight_bits(BitsPerStatus::Eight)]
fn payload_round_trip(#[case] bits: BitsPerStatus) {
    test_utils::init_tracer();

    let list = sample::random_list(100, bits);
    let cbor = cwt::encode_cwt_payload(&list, "https://ex/1", 1_000_000, &options())
        .expect("should encode");

    let labelled: Value = ciborium::from_reader(cbor.as_slice()).expect("should decode");
    let named = stringify_labels(labelled.clone());

    for bytes in [cbor.clone(), to_vec(&labelled), to_vec(&named)] {
        let decoded = cwt::decode_cwt_payload(&bytes).expect("should decode");

        assert_eq!(decoded.subject, "https://ex/1");
        assert_eq!(decoded.issued_at, 1_000_000);
        assert_eq!(decoded.exp, Some(2_000_000));
        assert_eq!(decoded.ttl, Some(3600));
        assert_eq!(decoded.aggregation_uri, None);
        for i in 0..list.len() {
            assert_eq!(decoded.status_list.get_status(i).ok(), list.get_status(i).ok());
        }
    }
}

#[test]
fn aggregation_uri() {
    let list = sample::random_list(16, BitsPerStatus::One);
    let options = PayloadOptions {
        aggregation_uri: Some("https://example.com/statuslists".into()),
        ..PayloadOptions::default()
    };
    let cbor = cwt::encode_cwt_payload(&list, STATUS_LIST_URI, ISSUED_AT, &options)
        .expect("should encode");

    let decoded = cwt::decode_cwt_payload(&cbor).expect("should decode");
    assert_eq!(decoded.aggregation_uri.as_deref(), Some("https://example.com/statuslists"));
    assert_eq!(decoded.exp, None);
    assert_eq!(decoded.ttl, None);
}

#[test]
fn status_claim_round_trip() {
    let cbor = cwt::encode_cwt_status_claim(42, "https://ex/1").expect("should encode");
    let entry = cwt::decode_cwt_status_claim(&cbor).expect("should decode");
    assert_eq!(entry.idx, 42);
    assert_eq!(entry.uri, "https://ex/1");

    // produced independently, nested under 65535
    let claim = cwt::create_cwt_status_claim(42, "https://ex/1");
    let claims = Value::Map(vec![(Value::Integer(cwt::claim_key::STATUS.into()), claim.to_value())]);
    for bytes in [to_vec(&claims), to_vec(&stringify_labels(claims.clone()))] {
        let entry = cwt::get_status_list_from_cwt(&bytes).expect("should decode");
        assert_eq!(entry.idx, 42);
        assert_eq!(entry.uri, "https://ex/1");
    }
}

#[test]
fn missing_status_claim() {
    let list = sample::random_list(8, BitsPerStatus::One);
    let cbor = cwt::encode_cwt_payload(&list, STATUS_LIST_URI, ISSUED_AT, &options())
        .expect("should encode");

    let err = cwt::get_status_list_from_cwt(&cbor).expect_err("should fail");
    assert!(matches!(err.code(), Err::NotFound));
    assert_eq!(err.to_string(), "No status claim found in CWT payload");
}

#[tokio::test]
async fn signed_token() {
    test_utils::init_tracer();

    let keystore = IssuerKeystore::new();
    let list = sample::random_list(1024, BitsPerStatus::Two);
    let token = cwt::issue(&list, STATUS_LIST_URI, ISSUED_AT, &options(), &keystore)
        .await
        .expect("should issue");

    let cose_sign_1 = CoseSign1::from_tagged_slice(&token).expect("should parse");
    assert_eq!(cose_sign_1.protected.header.key_id, ISSUER_KID.as_bytes().to_vec());

    let payload = cwt::verify(&token, &keystore.verifier()).await.expect("should verify");
    let decoded = cwt::get_list_from_status_list_cwt(&payload).expect("should decode");
    for i in 0..list.len() {
        assert_eq!(decoded.get_status(i).ok(), list.get_status(i).ok());
    }

    let other = IssuerKeystore::generate().verifier();
    let err = cwt::verify(&token, &other).await.expect_err("should fail");
    assert!(matches!(err.code(), Err::Signature(_)));
}
