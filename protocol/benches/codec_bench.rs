// Codec and signing benchmarks for the Plasma transaction library.
//
// Covers RLP encoding and decoding at every input/output arity, the
// typed-data digest, secp256k1 signing and recovery, and the builder's
// input selection.

use alloy_primitives::{address, Address, B256, U256};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use plasma_protocol::config::{ChainConfig, ETH_CURRENCY};
use plasma_protocol::crypto::{recover_signer, LocalSigner};
use plasma_protocol::position::UtxoPosition;
use plasma_protocol::transaction::{
    decode, encode_signed, encode_unsigned, sign_transaction, DigestSigner, Input, Output,
    Payment, TransactionBody, TransactionBuilder, TypedDataHasher, Utxo,
};

const BOB: Address = address!("3272ee86d8192f59261960c9ae186063c8c9041f");
const ONE_ETH: u64 = 1_000_000_000_000_000_000;

fn signer() -> LocalSigner {
    let mut key = [0u8; 32];
    key[31] = 1;
    LocalSigner::from_bytes(&key).unwrap()
}

fn body(arity: usize) -> TransactionBody {
    let inputs = (0..arity as u64)
        .map(|b| Input::new(19_774_001 + b, 0, 0))
        .collect();
    let outputs = (0..arity as u64)
        .map(|i| Output::payment(BOB, ETH_CURRENCY, U256::from(ONE_ETH + i)))
        .collect();
    TransactionBody::payment(inputs, outputs, B256::repeat_byte(0x42)).unwrap()
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("rlp/encode_unsigned");
    for arity in 1..=4 {
        let body = body(arity);
        group.bench_with_input(BenchmarkId::from_parameter(arity), &body, |b, body| {
            b.iter(|| encode_unsigned(body));
        });
    }
    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let hasher = TypedDataHasher::new(&ChainConfig::default());
    let signer = signer();
    let mut group = c.benchmark_group("rlp/decode_signed");
    for arity in 1..=4 {
        let one: &dyn DigestSigner = &signer;
        let signers = vec![one; arity];
        let signed = sign_transaction(body(arity), &hasher, &signers).unwrap();
        let bytes = encode_signed(&signed).unwrap();
        group.throughput(Throughput::Bytes(bytes.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(arity), &bytes, |b, bytes| {
            b.iter(|| decode(bytes).unwrap());
        });
    }
    group.finish();
}

fn bench_signing_digest(c: &mut Criterion) {
    let hasher = TypedDataHasher::new(&ChainConfig::default());
    let body = body(4);
    c.bench_function("eip712/signing_digest", |b| {
        b.iter(|| hasher.signing_digest(&body));
    });
}

fn bench_sign_and_recover(c: &mut Criterion) {
    let signer = signer();
    let digest = B256::repeat_byte(0x5a);
    let signature = signer.sign(&digest);

    c.bench_function("secp256k1/sign_digest", |b| {
        b.iter(|| signer.sign(&digest));
    });
    c.bench_function("secp256k1/recover_signer", |b| {
        b.iter(|| recover_signer(&digest, &signature).unwrap());
    });
}

fn bench_builder(c: &mut Criterion) {
    let config = ChainConfig::default();
    let signer = signer();
    let wallet: Vec<Utxo> = (1..=64u64)
        .map(|b| {
            Utxo::new(
                UtxoPosition::deposit(b),
                signer.address(),
                ETH_CURRENCY,
                U256::from(b),
            )
        })
        .collect();

    c.bench_function("builder/select_from_64", |b| {
        b.iter(|| {
            TransactionBuilder::new(&config, signer.address())
                .utxos(wallet.iter().rev().cloned())
                .payment(Payment::new(BOB, ETH_CURRENCY, U256::from(200)))
                .build()
                .unwrap()
        });
    });
}

criterion_group!(
    benches,
    bench_encode,
    bench_decode,
    bench_signing_digest,
    bench_sign_and_recover,
    bench_builder,
);
criterion_main!(benches);
