//! Criterion benchmarks for SHADE crypto: keygen, scalar mul, ECDH, view tag, derivation.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use shade_core::curve;
use shade_core::types::KeyPair;
use shade_crypto::{
    derive_stealth_address, derive_stealth_private_key, derive_stealth_public_key,
    verify_view_tag, SharedSecret,
};

fn bench_keygen(c: &mut Criterion) {
    let mut rng = ChaCha20Rng::seed_from_u64(1);
    let mut g = c.benchmark_group("keygen");
    g.throughput(Throughput::Elements(1));
    g.bench_function("generate_keypair", |b| {
        b.iter(|| black_box(KeyPair::generate(&mut rng)).unwrap());
    });
    g.finish();
}

fn bench_scalar_mul(c: &mut Criterion) {
    let mut rng = ChaCha20Rng::seed_from_u64(2);
    let k = KeyPair::generate(&mut rng).unwrap();
    let p = KeyPair::generate(&mut rng).unwrap();
    let mut g = c.benchmark_group("scalar_mul");
    g.throughput(Throughput::Elements(1));
    g.bench_function("scalar_mul_base", |b| {
        b.iter(|| black_box(curve::scalar_mul_base(k.secret())));
    });
    g.bench_function("scalar_mul", |b| {
        b.iter(|| black_box(curve::scalar_mul(k.secret(), p.public().as_point())));
    });
    g.finish();
}

fn bench_view_tag(c: &mut Criterion) {
    let mut rng = ChaCha20Rng::seed_from_u64(3);
    let ephemeral = KeyPair::generate(&mut rng).unwrap();
    let view = KeyPair::generate(&mut rng).unwrap();
    let tag = SharedSecret::derive(ephemeral.secret(), view.public())
        .unwrap()
        .view_tag();

    let mut g = c.benchmark_group("view_tag");
    g.throughput(Throughput::Elements(1));
    g.bench_function("derive_and_verify", |b| {
        b.iter(|| {
            let shared = SharedSecret::derive(view.secret(), ephemeral.public()).unwrap();
            black_box(verify_view_tag(&shared, tag))
        });
    });
    g.finish();
}

fn bench_stealth_derivation(c: &mut Criterion) {
    let mut rng = ChaCha20Rng::seed_from_u64(4);
    let spend = KeyPair::generate(&mut rng).unwrap();
    let ephemeral = KeyPair::generate(&mut rng).unwrap();
    let view = KeyPair::generate(&mut rng).unwrap();
    let sh = SharedSecret::derive(ephemeral.secret(), view.public())
        .unwrap()
        .to_scalar()
        .unwrap();

    let mut g = c.benchmark_group("stealth_derivation");
    g.throughput(Throughput::Elements(1));
    g.bench_function("derive_stealth_address", |b| {
        b.iter(|| {
            let pk = derive_stealth_public_key(spend.public(), &sh).unwrap();
            black_box(derive_stealth_address(&pk))
        });
    });
    g.bench_function("derive_stealth_private_key", |b| {
        b.iter(|| black_box(derive_stealth_private_key(spend.secret(), &sh)).unwrap());
    });
    g.finish();
}

criterion_group!(
    benches,
    bench_keygen,
    bench_scalar_mul,
    bench_view_tag,
    bench_stealth_derivation
);
criterion_main!(benches);
