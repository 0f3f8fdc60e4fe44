use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use legroast::{Algorithm, LegRoast};
use rand::rngs::OsRng;
use rand::RngCore;

fn keygen_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("legroast_keygen");
    group.sample_size(10);

    for alg in [Algorithm::LegendreMiddle, Algorithm::PowerMiddle] {
        group.bench_with_input(BenchmarkId::from_parameter(alg), &alg, |b, &alg| {
            let mut seed = [0u8; 16];
            OsRng.fill_bytes(&mut seed);
            b.iter(|| {
                let mut scheme = LegRoast::new(alg);
                scheme.keygen(Some(black_box(&seed))).unwrap();
            });
        });
    }
    group.finish();
}

fn sign_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("legroast_sign");
    group.sample_size(10);

    for alg in Algorithm::ALL {
        group.bench_with_input(BenchmarkId::from_parameter(alg), &alg, |b, &alg| {
            let mut scheme = LegRoast::new(alg);
            scheme.keygen(None).unwrap();
            let mut message = [0u8; 64];
            OsRng.fill_bytes(&mut message);
            b.iter(|| scheme.sign(black_box(&message)).unwrap());
        });
    }
    group.finish();
}

fn verify_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("legroast_verify");
    group.sample_size(10);

    for alg in Algorithm::ALL {
        group.bench_with_input(BenchmarkId::from_parameter(alg), &alg, |b, &alg| {
            let mut scheme = LegRoast::new(alg);
            scheme.keygen(None).unwrap();
            let mut message = [0u8; 64];
            OsRng.fill_bytes(&mut message);
            let signature = scheme.sign(&message).unwrap();
            b.iter(|| {
                scheme
                    .verify(black_box(&message), black_box(&signature))
                    .unwrap()
            });
        });
    }
    group.finish();
}

criterion_group!(benches, keygen_benchmarks, sign_benchmarks, verify_benchmarks);
criterion_main!(benches);
