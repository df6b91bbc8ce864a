//! Performance benchmarks for the slowmedown transforms
//!
//! Run with: cargo bench -p slowmedown-dsp --bench stretch_benchmark

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use slowmedown_dsp::filter::butter_bandpass;
use slowmedown_dsp::{enhance, widen, PhaseVocoder, Pipeline, PipelineConfig, Signal};
use std::f32::consts::PI;

/// Generate a test signal (440 Hz sine wave)
fn generate_test_signal(sample_rate: u32, duration_secs: f32) -> Vec<f32> {
    let num_samples = (sample_rate as f32 * duration_secs) as usize;
    (0..num_samples)
        .map(|i| 0.8 * (2.0 * PI * 440.0 * i as f32 / sample_rate as f32).sin())
        .collect()
}

fn bench_stretch_factors(c: &mut Criterion) {
    let mut group = c.benchmark_group("stretch");
    let sample_rate = 22_050;
    let input = generate_test_signal(sample_rate, 5.0);
    group.throughput(Throughput::Elements(input.len() as u64));

    for factor in [0.5f32, 0.75, 1.0, 1.5, 2.0] {
        let vocoder = PhaseVocoder::new(factor).unwrap();
        group.bench_with_input(BenchmarkId::new("factor", factor), &input, |b, input| {
            b.iter(|| black_box(vocoder.process(black_box(input)).unwrap()));
        });
    }

    group.finish();
}

fn bench_effects(c: &mut Criterion) {
    let mut group = c.benchmark_group("effects");
    let sample_rate = 22_050;
    let input = generate_test_signal(sample_rate, 5.0);
    let signal = Signal::mono(input.clone(), sample_rate).unwrap();
    group.throughput(Throughput::Elements(input.len() as u64));

    group.bench_function("enhance", |b| {
        b.iter(|| black_box(enhance(black_box(&input), sample_rate).unwrap()));
    });
    group.bench_function("widen", |b| {
        b.iter(|| black_box(widen(black_box(&signal)).unwrap()));
    });

    group.finish();
}

fn bench_filter_design(c: &mut Criterion) {
    c.bench_function("butter_bandpass_design", |b| {
        b.iter(|| black_box(butter_bandpass(60.0, 5000.0, black_box(4), 22_050).unwrap()));
    });
}

fn bench_full_pipeline(c: &mut Criterion) {
    let sample_rate = 22_050;
    let signal = Signal::mono(generate_test_signal(sample_rate, 5.0), sample_rate).unwrap();
    let pipeline = Pipeline::new(PipelineConfig {
        speed: 0.75,
        enhance: true,
        stereo: true,
        ..Default::default()
    })
    .unwrap();

    c.bench_function("pipeline_full", |b| {
        b.iter(|| black_box(pipeline.run(black_box(&signal)).unwrap()));
    });
}

criterion_group!(
    benches,
    bench_stretch_factors,
    bench_effects,
    bench_filter_design,
    bench_full_pipeline
);
criterion_main!(benches);
