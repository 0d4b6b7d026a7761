//! Benchmarks for the CPU simulation core.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::{Vec2, Vec3};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use pyro::audio::ExplosionSynth;
use pyro::{Color, Emitter, HeadlessRenderer, Palette, Particle, Registry};

fn bench_emit(c: &mut Criterion) {
    let mut group = c.benchmark_group("emit");
    let colors = Palette::classic().active_colors();

    for count in [100u32, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::new("circle", count), &count, |b, &count| {
            let mut rng = SmallRng::seed_from_u64(1);
            let emitter = Emitter::canvas();
            b.iter(|| {
                let batch: Vec<Particle<Vec2>> = emitter.emit_count(Vec2::ZERO, &colors, count, &mut rng);
                black_box(batch)
            })
        });

        group.bench_with_input(BenchmarkId::new("sphere", count), &count, |b, &count| {
            let mut rng = SmallRng::seed_from_u64(1);
            let emitter = Emitter::scene();
            b.iter(|| {
                let batch: Vec<Particle<Vec3>> = emitter.emit_count(Vec3::ZERO, &colors, count, &mut rng);
                black_box(batch)
            })
        });
    }

    group.finish();
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick");

    for count in [1_000u32, 10_000, 100_000] {
        group.bench_with_input(BenchmarkId::new("tick_and_render", count), &count, |b, &count| {
            let mut rng = SmallRng::seed_from_u64(2);
            // Long lifespans so nothing dies mid-measurement
            let emitter = Emitter::scene().with_max_life(1.0e9..2.0e9);
            let mut registry = Registry::new();
            let mut renderer = HeadlessRenderer::with_handles();
            let mut batch = emitter.emit_count(Vec3::ZERO, &[Color::WHITE], count, &mut rng);
            for p in &mut batch {
                if let Some(handle) = pyro::RenderAdapter::<Vec3>::acquire(&mut renderer, &p.visual_state()) {
                    p.attach(handle);
                }
            }
            registry.insert(batch);

            b.iter(|| {
                let report = registry.tick(&mut renderer);
                registry.render(&mut renderer);
                black_box(report)
            });

            registry.clear(&mut renderer);
        });
    }

    group.bench_function("burst_to_empty", |b| {
        let mut rng = SmallRng::seed_from_u64(3);
        let emitter = Emitter::canvas().with_count(100..=100);
        let mut renderer = HeadlessRenderer::new();
        b.iter(|| {
            let mut registry = Registry::new();
            registry.insert(emitter.emit::<Vec2, _>(Vec2::ZERO, &[Color::WHITE], &mut rng));
            let mut ticks = 0u32;
            while !registry.is_empty() {
                registry.tick(&mut renderer);
                ticks += 1;
            }
            black_box(ticks)
        })
    });

    group.finish();
}

fn bench_audio(c: &mut Criterion) {
    c.bench_function("explosion_synth", |b| {
        let synth = ExplosionSynth::default();
        let mut rng = SmallRng::seed_from_u64(4);
        b.iter(|| black_box(synth.render(&mut rng)))
    });
}

criterion_group!(benches, bench_emit, bench_tick, bench_audio);
criterion_main!(benches);
