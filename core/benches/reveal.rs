use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use sweeper_core::*;

fn bench_first_reveal(c: &mut Criterion) {
    let mut group = c.benchmark_group("first_reveal");

    for difficulty in [
        Difficulty::Beginner,
        Difficulty::Intermediate,
        Difficulty::Expert,
    ] {
        let config = DifficultyProfile::preset(difficulty).config;
        let center = (config.rows() / 2, config.cols() / 2);
        group.bench_with_input(
            BenchmarkId::from_parameter(difficulty),
            &config,
            |b, &config| {
                let mut seed = 0u64;
                b.iter(|| {
                    seed += 1;
                    let mut game = Game::new(config, seed);
                    black_box(game.reveal(black_box(center)))
                })
            },
        );
    }

    group.finish();
}

fn bench_flood_fill(c: &mut Criterion) {
    // mine-free except for one corner, so a single reveal floods nearly everything
    let layout = MineLayout::from_mine_coords((255, 255), &[(254, 254)]).unwrap();

    c.bench_function("flood_fill_255x255", |b| {
        b.iter(|| {
            let mut game = Game::with_layout(layout.clone());
            black_box(game.reveal((0, 0)))
        })
    });
}

criterion_group!(benches, bench_first_reveal, bench_flood_fill);
criterion_main!(benches);
