use clicker_core::{Catalog, TICK_SECONDS};
use clicker_runtime::{DebugCommand, Game};
use criterion::{criterion_group, criterion_main, Criterion};
use persistence::MemoryStore;

fn bench_ticks(c: &mut Criterion) {
    let mut game = Game::open(Catalog::standard(), MemoryStore::new());
    let _ = game.run_debug(DebugCommand::MaxAll(10));
    c.bench_function("tick_with_save", |b| {
        b.iter(|| {
            let _ = game.advance(TICK_SECONDS);
        })
    });
}

fn bench_purchases(c: &mut Criterion) {
    let catalog = Catalog::standard();
    c.bench_function("purchase_round", |b| {
        b.iter(|| {
            let mut state = clicker_core::EconomyState::new(&catalog);
            state.balance = 1e9;
            for def in catalog.iter() {
                let _ = clicker_econ::purchase(&mut state, &catalog, def.id.as_str());
            }
            state
        })
    });
}

criterion_group!(benches, bench_ticks, bench_purchases);
criterion_main!(benches);
