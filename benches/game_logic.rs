use criterion::{black_box, criterion_group, criterion_main, Criterion};
use bloccs::core::{Field, GameState};
use bloccs::types::{Command, PieceKind};

fn bench_tick(c: &mut Criterion) {
    let mut state = GameState::new(10, 20, 1.0, 12345);
    state.update(10);

    c.bench_function("game_tick_10ms", |b| {
        b.iter(|| {
            if state.is_over() {
                state = GameState::new(10, 20, 1.0, 12345);
            }
            state.update(black_box(10));
            state.drain_events();
        })
    });
}

fn bench_line_clear(c: &mut Criterion) {
    c.bench_function("clear_4_lines", |b| {
        b.iter(|| {
            let mut field = Field::new(10, 20);
            // Fill bottom 4 rows
            for y in 16..20 {
                for x in 0..10 {
                    field.set(x, y, Some(PieceKind::I));
                }
            }
            field.clear_full_rows()
        })
    });
}

fn bench_advance_next(c: &mut Criterion) {
    let mut state = GameState::new(10, 20, 1.0, 12345);

    c.bench_function("advance_next", |b| {
        b.iter(|| {
            state.advance_next();
            state.drain_events();
        })
    });
}

fn bench_move(c: &mut Criterion) {
    let mut state = GameState::new(10, 20, 1.0, 12345);
    state.update(10);

    c.bench_function("move_piece", |b| {
        b.iter(|| {
            state.move_piece(0, black_box(1), 0);
            state.move_piece(0, black_box(-1), 0);
            state.drain_events();
        })
    });
}

fn bench_hard_lock(c: &mut Criterion) {
    c.bench_function("hard_lock_and_lock", |b| {
        let mut state = GameState::new(10, 20, 1.0, 12345);
        state.update(10);
        b.iter(|| {
            if state.is_over() {
                state = GameState::new(10, 20, 1.0, 12345);
                state.update(10);
            }
            state.apply(Command::HardLock);
            state.update(black_box(10));
            state.drain_events();
        })
    });
}

criterion_group!(
    benches,
    bench_tick,
    bench_line_clear,
    bench_advance_next,
    bench_move,
    bench_hard_lock
);
criterion_main!(benches);
