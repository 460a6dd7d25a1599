//! Benchmarks for the match engine.
//!
//! Round resolution and command parsing are the per-turn hot path.

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use lanewar::game::{Command, FixedCrits, Lobby, SeededCrits};
use lanewar::{Catalog, Session};

fn session(seed: u64) -> Session {
    let mut lobby = Lobby::new();
    lobby.join("alice", 500).unwrap();
    lobby.join("bob", 500).unwrap();
    lobby.start(Catalog::builtin(), SeededCrits::new(seed)).unwrap()
}

fn bench_round_resolution(c: &mut Criterion) {
    c.bench_function("round_pawn_trade", |b| {
        b.iter(|| {
            let mut lobby = Lobby::new();
            lobby.join("alice", 0).unwrap();
            lobby.join("bob", 0).unwrap();
            let mut s = lobby.start(Catalog::builtin(), FixedCrits(false)).unwrap();
            s.submit(0, black_box("summon Pawn guard 1 attack")).unwrap();
            let round = s.submit(1, black_box("summon Pawn guard 1 defend")).unwrap();
            black_box(round)
        });
    });
}

fn bench_full_match(c: &mut Criterion) {
    // Both sides keep feeding guard 1 until mana runs dry, then pass.
    c.bench_function("match_100_rounds", |b| {
        b.iter(|| {
            let mut s = session(black_box(42));
            for _ in 0..100 {
                if s.is_over() {
                    break;
                }
                for _ in 0..2 {
                    let seat = s.current_turn();
                    if s.submit(seat, "summon Knight guard 1 attack").is_err() {
                        let _ = s.submit(seat, "end");
                    }
                }
            }
            black_box(s.rounds())
        });
    });
}

fn bench_command_parse(c: &mut Criterion) {
    let inputs = [
        "summon Pawn guard 1 attack",
        "SUMMON queen KING 0 defend",
        "end",
        "summon Rook guard x attack",
        "attack now",
    ];

    c.bench_function("command_parse", |b| {
        b.iter(|| {
            for input in &inputs {
                let _ = black_box(Command::parse(black_box(input)));
            }
        });
    });
}

criterion_group!(
    benches,
    bench_round_resolution,
    bench_full_match,
    bench_command_parse
);
criterion_main!(benches);
