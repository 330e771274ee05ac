//! Screen benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use vtpane::core::Screen;
use vtpane::Emulator;

fn bench_screen_print(c: &mut Criterion) {
    let mut group = c.benchmark_group("screen");

    // Measure printing characters
    let text = "Hello, World! ".repeat(100);
    group.throughput(Throughput::Elements(text.chars().count() as u64));

    group.bench_function("print_chars", |b| {
        b.iter(|| {
            let mut screen = Screen::new(80, 24, 1000);
            for c in text.chars() {
                screen.put_char(c);
            }
            black_box(screen)
        })
    });

    group.finish();
}

fn bench_screen_scroll(c: &mut Criterion) {
    let mut group = c.benchmark_group("screen");

    // Fill screen and scroll rows into history
    group.bench_function("scroll", |b| {
        b.iter(|| {
            let mut screen = Screen::new(80, 24, 1000);
            for i in 0..100 {
                for c in format!("Line {}: Some text content here", i).chars() {
                    screen.put_char(c);
                }
                screen.newline(true);
            }
            black_box(screen)
        })
    });

    // Bounded history at capacity evicts on every push
    group.bench_function("scroll_full_history", |b| {
        let mut screen = Screen::new(80, 24, 100);
        for _ in 0..200 {
            screen.newline(true);
        }
        b.iter(|| {
            screen.put_char('x');
            screen.newline(true);
        })
    });

    group.finish();
}

fn bench_emulator_csi(c: &mut Criterion) {
    let mut group = c.benchmark_group("screen");

    // Parse and apply CSI sequences
    let input = "\x1b[H\x1b[2J\x1b[1;31mHello\x1b[0m".repeat(100);
    group.throughput(Throughput::Bytes(input.len() as u64));

    group.bench_function("csi_apply", |b| {
        b.iter(|| {
            let mut emulator = Emulator::new(80, 24, 1000);
            emulator.process(black_box(input.as_bytes()));
            black_box(emulator)
        })
    });

    group.finish();
}

fn bench_screen_resize(c: &mut Criterion) {
    let mut group = c.benchmark_group("screen");

    group.bench_function("resize", |b| {
        b.iter(|| {
            let mut screen = Screen::new(80, 24, 1000);
            for _ in 0..20 {
                for c in "Hello, World!".chars() {
                    screen.put_char(c);
                }
                screen.newline(true);
            }
            // Resize multiple times
            screen.resize(120, 40);
            screen.resize(80, 24);
            screen.resize(132, 50);
            black_box(screen)
        })
    });

    group.finish();
}

fn bench_emulator_full_redraw(c: &mut Criterion) {
    let mut group = c.benchmark_group("screen");

    // Simulate a full screen redraw (like vim opening)
    let mut setup_input = String::new();
    for row in 1..=24 {
        setup_input.push_str(&format!("\x1b[{};1H", row));
        setup_input.push_str(&"X".repeat(80));
    }

    group.throughput(Throughput::Bytes(setup_input.len() as u64));

    group.bench_function("full_redraw", |b| {
        b.iter(|| {
            let mut emulator = Emulator::new(80, 24, 1000);
            emulator.process(setup_input.as_bytes());
            black_box(emulator)
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_screen_print,
    bench_screen_scroll,
    bench_emulator_csi,
    bench_screen_resize,
    bench_emulator_full_redraw
);

criterion_main!(benches);
