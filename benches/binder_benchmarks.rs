//! Performance benchmarks for binding Magpie programs.
//!
//! Programs are built in memory with `AstBuilder`, so the numbers cover
//! registration and binding only:
//! - Call chains: many small functions resolved and bound on demand
//! - Deep expressions: one function with a large operator tree
//! - Generics: many instances of one template
//!
//! ## Profiling with Puffin
//!
//! Run with the `profile-with-puffin` feature to collect per-phase timings:
//!
//! ```bash
//! cargo bench --features profile-with-puffin -- --profile-time 5
//! ```

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use magpie::{AstBuilder, Bump, Expr, FunctionDecl, TypeExpr, Unit};
use std::hint::black_box;

#[cfg(feature = "profile-with-puffin")]
static FRAME_VIEW: std::sync::OnceLock<puffin::GlobalFrameView> = std::sync::OnceLock::new();

#[cfg(feature = "profile-with-puffin")]
fn setup_profiler() {
    puffin::set_scopes_on(true);
    FRAME_VIEW.get_or_init(puffin::GlobalFrameView::default);
}

#[cfg(not(feature = "profile-with-puffin"))]
fn setup_profiler() {}

/// Call at the end of each benchmark iteration to flush profiling data.
#[cfg(feature = "profile-with-puffin")]
fn end_profiling_frame() {
    puffin::GlobalProfiler::lock().new_frame();
}

#[cfg(not(feature = "profile-with-puffin"))]
fn end_profiling_frame() {}

/// Print the average time of each top-level scope over the recorded frames.
#[cfg(feature = "profile-with-puffin")]
fn print_profiling_stats() {
    use puffin::Reader;
    use std::collections::HashMap;

    let Some(frame_view) = FRAME_VIEW.get() else {
        println!("Profiler not initialized");
        return;
    };

    let view = frame_view.lock();
    let scope_collection = view.scope_collection();
    let mut scope_timings: HashMap<String, i64> = HashMap::new();
    let mut frame_count = 0i64;

    for frame in view.recent_frames() {
        frame_count += 1;
        let Ok(unpacked) = frame.unpacked() else {
            continue;
        };
        for (_thread_info, stream_info) in unpacked.thread_streams.iter() {
            let reader = Reader::from_start(&stream_info.stream);
            let Ok(scopes) = reader.read_top_scopes() else {
                continue;
            };
            for scope in scopes {
                if let Some(details) = scope_collection.fetch_by_id(&scope.id) {
                    *scope_timings.entry(details.name().to_string()).or_insert(0) +=
                        scope.record.duration_ns;
                }
            }
        }
    }

    println!("\n=== Profiling Summary ({} frames) ===", frame_count);
    let mut entries: Vec<_> = scope_timings.into_iter().collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    for (name, ns) in entries {
        let avg_ns = if frame_count > 0 { ns / frame_count } else { ns };
        println!(
            "  {:30} {:>10.2?} avg",
            name,
            std::time::Duration::from_nanos(avg_ns as u64)
        );
    }
    println!("=====================================\n");
}

#[cfg(not(feature = "profile-with-puffin"))]
fn print_profiling_stats() {}

/// `F0(x Int) -> Int = x` and `Fi(x Int) -> Int = F(i-1) (x + 1)`.
fn call_chain<'a>(ast: AstBuilder<'a>, length: usize) -> Vec<&'a FunctionDecl<'a>> {
    (0..length)
        .map(|i| {
            let body = if i == 0 {
                ast.name("x")
            } else {
                ast.call_named(
                    &format!("F{}", i - 1),
                    ast.op(ast.name("x"), "+", ast.int(1)),
                )
            };
            ast.function(&format!("F{i}"), &[("x", TypeExpr::Int)], TypeExpr::Int, body)
        })
        .collect()
}

/// A left-leaning sum `1 + 2 + ... + depth` in a single function.
fn deep_expression<'a>(ast: AstBuilder<'a>, depth: i32) -> &'a FunctionDecl<'a> {
    let body: Expr<'a> = (2..=depth).fold(ast.int(1), |acc, n| ast.op(acc, "+", ast.int(n)));
    ast.function("Sum", &[], TypeExpr::Int, body)
}

/// `Id'T` plus a caller instancing it at `Int`, `Int[]`, `Int[][]` and so on.
fn generic_instances<'a>(ast: AstBuilder<'a>, count: usize) -> Vec<&'a FunctionDecl<'a>> {
    let t = ast.ty_named("T", &[]);
    let id = ast.generic_function("Id", &["T"], &[("x", t)], t, ast.name("x"));

    let mut value = ast.int(0);
    let mut calls = Vec::with_capacity(count);
    for _ in 0..count {
        calls.push(ast.define("v", ast.call_named("Id", value)));
        value = ast.array(&[value]);
    }
    // Every define lives in its own block so `v` can be reused.
    let blocks: Vec<Expr<'a>> = calls.iter().map(|call| ast.block(&[*call])).collect();
    let main = ast.function("Main", &[], TypeExpr::Unit, ast.block(&blocks));
    vec![id, main]
}

fn build<'a>(decls: &[&'a FunctionDecl<'a>]) -> usize {
    let mut unit = Unit::new();
    for decl in decls {
        unit.add_function(*decl).unwrap();
    }
    unit.build().unwrap();
    end_profiling_frame();
    unit.program().functions().count()
}

fn call_chain_benchmarks(c: &mut Criterion) {
    setup_profiler();

    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let mut group = c.benchmark_group("binder/call_chain");

    for length in [10, 100, 1000] {
        let decls = call_chain(ast, length);
        group.throughput(Throughput::Elements(length as u64));
        group.bench_with_input(BenchmarkId::from_parameter(length), &decls, |b, decls| {
            b.iter(|| black_box(build(black_box(decls))));
        });
    }

    group.finish();
    print_profiling_stats();
}

fn deep_expression_benchmarks(c: &mut Criterion) {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let mut group = c.benchmark_group("binder/deep_expression");

    for depth in [100, 1000] {
        let decls = [deep_expression(ast, depth)];
        group.bench_with_input(BenchmarkId::from_parameter(depth), &decls, |b, decls| {
            b.iter(|| black_box(build(black_box(decls))));
        });
    }

    group.finish();
}

fn generic_benchmarks(c: &mut Criterion) {
    let arena = Bump::new();
    let ast = AstBuilder::new(&arena);
    let mut group = c.benchmark_group("binder/generics");

    for count in [4, 32] {
        let decls = generic_instances(ast, count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &decls, |b, decls| {
            b.iter(|| black_box(build(black_box(decls))));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    call_chain_benchmarks,
    deep_expression_benchmarks,
    generic_benchmarks
);
criterion_main!(benches);
