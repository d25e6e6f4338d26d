use clove_udf::{Context, Registry, Udf, UdfResult, Value, builtins, convert_generic};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

const THREADS: usize = 16;
const CALLS_PER_THREAD: usize = 200;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Keeps its own synchronized state; the registry guarantees nothing about it.
#[derive(Default)]
struct CallCounter {
    calls: AtomicUsize,
}

impl Udf for CallCounter {
    fn call(&self, _ctx: &Context, args: &[Value]) -> UdfResult<Value> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        Ok(args[0].clone())
    }

    fn accept(&self, arity: usize) -> bool {
        arity == 1
    }

    fn is_aggregation_parameter(&self, _k: usize) -> bool {
        false
    }
}

fn square(v: i64) -> i64 {
    v * v
}

#[test]
fn test_concurrent_calls_to_shared_functions() {
    init_tracing();
    let registry = Registry::new();
    builtins::install(&registry).unwrap();
    registry.register("square", convert_generic(square).unwrap()).unwrap();

    thread::scope(|scope| {
        for t in 0..THREADS {
            let registry = &registry;
            scope.spawn(move || {
                for i in 0..CALLS_PER_THREAD {
                    let ctx = Context::new();
                    let n = (t * CALLS_PER_THREAD + i) as i64;

                    let squared = registry.call(&ctx, "square", &[Value::Integer(n)]).unwrap();
                    assert_eq!(squared, Value::Integer(n * n));

                    let tag = format!("t{t}");
                    let idx = format!("i{i}");
                    let joined = registry
                        .call(&ctx, "join", &[Value::from(tag.as_str()), Value::from(idx.as_str()), Value::from(":")])
                        .unwrap();
                    assert_eq!(joined, Value::String(format!("t{t}:i{i}")));
                }
            });
        }
    });
}

#[test]
fn test_concurrent_lookups_during_registration() {
    init_tracing();
    let registry = Registry::new();
    builtins::install(&registry).unwrap();

    thread::scope(|scope| {
        scope.spawn(|| {
            for i in 0..100 {
                registry
                    .register(&format!("late_{i}"), convert_generic(square).unwrap())
                    .unwrap();
            }
        });
        for _ in 0..4 {
            scope.spawn(|| {
                for _ in 0..500 {
                    let udf = registry.lookup("count", 1).unwrap();
                    let group = Value::Array(vec![Value::Integer(1), Value::Null]);
                    assert_eq!(udf.call(&Context::new(), &[group]).unwrap(), Value::Integer(1));
                }
            });
        }
    });

    assert_eq!(registry.len(), 105);
}

#[test]
fn test_stateful_function_counts_every_call() {
    let counter = Arc::new(CallCounter::default());
    let registry = Registry::new();
    registry.register_shared("counter", counter.clone()).unwrap();

    thread::scope(|scope| {
        for t in 0..THREADS {
            let registry = &registry;
            scope.spawn(move || {
                let ctx = Context::new();
                for _ in 0..CALLS_PER_THREAD {
                    let v = registry.call(&ctx, "counter", &[Value::Integer(t as i64)]).unwrap();
                    assert_eq!(v, Value::Integer(t as i64));
                }
            });
        }
    });

    assert_eq!(counter.calls.load(Ordering::Relaxed), THREADS * CALLS_PER_THREAD);
}

#[test]
fn test_context_shared_across_threads() {
    let registry = Registry::new();
    builtins::install(&registry).unwrap();
    let ctx = Context::new();

    thread::scope(|scope| {
        for t in 0..THREADS {
            let (registry, ctx) = (&registry, &ctx);
            scope.spawn(move || {
                let group = Value::Array(vec![Value::Integer(t as i64); t]);
                let n = registry.call(ctx, "count", &[group]).unwrap();
                assert_eq!(n, Value::Integer(t as i64));
            });
        }
    });
}
