//! Benchmarks for the service container

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use service_container::{Arguments, Autowire, Container, Factory, Parameter, Result};
use std::hint::black_box;
use std::sync::Arc;

#[allow(dead_code)]
struct SmallService {
    value: i32,
}

#[allow(dead_code)]
struct MediumService {
    name: String,
    values: Vec<i32>,
}

struct Config;

impl Autowire for Config {
    fn parameters() -> Vec<Parameter> {
        vec![]
    }

    fn construct(_: &mut Arguments) -> Result<Self> {
        Ok(Config)
    }
}

#[allow(dead_code)]
struct Database {
    config: Arc<Config>,
}

impl Autowire for Database {
    fn parameters() -> Vec<Parameter> {
        vec![Parameter::of::<Config>("config")]
    }

    fn construct(args: &mut Arguments) -> Result<Self> {
        Ok(Database {
            config: args.take()?,
        })
    }
}

#[allow(dead_code)]
struct UserService {
    db: Arc<Database>,
    config: Arc<Config>,
}

impl Autowire for UserService {
    fn parameters() -> Vec<Parameter> {
        vec![
            Parameter::of::<Database>("db"),
            Parameter::of::<Config>("config"),
        ]
    }

    fn construct(args: &mut Arguments) -> Result<Self> {
        Ok(UserService {
            db: args.take()?,
            config: args.take()?,
        })
    }
}

fn autowired_container() -> Container {
    let container = Container::new();
    container.register_type::<Config>();
    container.register_type::<Database>();
    container.register_type::<UserService>();
    container
}

fn bench_registration(c: &mut Criterion) {
    let mut group = c.benchmark_group("registration");

    group.bench_function("bind_fn", |b| {
        b.iter(|| {
            let container = Container::new();
            container.bind_fn("small", |_| Ok(SmallService { value: 42 }), false);
            black_box(container)
        })
    });

    group.bench_function("bind_type_name", |b| {
        b.iter(|| {
            let container = Container::new();
            container
                .bind("Cache", Some(Factory::type_name("RedisCache")), true)
                .unwrap();
            black_box(container)
        })
    });

    group.bench_function("individual_4_services", |b| {
        b.iter(|| {
            let container = Container::new();
            container.singleton_fn("a", |_| Ok(SmallService { value: 1 }));
            container.singleton_fn("b", |_| Ok(SmallService { value: 2 }));
            container.bind_fn("c", |_| Ok(SmallService { value: 3 }), false);
            container.bind_type("d", "a", false).unwrap();
            black_box(container)
        })
    });

    group.bench_function("batch_closure_4", |b| {
        b.iter(|| {
            let container = Container::new();
            container.batch(|batch| {
                batch.singleton_fn("a", |_| Ok(SmallService { value: 1 }));
                batch.singleton_fn("b", |_| Ok(SmallService { value: 2 }));
                batch.bind_fn("c", |_| Ok(SmallService { value: 3 }), false);
                batch.bind_type("d", "a", false).unwrap();
            });
            black_box(container)
        })
    });

    group.finish();
}

fn bench_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolution");
    group.throughput(Throughput::Elements(1));

    let container = Container::new();
    container.singleton_fn("small", |_| Ok(SmallService { value: 42 }));
    container.singleton_fn("medium", |_| {
        Ok(MediumService {
            name: "test".to_string(),
            values: vec![1, 2, 3, 4, 5],
        })
    });
    container.bind_fn("transient", |_| Ok(SmallService { value: 42 }), false);
    container.bind_type("alias", "small", false).unwrap();

    // Warm the cache
    let _ = container.resolve("small").unwrap();
    let _ = container.resolve("medium").unwrap();

    group.bench_function("resolve_shared", |b| {
        b.iter(|| black_box(container.resolve("small").unwrap()))
    });

    group.bench_function("resolve_as_shared", |b| {
        b.iter(|| black_box(container.resolve_as::<MediumService>("medium").unwrap()))
    });

    group.bench_function("resolve_transient", |b| {
        b.iter(|| black_box(container.resolve("transient").unwrap()))
    });

    group.bench_function("resolve_alias", |b| {
        b.iter(|| black_box(container.resolve("alias").unwrap()))
    });

    group.bench_function("has", |b| b.iter(|| black_box(container.has("small"))));

    group.bench_function("try_resolve_not_found", |b| {
        b.iter(|| black_box(container.try_resolve("missing")))
    });

    group.finish();
}

fn bench_autowire(c: &mut Criterion) {
    let mut group = c.benchmark_group("autowire");
    group.throughput(Throughput::Elements(1));

    let container = autowired_container();
    group.bench_function("graph_depth_3", |b| {
        b.iter(|| black_box(container.make::<UserService>().unwrap()))
    });

    let shared = autowired_container();
    shared
        .singleton(service_container::Identifier::of::<Config>(), None)
        .unwrap();
    group.bench_function("graph_depth_3_shared_leaf", |b| {
        b.iter(|| black_box(shared.make::<UserService>().unwrap()))
    });

    group.bench_function("build_leaf", |b| {
        let leaf = Factory::TypeName(service_container::Identifier::of::<Config>());
        b.iter(|| black_box(container.build(&leaf).unwrap()))
    });

    group.finish();
}

fn bench_concurrent(c: &mut Criterion) {
    use std::thread;

    let mut group = c.benchmark_group("concurrent");

    group.bench_function("concurrent_reads_4", |b| {
        let container = Container::new();
        container.singleton_fn("small", |_| Ok(SmallService { value: 42 }));

        b.iter(|| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let c = container.clone();
                    thread::spawn(move || {
                        for _ in 0..100 {
                            let _ = c.resolve("small").unwrap();
                        }
                    })
                })
                .collect();

            for h in handles {
                h.join().unwrap();
            }
        })
    });

    group.bench_function("concurrent_autowire_4", |b| {
        let container = autowired_container();

        b.iter(|| {
            let handles: Vec<_> = (0..4)
                .map(|_| {
                    let c = container.clone();
                    thread::spawn(move || {
                        for _ in 0..25 {
                            let _ = c.make::<UserService>().unwrap();
                        }
                    })
                })
                .collect();

            for h in handles {
                h.join().unwrap();
            }
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_registration,
    bench_resolution,
    bench_autowire,
    bench_concurrent,
);

criterion_main!(benches);
