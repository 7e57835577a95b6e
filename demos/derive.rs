//! Example demonstrating the #[derive(Autowire)] macro
//!
//! Run with:
//!   cargo run --example derive --features derive

use service_container::{Autowire, Container, DiError};
use std::sync::Arc;

trait Logger: Send + Sync {
    fn log(&self, message: &str);
}

struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn log(&self, message: &str) {
        println!("  [log] {message}");
    }
}

#[derive(Autowire)]
struct Config;

#[derive(Autowire)]
struct Database {
    config: Arc<Config>,
}

#[derive(Autowire)]
struct UserService {
    db: Arc<Database>,
    #[inject(name = "Logger")]
    logger: Arc<dyn Logger>,
    #[inject(default)]
    request_count: u64,
}

#[allow(dead_code)]
#[derive(Autowire)]
struct Mailer {
    port: u16,
}

fn main() {
    println!("=== Service Container Derive Macro Demo ===\n");

    let container = Container::new();
    container.register_type::<Config>();
    container.register_type::<Database>();
    container.register_type::<UserService>();
    container.register_type::<Mailer>();

    // Config is shared; Database and UserService are auto-wired on demand
    container
        .singleton(service_container::Identifier::of::<Config>(), None)
        .unwrap();
    container.singleton_fn("Logger", |_| Ok(Arc::new(ConsoleLogger) as Arc<dyn Logger>));

    let first = container.make::<UserService>().unwrap();
    let second = container.make::<UserService>().unwrap();

    first.logger.log("UserService built");
    println!(
        "  fresh Database per UserService: {}",
        !Arc::ptr_eq(&first.db, &second.db)
    );
    println!(
        "  shared Config: {}",
        Arc::ptr_eq(&first.db.config, &second.db.config)
    );
    println!("  request count: {}", first.request_count);

    // Builtin fields cannot be auto-wired
    match container.make::<Mailer>() {
        Err(DiError::UnresolvableParameter { parameter, target }) => {
            println!("  cannot build {target}: parameter ${parameter} is a builtin")
        }
        other => println!("  unexpected: {:?}", other.map(|_| ())),
    }

    println!("\n=== Demo Complete ===");
}
