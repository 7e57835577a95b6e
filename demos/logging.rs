//! Example demonstrating logging capabilities
//!
//! Run with JSON logging (production):
//! ```bash
//! cargo run --example logging --features logging-json
//! ```
//!
//! Run with pretty logging (development):
//! ```bash
//! cargo run --example logging --features logging-pretty
//! ```

use service_container::{Arguments, Autowire, Container, Parameter, Result};
use std::sync::Arc;

#[allow(dead_code)]
struct Database {
    url: String,
}

#[allow(dead_code)]
struct UserService {
    db: Arc<Database>,
}

impl Autowire for UserService {
    fn parameters() -> Vec<Parameter> {
        vec![Parameter::class("db", "Database")]
    }

    fn construct(args: &mut Arguments) -> Result<Self> {
        Ok(UserService { db: args.take()? })
    }
}

struct Cyclic;

impl Autowire for Cyclic {
    fn parameters() -> Vec<Parameter> {
        vec![Parameter::of::<Cyclic>("inner")]
    }

    fn construct(args: &mut Arguments) -> Result<Self> {
        args.take::<Cyclic>()?;
        Ok(Cyclic)
    }
}

fn main() {
    // TRACE shows cache hits and cycle checks too
    service_container::logging::builder().trace().pretty().init();

    println!("=== Service Container Logging Demo ===\n");

    // logs: "Creating new service container"
    let container = Container::new();
    container.register_type::<UserService>();
    container.register_type::<Cyclic>();

    // logs: "Registering construction function"
    container.singleton_fn("Database", |_| {
        println!("  [App] Database being created...");
        Ok(Database {
            url: "postgres://localhost/mydb".into(),
        })
    });

    // logs: "Registering implicit self-binding", "Building type"
    let _users = container.make::<UserService>().unwrap();

    // logs: "Service resolved from instance cache"
    let _db = container.resolve("Database").unwrap();

    // logs: "Circular dependency detected"
    let err = container.make::<Cyclic>().err();
    println!("  [App] Cycle reported: {}", err.map(|e| e.to_string()).unwrap_or_default());

    // Failures are returned, not logged
    assert!(container.try_resolve("Missing").is_none());

    println!("\n=== Demo Complete ===");
    println!("Check the log output above to see structured logging in action!");
    println!("\nTip: Use --features logging-json for production (JSON output)");
    println!("     Use --features logging-pretty for development (colorful output)");
}
