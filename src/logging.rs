//! Logging setup for service-container
//!
//! The container emits `tracing` events under the `service_container`
//! target. This module installs a subscriber for applications that do not
//! configure one themselves.
//!
//! # Features
//!
//! - `logging` - Emit container events (default)
//! - `logging-json` - JSON output through `tracing-subscriber`
//! - `logging-pretty` - Human-readable output through `tracing-subscriber`
//!
//! Without either subscriber feature the `init*` functions do nothing.
//!
//! # Example
//!
//! ```rust,ignore
//! use service_container::logging;
//!
//! logging::init();
//!
//! // Or configure it
//! logging::builder()
//!     .trace()
//!     .compact()
//!     .container_only()
//!     .with_thread_names()
//!     .init();
//! ```

use tracing::Level;

/// Target of every event emitted by the container.
pub const TARGET: &str = "service_container";

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per event
    #[default]
    Json,
    /// Multi-line colorful output
    Pretty,
    /// Single-line output
    Compact,
}

/// Subscriber configuration
#[derive(Debug, Clone)]
pub struct LoggingBuilder {
    level: Level,
    format: LogFormat,
    target: Option<&'static str>,
    with_file: bool,
    with_line_number: bool,
    with_thread_ids: bool,
    with_thread_names: bool,
}

impl Default for LoggingBuilder {
    fn default() -> Self {
        Self {
            level: Level::DEBUG,
            format: LogFormat::default(),
            target: None,
            with_file: false,
            with_line_number: false,
            with_thread_ids: false,
            with_thread_names: false,
        }
    }
}

impl LoggingBuilder {
    /// Builder with the default settings (JSON at DEBUG).
    pub fn new() -> Self {
        Self::default()
    }

    /// Minimum level
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Show cache hits, builds and cycle checks
    pub fn trace(self) -> Self {
        self.with_level(Level::TRACE)
    }

    /// Show container creation and binding registration
    pub fn debug(self) -> Self {
        self.with_level(Level::DEBUG)
    }

    /// Informational events and above
    pub fn info(self) -> Self {
        self.with_level(Level::INFO)
    }

    /// Warnings and errors
    pub fn warn(self) -> Self {
        self.with_level(Level::WARN)
    }

    /// Errors only
    pub fn error(self) -> Self {
        self.with_level(Level::ERROR)
    }

    /// Only show events from `target`
    pub fn with_target_filter(mut self, target: &'static str) -> Self {
        self.target = Some(target);
        self
    }

    /// Only show container events
    pub fn container_only(self) -> Self {
        self.with_target_filter(TARGET)
    }

    /// Include the source file of each event
    pub fn with_file(mut self) -> Self {
        self.with_file = true;
        self
    }

    /// Include the source line of each event
    pub fn with_line_number(mut self) -> Self {
        self.with_line_number = true;
        self
    }

    /// Include the emitting thread's id
    pub fn with_thread_ids(mut self) -> Self {
        self.with_thread_ids = true;
        self
    }

    /// Include the emitting thread's name
    pub fn with_thread_names(mut self) -> Self {
        self.with_thread_names = true;
        self
    }

    /// One JSON object per event
    pub fn json(mut self) -> Self {
        self.format = LogFormat::Json;
        self
    }

    /// Multi-line human-readable output
    pub fn pretty(mut self) -> Self {
        self.format = LogFormat::Pretty;
        self
    }

    /// Single-line output
    pub fn compact(mut self) -> Self {
        self.format = LogFormat::Compact;
        self
    }

    /// `EnvFilter` directive for this configuration
    #[cfg_attr(
        not(any(feature = "logging-json", feature = "logging-pretty")),
        allow(dead_code)
    )]
    fn directive(&self) -> String {
        match self.target {
            Some(target) => format!("{}={}", target, self.level),
            None => self.level.to_string(),
        }
    }

    /// Install the subscriber globally.
    ///
    /// Does nothing if a global subscriber is already set. JSON falls back to
    /// the default text format when `logging-json` is off.
    #[cfg(any(feature = "logging-json", feature = "logging-pretty"))]
    pub fn init(self) {
        use tracing_subscriber::{EnvFilter, fmt, prelude::*};

        let filter = EnvFilter::new(self.directive());
        let layer = fmt::layer()
            .with_file(self.with_file)
            .with_line_number(self.with_line_number)
            .with_thread_ids(self.with_thread_ids)
            .with_thread_names(self.with_thread_names)
            .with_target(true);

        let registry = tracing_subscriber::registry().with(filter);
        let _ = match self.format {
            #[cfg(feature = "logging-json")]
            LogFormat::Json => registry.with(layer.json()).try_init(),
            #[cfg(not(feature = "logging-json"))]
            LogFormat::Json => registry.with(layer).try_init(),
            LogFormat::Pretty => registry.with(layer.pretty()).try_init(),
            LogFormat::Compact => registry.with(layer.compact()).try_init(),
        };
    }

    #[cfg(not(any(feature = "logging-json", feature = "logging-pretty")))]
    pub fn init(self) {}
}

/// Start a [`LoggingBuilder`].
pub fn builder() -> LoggingBuilder {
    LoggingBuilder::new()
}

/// JSON when `logging-json` is enabled, pretty otherwise.
pub fn init() {
    if cfg!(feature = "logging-json") {
        init_json();
    } else {
        init_pretty();
    }
}

/// JSON output at DEBUG, for log aggregation.
///
/// ```json
/// {"timestamp":"2026-01-01T00:00:00.000Z","level":"DEBUG","target":"service_container","fields":{"message":"Registering binding","service":"Logger","shared":true}}
/// ```
pub fn init_json() {
    builder().json().debug().init();
}

/// Pretty output at DEBUG, for local development.
pub fn init_pretty() {
    builder().pretty().debug().init();
}

/// DEBUG output restricted to container events.
pub fn init_container_only() {
    builder().container_only().debug().init();
}
