//! # envkit
//!
//! Typed configuration from environment variables.
//!
//! A [`Resolver`] reads `prefix + name` from an [`EnvStore`] (the process
//! environment by default), converts the raw string to the requested type and
//! falls back to a caller-supplied default when the value is unset, empty or
//! unparseable.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use envkit_core::{EnvResult, Resolver};
//! use std::time::Duration;
//!
//! fn load() -> EnvResult<()> {
//!     let env = Resolver::builder()
//!         .prefix("APP_")
//!         .env_file(".env")
//!         .required(["DATABASE_URL"])
//!         .build()?;
//!
//!     let workers = env.get_int("WORKERS", 4);
//!     // APP_REQUEST_TIMEOUT_MS=1500 resolves to 1.5s
//!     let timeout = env.get_duration("REQUEST_TIMEOUT_MS", Duration::from_secs(5));
//!     let hosts = env.get_string_slice("ALLOWED_HOSTS", &["localhost"]);
//!     # let _ = (workers, timeout, hosts);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Prefixes**: namespace several subsystems within one environment
//! - **Defaults**: every typed getter takes a fallback instead of failing
//! - **Duration inference**: bare integers take their unit from the key name
//! - **Env files**: `KEY=VALUE` files that never override the live environment
//! - **Required keys**: every missing key reported at construction

pub mod config_file;
pub mod duration;
pub mod env;
pub mod envfile;
mod error;
mod parse;
mod resolver;
pub mod store;
pub mod timestamp;

pub use error::{EnvError, EnvResult};
pub use resolver::{Resolver, ResolverBuilder, ResolverConfig};
pub use store::{EnvStore, MemoryEnv, ProcessEnv};
pub use timestamp::Timestamped;

// Re-exported so callers of `get_url` don't need their own dependency
pub use url::Url;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
