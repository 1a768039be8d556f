//! envkit: check and export environment configuration
//!
//! Configured through its own environment:
//!   ENVKIT_PREFIX=APP_ \
//!   ENVKIT_ENV_FILE=.env \
//!   ENVKIT_REQUIRED=DATABASE_URL,REDIS_HOST \
//!   ENVKIT_FORMAT=json \
//!   envkit
//!
//! Exits non-zero when a required key is missing, otherwise prints every
//! variable under the prefix.

use anyhow::Context;
use envkit_core::{EnvError, Resolver};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    init_tracing();

    let settings = Resolver::builder().prefix("ENVKIT_").build()?;
    let prefix = settings.get_string("PREFIX", "");
    let required = settings.get_string_slice("REQUIRED", &[]);
    let silent = settings.get_bool("SILENT", false);
    let format = settings.get_string("FORMAT", "text");

    let mut builder = Resolver::builder()
        .prefix(prefix.as_str())
        .silent(silent)
        .required(required);
    if let Some(path) = settings.lookup("ENV_FILE") {
        builder = builder.env_file(path);
    }

    let env = match builder.build() {
        Ok(env) => env,
        Err(EnvError::MissingRequired { keys }) => {
            for key in &keys {
                tracing::error!(key = %key, "required variable is missing");
            }
            anyhow::bail!("{} required variable(s) missing", keys.len());
        }
        Err(e) => return Err(e.into()),
    };

    let exported = env.export();
    tracing::info!(prefix = %prefix, count = exported.len(), "configuration resolved");

    match format.as_str() {
        "json" => {
            let out = serde_json::to_string_pretty(&exported).context("failed to encode export")?;
            println!("{out}");
        }
        _ => {
            for (key, value) in &exported {
                println!("{key}={value}");
            }
        }
    }

    Ok(())
}

/// Initialize tracing/logging
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(true))
        .init();
}
