//! MongoDB client configuration for envkit
//!
//! Resolves a [`MongoConfig`] from `MONGO_*` environment variables (or a TOML
//! file) and renders the connection string for the driver. Documents that
//! implement [`Timestamped`] are stamped before writes when
//! `auto_timestamps` is enabled.

mod config;

pub use config::MongoConfig;
pub use envkit_core::Timestamped;

use envkit_core::timestamp;

impl MongoConfig {
    /// Prepare a document for insertion
    pub fn before_insert<T: Timestamped>(&self, doc: &mut T) {
        if self.auto_timestamps {
            timestamp::stamp_insert(doc);
        }
    }

    /// Prepare a batch of documents for insertion
    pub fn before_insert_many<T: Timestamped>(&self, docs: &mut [T]) {
        if self.auto_timestamps {
            timestamp::stamp_insert_many(docs);
        }
    }

    /// Prepare a document for update
    pub fn before_update<T: Timestamped>(&self, doc: &mut T) {
        if self.auto_timestamps {
            timestamp::stamp_update(doc);
        }
    }
}
