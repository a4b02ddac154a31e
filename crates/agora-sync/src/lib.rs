pub mod cache;
pub mod channels;
pub mod error;
pub mod ingest;
pub mod store;

pub use cache::ChannelCache;
pub use channels::{ChannelSync, SyncOutcome};
pub use error::SyncError;
pub use ingest::{IngestOutcome, Ingestor};
pub use store::ForumStore;

#[cfg(test)]
mod test_support;
