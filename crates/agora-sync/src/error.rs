use thiserror::Error;

use agora_types::Snowflake;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Store failures during ingestion. Rejected events are not errors and never
/// show up here.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("failed to sync channel {id}")]
    Channel {
        id: Snowflake,
        #[source]
        source: BoxError,
    },

    #[error("failed to store message {id}")]
    Message {
        id: Snowflake,
        #[source]
        source: BoxError,
    },
}

impl SyncError {
    pub(crate) fn channel(id: &Snowflake, source: anyhow::Error) -> Self {
        Self::Channel {
            id: id.clone(),
            source: source.into(),
        }
    }

    pub(crate) fn message(id: &Snowflake, source: anyhow::Error) -> Self {
        Self::Message {
            id: id.clone(),
            source: source.into(),
        }
    }
}
