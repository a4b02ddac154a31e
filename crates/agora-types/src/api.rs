use serde::{Deserialize, Serialize};

use crate::models::Snowflake;

// -- Ingestion --

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub status: &'static str,
}

// -- Moderation --

/// Marks (or clears, with `null`) the accepted answer of a post.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SetAnswerRequest {
    pub message_id: Option<Snowflake>,
}
