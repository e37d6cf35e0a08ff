use serde::{Deserialize, Serialize};

/// Body of the initial screenplay request. The chained follow-up requests
/// carry no body at all; their inputs live in the server-side draft.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenplayRequest {
    pub story: String,
    pub genre: String,
}

/// Reply shape shared by every generation endpoint.
///
/// Success carries `content`; a chained step whose prerequisite is missing
/// carries `error` instead. Both fields absent is a malformed reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerationReply {
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            error: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            content: None,
            error: Some(message.into()),
        }
    }
}
