use thiserror::Error;

/// Shown when a failure carries no description of its own.
pub const GENERIC_APOLOGY: &str =
    "Sorry, I'm having a little trouble connecting right now. Please try again in a moment.";

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error("Type a message or attach an image before sending.")]
    EmptyInput,

    #[error("Please select an image file. {media_type} is not supported.")]
    UnsupportedType { media_type: String },

    #[error("Unable to read {file_name}: {reason}")]
    Read { file_name: String, reason: String },

    #[error("{origin} error: {status} {status_text} - {body}")]
    Upstream {
        origin: String,
        status: u16,
        status_text: String,
        body: String,
    },

    #[error("Invalid response structure from {origin}.")]
    MalformedResponse { origin: String },

    #[error("Network error: {reason}")]
    Network { reason: String },

    #[error("Still waiting on a reply, hang tight.")]
    Busy,

    #[error("The request was cancelled.")]
    Cancelled,
}

impl ChatError {
    /// The text a failed turn leaves in the transcript.
    pub fn fallback_text(description: &str) -> String {
        if description.trim().is_empty() {
            return GENERIC_APOLOGY.to_string();
        }

        return description.to_string();
    }
}
