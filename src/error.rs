//! Error types for rules queries.

use thiserror::Error;

/// Everything that can end an A2S_RULES query.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The 4-byte header is neither a simple (-1) nor a split (-2) marker,
    /// or a payload handed to the decoder does not start with -1.
    #[error("Bad packet header")]
    BadPacketHeader,

    /// Header is valid but the type byte is not the rules response tag.
    #[error("Bad rules reply")]
    BadRulesReply,

    /// Handshake reply was neither a challenge nor the expected answer.
    #[error("Bad challenge response")]
    BadChallenge,

    /// The server kept handing out new challenges.
    #[error("Server issued {0} challenges without answering")]
    ChallengeLimit(usize),

    /// Split reply uses bzip2 compression, which is not supported.
    #[error("Compressed split responses are not supported")]
    Compressed,

    /// Socket error, including receive timeouts.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using QueryError.
pub type Result<T> = std::result::Result<T, QueryError>;
