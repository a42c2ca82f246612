use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ReplayError {
    #[error("frame format error: {0}")]
    FrameFormat(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("timeout waiting on {server}")]
    TransportTimeout { server: String },

    #[error("connection refused by {server}")]
    TransportConnectionRefused { server: String },

    #[error("connection reset by {server}")]
    TransportConnectionReset { server: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl ReplayError {
    /// True for errors raised below the DNS layer: the server never produced
    /// a parseable answer and the replay moves on to the next target.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Network(_)
                | Self::TransportTimeout { .. }
                | Self::TransportConnectionRefused { .. }
                | Self::TransportConnectionReset { .. }
        )
    }
}
