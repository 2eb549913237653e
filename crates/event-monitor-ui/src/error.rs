//! Error types for the consumer side.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid history length: {0}. Must be between 1 and {max}", max = crate::MAX_HISTORY)]
    InvalidHistoryLength(usize),

    #[error("Failed to spawn poller thread: {0}")]
    PollerSpawn(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidHistoryLength(0);
        assert!(err.to_string().contains("Invalid history length: 0"));

        let err = Error::PollerSpawn(std::io::Error::new(
            std::io::ErrorKind::Other,
            "no threads left",
        ));
        assert!(err.to_string().contains("no threads left"));
    }
}
