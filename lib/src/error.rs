use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SweepError {
    #[error("io: {0}")]
    Io(#[from] io::Error),

    #[error("sudo authentication failed")]
    SudoDenied,

    #[error("command failed: {0}")]
    CommandFailed(String),

    #[error("failed to delete any of {matches} matches: {source}")]
    AllMatchesFailed {
        matches: usize,
        #[source]
        source: Box<SweepError>,
    },
}
