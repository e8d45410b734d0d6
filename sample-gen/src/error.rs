use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures of a generation run. Each carries the path it was working on.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("failed to create output directory {}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write {}", path.display())]
    WriteDocument {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write manifest {}", path.display())]
    WriteManifest {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
