use std::path::PathBuf;

/// 槽位存储错误
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Invalid slot number {slot}. Use 1-{max}.")]
    InvalidSlot { slot: u32, max: u8 },

    #[error("Nothing to save: snapshot has no content")]
    EmptySnapshot,

    #[error("Storage error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not encode manifest: {0}")]
    Manifest(#[from] serde_json::Error),
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// 旧版单文件存储迁移错误
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("Could not read legacy store {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Legacy store {path} is not valid: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Could not migrate legacy slot {slot}: {source}")]
    Write {
        slot: u8,
        #[source]
        source: StorageError,
    },

    #[error("Could not back up legacy store to {path}: {source}")]
    Backup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
