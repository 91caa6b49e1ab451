use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;
use zbim_core::document::Document;
use zbim_core::host::HostDocument;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("failed to read file {path:?}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write file {path:?}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode document snapshot: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("invalid document snapshot {path:?}: {source}")]
    InvalidDocument {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub trait DocumentLoader {
    fn load(&self, path: &Path) -> Result<Document, IoError>;
}

pub trait DocumentSaver {
    fn save(&self, document: &Document, path: &Path) -> Result<(), IoError>;
}

/// 以 JSON 快照读写文档，元素 ID 与插入顺序原样保留。
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonFacade {
    pretty: bool,
}

impl JsonFacade {
    pub fn new() -> Self {
        Self::default()
    }

    /// 写出带缩进的 JSON，便于人工比对。
    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl DocumentLoader for JsonFacade {
    fn load(&self, path: &Path) -> Result<Document, IoError> {
        let data = fs::read_to_string(path).map_err(|source| IoError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let document: Document =
            serde_json::from_str(&data).map_err(|source| IoError::InvalidDocument {
                path: path.to_path_buf(),
                source,
            })?;
        debug!(path = %path.display(), elements = document.element_count(), "已读取文档快照");
        Ok(document)
    }
}

impl DocumentSaver for JsonFacade {
    fn save(&self, document: &Document, path: &Path) -> Result<(), IoError> {
        let encoded = if self.pretty {
            serde_json::to_string_pretty(document)
        } else {
            serde_json::to_string(document)
        };
        let data = encoded.map_err(IoError::Encode)?;
        fs::write(path, data).map_err(|source| IoError::WriteError {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), elements = document.element_count(), "已写出文档快照");
        Ok(())
    }
}
