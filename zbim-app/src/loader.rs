use std::path::{Path, PathBuf};

use tracing::info;
use zbim_core::host::HostDocument;
use zbim_engine::naming::ElevationDesignation;
use zbim_engine::session::{DemoElements, Session};
use zbim_io::{DocumentLoader, IoError, JsonFacade};

/// 文档来源，便于 CLI 呈现加载信息。
#[derive(Debug, Clone)]
pub enum DocumentSource {
    Snapshot(PathBuf),
    Demo,
}

/// 统一封装加载后的会话与元信息。
#[derive(Debug)]
pub struct LoadedSession {
    pub session: Session,
    pub source: DocumentSource,
    pub demo_elements: Option<DemoElements>,
}

/// 指定快照时从 JSON 读取文档，否则构建内置示例。
/// 显式给出的快照读取失败时返回错误，不回退到示例。
pub fn load_session(
    snapshot: Option<&Path>,
    designation: ElevationDesignation,
) -> Result<LoadedSession, IoError> {
    let mut session = Session::new(designation);
    if let Some(path) = snapshot {
        let document = JsonFacade::new().load(path)?;
        info!(path = %path.display(), elements = document.element_count(), "从快照加载文档成功");
        session.load_document(document);
        return Ok(LoadedSession {
            session,
            source: DocumentSource::Snapshot(path.to_path_buf()),
            demo_elements: None,
        });
    }

    let demo_elements = session.populate_demo();
    info!(elements = session.document().element_count(), "使用内置示例文档");
    Ok(LoadedSession {
        session,
        source: DocumentSource::Demo,
        demo_elements: Some(demo_elements),
    })
}
