use std::path::PathBuf;

use nestscore_io::IoError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FrontendError {
    #[error("找不到输入文件 {path:?}")]
    InputNotFound { path: PathBuf },
    #[error("无法解析图纸 {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: IoError,
    },
    #[error("目录 {dir:?} 中没有以 `{prefix}` 开头的 DXF 输出，请先运行测试")]
    NoOutputFound { dir: PathBuf, prefix: String },
    #[error("无法启动测试命令 `{command}`: {source}")]
    RunnerFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("序列化比对结果失败: {0}")]
    Serialize(#[from] serde_json::Error),
}
