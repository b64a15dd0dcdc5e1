use std::process::Command;

use tracing::{info, warn};

use crate::errors::FrontendError;

/// 外部测试命令的执行结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// 通过 `sh -c` 阻塞执行生成器测试命令，不重试也不设置超时。
///
/// 命令非零退出不视为错误，只有无法启动进程时才返回 `RunnerFailed`。
pub fn run_generator_tests(command: &str) -> Result<RunOutcome, FrontendError> {
    info!(command, "运行生成器测试");
    let output = Command::new("sh")
        .arg("-c")
        .arg(command)
        .env("CI", "")
        .output()
        .map_err(|source| FrontendError::RunnerFailed {
            command: command.to_string(),
            source,
        })?;

    let outcome = RunOutcome {
        success: output.status.success(),
        exit_code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };
    if !outcome.success {
        warn!(exit_code = ?outcome.exit_code, "生成器测试以非零状态退出");
    }
    Ok(outcome)
}
