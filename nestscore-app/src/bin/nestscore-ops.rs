use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use nestscore_app::bootstrap;
use nestscore_frontend::cli::{check_command, inspect_command, test_command};
use tracing::error;

/// 生成器回归测试的辅助命令。
#[derive(Debug, Parser)]
#[command(name = "nestscore-ops", version)]
struct Cli {
    /// 配置文件路径
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// 比对最新的生成结果与参考图纸并打印得分构成
    Check(Locations),
    /// 运行生成器测试，然后执行 check
    Test(Locations),
    /// 列出图纸中面积最大的形状与疑似槽
    Inspect {
        /// 待检查的 DXF，默认使用参考图纸
        file: Option<PathBuf>,
    },
}

#[derive(Debug, clap::Args)]
struct Locations {
    /// 参考 DXF 文件
    #[arg(long)]
    reference: Option<PathBuf>,
    /// 生成结果所在目录
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = bootstrap(cli.config);
    let workflow = &config.workflow;

    let result = match cli.command {
        Command::Check(locations) => check_command(
            &locations.reference.unwrap_or_else(|| workflow.reference.clone()),
            &locations.output_dir.unwrap_or_else(|| workflow.output_dir.clone()),
            &config,
        ),
        Command::Test(locations) => test_command(
            &locations.reference.unwrap_or_else(|| workflow.reference.clone()),
            &locations.output_dir.unwrap_or_else(|| workflow.output_dir.clone()),
            &config,
        ),
        Command::Inspect { file } => inspect_command(
            &file.unwrap_or_else(|| workflow.reference.clone()),
            &config,
        ),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "命令执行失败");
            eprintln!("错误: {err}");
            ExitCode::FAILURE
        }
    }
}
