use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use nestscore_app::bootstrap;
use nestscore_frontend::ReportFormat;
use nestscore_frontend::cli::compare_command;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => ReportFormat::Json,
            OutputFormat::Text => ReportFormat::Text,
        }
    }
}

/// 比对生成的 DXF 与参考 DXF，输出准确度指标。
#[derive(Debug, Parser)]
#[command(name = "nestscore", version)]
struct Args {
    /// 生成的 DXF 文件
    generated: PathBuf,
    /// 参考 DXF 文件
    reference: PathBuf,
    /// 输出格式
    #[arg(long, value_enum, default_value = "json")]
    format: OutputFormat,
    /// 配置文件路径（默认读取 NESTSCORE_CONFIG 或 ./config/default.toml）
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let config = bootstrap(args.config);
    info!(
        generated = %args.generated.display(),
        reference = %args.reference.display(),
        "开始比对"
    );

    match compare_command(
        &args.generated,
        &args.reference,
        args.format.into(),
        &config,
    ) {
        Ok(rendered) => {
            println!("{rendered}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "比对失败");
            eprintln!("错误: {err}");
            ExitCode::FAILURE
        }
    }
}
