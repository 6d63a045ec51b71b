//! # binding-check
//!
//! 读取外部提取器生成的 JSON 声明，解析并校验绑定图，输出诊断。
//! 存在错误时以非零状态退出。

mod output;
mod plan;

use anyhow::Context;
use clap::Parser;
use di_composition::{JsonFileSource, LoggingConfig, ProcessorBuilder};
use output::OutputFormat;
use plan::PlanEmitter;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info};

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "binding-check")]
#[command(about = "检查依赖注入绑定图")]
struct Args {
    /// 声明输入文件（JSON）
    input: PathBuf,

    /// 处理选项，形如 name=value，可以重复
    #[arg(short = 'A', long = "option", value_name = "NAME=VALUE")]
    options: Vec<String>,

    /// 选项文件（TOML 或 JSON）
    #[arg(long)]
    options_file: Option<PathBuf>,

    /// 从带此前缀的环境变量读取选项
    #[arg(long)]
    env_prefix: Option<String>,

    /// 输出格式
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// 输出每个组件的绑定计划
    #[arg(long)]
    plan: bool,

    /// 日志级别
    #[arg(long, default_value = "warn")]
    log_level: tracing::Level,

    /// 使用 JSON 日志
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    let mut logging = LoggingConfig::default()
        .with_level(args.log_level)
        .with_stderr();
    logging.json_format = args.json_logs;

    let mut builder = ProcessorBuilder::new()
        .with_logging(logging)
        .with_option_arguments(&args.options);
    if let Some(path) = &args.options_file {
        builder = builder
            .add_options_file(path)
            .with_context(|| format!("无法使用选项文件 {}", path.display()))?;
    }
    if let Some(prefix) = &args.env_prefix {
        builder = builder.add_options_env(prefix);
    }
    let emitter = Arc::new(PlanEmitter::new());
    if args.plan {
        builder = builder.with_emitter(emitter.clone());
    }

    let processor = builder.build().await.context("处理器构建失败")?;
    debug!("可识别的选项: {:?}", processor.supported_options());

    let outcome = processor
        .process_source(&JsonFileSource::new(&args.input))
        .await
        .with_context(|| format!("处理 {} 失败", args.input.display()))?;

    let rendered = output::render(args.format, &outcome, &emitter.take())?;
    print!("{}", rendered);

    info!("检查完成: {}", args.input.display());
    if outcome.has_errors() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_is_parsed_by_clap() {
        let args = Args::try_parse_from(["binding-check", "input.json"]).unwrap();
        assert_eq!(args.log_level, tracing::Level::WARN);

        let args =
            Args::try_parse_from(["binding-check", "--log-level", "DEBUG", "input.json"]).unwrap();
        assert_eq!(args.log_level, tracing::Level::DEBUG);

        assert!(Args::try_parse_from(["binding-check", "--log-level", "verbose", "input.json"]).is_err());
    }
}
