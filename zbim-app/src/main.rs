use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use zbim_config::{AppConfig, ConfigError};
use zbim_engine::command::CommandRequest;
use zbim_engine::naming::ElevationDesignation;
use zbim_io::{DocumentSaver, JsonFacade};

mod cli;
mod loader;

/// 按立面标识复制样板明细表、布置面积并添加颜色图例。
#[derive(Debug, Parser)]
#[command(name = "zbim", version)]
struct Args {
    /// 配置文件路径；缺省时依次尝试 `ZBIM_CONFIG` 与 `./config/default.toml`
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// JSON 文档快照；缺省时使用内置示例文档
    #[arg(long, value_name = "PATH")]
    document: Option<PathBuf>,

    /// 覆盖配置中的立面标识
    #[arg(long)]
    designation: Option<String>,

    /// 覆盖配置中的图纸目录过滤值
    #[arg(long, value_name = "VALUE")]
    sheet_filter: Option<String>,

    /// 运行结束后把文档快照写到该路径
    #[arg(long, value_name = "PATH")]
    save: Option<PathBuf>,

    /// 打印可用命令后退出
    #[arg(long)]
    list_commands: bool,

    /// 要执行的单条命令；缺省时执行完整的立面生成流程
    command: Option<String>,

    /// 命令参数，可重复
    #[arg(long = "arg", value_name = "VALUE")]
    args: Vec<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let config = load_configuration(args.config.clone());
    init_logging(&config);
    info!("启动 ZBIM 明细表生成工具");

    match run(args, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "运行失败");
            eprintln!("错误：{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args, config: AppConfig) -> anyhow::Result<()> {
    let designation =
        ElevationDesignation::new(args.designation.unwrap_or(config.pipeline.designation));
    let sheet_filter = args
        .sheet_filter
        .unwrap_or(config.pipeline.sheet_index_filter);

    let mut loaded = loader::load_session(args.document.as_deref(), designation)
        .context("无法加载文档快照")?;

    let options = cli::RunOptions {
        command: args
            .command
            .map(|name| CommandRequest::new(name, args.args)),
        sheet_filter,
        legend: config.legend,
        list_commands: args.list_commands,
    };
    cli::run(&mut loaded, &options)?;

    if let Some(path) = args.save {
        JsonFacade::pretty()
            .save(loaded.session.document(), &path)
            .with_context(|| format!("保存文档到 {} 失败", path.display()))?;
        info!(path = %path.display(), "已保存文档快照");
        println!("文档已保存：{}", path.display());
    }
    Ok(())
}

fn load_configuration(override_path: Option<PathBuf>) -> AppConfig {
    match override_path {
        Some(path) => AppConfig::from_file(&path).unwrap_or_else(|err| {
            warn!(path = %path.display(), error = %err, "加载指定配置失败，使用默认配置");
            AppConfig::default()
        }),
        None => match AppConfig::discover() {
            Ok(cfg) => cfg,
            Err(err) => {
                match &err {
                    ConfigError::Io { path, .. } | ConfigError::Parse { path, .. } => {
                        warn!(path = %path.display(), error = %err, "加载默认配置失败，使用内建默认值");
                    }
                    ConfigError::Context { .. } => {
                        warn!(error = %err, "加载默认配置失败，使用内建默认值");
                    }
                }
                AppConfig::default()
            }
        },
    }
}

fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_new(config.logging.level.clone()).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if subscriber.try_init().is_err() {
        // 已初始化，忽略
    }
}
