use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use log::{info, warn};
use serde::Serialize;
use serde_json::Value;
use simplelog::{CombinedLogger, ConfigBuilder, LevelFilter, SimpleLogger};
use time::macros::format_description;
use time::OffsetDateTime;
use tokio_util::sync::CancellationToken;

use api_pressure_engine::core::aggregator::aggregate_with_top_n;
use api_pressure_engine::core::collection::{parse_header_line, parse_postman_collection};
use api_pressure_engine::core::coordinator::run_test_with_cancel;
use api_pressure_engine::core::show_result_with_table::show_result_with_table;
use api_pressure_engine::models::api_definition::ApiDefinition;
use api_pressure_engine::models::args::Args;
use api_pressure_engine::models::result::{RequestResult, TestSummary};
use api_pressure_engine::models::test_config::TestConfiguration;

#[derive(Serialize)]
struct Report<'a> {
    config: &'a TestConfiguration,
    summary: &'a TestSummary,
    results: &'a [RequestResult],
}

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    // 只输出本项目的日志，屏蔽hyper/reqwest
    let config = ConfigBuilder::new().add_filter_allow_str("api_pressure").build();
    if let Err(e) = CombinedLogger::init(vec![SimpleLogger::new(level, config)]) {
        eprintln!("初始化日志失败: {}", e);
    }
}

fn load_apis(args: &Args) -> anyhow::Result<Vec<ApiDefinition>> {
    let mut apis = if let Some(path) = &args.collection {
        let content = fs::read_to_string(path)
            .with_context(|| format!("读取collection失败: {}", path.display()))?;
        let collection: Value = serde_json::from_str(&content).context("解析collection失败")?;
        parse_postman_collection(&collection)?
    } else if let Some(path) = &args.apis {
        let content =
            fs::read_to_string(path).with_context(|| format!("读取接口文件失败: {}", path.display()))?;
        serde_json::from_str::<Vec<ApiDefinition>>(&content).context("解析接口文件失败")?
    } else {
        Vec::new()
    };
    let mut extra = HashMap::new();
    for line in &args.headers {
        let (key, value) = parse_header_line(line)?;
        extra.insert(key, value);
    }
    if !extra.is_empty() {
        for api in apis.iter_mut() {
            api.merge_headers(&extra);
        }
    }
    Ok(apis)
}

fn output_path(output: &Path) -> anyhow::Result<PathBuf> {
    if !output.is_dir() {
        return Ok(output.to_path_buf());
    }
    let stamp = OffsetDateTime::now_utc()
        .format(format_description!("[year][month][day]_[hour][minute][second]"))
        .context("格式化时间失败")?;
    Ok(output.join(format!("performance_report_{}.json", stamp)))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logger(args.verbose);

    let apis = load_apis(&args)?;
    let mut config = TestConfiguration::new(args.users, args.ramp_up)
        .with_request_timeout(Duration::from_secs(args.timeout));
    if let Some(deadline) = args.deadline {
        config = config.with_deadline(Duration::from_secs(deadline));
    }

    // ctrl-c 取消，已完成的结果照常统计
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("收到ctrl-c, 正在停止压测");
                cancel.cancel();
            }
        });
    }

    let results = run_test_with_cancel(&apis, &config, cancel).await?;
    let summary = aggregate_with_top_n(&results, &config, args.top_n)?;
    show_result_with_table(&summary);

    if let Some(output) = &args.output {
        let path = output_path(output)?;
        let report = Report {
            config: &config,
            summary: &summary,
            results: &results,
        };
        let content = serde_json::to_string_pretty(&report).context("序列化结果失败")?;
        fs::write(&path, content).with_context(|| format!("写入结果失败: {}", path.display()))?;
        info!("结果已写入 {}", path.display());
    }
    Ok(())
}
