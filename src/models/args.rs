use std::path::PathBuf;

use clap::{ArgGroup, Parser};

use crate::models::test_config::{DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_TOP_N};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(group(ArgGroup::new("input").required(true).args(["apis", "collection"])))]
pub struct Args {
    /// 接口列表json文件
    #[arg(short, long)]
    pub apis: Option<PathBuf>,

    /// Postman collection文件
    #[arg(short, long)]
    pub collection: Option<PathBuf>,

    /// 虚拟用户数
    #[arg(short, long, default_value_t = 10)]
    pub users: usize,

    /// 爬坡时间（秒）
    #[arg(short, long, default_value_t = 5.0)]
    pub ramp_up: f64,

    /// 单个请求超时时间（秒）
    #[arg(short, long, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub timeout: u64,

    /// 整体截止时间（秒）
    #[arg(long)]
    pub deadline: Option<u64>,

    /// 追加到每个接口的请求头，格式 "Name: value"，可重复
    #[arg(short = 'H', long = "header")]
    pub headers: Vec<String>,

    /// 排行榜数量
    #[arg(long, default_value_t = DEFAULT_TOP_N)]
    pub top_n: usize,

    /// 结果输出文件，传目录时自动生成文件名
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 日志详细程度，可叠加
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
