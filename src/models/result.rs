use serde::{Deserialize, Serialize};

use crate::models::api_definition::HttpMethod;
use crate::models::http_error_stats::HttpErrorEntry;

/// 传输层失败时记录的状态码
pub const TRANSPORT_ERROR_STATUS: u16 = 500;

/// 单次请求的结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestResult {
    pub name: String,
    pub url: String,
    pub method: HttpMethod,
    pub user_id: usize,
    pub status_code: u16,
    // 从发出请求到读完响应的耗时(毫秒)
    pub response_time_ms: f64,
    pub bytes_received: u64,
    pub error_message: Option<String>,
}

impl RequestResult {
    pub fn is_error(&self) -> bool {
        self.status_code >= 400
    }
}

/// 单个url的统计
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointMetrics {
    pub url: String,
    pub total_requests: u64,
    pub err_count: u64,
    pub error_rate: f64,
    pub mean_response_time: f64,
    pub min_response_time: f64,
    pub max_response_time: f64,
    pub median_response_time: f64,
    pub response_time_90: f64,
    pub response_time_95: f64,
    pub response_time_99: f64,
    // 请求数 / (虚拟用户数 * 爬坡时间)
    pub throughput: f64,
    pub total_data_kb: f64,
}

/// 排行榜中的一项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEndpoint {
    pub url: String,
    pub value: f64,
}

/// 响应时间分布的一个桶，区间为毫秒闭区间
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatencyBucket {
    pub start_ms: u64,
    pub end_ms: u64,
    pub count: u64,
}

/// 整体统计结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestSummary {
    pub virtual_users: usize,
    pub ramp_up_secs: f64,
    pub total_requests: u64,
    pub err_count: u64,
    pub error_rate: f64,
    pub success_rate: f64,
    pub mean_response_time: f64,
    pub min_response_time: f64,
    pub max_response_time: f64,
    pub median_response_time: f64,
    pub response_time_90: f64,
    pub response_time_95: f64,
    pub response_time_99: f64,
    pub throughput: f64,
    pub total_data_kb: f64,
    // 按url排序
    pub api_results: Vec<EndpointMetrics>,
    // 所有请求都成功的url
    pub successful_urls: Vec<String>,
    pub top_error_rates: Vec<RankedEndpoint>,
    // 只在全部成功的url里排
    pub slowest_successful: Vec<RankedEndpoint>,
    pub http_errors: Vec<HttpErrorEntry>,
    pub latency_distribution: Vec<LatencyBucket>,
}

impl TestSummary {
    pub fn endpoint(&self, url: &str) -> Option<&EndpointMetrics> {
        self.api_results.iter().find(|api| api.url == url)
    }
}
