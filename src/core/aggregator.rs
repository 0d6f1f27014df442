use std::cmp::Ordering;
use std::collections::BTreeMap;

use histogram::Histogram;
use log::warn;

use crate::models::error::{EngineError, EngineResult};
use crate::models::http_error_stats::HttpErrorStats;
use crate::models::result::{EndpointMetrics, LatencyBucket, RankedEndpoint, RequestResult, TestSummary};
use crate::models::test_config::{TestConfiguration, DEFAULT_TOP_N};

// 分布统计的桶精度和上限(2^20毫秒)
const HISTOGRAM_GROUPING_POWER: u8 = 7;
const HISTOGRAM_MAX_VALUE_POWER: u8 = 20;

/// 线性插值百分位，`sorted`必须升序；空切片返回`None`
pub fn percentile(sorted: &[f64], p: f64) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let rank = (p / 100.0).clamp(0.0, 1.0) * last as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}

struct LatencyStats {
    mean: f64,
    min: f64,
    max: f64,
    p50: f64,
    p90: f64,
    p95: f64,
    p99: f64,
}

impl LatencyStats {
    // 在排好序的数据上求和，结果和输入顺序无关
    fn from_results<'a>(results: impl Iterator<Item = &'a RequestResult>) -> LatencyStats {
        let mut times: Vec<f64> = results.map(|r| r.response_time_ms).collect();
        times.sort_by(f64::total_cmp);
        let sum: f64 = times.iter().sum();
        // 分组不会为空，空的时候全部记0
        let at = |p: f64| percentile(&times, p).unwrap_or_default();
        LatencyStats {
            mean: if times.is_empty() { 0.0 } else { sum / times.len() as f64 },
            min: times.first().copied().unwrap_or_default(),
            max: times.last().copied().unwrap_or_default(),
            p50: at(50.0),
            p90: at(90.0),
            p95: at(95.0),
            p99: at(99.0),
        }
    }
}

fn error_rate(err_count: u64, total: u64) -> f64 {
    err_count as f64 / total as f64 * 100.0
}

/// 吞吐量按配置计算: 请求数 / (虚拟用户数 * 爬坡时间)，不是实际运行时长
fn throughput(count: u64, config: &TestConfiguration) -> f64 {
    count as f64 / (config.virtual_users as f64 * config.ramp_up_secs)
}

fn total_data_kb<'a>(results: impl Iterator<Item = &'a RequestResult>) -> f64 {
    results.map(|r| r.bytes_received).sum::<u64>() as f64 / 1024.0
}

pub fn aggregate(results: &[RequestResult], config: &TestConfiguration) -> EngineResult<TestSummary> {
    aggregate_with_top_n(results, config, DEFAULT_TOP_N)
}

pub fn aggregate_with_top_n(
    results: &[RequestResult],
    config: &TestConfiguration,
    top_n: usize,
) -> EngineResult<TestSummary> {
    if results.is_empty() {
        return Err(EngineError::NoData);
    }
    let total_requests = results.len() as u64;
    let err_count = results.iter().filter(|r| r.is_error()).count() as u64;
    let stats = LatencyStats::from_results(results.iter());

    // 按url分组
    let mut groups: BTreeMap<&str, Vec<&RequestResult>> = BTreeMap::new();
    for result in results {
        groups.entry(result.url.as_str()).or_default().push(result);
    }
    let api_results: Vec<EndpointMetrics> = groups
        .into_iter()
        .map(|(url, group)| {
            let count = group.len() as u64;
            let api_err_count = group.iter().filter(|r| r.is_error()).count() as u64;
            let api_stats = LatencyStats::from_results(group.iter().copied());
            EndpointMetrics {
                url: url.to_string(),
                total_requests: count,
                err_count: api_err_count,
                error_rate: error_rate(api_err_count, count),
                mean_response_time: api_stats.mean,
                min_response_time: api_stats.min,
                max_response_time: api_stats.max,
                median_response_time: api_stats.p50,
                response_time_90: api_stats.p90,
                response_time_95: api_stats.p95,
                response_time_99: api_stats.p99,
                throughput: throughput(count, config),
                total_data_kb: total_data_kb(group.iter().copied()),
            }
        })
        .collect();

    let successful_urls: Vec<String> = api_results
        .iter()
        .filter(|api| api.err_count == 0)
        .map(|api| api.url.clone())
        .collect();
    let top_error_rates = rank(
        api_results.iter().filter(|api| api.err_count > 0),
        |api| api.error_rate,
        top_n,
    );
    // 有失败的url不参与慢接口排名，避免超时拉高平均值
    let slowest_successful = rank(
        api_results.iter().filter(|api| api.err_count == 0),
        |api| api.mean_response_time,
        top_n,
    );

    Ok(TestSummary {
        virtual_users: config.virtual_users,
        ramp_up_secs: config.ramp_up_secs,
        total_requests,
        err_count,
        error_rate: error_rate(err_count, total_requests),
        success_rate: error_rate(total_requests - err_count, total_requests),
        mean_response_time: stats.mean,
        min_response_time: stats.min,
        max_response_time: stats.max,
        median_response_time: stats.p50,
        response_time_90: stats.p90,
        response_time_95: stats.p95,
        response_time_99: stats.p99,
        throughput: throughput(total_requests, config),
        total_data_kb: total_data_kb(results.iter()),
        api_results,
        successful_urls,
        top_error_rates,
        slowest_successful,
        http_errors: HttpErrorStats::from_results(results).into_entries(),
        latency_distribution: latency_distribution(results),
    })
}

// 按value降序，相同时按url升序
fn rank<'a>(
    endpoints: impl Iterator<Item = &'a EndpointMetrics>,
    value: impl Fn(&EndpointMetrics) -> f64,
    top_n: usize,
) -> Vec<RankedEndpoint> {
    let mut ranked: Vec<RankedEndpoint> = endpoints
        .map(|api| RankedEndpoint {
            url: api.url.clone(),
            value: value(api),
        })
        .collect();
    ranked.sort_by(|a, b| match b.value.total_cmp(&a.value) {
        Ordering::Equal => a.url.cmp(&b.url),
        other => other,
    });
    ranked.truncate(top_n);
    ranked
}

/// 响应时间分布，只返回有数据的桶
pub fn latency_distribution(results: &[RequestResult]) -> Vec<LatencyBucket> {
    let mut histogram = match Histogram::new(HISTOGRAM_GROUPING_POWER, HISTOGRAM_MAX_VALUE_POWER) {
        Ok(histogram) => histogram,
        Err(e) => {
            warn!("histogram初始化失败:{:?}", e);
            return Vec::new();
        }
    };
    let max_value = (1u64 << HISTOGRAM_MAX_VALUE_POWER) - 1;
    for result in results {
        let value = (result.response_time_ms.round() as u64).min(max_value);
        if let Err(e) = histogram.increment(value) {
            warn!("histogram设置数据错误:{:?}", e);
        }
    }
    let mut buckets = Vec::new();
    for bucket in &histogram {
        if bucket.count() == 0 {
            continue;
        }
        let range = bucket.range();
        buckets.push(LatencyBucket {
            start_ms: *range.start(),
            end_ms: *range.end(),
            count: bucket.count(),
        });
    }
    buckets
}
