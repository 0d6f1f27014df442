use prettytable::{format, row, Cell, Row, Table};

use crate::models::result::{RankedEndpoint, TestSummary};

fn new_table() -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_NO_BORDER_LINE_SEPARATOR);
    table
}

fn ranking_table(title: &str, unit: &str, ranked: &[RankedEndpoint]) {
    if ranked.is_empty() {
        return;
    }
    let mut table = new_table();
    table.add_row(row!["url", title]);
    for item in ranked {
        table.add_row(row![item.url, format!("{:.2}{}", item.value, unit)]);
    }
    println!("{}:", title);
    table.printstd();
}

pub fn show_result_with_table(result: &TestSummary) {
    let mut table = new_table();
    table.add_row(row!["指标", "值"]);
    table.add_row(row!["虚拟用户数", format!("{}", result.virtual_users)]);
    table.add_row(row!["爬坡时间", format!("{}s", result.ramp_up_secs)]);
    table.add_row(row!["总请求数", format!("{}", result.total_requests)]);
    table.add_row(row!["错误数量", format!("{}", result.err_count)]);
    table.add_row(row!["错误率", format!("{:.2}%", result.error_rate)]);
    table.add_row(row!["吞吐量", format!("{:.3} req/s", result.throughput)]);
    table.add_row(row!["平均响应时间", format!("{:.2}ms", result.mean_response_time)]);
    table.add_row(row!["最大响应时间", format!("{:.2}ms", result.max_response_time)]);
    table.add_row(row!["最小响应时间", format!("{:.2}ms", result.min_response_time)]);
    table.add_row(row!["中位响应时间", format!("{:.2}ms", result.median_response_time)]);
    table.add_row(row!["90%响应时间", format!("{:.2}ms", result.response_time_90)]);
    table.add_row(row!["95%响应时间", format!("{:.2}ms", result.response_time_95)]);
    table.add_row(row!["99%响应时间", format!("{:.2}ms", result.response_time_99)]);
    table.add_row(row!["总数据量", format!("{:.2}kb", result.total_data_kb)]);
    println!("压测结果:");
    table.printstd();

    let mut api_table = new_table();
    api_table.add_row(row!["url", "请求数", "错误率", "平均", "最小", "最大", "p90", "p95", "p99"]);
    for api in &result.api_results {
        api_table.add_row(row![
            api.url,
            format!("{}", api.total_requests),
            format!("{:.2}%", api.error_rate),
            format!("{:.2}ms", api.mean_response_time),
            format!("{:.2}ms", api.min_response_time),
            format!("{:.2}ms", api.max_response_time),
            format!("{:.2}ms", api.response_time_90),
            format!("{:.2}ms", api.response_time_95),
            format!("{:.2}ms", api.response_time_99),
        ]);
    }
    println!("接口详情:");
    api_table.printstd();

    ranking_table("错误率最高的接口", "%", &result.top_error_rates);
    ranking_table("最慢的接口(仅全部成功)", "ms", &result.slowest_successful);

    if !result.http_errors.is_empty() {
        let mut errors_table = new_table();
        errors_table.add_row(row!["url", "错误代码", "错误信息", "次数"]);
        for e in &result.http_errors {
            errors_table.add_row(Row::new(vec![
                Cell::new(&e.url),
                Cell::new(format!("{:03}", e.status_code).as_str()),
                Cell::new(&format!("{:?}", e.error_message)).style_spec("R"),
                Cell::new(format!("{}", e.count).as_str()),
            ]));
        }
        println!("HTTP 错误:");
        errors_table.printstd();
    }
}
