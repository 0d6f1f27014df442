use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::result::RequestResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpErrorEntry {
    pub url: String,
    pub status_code: u16,
    pub error_message: String,
    pub count: u32,
}

/// 错误分析：{(状态码, 错误信息, url): 次数}
#[derive(Debug, Default)]
pub struct HttpErrorStats {
    pub(crate) errors: HashMap<(u16, String, String), u32>,
}

impl HttpErrorStats {
    pub(crate) fn new() -> Self {
        HttpErrorStats {
            errors: HashMap::new(),
        }
    }

    // 增加一个错误和对应的出现次数
    pub(crate) fn increment(&mut self, status_code: u16, error_message: String, url: String) {
        *self.errors.entry((status_code, error_message, url)).or_insert(0) += 1;
    }

    pub(crate) fn from_results(results: &[RequestResult]) -> Self {
        let mut stats = HttpErrorStats::new();
        for result in results.iter().filter(|r| r.is_error()) {
            let message = result.error_message.clone().unwrap_or_default();
            stats.increment(result.status_code, message, result.url.clone());
        }
        stats
    }

    /// 次数多的在前，次数相同按url、状态码排序，保证输出稳定
    pub(crate) fn into_entries(self) -> Vec<HttpErrorEntry> {
        let mut entries: Vec<HttpErrorEntry> = self
            .errors
            .into_iter()
            .map(|((status_code, error_message, url), count)| HttpErrorEntry {
                url,
                status_code,
                error_message,
                count,
            })
            .collect();
        entries.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| a.url.cmp(&b.url))
                .then_with(|| a.status_code.cmp(&b.status_code))
                .then_with(|| a.error_message.cmp(&b.error_message))
        });
        entries
    }
}
