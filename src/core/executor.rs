use std::error::Error as StdError;
use std::time::{Duration, Instant};

use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, RequestBuilder};
use tokio_util::sync::CancellationToken;

use crate::models::api_definition::{ApiDefinition, RequestBody};
use crate::models::result::{RequestResult, TRANSPORT_ERROR_STATUS};

/// 错误响应体最多保留的字符数
pub const MAX_ERROR_MESSAGE_CHARS: usize = 500;

/// `<包名> <版本> (<系统>; <系统版本>)`
pub fn default_user_agent() -> String {
    let info = os_info::get();
    format!(
        "{} {} ({}; {})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        info.os_type(),
        info.version()
    )
}

/// 执行单个请求，所有失败都会被转换成`RequestResult`，不会向上抛
#[derive(Clone)]
pub struct RequestExecutor {
    client: Client,
    timeout: Duration,
    user_agent: String,
}

impl RequestExecutor {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(RequestExecutor {
            client,
            timeout,
            user_agent: default_user_agent(),
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn execute(&self, api: &ApiDefinition, name: &str, user_id: usize) -> RequestResult {
        let mut result = RequestResult {
            name: name.to_string(),
            url: api.url.clone(),
            method: api.method,
            user_id,
            status_code: TRANSPORT_ERROR_STATUS,
            response_time_ms: 0.0,
            bytes_received: 0,
            error_message: None,
        };
        let request = match self.build_request(api) {
            Ok(request) => request,
            Err(message) => {
                warn!("{}-构建请求失败: {}", name, message);
                result.error_message = Some(message);
                return result;
            }
        };
        // 记录开始时间
        let start = Instant::now();
        let outcome = self.send(request).await;
        result.response_time_ms = start.elapsed().as_secs_f64() * 1000.0;
        match outcome {
            Ok((status_code, bytes_received, error_message)) => {
                result.status_code = status_code;
                result.bytes_received = bytes_received;
                result.error_message = error_message;
                debug!(
                    "用户{} {} {} -> {} ({:.2}ms)",
                    user_id, api.method, api.url, status_code, result.response_time_ms
                );
            }
            Err(message) => {
                warn!("用户{} {} {} 请求失败: {}", user_id, api.method, api.url, message);
                result.error_message = Some(message);
            }
        }
        result
    }

    /// 取消时直接放弃正在进行的请求，返回`None`
    pub async fn execute_until_cancelled(
        &self,
        api: &ApiDefinition,
        name: &str,
        user_id: usize,
        cancel: &CancellationToken,
    ) -> Option<RequestResult> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!("用户{} {} 请求被取消", user_id, api.url);
                None
            }
            result = self.execute(api, name, user_id) => Some(result),
        }
    }

    fn build_request(&self, api: &ApiDefinition) -> Result<RequestBuilder, String> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&self.user_agent).map_err(|e| format!("无效的User-Agent: {}", e))?,
        );
        for (key, value) in &api.headers {
            let header_name = key
                .trim()
                .parse::<HeaderName>()
                .map_err(|_| format!("无法解析头部名称: '{}'", key))?;
            let header_value =
                HeaderValue::from_str(value.trim()).map_err(|_| format!("无法解析头部值: '{}'", value))?;
            headers.insert(header_name, header_value);
        }
        let mut request = self.client.request(api.method.to_reqwest(), &api.url);
        match &api.body {
            RequestBody::Empty => {}
            RequestBody::Json(json) => {
                let bytes = serde_json::to_vec(json).map_err(|e| format!("序列化json失败: {}", e))?;
                if !headers.contains_key(CONTENT_TYPE) {
                    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                }
                request = request.body(bytes);
            }
            RequestBody::Raw(text) => {
                request = request.body(text.clone());
            }
        }
        Ok(request.headers(headers))
    }

    // 返回 (状态码, 响应大小, 错误信息)
    async fn send(&self, request: RequestBuilder) -> Result<(u16, u64, Option<String>), String> {
        let response = request.send().await.map_err(|e| self.describe(&e))?;
        let status = response.status();
        let status_code = status.as_u16();
        let body = response.bytes().await.map_err(|e| self.describe(&e))?;
        let bytes_received = body.len() as u64;
        if status_code < 400 {
            return Ok((status_code, bytes_received, None));
        }
        let text = String::from_utf8_lossy(&body);
        let message = if text.trim().is_empty() {
            format!("HTTP 错误: 状态码 {} {}", status_code, status.canonical_reason().unwrap_or(""))
                .trim_end()
                .to_string()
        } else {
            truncate_chars(&text, MAX_ERROR_MESSAGE_CHARS)
        };
        Ok((status_code, bytes_received, Some(message)))
    }

    fn describe(&self, err: &reqwest::Error) -> String {
        let mut message = if err.is_timeout() {
            format!("请求超时({}s): {}", self.timeout.as_secs_f64(), err)
        } else if err.is_connect() {
            format!("连接失败: {}", err)
        } else {
            err.to_string()
        };
        let mut source = err.source();
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        message
    }
}

pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => text[..index].to_string(),
        None => text.to_string(),
    }
}
