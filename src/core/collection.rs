use log::debug;
use serde_json::Value;

use crate::models::api_definition::{ApiDefinition, RequestBody};
use crate::models::error::EngineError;

/// 把Postman风格的collection转换成接口列表，文件夹会被展开
pub fn parse_postman_collection(collection: &Value) -> Result<Vec<ApiDefinition>, EngineError> {
    let items = collection
        .get("item")
        .and_then(Value::as_array)
        .ok_or_else(|| EngineError::validation("collection缺少item数组"))?;
    let mut apis = Vec::new();
    collect_items(items, &mut apis)?;
    debug!("从collection中导入了{}个接口", apis.len());
    Ok(apis)
}

fn collect_items(items: &[Value], apis: &mut Vec<ApiDefinition>) -> Result<(), EngineError> {
    for item in items {
        // 文件夹
        if let Some(children) = item.get("item").and_then(Value::as_array) {
            collect_items(children, apis)?;
            continue;
        }
        let Some(request) = item.get("request") else {
            continue;
        };
        apis.push(parse_request(item, request)?);
    }
    Ok(())
}

fn parse_request(item: &Value, request: &Value) -> Result<ApiDefinition, EngineError> {
    // request也可以直接是一个url字符串
    if let Some(url) = request.as_str() {
        return Ok(with_item_name(ApiDefinition::new("GET", url)?, item));
    }
    let method = request.get("method").and_then(Value::as_str).unwrap_or("GET");
    let url = match request.get("url") {
        Some(Value::String(url)) => url.clone(),
        Some(url) => url
            .get("raw")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        None => String::new(),
    };
    let mut api = ApiDefinition::new(method, url)?;
    if let Some(headers) = request.get("header").and_then(Value::as_array) {
        for header in headers {
            if header.get("disabled").and_then(Value::as_bool).unwrap_or(false) {
                continue;
            }
            let key = header.get("key").and_then(Value::as_str);
            let value = header.get("value").and_then(Value::as_str).unwrap_or_default();
            if let Some(key) = key {
                api = api.with_header(key, value);
            }
        }
    }
    if let Some(raw) = request
        .get("body")
        .and_then(|body| body.get("raw"))
        .and_then(Value::as_str)
    {
        api = api.with_body(RequestBody::from_text(raw));
    }
    Ok(with_item_name(api, item))
}

fn with_item_name(api: ApiDefinition, item: &Value) -> ApiDefinition {
    match item.get("name").and_then(Value::as_str) {
        Some(name) if !name.trim().is_empty() => api.with_name(name),
        _ => api,
    }
}

/// 解析 `Name: value` 形式的请求头
pub fn parse_header_line(line: &str) -> Result<(String, String), EngineError> {
    let parts: Vec<&str> = line.splitn(2, ':').collect();
    if parts.len() != 2 || parts[0].trim().is_empty() {
        return Err(EngineError::validation(format!("无法解析请求头: '{}'", line)));
    }
    Ok((parts[0].trim().to_string(), parts[1].trim().to_string()))
}
