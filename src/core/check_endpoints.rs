use std::collections::HashSet;

use reqwest::header::{HeaderName, HeaderValue};
use reqwest::Url;

use crate::core::session::NamedApi;
use crate::models::api_definition::ApiDefinition;
use crate::models::error::EngineError;

/// 在任何网络请求之前校验接口列表，并给每个接口分配唯一的展示名
pub(crate) fn check_endpoints(apis: &[ApiDefinition]) -> Result<Vec<NamedApi>, EngineError> {
    if apis.is_empty() {
        return Err(EngineError::validation("接口列表不能为空"));
    }
    // 先占用显式指定的名称
    let mut names_set = HashSet::new();
    for api in apis {
        if let Some(name) = &api.name {
            if name.trim().is_empty() {
                return Err(EngineError::validation("api名称不能为空"));
            }
            if !names_set.insert(name.clone()) {
                return Err(EngineError::validation(format!("重复的name: {}", name)));
            }
        }
    }
    let mut named = Vec::with_capacity(apis.len());
    for (index, api) in apis.iter().enumerate() {
        check_url(api)?;
        check_headers(api)?;
        let name = match &api.name {
            Some(name) => name.clone(),
            None => {
                let derived = api.derived_name();
                let mut candidate = derived.clone();
                let mut seq = index + 1;
                while names_set.contains(&candidate) {
                    candidate = format!("{} #{}", derived, seq);
                    seq += 1;
                }
                names_set.insert(candidate.clone());
                candidate
            }
        };
        named.push(NamedApi {
            name,
            api: api.clone(),
        });
    }
    Ok(named)
}

fn check_url(api: &ApiDefinition) -> Result<(), EngineError> {
    if api.url.trim().is_empty() {
        return Err(EngineError::validation("url不能为空"));
    }
    let url = Url::parse(api.url.trim())
        .map_err(|e| EngineError::validation(format!("无效的url {:?}: {}", api.url, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(EngineError::validation(format!(
            "只支持http/https, 实际为{}: {}",
            other, api.url
        ))),
    }
}

fn check_headers(api: &ApiDefinition) -> Result<(), EngineError> {
    let mut seen = HashSet::new();
    for (key, value) in &api.headers {
        if key.trim().parse::<HeaderName>().is_err() {
            return Err(EngineError::validation(format!("无效的header名称: {:?}", key)));
        }
        if HeaderValue::from_str(value.trim()).is_err() {
            return Err(EngineError::validation(format!("无效的header值: {:?}", value)));
        }
        if !seen.insert(key.trim().to_ascii_lowercase()) {
            return Err(EngineError::validation(format!("重复的header: {}", key)));
        }
    }
    Ok(())
}
