use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::error::EngineError;

/// 支持的请求方法
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE", try_from = "String")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }

    pub(crate) fn to_reqwest(self) -> reqwest::Method {
        match self {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Patch => reqwest::Method::PATCH,
        }
    }
}

impl FromStr for HttpMethod {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            "PATCH" => Ok(HttpMethod::Patch),
            other => Err(EngineError::validation(format!("不支持的请求方法: {:?}", other))),
        }
    }
}

impl TryFrom<String> for HttpMethod {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 请求体
///
/// 输入是松散的json：缺失或`null`为空，字符串会先尝试按json解析，
/// 解析不了就原样发送。
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Option<Value>", into = "Option<Value>")]
pub enum RequestBody {
    #[default]
    Empty,
    Json(Value),
    Raw(String),
}

impl RequestBody {
    pub fn from_text(text: &str) -> Self {
        if text.trim().is_empty() {
            return RequestBody::Empty;
        }
        // 只解析一层，解析出的字符串也按json字符串发送
        match serde_json::from_str::<Value>(text) {
            Ok(Value::Null) => RequestBody::Empty,
            Ok(json) => RequestBody::Json(json),
            Err(_) => RequestBody::Raw(text.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, RequestBody::Empty)
    }
}

impl From<Option<Value>> for RequestBody {
    fn from(value: Option<Value>) -> Self {
        match value {
            None | Some(Value::Null) => RequestBody::Empty,
            Some(Value::String(text)) => RequestBody::from_text(&text),
            Some(json) => RequestBody::Json(json),
        }
    }
}

impl From<RequestBody> for Option<Value> {
    fn from(body: RequestBody) -> Self {
        match body {
            RequestBody::Empty => None,
            // json字符串写成json文本，和Raw区分开
            RequestBody::Json(json @ Value::String(_)) => Some(Value::String(json.to_string())),
            RequestBody::Json(json) => Some(json),
            RequestBody::Raw(text) => Some(Value::String(text)),
        }
    }
}

/// 一个待压测的接口
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiDefinition {
    #[serde(default)]
    pub name: Option<String>,
    pub url: String,
    pub method: HttpMethod,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub body: RequestBody,
}

impl ApiDefinition {
    pub fn new(method: &str, url: impl Into<String>) -> Result<Self, EngineError> {
        Ok(ApiDefinition {
            name: None,
            url: url.into(),
            method: method.parse()?,
            headers: HashMap::new(),
            body: RequestBody::Empty,
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_header(key.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    /// 合并额外的请求头(比如鉴权头)，同名(不区分大小写)的旧值会被覆盖
    pub fn merge_headers(&mut self, extra: &HashMap<String, String>) {
        for (key, value) in extra {
            self.set_header(key.clone(), value.clone());
        }
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    pub fn has_header(&self, key: &str) -> bool {
        self.header(key).is_some()
    }

    /// 没有显式名称时用 `METHOD path` 作为展示名
    pub fn derived_name(&self) -> String {
        let path = match reqwest::Url::parse(&self.url) {
            Ok(url) => url.path().to_string(),
            Err(_) => self.url.clone(),
        };
        format!("{} {}", self.method, path)
    }

    fn set_header(&mut self, key: String, value: String) {
        self.headers.retain(|k, _| !k.eq_ignore_ascii_case(&key));
        self.headers.insert(key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_method_is_case_insensitive() {
        assert_eq!("get".parse::<HttpMethod>().unwrap(), HttpMethod::Get);
        assert_eq!(" Patch ".parse::<HttpMethod>().unwrap(), HttpMethod::Patch);
        assert!("HEAD".parse::<HttpMethod>().unwrap_err().is_validation());
    }

    #[test]
    fn test_method_serializes_uppercase() {
        let method: HttpMethod = serde_json::from_value(json!("delete")).unwrap();
        assert_eq!(method, HttpMethod::Delete);
        assert_eq!(serde_json::to_value(method).unwrap(), json!("DELETE"));
        assert!(serde_json::from_value::<HttpMethod>(json!("OPTIONS")).is_err());
    }

    #[test]
    fn test_body_variants() {
        assert_eq!(RequestBody::from(None), RequestBody::Empty);
        assert_eq!(RequestBody::from(Some(Value::Null)), RequestBody::Empty);
        assert_eq!(RequestBody::from_text("   "), RequestBody::Empty);
        assert_eq!(
            RequestBody::from_text(r#"{"a": 1}"#),
            RequestBody::Json(json!({"a": 1}))
        );
        assert_eq!(
            RequestBody::from_text("a=1&b=2"),
            RequestBody::Raw("a=1&b=2".to_string())
        );
        assert_eq!(
            RequestBody::from(Some(json!([1, 2]))),
            RequestBody::Json(json!([1, 2]))
        );
    }

    #[test]
    fn test_json_string_body_survives_serde() {
        assert_eq!(
            RequestBody::from_text(r#""hi""#),
            RequestBody::Json(Value::String("hi".to_string()))
        );
        for body in [
            RequestBody::Json(Value::String("hi".to_string())),
            RequestBody::Json(Value::String(r#"{"a": 1}"#.to_string())),
            RequestBody::Raw("a=1&b=2".to_string()),
            RequestBody::Json(json!({"a": "b"})),
            RequestBody::Empty,
        ] {
            let encoded = serde_json::to_value(&body).unwrap();
            let decoded: RequestBody = serde_json::from_value(encoded).unwrap();
            assert_eq!(decoded, body);
        }
    }

    #[test]
    fn test_definition_from_json() {
        let api: ApiDefinition = serde_json::from_value(json!({
            "url": "http://localhost/users",
            "method": "post",
            "headers": {"X-Trace": "1"},
            "body": "{\"name\": \"bob\"}"
        }))
        .unwrap();
        assert_eq!(api.method, HttpMethod::Post);
        assert_eq!(api.body, RequestBody::Json(json!({"name": "bob"})));
        assert_eq!(api.header("x-trace"), Some("1"));
        assert!(api.name.is_none());

        let api: ApiDefinition =
            serde_json::from_value(json!({"url": "http://localhost/", "method": "GET"})).unwrap();
        assert!(api.body.is_empty());
        assert!(api.headers.is_empty());
    }

    #[test]
    fn test_merge_headers_overrides_case_insensitively() {
        let mut api = ApiDefinition::new("GET", "http://localhost/")
            .unwrap()
            .with_header("authorization", "Bearer old")
            .with_header("Accept", "text/plain");
        let mut auth = HashMap::new();
        auth.insert("Authorization".to_string(), "Bearer new".to_string());
        api.merge_headers(&auth);

        assert_eq!(api.headers.len(), 2);
        assert_eq!(api.header("AUTHORIZATION"), Some("Bearer new"));
        assert_eq!(api.headers.get("Authorization").map(String::as_str), Some("Bearer new"));
    }

    #[test]
    fn test_derived_name_uses_path() {
        let api = ApiDefinition::new("put", "https://example.com/v1/items?id=3").unwrap();
        assert_eq!(api.derived_name(), "PUT /v1/items");
    }
}
