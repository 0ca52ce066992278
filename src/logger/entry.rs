//! 日志条目定义
//!
//! 序列化字段名与导出文件保持一致（camelCase）。

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use serde_json::Value;
use uuid::Uuid;

/// 替代真实 Authorization 值的占位符
pub const REDACTED: &str = "[REDACTED]";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn label(&self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Request,
    Response,
    ApiError,
}

/// 条目 ID：毫秒时间戳 + 9 位随机字符
pub(crate) fn new_entry_id(now: DateTime<Utc>) -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!("{}{}", now.timestamp_millis(), &random[..9])
}

/// 与浏览器 `toISOString()` 一致的格式
pub fn iso_millis(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn serialize_ts<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&iso_millis(ts))
}

// =========================================================
// 通用日志
// =========================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub id: String,
    #[serde(serialize_with = "serialize_ts")]
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub module: String,
    pub message: String,
    pub data: Option<Value>,
    pub url: Option<String>,
}

// =========================================================
// 请求 / 响应 / 错误记录
// =========================================================

/// 记录下来的请求头，只保留可公开的部分
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecordedHeaders {
    #[serde(rename = "Authorization", skip_serializing_if = "Option::is_none")]
    pub authorization: Option<String>,
    #[serde(rename = "Content-Type", skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestRecord {
    pub id: String,
    #[serde(serialize_with = "serialize_ts")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: RecordKind,
    pub method: String,
    /// 相对路径（不含基础地址）
    pub url: String,
    pub full_url: String,
    pub params: Option<Value>,
    pub data: Option<Value>,
    pub headers: RecordedHeaders,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseRecord {
    pub id: String,
    #[serde(serialize_with = "serialize_ts")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: RecordKind,
    pub method: String,
    pub url: String,
    pub status: u16,
    pub status_text: String,
    /// 耗时（毫秒）
    #[serde(rename = "duration")]
    pub duration_ms: i64,
    pub data_size: usize,
}

/// 请求失败时由管线提供的上下文
#[derive(Debug, Clone, Default)]
pub struct FailureContext {
    pub method: Option<String>,
    pub url: Option<String>,
    pub status: Option<u16>,
    pub status_text: Option<String>,
    /// 传输层或 HTTP 层的错误描述，服务端未给出 message 时使用
    pub error_message: String,
    pub response_data: Option<Value>,
    pub stack: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorRecord {
    pub id: String,
    #[serde(serialize_with = "serialize_ts")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub kind: RecordKind,
    pub method: Option<String>,
    pub url: Option<String>,
    pub status: Option<u16>,
    pub status_text: Option<String>,
    pub message: String,
    pub error_code: Option<Value>,
    pub response_data: Option<Value>,
    pub stack: Option<String>,
}

// =========================================================
// 快照与导出
// =========================================================

#[derive(Debug, Clone, Serialize)]
pub struct LogSnapshot {
    pub logs: Vec<LogEntry>,
    pub errors: Vec<LogEntry>,
    pub requests: Vec<RequestRecord>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub export_time: String,
    pub user_agent: Option<String>,
    pub url: Option<String>,
    #[serde(flatten)]
    pub snapshot: LogSnapshot,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_id_shape() {
        let now = Utc::now();
        let id = new_entry_id(now);
        let millis = now.timestamp_millis().to_string();
        assert!(id.starts_with(&millis));
        assert_eq!(id.len(), millis.len() + 9);
        assert_ne!(new_entry_id(now), id);
    }

    #[test]
    fn test_headers_serialize_with_wire_names() {
        let headers = RecordedHeaders {
            authorization: Some(REDACTED.to_string()),
            content_type: None,
        };
        let json = serde_json::to_value(&headers).unwrap();
        assert_eq!(json, serde_json::json!({ "Authorization": "[REDACTED]" }));
    }
}
