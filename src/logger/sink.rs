//! 控制台输出
//!
//! 每条日志在写入缓冲区后同步输出到控制台。浏览器端的实现在
//! frontend `web::console`，原生环境走 `tracing`。

use serde_json::Value;

use super::entry::LogLevel;

pub trait ConsoleSink: Send + Sync {
    /// `line` 形如 `[INFO] [API] Request: GET /apps`
    fn write(&self, level: LogLevel, line: &str, data: Option<&Value>);
}

/// 以 `tracing` 事件输出
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ConsoleSink for TracingSink {
    fn write(&self, level: LogLevel, line: &str, data: Option<&Value>) {
        let data = data.map(Value::to_string).unwrap_or_default();
        match level {
            LogLevel::Info => tracing::info!(target: "appconsole", data = %data, "{}", line),
            LogLevel::Warn => tracing::warn!(target: "appconsole", data = %data, "{}", line),
            LogLevel::Error => tracing::error!(target: "appconsole", data = %data, "{}", line),
        }
    }
}
