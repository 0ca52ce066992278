//! 系统日志收集器
//!
//! 三个有界序列：
//! - `logs`: 所有日志
//! - `errors`: 错误级别日志（同时也写入 `logs`）
//! - `requests`: 发出的 API 请求
//!
//! 实例通过 `Arc<SystemLogger>` 显式注入到请求管线、诊断接口和前端上下文。

mod entry;
mod sink;

pub use entry::{
    ApiErrorRecord, ExportDocument, FailureContext, LogEntry, LogLevel, LogSnapshot, RecordKind,
    RecordedHeaders, RequestRecord, ResponseRecord, REDACTED, iso_millis,
};
pub use sink::{ConsoleSink, TracingSink};

use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use serde_json::{Value, json};

use crate::host::HostInfo;
use crate::request::{HttpMethod, HttpRequest, HttpResponse};
use crate::ring::RingBuffer;
use entry::new_entry_id;

/// 读取最近日志时的默认条数
pub const DEFAULT_RECENT: usize = 20;

struct Buffers {
    logs: RingBuffer<LogEntry>,
    errors: RingBuffer<LogEntry>,
    requests: RingBuffer<RequestRecord>,
}

pub struct SystemLogger {
    buffers: Mutex<Buffers>,
    sink: Box<dyn ConsoleSink>,
    host: Arc<dyn HostInfo>,
}

impl SystemLogger {
    pub fn new(capacity: usize, sink: impl ConsoleSink + 'static, host: Arc<dyn HostInfo>) -> Self {
        Self {
            buffers: Mutex::new(Buffers {
                logs: RingBuffer::new(capacity),
                errors: RingBuffer::new(capacity),
                requests: RingBuffer::new(capacity),
            }),
            sink: Box::new(sink),
            host,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buffers.lock().logs.capacity()
    }

    // =========================================================
    // 通用日志
    // =========================================================

    pub fn log(
        &self,
        level: LogLevel,
        module: &str,
        message: impl Into<String>,
        data: Option<Value>,
    ) -> LogEntry {
        let entry = self.new_entry(level, module, message.into(), data);
        store(&mut self.buffers.lock(), &entry);
        self.emit(&entry);
        entry
    }

    fn new_entry(&self, level: LogLevel, module: &str, message: String, data: Option<Value>) -> LogEntry {
        let now = Utc::now();
        LogEntry {
            id: new_entry_id(now),
            timestamp: now,
            level,
            module: module.to_string(),
            message,
            data,
            url: self.host.current_url(),
        }
    }

    fn emit(&self, entry: &LogEntry) {
        let line = format!("[{}] [{}] {}", entry.level.label(), entry.module, entry.message);
        self.sink.write(entry.level, &line, entry.data.as_ref());
    }

    pub fn info(&self, module: &str, message: impl Into<String>, data: Option<Value>) -> LogEntry {
        self.log(LogLevel::Info, module, message, data)
    }

    pub fn warn(&self, module: &str, message: impl Into<String>, data: Option<Value>) -> LogEntry {
        self.log(LogLevel::Warn, module, message, data)
    }

    pub fn error(&self, module: &str, message: impl Into<String>, data: Option<Value>) -> LogEntry {
        self.log(LogLevel::Error, module, message, data)
    }

    // =========================================================
    // API 请求日志
    // =========================================================

    /// 记录发出的请求。Authorization 只记录占位符。
    pub fn log_request(
        &self,
        method: HttpMethod,
        path: &str,
        http: &HttpRequest,
        params: Option<Value>,
        data: Option<Value>,
    ) -> RequestRecord {
        let now = Utc::now();
        let full_url = http.url.split('?').next().unwrap_or_default().to_string();
        let record = RequestRecord {
            id: new_entry_id(now),
            timestamp: now,
            kind: RecordKind::Request,
            method: method.as_str().to_string(),
            url: path.to_string(),
            full_url,
            params,
            data,
            headers: RecordedHeaders {
                authorization: http.header("Authorization").map(|_| REDACTED.to_string()),
                content_type: http.header("Content-Type").map(str::to_string),
            },
        };

        self.buffers.lock().requests.push(record.clone());
        self.info(
            "API",
            format!("Request: {} {}", record.method, record.url),
            Some(json!({ "params": record.params })),
        );
        record
    }

    /// 记录响应，耗时从请求记录的时间戳算起
    pub fn log_response(&self, response: &HttpResponse, request: &RequestRecord) -> ResponseRecord {
        let now = Utc::now();
        let record = ResponseRecord {
            id: new_entry_id(now),
            timestamp: now,
            kind: RecordKind::Response,
            method: request.method.clone(),
            url: request.url.clone(),
            status: response.status,
            status_text: response.status_text.clone(),
            duration_ms: (now - request.timestamp).num_milliseconds(),
            data_size: serialized_len(&response.body),
        };

        self.info(
            "API",
            format!(
                "Response: {} {} - {} ({}ms)",
                record.method, record.url, record.status, record.duration_ms
            ),
            Some(json!({ "status": record.status, "dataSize": record.data_size })),
        );
        record
    }

    /// 记录失败的请求（写入 errors 序列）
    pub fn log_api_error(&self, failure: FailureContext) -> ApiErrorRecord {
        let now = Utc::now();
        let server_message = failure
            .response_data
            .as_ref()
            .and_then(|d| d.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string);
        let error_code = failure
            .response_data
            .as_ref()
            .and_then(|d| d.get("code"))
            .cloned();

        let record = ApiErrorRecord {
            id: new_entry_id(now),
            timestamp: now,
            kind: RecordKind::ApiError,
            method: failure.method,
            url: failure.url,
            status: failure.status,
            status_text: failure.status_text,
            message: server_message.unwrap_or(failure.error_message),
            error_code,
            response_data: failure.response_data,
            stack: failure.stack,
        };

        let status = record
            .status
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        let data = serde_json::to_value(&record).ok();
        self.error(
            "API",
            format!(
                "Error: {} {} - {}: {}",
                record.method.as_deref().unwrap_or("-"),
                record.url.as_deref().unwrap_or("-"),
                status,
                record.message
            ),
            data,
        );
        record
    }

    // =========================================================
    // 全局错误捕获
    // =========================================================

    /// 未捕获的异常
    pub fn capture_uncaught(&self, message: &str, detail: Value) -> LogEntry {
        self.error("Global", format!("Uncaught error: {}", message), Some(detail))
    }

    /// panic 记录
    ///
    /// panic 可能发生在持有缓冲区锁期间，因此只尝试加锁；
    /// 锁被占用时放弃记录并返回 `None`。
    pub fn capture_panic(&self, message: &str, detail: Value) -> Option<LogEntry> {
        let entry = self.new_entry(
            LogLevel::Error,
            "Global",
            format!("Uncaught panic: {}", message),
            Some(detail),
        );
        store(&mut *self.buffers.try_lock()?, &entry);
        self.emit(&entry);
        Some(entry)
    }

    /// 未处理的 Promise 拒绝
    pub fn capture_rejection(&self, reason: &str, stack: Option<&str>) -> LogEntry {
        self.error(
            "Global",
            format!("Unhandled promise rejection: {}", reason),
            Some(json!({ "reason": stack.unwrap_or(reason) })),
        )
    }

    /// 应用启动日志
    pub fn log_startup(&self, base_url: &str) -> LogEntry {
        self.info(
            "System",
            "Application initialized",
            Some(json!({
                "baseURL": base_url,
                "userAgent": self.host.user_agent(),
                "timestamp": iso_millis(&Utc::now()),
            })),
        )
    }

    // =========================================================
    // 读取与导出
    // =========================================================

    pub fn recent_logs(&self, count: usize) -> Vec<LogEntry> {
        self.buffers.lock().logs.recent_vec(count)
    }

    pub fn recent_errors(&self, count: usize) -> Vec<LogEntry> {
        self.buffers.lock().errors.recent_vec(count)
    }

    pub fn recent_requests(&self, count: usize) -> Vec<RequestRecord> {
        self.buffers.lock().requests.recent_vec(count)
    }

    pub fn snapshot(&self) -> LogSnapshot {
        let buffers = self.buffers.lock();
        LogSnapshot {
            logs: buffers.logs.to_vec(),
            errors: buffers.errors.to_vec(),
            requests: buffers.requests.to_vec(),
        }
    }

    pub fn export_document(&self) -> ExportDocument {
        ExportDocument {
            export_time: iso_millis(&Utc::now()),
            user_agent: self.host.user_agent(),
            url: self.host.current_url(),
            snapshot: self.snapshot(),
        }
    }

    /// 导出为格式化的 JSON
    pub fn export_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.export_document())
    }

    /// 清空三个序列，然后记录一条清空日志
    pub fn clear(&self) {
        {
            let mut buffers = self.buffers.lock();
            buffers.logs.clear();
            buffers.errors.clear();
            buffers.requests.clear();
        }
        self.info("System", "Logs cleared", None);
    }
}

/// 响应数据重新序列化后的长度（UTF-16 码元数），非 JSON 按字符串计，空响应为 `""`
fn serialized_len(body: &str) -> usize {
    let body = body.trim();
    let data = serde_json::from_str::<Value>(body).unwrap_or_else(|_| Value::String(body.to_string()));
    data.to_string().encode_utf16().count()
}

fn store(buffers: &mut Buffers, entry: &LogEntry) {
    buffers.logs.push(entry.clone());
    if entry.level == LogLevel::Error {
        buffers.errors.push(entry.clone());
    }
}

#[cfg(test)]
mod tests;
