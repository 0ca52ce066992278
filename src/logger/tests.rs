use super::*;
use crate::host::StaticHost;
use crate::request::HttpMethod;

// =========================================================
// Shared Mock Components
// =========================================================

#[derive(Clone, Default)]
struct RecordingSink {
    lines: Arc<Mutex<Vec<(LogLevel, String)>>>,
}

impl ConsoleSink for RecordingSink {
    fn write(&self, level: LogLevel, line: &str, _data: Option<&Value>) {
        self.lines.lock().push((level, line.to_string()));
    }
}

fn setup(capacity: usize) -> (SystemLogger, RecordingSink) {
    let sink = RecordingSink::default();
    let host = StaticHost::new("https://console.example.com/apps", "TestAgent/1.0");
    let logger = SystemLogger::new(capacity, sink.clone(), Arc::new(host));
    (logger, sink)
}

// =========================================================
// Tests
// =========================================================

#[test]
fn test_log_records_entry_and_mirrors_console() {
    let (logger, sink) = setup(200);

    let entry = logger.warn("Router", "slow navigation", Some(json!({ "ms": 900 })));

    assert_eq!(entry.level, LogLevel::Warn);
    assert_eq!(entry.url.as_deref(), Some("https://console.example.com/apps"));
    assert_eq!(logger.recent_logs(DEFAULT_RECENT).len(), 1);
    assert!(logger.recent_errors(DEFAULT_RECENT).is_empty());

    let lines = sink.lines.lock();
    assert_eq!(lines.as_slice(), &[(LogLevel::Warn, "[WARN] [Router] slow navigation".to_string())]);
}

#[test]
fn test_error_goes_to_both_sequences() {
    let (logger, _) = setup(200);
    let entry = logger.error("Apps", "load failed", None);

    let errors = logger.recent_errors(5);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].id, entry.id);
    assert_eq!(logger.recent_logs(5).len(), 1);
}

#[test]
fn test_sequences_are_bounded() {
    let (logger, _) = setup(200);
    let req = HttpRequest::new("/api/v1/apps", HttpMethod::Get);

    for i in 0..201 {
        logger.error("Test", format!("error #{}", i), None);
        logger.log_request(HttpMethod::Get, "/apps", &req, None, None);
    }

    let snapshot = logger.snapshot();
    assert_eq!(snapshot.errors.len(), 200);
    assert_eq!(snapshot.requests.len(), 200);
    assert_eq!(snapshot.logs.len(), 200);
    // 第 201 条挤掉了最早的一条
    assert_eq!(snapshot.errors[0].message, "error #1");
    assert_eq!(snapshot.errors[199].message, "error #200");
}

#[test]
fn test_request_log_redacts_authorization() {
    let (logger, _) = setup(200);
    let req = HttpRequest::new("/api/v1/apps?page=2", HttpMethod::Post)
        .with_header("Authorization", "Bearer super-secret")
        .with_header("Content-Type", "application/json");

    let record = logger.log_request(
        HttpMethod::Post,
        "/apps",
        &req,
        Some(json!({ "page": 2 })),
        Some(json!({ "name": "demo" })),
    );

    assert_eq!(record.headers.authorization.as_deref(), Some(REDACTED));
    assert_eq!(record.headers.content_type.as_deref(), Some("application/json"));
    assert_eq!(record.full_url, "/api/v1/apps");
    assert_eq!(record.kind, RecordKind::Request);

    let exported = logger.export_json().unwrap();
    assert!(!exported.contains("super-secret"));
    assert!(exported.contains(REDACTED));

    let info = logger.recent_logs(1);
    assert_eq!(info[0].message, "Request: POST /apps");
}

#[test]
fn test_request_without_token_has_no_authorization() {
    let (logger, _) = setup(200);
    let req = HttpRequest::new("/api/v1/apps", HttpMethod::Get);
    let record = logger.log_request(HttpMethod::Get, "/apps", &req, None, None);
    assert_eq!(record.headers, RecordedHeaders::default());
}

#[test]
fn test_response_log_computes_duration() {
    let (logger, _) = setup(200);
    let req = HttpRequest::new("/api/v1/apps", HttpMethod::Get);
    let request = logger.log_request(HttpMethod::Get, "/apps", &req, None, None);

    let response = HttpResponse {
        status: 200,
        status_text: "OK".to_string(),
        body: r#"{"data":[]}"#.to_string(),
    };
    let record = logger.log_response(&response, &request);

    assert!(record.duration_ms >= 0);
    assert_eq!(record.data_size, 11);
    assert_eq!(record.status, 200);
    // 响应不进入 requests 序列
    assert_eq!(logger.recent_requests(10).len(), 1);
    assert!(logger.recent_logs(1)[0].message.starts_with("Response: GET /apps - 200 ("));
}

#[test]
fn test_api_error_prefers_server_message() {
    let (logger, sink) = setup(200);
    let record = logger.log_api_error(FailureContext {
        method: Some("DELETE".to_string()),
        url: Some("/apps/7".to_string()),
        status: Some(500),
        status_text: Some("Internal Server Error".to_string()),
        error_message: "HTTP 500".to_string(),
        response_data: Some(json!({ "code": 5001, "message": "数据库连接失败" })),
        stack: Some("at transport.send".to_string()),
    });

    assert_eq!(record.message, "数据库连接失败");
    assert_eq!(record.error_code, Some(json!(5001)));

    let errors = logger.recent_errors(5);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "Error: DELETE /apps/7 - 500: 数据库连接失败");
    assert_eq!(errors[0].data.as_ref().unwrap()["stack"], json!("at transport.send"));
    assert_eq!(sink.lines.lock()[0].0, LogLevel::Error);
}

#[test]
fn test_api_error_without_response() {
    let (logger, _) = setup(200);
    let record = logger.log_api_error(FailureContext {
        method: Some("GET".to_string()),
        url: Some("/apps".to_string()),
        error_message: "请求超时 (30000ms)".to_string(),
        ..Default::default()
    });

    assert_eq!(record.message, "请求超时 (30000ms)");
    assert_eq!(logger.recent_errors(1)[0].message, "Error: GET /apps - -: 请求超时 (30000ms)");
}

#[test]
fn test_export_contains_exactly_recorded_entries() {
    let (logger, _) = setup(200);
    let req = HttpRequest::new("/api/v1/modules", HttpMethod::Get);

    for i in 0..5 {
        logger.info("Test", format!("info #{}", i), None);
    }
    logger.error("Test", "bad", None);
    logger.log_request(HttpMethod::Get, "/modules", &req, None, None);

    let doc: Value = serde_json::from_str(&logger.export_json().unwrap()).unwrap();

    // 5 条 info + 1 条 error + 1 条请求日志
    assert_eq!(doc["logs"].as_array().unwrap().len(), 7);
    assert_eq!(doc["errors"].as_array().unwrap().len(), 1);
    assert_eq!(doc["requests"].as_array().unwrap().len(), 1);
    assert_eq!(doc["userAgent"], json!("TestAgent/1.0"));
    assert_eq!(doc["url"], json!("https://console.example.com/apps"));
    assert!(doc["exportTime"].as_str().unwrap().ends_with('Z'));
    assert_eq!(doc["requests"][0]["fullUrl"], json!("/api/v1/modules"));
    assert_eq!(doc["requests"][0]["type"], json!("request"));
}

#[test]
fn test_clear_leaves_single_marker() {
    let (logger, _) = setup(200);
    logger.error("Test", "bad", None);

    logger.clear();

    let snapshot = logger.snapshot();
    assert!(snapshot.errors.is_empty());
    assert!(snapshot.requests.is_empty());
    assert_eq!(snapshot.logs.len(), 1);
    assert_eq!(snapshot.logs[0].message, "Logs cleared");
}

#[test]
fn test_global_captures() {
    let (logger, _) = setup(200);
    logger.capture_uncaught(
        "x is undefined",
        json!({ "filename": "app.js", "lineno": 3, "colno": 9, "error": null }),
    );
    logger.capture_rejection("Error: nope", Some("Error: nope\n  at f"));

    let errors = logger.recent_errors(5);
    assert_eq!(errors.len(), 2);
    assert_eq!(errors[0].module, "Global");
    assert_eq!(errors[0].message, "Uncaught error: x is undefined");
    assert_eq!(errors[1].message, "Unhandled promise rejection: Error: nope");
    assert_eq!(errors[1].data, Some(json!({ "reason": "Error: nope\n  at f" })));
}

#[test]
fn test_startup_log() {
    let (logger, _) = setup(200);
    let entry = logger.log_startup("/api/v1");
    let data = entry.data.unwrap();
    assert_eq!(data["baseURL"], json!("/api/v1"));
    assert_eq!(data["userAgent"], json!("TestAgent/1.0"));
}

#[test]
fn test_data_size_counts_serialized_text() {
    let (logger, _) = setup(200);
    let req = HttpRequest::new("/api/v1/apps", HttpMethod::Get);
    let request = logger.log_request(HttpMethod::Get, "/apps", &req, None, None);

    let respond = |body: &str| HttpResponse {
        status: 200,
        status_text: "OK".to_string(),
        body: body.to_string(),
    };

    // 按字符计，中文不按 UTF-8 字节计
    let record = logger.log_response(&respond(r#"{"message":"成功"}"#), &request);
    assert_eq!(record.data_size, 16);

    // 空白不计入
    let record = logger.log_response(&respond("{ \"a\": 1 }"), &request);
    assert_eq!(record.data_size, 7);

    let record = logger.log_response(&respond(""), &request);
    assert_eq!(record.data_size, 2);

    let record = logger.log_response(&respond("ok"), &request);
    assert_eq!(record.data_size, 4);
}

#[test]
fn test_panic_capture_skips_when_buffers_locked() {
    let (logger, sink) = setup(200);

    let guard = logger.buffers.lock();
    assert!(logger.capture_panic("boom", json!({})).is_none());
    drop(guard);
    assert!(sink.lines.lock().is_empty());

    let entry = logger
        .capture_panic("index out of bounds", json!({ "lineno": 7 }))
        .unwrap();
    assert_eq!(entry.module, "Global");
    assert_eq!(entry.message, "Uncaught panic: index out of bounds");
    assert_eq!(logger.recent_errors(1)[0].id, entry.id);
    assert_eq!(sink.lines.lock()[0].0, LogLevel::Error);
}
