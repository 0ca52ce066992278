//! 诊断接口
//!
//! 通过显式命令读取、导出和清空日志缓冲区，前端的诊断面板基于此实现。

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::logger::{DEFAULT_RECENT, SystemLogger, iso_millis};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticCommand {
    RecentLogs(usize),
    RecentErrors(usize),
    RecentRequests(usize),
    Export,
    Clear,
}

impl DiagnosticCommand {
    /// 解析文本命令，如 `errors 50`、`export`
    pub fn parse(input: &str) -> Option<Self> {
        let mut parts = input.split_whitespace();
        let verb = parts.next()?.to_ascii_lowercase();
        let count = match parts.next() {
            Some(n) => n.parse().ok()?,
            None => DEFAULT_RECENT,
        };
        match verb.as_str() {
            "logs" => Some(Self::RecentLogs(count)),
            "errors" => Some(Self::RecentErrors(count)),
            "requests" => Some(Self::RecentRequests(count)),
            "export" => Some(Self::Export),
            "clear" => Some(Self::Clear),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticOutput {
    /// 条目列表（JSON 形式）
    Entries(Vec<Value>),
    /// 导出文件
    Export { file_name: String, content: String },
    Cleared,
}

#[derive(Clone)]
pub struct Diagnostics {
    logger: Arc<SystemLogger>,
}

impl Diagnostics {
    pub fn new(logger: Arc<SystemLogger>) -> Self {
        Self { logger }
    }

    pub fn logger(&self) -> &Arc<SystemLogger> {
        &self.logger
    }

    pub fn run(&self, command: DiagnosticCommand) -> Result<DiagnosticOutput, serde_json::Error> {
        let output = match command {
            DiagnosticCommand::RecentLogs(n) => {
                DiagnosticOutput::Entries(to_values(&self.logger.recent_logs(n))?)
            }
            DiagnosticCommand::RecentErrors(n) => {
                DiagnosticOutput::Entries(to_values(&self.logger.recent_errors(n))?)
            }
            DiagnosticCommand::RecentRequests(n) => {
                DiagnosticOutput::Entries(to_values(&self.logger.recent_requests(n))?)
            }
            DiagnosticCommand::Export => {
                let content = self.logger.export_json()?;
                self.logger.info("System", "Logs exported successfully", None);
                DiagnosticOutput::Export {
                    file_name: export_file_name(Utc::now()),
                    content,
                }
            }
            DiagnosticCommand::Clear => {
                self.logger.clear();
                DiagnosticOutput::Cleared
            }
        };
        Ok(output)
    }
}

fn to_values<T: serde::Serialize>(items: &[T]) -> Result<Vec<Value>, serde_json::Error> {
    items.iter().map(serde_json::to_value).collect()
}

/// 导出文件名：`system-logs-2024-05-01T08-30-00-123Z.json`
pub fn export_file_name(now: DateTime<Utc>) -> String {
    format!("system-logs-{}.json", iso_millis(&now).replace([':', '.'], "-"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::StaticHost;
    use crate::logger::TracingSink;
    use chrono::TimeZone;

    fn setup() -> Diagnostics {
        let logger = SystemLogger::new(200, TracingSink, Arc::new(StaticHost::default()));
        Diagnostics::new(Arc::new(logger))
    }

    #[test]
    fn test_file_name_is_sanitized() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap();
        assert_eq!(
            export_file_name(now),
            "system-logs-2024-05-01T08-30-00-000Z.json"
        );
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(DiagnosticCommand::parse("errors 5"), Some(DiagnosticCommand::RecentErrors(5)));
        assert_eq!(DiagnosticCommand::parse("REQUESTS"), Some(DiagnosticCommand::RecentRequests(20)));
        assert_eq!(DiagnosticCommand::parse("export"), Some(DiagnosticCommand::Export));
        assert_eq!(DiagnosticCommand::parse("errors many"), None);
        assert_eq!(DiagnosticCommand::parse("reboot"), None);
        assert_eq!(DiagnosticCommand::parse(""), None);
    }

    #[test]
    fn test_recent_errors() {
        let diag = setup();
        for i in 0..3 {
            diag.logger().error("Test", format!("e{}", i), None);
        }

        let DiagnosticOutput::Entries(entries) = diag.run(DiagnosticCommand::RecentErrors(2)).unwrap()
        else {
            panic!("expected entries");
        };
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1]["message"], "e2");
        assert_eq!(entries[1]["level"], "error");
    }

    #[test]
    fn test_export_and_clear() {
        let diag = setup();
        diag.logger().info("Test", "hello", None);

        let DiagnosticOutput::Export { file_name, content } = diag.run(DiagnosticCommand::Export).unwrap()
        else {
            panic!("expected export");
        };
        assert!(file_name.starts_with("system-logs-"));
        assert!(file_name.ends_with(".json"));
        let doc: Value = serde_json::from_str(&content).unwrap();
        assert_eq!(doc["logs"].as_array().unwrap().len(), 1);

        assert_eq!(diag.run(DiagnosticCommand::Clear).unwrap(), DiagnosticOutput::Cleared);
        assert_eq!(diag.logger().snapshot().logs.len(), 1);
    }
}
