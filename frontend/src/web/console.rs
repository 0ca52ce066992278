//! 浏览器控制台输出

use appconsole::logger::{ConsoleSink, LogLevel};
use serde_json::Value;
use wasm_bindgen::JsValue;

/// 将日志行写入 `console.log` / `console.warn` / `console.error`
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserConsoleSink;

impl ConsoleSink for BrowserConsoleSink {
    fn write(&self, level: LogLevel, line: &str, data: Option<&Value>) {
        let line = JsValue::from_str(line);
        let data = data.map(|d| {
            let text = d.to_string();
            js_sys::JSON::parse(&text).unwrap_or_else(|_| JsValue::from_str(&text))
        });

        match (level, data) {
            (LogLevel::Info, Some(d)) => web_sys::console::log_2(&line, &d),
            (LogLevel::Info, None) => web_sys::console::log_1(&line),
            (LogLevel::Warn, Some(d)) => web_sys::console::warn_2(&line, &d),
            (LogLevel::Warn, None) => web_sys::console::warn_1(&line),
            (LogLevel::Error, Some(d)) => web_sys::console::error_2(&line, &d),
            (LogLevel::Error, None) => web_sys::console::error_1(&line),
        }
    }
}
