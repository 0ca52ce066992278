//! Panic 记录
//!
//! WASM 中的 panic 不会触发 `error` 事件，需要单独安装 hook
//! 才能进入日志缓冲区和导出文件。

use std::panic;
use std::sync::Arc;

use appconsole::SystemLogger;
use serde_json::json;
use wasm_bindgen::prelude::*;

#[wasm_bindgen(inline_js = "export function get_stack() { return new Error().stack; }")]
extern "C" {
    fn get_stack() -> String;
}

/// 安装 panic hook：先记录到日志，再交给 `console_error_panic_hook` 输出
pub fn install(logger: Arc<SystemLogger>) {
    panic::set_hook(Box::new(move |info: &panic::PanicHookInfo| {
        logger.capture_panic(
            &info.to_string(),
            json!({
                "filename": info.location().map(|l| l.file()),
                "lineno": info.location().map(|l| l.line()),
                "colno": info.location().map(|l| l.column()),
                "error": get_stack(),
            }),
        );
        console_error_panic_hook::hook(info);
    }));
}
