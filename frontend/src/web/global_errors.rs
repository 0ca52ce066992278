//! 全局错误监听
//!
//! 把 `error` 与 `unhandledrejection` 事件记录到日志缓冲区。

use std::sync::Arc;

use appconsole::SystemLogger;
use serde_json::json;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{ErrorEvent, PromiseRejectionEvent};

/// 错误对象的 stack，非 Error 对象返回 `None`
fn stack_of(value: &JsValue) -> Option<String> {
    js_sys::Reflect::get(value, &JsValue::from_str("stack"))
        .ok()
        .and_then(|s| s.as_string())
}

fn describe(value: &JsValue) -> String {
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return error.message().into();
    }
    value
        .as_string()
        .unwrap_or_else(|| js_sys::JSON::stringify(value).map(String::from).unwrap_or_default())
}

/// 注册全局监听器，监听器在页面生命周期内保持存活
pub fn install(logger: Arc<SystemLogger>) {
    let Some(window) = web_sys::window() else {
        return;
    };

    let on_error = {
        let logger = logger.clone();
        Closure::<dyn Fn(ErrorEvent)>::new(move |event: ErrorEvent| {
            let error = event.error();
            logger.capture_uncaught(
                &event.message(),
                json!({
                    "filename": event.filename(),
                    "lineno": event.lineno(),
                    "colno": event.colno(),
                    "error": stack_of(&error),
                }),
            );
        })
    };
    let _ = window.add_event_listener_with_callback("error", on_error.as_ref().unchecked_ref());
    on_error.forget();

    let on_rejection = Closure::<dyn Fn(PromiseRejectionEvent)>::new(
        move |event: PromiseRejectionEvent| {
            let reason = event.reason();
            logger.capture_rejection(&describe(&reason), stack_of(&reason).as_deref());
        },
    );
    let _ = window.add_event_listener_with_callback(
        "unhandledrejection",
        on_rejection.as_ref().unchecked_ref(),
    );
    on_rejection.forget();
}
