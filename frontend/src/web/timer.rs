//! 定时器封装模块
//!
//! 使用 `web_sys` 的原生 `setTimeout` API。

use std::time::Duration;

use wasm_bindgen::prelude::*;

fn millis(delay: Duration) -> i32 {
    delay.as_millis().min(i32::MAX as u128) as i32
}

/// 一次性定时器
///
/// 封装 `setTimeout` API。当 `Timeout` 被 drop 时，若尚未触发则自动取消。
pub struct Timeout {
    handle: Option<i32>,
    #[allow(dead_code)]
    closure: Closure<dyn FnMut()>,
}

impl Timeout {
    /// 创建新的一次性定时器
    ///
    /// 无法获取 window 对象时定时器不会被注册。
    pub fn new<F>(delay: Duration, callback: F) -> Self
    where
        F: FnOnce() + 'static,
    {
        let closure: Closure<dyn FnMut()> = Closure::once(callback);

        let handle = web_sys::window().and_then(|window| {
            window
                .set_timeout_with_callback_and_timeout_and_arguments_0(
                    closure.as_ref().unchecked_ref(),
                    millis(delay),
                )
                .ok()
        });

        Self { handle, closure }
    }

    /// 注册后不再持有句柄，回调由 JS 侧负责释放
    pub fn detached<F>(delay: Duration, callback: F)
    where
        F: FnOnce() + 'static,
    {
        let callback = Closure::once_into_js(callback);
        if let Some(window) = web_sys::window() {
            let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.unchecked_ref(),
                millis(delay),
            );
        }
    }

    /// 取消定时器
    pub fn cancel(&mut self) {
        if let (Some(handle), Some(window)) = (self.handle.take(), web_sys::window()) {
            window.clear_timeout_with_handle(handle);
        }
    }
}

impl Drop for Timeout {
    fn drop(&mut self) {
        self.cancel();
    }
}
