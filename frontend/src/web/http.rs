//! HTTP 传输模块
//!
//! 使用 `web_sys::fetch` 实现核心 crate 的 [`HttpClient`]，
//! 超时通过 `AbortController` 中止请求。

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use appconsole::request::{HttpClient, HttpRequest, HttpResponse, TransportError};
use async_trait::async_trait;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortController, Headers, Request, RequestInit, Response};

use super::Timeout;

fn js_message(value: &JsValue) -> String {
    value
        .dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| value.as_string())
        .unwrap_or_else(|| format!("{:?}", value))
}

/// 基于 fetch 的 HTTP 客户端
#[derive(Debug, Clone, Copy)]
pub struct FetchHttpClient {
    timeout: Duration,
}

impl FetchHttpClient {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    fn build(&self, req: &HttpRequest, controller: &AbortController) -> Result<Request, TransportError> {
        let headers = Headers::new()
            .map_err(|e| TransportError::Build(format!("创建 Headers 失败: {}", js_message(&e))))?;
        for (key, value) in &req.headers {
            headers
                .set(key, value)
                .map_err(|e| TransportError::Build(format!("设置 Header 失败: {}", js_message(&e))))?;
        }

        let opts = RequestInit::new();
        opts.set_method(req.method.as_str());
        opts.set_headers(&headers.into());
        opts.set_signal(Some(&controller.signal()));
        if let Some(body) = &req.body {
            opts.set_body(&JsValue::from_str(body));
        }

        Request::new_with_str_and_init(&req.url, &opts)
            .map_err(|e| TransportError::Build(js_message(&e)))
    }
}

#[async_trait(?Send)]
impl HttpClient for FetchHttpClient {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, TransportError> {
        let controller =
            AbortController::new().map_err(|e| TransportError::Build(js_message(&e)))?;
        let request = self.build(&req, &controller)?;

        let window = web_sys::window()
            .ok_or_else(|| TransportError::Network("无法获取 window 对象".to_string()))?;

        let timed_out = Rc::new(Cell::new(false));
        // 超时前 drop 时自动取消
        let _guard = {
            let timed_out = timed_out.clone();
            let controller = controller.clone();
            Timeout::new(self.timeout, move || {
                timed_out.set(true);
                controller.abort();
            })
        };

        let fail = |e: JsValue| {
            if timed_out.get() {
                TransportError::Timeout(self.timeout)
            } else {
                TransportError::Network(js_message(&e))
            }
        };

        let resp_value = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(fail)?;
        let response: Response = resp_value
            .dyn_into()
            .map_err(|e| TransportError::Body(format!("Response 类型转换失败: {}", js_message(&e))))?;

        let text_promise = response
            .text()
            .map_err(|e| TransportError::Body(js_message(&e)))?;
        let body = JsFuture::from(text_promise).await.map_err(fail)?;

        Ok(HttpResponse {
            status: response.status(),
            status_text: response.status_text(),
            body: body.as_string().unwrap_or_default(),
        })
    }
}
