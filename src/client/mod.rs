//! API 请求管线
//!
//! 每次请求经过三个阶段：
//! 1. `prepare`：附加令牌、记录请求、打时间戳
//! 2. `HttpClient::send`：由具体传输实现（fetch / reqwest / mock）发出
//! 3. `settle`：成功则记录响应并返回响应体；失败则记录、分类、提示并返回 [`ApiError`]
//!
//! 失败不会自动重试。

mod call;

pub use call::ApiCall;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::config::ClientConfig;
use crate::failure::{ApiError, FailureKind, server_message};
use crate::host::{HostInfo, Redirector};
use crate::logger::{FailureContext, RequestRecord, SystemLogger};
use crate::notify::{MessageLevel, Notification, Notifier};
use crate::request::{HttpClient, HttpMethod, HttpRequest, HttpResponse, TransportError};
use crate::session::TokenStore;

const NOTIFICATION_TITLE: &str = "系统错误";

/// 单个请求 endpoint 的描述
///
/// GET/DELETE 请求把自身序列化为查询参数，其他方法序列化为请求体。
pub trait ApiEndpoint: Serialize {
    type Response: DeserializeOwned;
    const METHOD: HttpMethod;
    /// 相对于基础地址的路径，可包含路径参数
    fn path(&self) -> String;
}

/// 请求管线依赖的宿主服务
#[derive(Clone)]
pub struct ClientContext {
    pub config: Arc<ClientConfig>,
    pub logger: Arc<SystemLogger>,
    pub session: Arc<dyn TokenStore>,
    pub notifier: Arc<dyn Notifier>,
    pub redirector: Arc<dyn Redirector>,
    pub host: Arc<dyn HostInfo>,
}

/// 已通过出站阶段、等待发送的请求
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub method: HttpMethod,
    pub path: String,
    pub http: HttpRequest,
    pub record: RequestRecord,
}

#[derive(Clone)]
pub struct ApiClient<C> {
    base_url: String,
    transport: C,
    ctx: ClientContext,
}

impl<C: HttpClient> ApiClient<C> {
    pub fn new(transport: C, base_url: impl Into<String>, ctx: ClientContext) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        ctx.logger.info(
            "API",
            format!("API client created with base URL: {}", base_url),
            None,
        );
        Self {
            base_url,
            transport,
            ctx,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn logger(&self) -> &Arc<SystemLogger> {
        &self.ctx.logger
    }

    // =========================================================
    // 便捷方法
    // =========================================================

    pub async fn get(&self, path: &str) -> Result<Value, ApiError> {
        self.request(ApiCall::new(HttpMethod::Get, path)).await
    }

    pub async fn get_with<P: Serialize>(&self, path: &str, params: &P) -> Result<Value, ApiError> {
        let params = self.encode(params)?;
        self.request(ApiCall::new(HttpMethod::Get, path).with_params(params))
            .await
    }

    pub async fn post<B: Serialize>(&self, path: &str, body: &B) -> Result<Value, ApiError> {
        let body = self.encode(body)?;
        self.request(ApiCall::new(HttpMethod::Post, path).with_data(body))
            .await
    }

    pub async fn put<B: Serialize>(&self, path: &str, body: &B) -> Result<Value, ApiError> {
        let body = self.encode(body)?;
        self.request(ApiCall::new(HttpMethod::Put, path).with_data(body))
            .await
    }

    pub async fn patch<B: Serialize>(&self, path: &str, body: &B) -> Result<Value, ApiError> {
        let body = self.encode(body)?;
        self.request(ApiCall::new(HttpMethod::Patch, path).with_data(body))
            .await
    }

    pub async fn delete(&self, path: &str) -> Result<Value, ApiError> {
        self.request(ApiCall::new(HttpMethod::Delete, path)).await
    }

    /// 发送请求并把响应体反序列化为 `T`
    pub async fn send_json<T: DeserializeOwned>(&self, call: ApiCall) -> Result<T, ApiError> {
        let method = call.method;
        let path = call.path.clone();
        let body = self.request(call).await?;
        serde_json::from_value(body).map_err(|e| {
            let kind = FailureKind::InvalidResponse;
            let message = kind.user_message(None);
            let entry = self.ctx.logger.error(
                "API",
                format!("Response decode error: {} {}: {}", method.as_str(), path, e),
                None,
            );
            self.ctx.notifier.message(MessageLevel::Error, &message);
            ApiError {
                kind,
                status: None,
                message,
                log_id: Some(entry.id),
                response_data: None,
                transport: None,
            }
        })
    }

    /// 调用类型化的 endpoint
    pub async fn call<E: ApiEndpoint>(&self, endpoint: &E) -> Result<E::Response, ApiError> {
        let value = self.encode(endpoint)?;
        let call = ApiCall::new(E::METHOD, &endpoint.path());
        let call = match E::METHOD {
            HttpMethod::Get | HttpMethod::Delete => call.with_params(value),
            _ => call.with_data(value),
        };
        self.send_json(call).await
    }

    // =========================================================
    // 管线
    // =========================================================

    /// 完整执行一次请求
    pub async fn request(&self, call: ApiCall) -> Result<Value, ApiError> {
        let prepared = self.prepare(call);
        let outcome = self.transport.send(prepared.http.clone()).await;
        self.settle(&prepared, outcome)
    }

    /// 出站阶段：附加令牌并记录请求
    pub fn prepare(&self, call: ApiCall) -> PreparedRequest {
        let url = format!("{}{}{}", self.base_url, call.path, call.query_string());
        let mut http = HttpRequest::new(&url, call.method);

        if let Some(token) = self.ctx.session.token() {
            http = http.with_header("Authorization", &format!("Bearer {}", token));
        }
        if let Some(data) = &call.data {
            http = http
                .with_header("Content-Type", "application/json")
                .with_body(data);
        }

        let record = self
            .ctx
            .logger
            .log_request(call.method, &call.path, &http, call.params, call.data);

        PreparedRequest {
            method: call.method,
            path: call.path,
            http,
            record,
        }
    }

    /// 入站阶段
    pub fn settle(
        &self,
        prepared: &PreparedRequest,
        outcome: Result<HttpResponse, TransportError>,
    ) -> Result<Value, ApiError> {
        match outcome {
            Ok(response) if response.is_success() => {
                self.ctx.logger.log_response(&response, &prepared.record);
                Ok(parse_body(&response.body).unwrap_or(Value::Null))
            }
            Ok(response) => {
                let data = parse_body(&response.body);
                Err(self.fail(prepared, Some(&response), data, None))
            }
            Err(e) => Err(self.fail(prepared, None, None, Some(e))),
        }
    }

    /// 记录失败、提示用户并构造错误
    fn fail(
        &self,
        prepared: &PreparedRequest,
        response: Option<&HttpResponse>,
        data: Option<Value>,
        transport: Option<TransportError>,
    ) -> ApiError {
        let status = response.map(|r| r.status);
        let error_message = match (&transport, status) {
            (Some(e), _) => e.to_string(),
            (None, Some(code)) => format!("Request failed with status code {}", code),
            (None, None) => "Request failed".to_string(),
        };

        // 1. 先完整记录
        let record = self.ctx.logger.log_api_error(FailureContext {
            method: Some(prepared.method.as_str().to_string()),
            url: Some(prepared.path.clone()),
            status,
            status_text: response.map(|r| r.status_text.clone()),
            error_message: error_message.clone(),
            response_data: data.clone(),
            stack: Some(stack_trace(prepared, status, &error_message)),
        });

        // 2. 分类
        let kind = FailureKind::classify(status, transport.as_ref(), self.ctx.host.is_online());
        let message = kind.user_message(server_message(data.as_ref()));

        // 3. 会话过期：清除令牌，延迟跳转登录页
        if kind == FailureKind::Unauthorized {
            self.ctx.session.clear_token();
            self.ctx.redirector.redirect_after(
                &self.ctx.config.login_path,
                self.ctx.config.unauthorized_redirect_delay(),
            );
        }

        // 4. 提示用户
        if kind.escalates() {
            self.ctx.notifier.notify(Notification {
                title: NOTIFICATION_TITLE.to_string(),
                message: format!(
                    "{}\n\n错误ID: {}\n\n您可以在诊断面板中导出日志",
                    message, record.id
                ),
                level: MessageLevel::Error,
                duration: self.ctx.config.notification_duration(),
            });
        } else {
            self.ctx.notifier.message(MessageLevel::Error, &message);
        }

        ApiError {
            kind,
            status,
            message,
            log_id: Some(record.id),
            response_data: data,
            transport,
        }
    }

    /// 序列化请求数据；失败时按出站阶段错误处理
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Value, ApiError> {
        serde_json::to_value(value).map_err(|e| {
            let entry = self.ctx.logger.error(
                "API",
                "Request interceptor error",
                Some(json!({ "error": e.to_string() })),
            );
            ApiError {
                kind: FailureKind::InvalidRequest,
                status: None,
                message: FailureKind::InvalidRequest.user_message(None),
                log_id: Some(entry.id),
                response_data: None,
                transport: Some(TransportError::Build(e.to_string())),
            }
        })
    }
}

/// 解析响应体：JSON 优先，否则保留原始文本，空响应为 `None`
fn parse_body(body: &str) -> Option<Value> {
    if body.trim().is_empty() {
        return None;
    }
    Some(serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string())))
}

/// 失败请求经过的阶段
fn stack_trace(prepared: &PreparedRequest, status: Option<u16>, message: &str) -> String {
    let method = prepared.method.as_str();
    let settle = match status {
        Some(code) => format!("status {}", code),
        None => "no response".to_string(),
    };
    format!(
        "ApiError: {}\n    at request.prepare ({} {})\n    at transport.send ({} {})\n    at response.settle ({})",
        message, method, prepared.path, method, prepared.http.url, settle
    )
}
