use serde_json::Value;

use crate::request::TransportError;

// =========================================================
// 失败分类
// =========================================================

/// 请求失败的分类
/// 决定用户看到的提示以及是否升级为持久通知
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// 401: 会话过期，需要重新登录
    Unauthorized,
    /// 403: 无权限
    Forbidden,
    /// 404: 接口或资源不存在
    NotFound,
    /// 500: 服务器内部错误
    ServerError,
    /// 其他非 2xx 状态码
    Status(u16),
    /// 超过请求超时时间
    Timeout,
    /// 浏览器处于离线状态
    Offline,
    /// 其他没有响应的失败
    Network,
    /// 请求在发出之前就构建失败（如请求体序列化失败）
    InvalidRequest,
    /// 响应成功但数据结构与预期不符
    InvalidResponse,
}

impl FailureKind {
    /// 根据响应状态和传输错误分类
    ///
    /// 有响应时只看状态码；没有响应时依次判断超时、离线。
    pub fn classify(status: Option<u16>, transport: Option<&TransportError>, online: bool) -> Self {
        match status {
            Some(401) => FailureKind::Unauthorized,
            Some(403) => FailureKind::Forbidden,
            Some(404) => FailureKind::NotFound,
            Some(500) => FailureKind::ServerError,
            Some(code) => FailureKind::Status(code),
            None => match transport {
                Some(TransportError::Timeout(_)) => FailureKind::Timeout,
                _ if !online => FailureKind::Offline,
                _ => FailureKind::Network,
            },
        }
    }

    /// 严重错误以持久通知展示，其余以短暂消息展示
    pub fn escalates(&self) -> bool {
        matches!(
            self,
            FailureKind::ServerError | FailureKind::Timeout | FailureKind::Offline
        )
    }

    /// 用户可见的提示文本
    ///
    /// `server_message` 是响应体中的 `message` 字段，404/500/其他状态码时优先使用。
    pub fn user_message(&self, server_message: Option<&str>) -> String {
        match self {
            FailureKind::Unauthorized => "登录已过期，请重新登录".to_string(),
            FailureKind::Forbidden => "没有权限执行此操作".to_string(),
            FailureKind::NotFound => server_message.unwrap_or("API接口不存在").to_string(),
            FailureKind::ServerError => server_message.unwrap_or("服务器内部错误").to_string(),
            FailureKind::Status(code) => server_message
                .map(str::to_string)
                .unwrap_or_else(|| format!("请求失败 ({})", code)),
            FailureKind::Timeout => "请求超时，请检查网络连接".to_string(),
            FailureKind::Offline => "网络连接已断开".to_string(),
            FailureKind::Network | FailureKind::InvalidRequest => "请求失败".to_string(),
            FailureKind::InvalidResponse => "响应数据格式错误".to_string(),
        }
    }
}

/// 从响应体中取出服务端的 `message`
pub(crate) fn server_message(data: Option<&Value>) -> Option<&str> {
    data?.get("message")?.as_str().filter(|m| !m.is_empty())
}

// =========================================================
// 核心错误类型
// =========================================================

/// 返回给调用方的请求错误
///
/// 管线在返回之前已经记录日志并提示用户，调用方可以据此做进一步处理。
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub kind: FailureKind,
    pub status: Option<u16>,
    /// 已展示给用户的提示
    pub message: String,
    /// 对应的错误日志 ID
    pub log_id: Option<String>,
    pub response_data: Option<Value>,
    #[source]
    pub transport: Option<TransportError>,
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        self.kind == FailureKind::Unauthorized
    }
}
