//! 宿主环境抽象
//!
//! 浏览器实现位于 frontend 的 `web::host`；原生环境和测试使用 [`StaticHost`]。

use std::time::Duration;

/// 宿主环境信息（页面地址、UA、在线状态）
pub trait HostInfo: Send + Sync {
    fn current_url(&self) -> Option<String>;
    fn user_agent(&self) -> Option<String>;
    fn is_online(&self) -> bool {
        true
    }
}

/// 延迟整页跳转
pub trait Redirector: Send + Sync {
    fn redirect_after(&self, path: &str, delay: Duration);
}

/// 固定值的宿主信息
#[derive(Debug, Clone)]
pub struct StaticHost {
    pub url: Option<String>,
    pub user_agent: Option<String>,
    pub online: bool,
}

impl StaticHost {
    pub fn new(url: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            user_agent: Some(user_agent.into()),
            online: true,
        }
    }

    pub fn offline(mut self) -> Self {
        self.online = false;
        self
    }
}

impl Default for StaticHost {
    fn default() -> Self {
        Self {
            url: None,
            user_agent: Some(concat!("appconsole/", env!("CARGO_PKG_VERSION")).to_string()),
            online: true,
        }
    }
}

impl HostInfo for StaticHost {
    fn current_url(&self) -> Option<String> {
        self.url.clone()
    }

    fn user_agent(&self) -> Option<String> {
        self.user_agent.clone()
    }

    fn is_online(&self) -> bool {
        self.online
    }
}
