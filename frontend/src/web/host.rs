//! 浏览器宿主信息与页面跳转

use std::time::Duration;

use appconsole::host::{HostInfo, Redirector};

use super::Timeout;

fn location() -> Option<web_sys::Location> {
    web_sys::window().map(|w| w.location())
}

/// 当前页面的 hostname，如 `localhost`
pub fn page_hostname() -> String {
    location()
        .and_then(|l| l.hostname().ok())
        .unwrap_or_default()
}

/// 当前页面的 origin，如 `https://admin.example.com`
pub fn page_origin() -> String {
    location().and_then(|l| l.origin().ok()).unwrap_or_default()
}

/// 每次调用时从 `window` 读取，不持有 JS 对象
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserHost;

impl HostInfo for BrowserHost {
    fn current_url(&self) -> Option<String> {
        location().and_then(|l| l.href().ok())
    }

    fn user_agent(&self) -> Option<String> {
        web_sys::window().and_then(|w| w.navigator().user_agent().ok())
    }

    fn is_online(&self) -> bool {
        web_sys::window()
            .map(|w| w.navigator().on_line())
            .unwrap_or(true)
    }
}

impl Redirector for BrowserHost {
    /// 延迟后整页跳转，丢弃当前应用状态
    fn redirect_after(&self, path: &str, delay: Duration) {
        let path = path.to_string();
        Timeout::detached(delay, move || {
            if let Some(location) = location() {
                let _ = location.set_href(&path);
            }
        });
    }
}
