//! 会话令牌存储
//!
//! 浏览器端由 `localStorage` 实现（frontend `web::storage`），
//! 路由守卫和请求管线都只通过 [`TokenStore`] 读取令牌。

use parking_lot::Mutex;

pub trait TokenStore: Send + Sync {
    /// 读取令牌；空字符串视为不存在
    fn token(&self) -> Option<String>;
    fn set_token(&self, token: &str);
    fn clear_token(&self);
}

/// 规范化令牌：去掉空值
pub(crate) fn non_empty(token: Option<String>) -> Option<String> {
    token.filter(|t| !t.is_empty())
}

/// 内存中的令牌存储
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        let store = Self::new();
        store.set_token(token);
        store
    }
}

impl TokenStore for MemoryTokenStore {
    fn token(&self) -> Option<String> {
        non_empty(self.token.lock().clone())
    }

    fn set_token(&self, token: &str) {
        *self.token.lock() = Some(token.to_string());
    }

    fn clear_token(&self) {
        *self.token.lock() = None;
    }
}
