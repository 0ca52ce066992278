//! 客户端配置
//!
//! 所有值都有默认值；部署环境可通过 JSON 覆盖其中任意字段，
//! 未出现的字段回落到默认值。

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::guard::{LoginGuard, RouterCore};
use crate::routes::{LOGIN_PATH, RouteTable};

// =========================================================
// 默认值 (Defaults)
// =========================================================

const DEFAULT_API_PREFIX: &str = "/api/v1";
const DEFAULT_API_PORT: u16 = 8080;
const DEFAULT_DEV_PORTS: [u16; 2] = [5173, 5174];
const DEFAULT_LOOPBACK_HOSTS: [&str; 2] = ["localhost", "127.0.0.1"];
const DEFAULT_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_REDIRECT_DELAY_MS: u64 = 1_500;
const DEFAULT_NOTIFICATION_MS: u64 = 10_000;
const DEFAULT_LOG_CAPACITY: usize = 200;
const DEFAULT_TOKEN_KEY: &str = "token";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("配置解析失败: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("配置无效: {0}")]
    Invalid(&'static str),
}

/// 请求层与日志层的运行时配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// API 路径前缀，拼接在来源之后
    pub api_prefix: String,
    /// 显式指定的 API 来源（如 `https://api.example.com`）。
    /// 设置后不再从页面来源推导端口。
    pub api_origin: Option<String>,
    /// 视为本地开发环境的主机名，走相对路径（由开发服务器代理）
    pub loopback_hosts: Vec<String>,
    /// 开发服务器端口，推导 API 来源时会被替换为 `api_port`
    pub dev_ports: Vec<u16>,
    pub api_port: u16,
    pub timeout_ms: u64,
    /// 401 之后跳转登录页的延迟
    pub unauthorized_redirect_delay_ms: u64,
    /// 严重错误通知的展示时长
    pub notification_duration_ms: u64,
    /// 每个日志序列的容量
    pub log_capacity: usize,
    /// 会话令牌在本地存储中的键
    pub token_key: String,
    pub login_path: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            api_origin: None,
            loopback_hosts: DEFAULT_LOOPBACK_HOSTS.iter().map(|h| h.to_string()).collect(),
            dev_ports: DEFAULT_DEV_PORTS.to_vec(),
            api_port: DEFAULT_API_PORT,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            unauthorized_redirect_delay_ms: DEFAULT_REDIRECT_DELAY_MS,
            notification_duration_ms: DEFAULT_NOTIFICATION_MS,
            log_capacity: DEFAULT_LOG_CAPACITY,
            token_key: DEFAULT_TOKEN_KEY.to_string(),
            login_path: LOGIN_PATH.to_string(),
        }
    }
}

impl ClientConfig {
    /// 从 JSON 文本加载配置，缺失字段使用默认值
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.log_capacity == 0 {
            return Err(ConfigError::Invalid("log_capacity 必须大于 0"));
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::Invalid("timeout_ms 必须大于 0"));
        }
        if !self.login_path.starts_with('/') {
            return Err(ConfigError::Invalid("login_path 必须以 / 开头"));
        }
        if RouterCore::new(RouteTable::default(), LoginGuard::new(&self.login_path)).is_err() {
            return Err(ConfigError::Invalid("login_path 必须指向路由表中的登录页"));
        }
        Ok(())
    }

    /// 覆盖 API 来源（空字符串视为未设置）
    pub fn with_api_origin(mut self, origin: Option<&str>) -> Self {
        self.api_origin = origin
            .map(|o| o.trim().trim_end_matches('/'))
            .filter(|o| !o.is_empty())
            .map(str::to_string);
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn unauthorized_redirect_delay(&self) -> Duration {
        Duration::from_millis(self.unauthorized_redirect_delay_ms)
    }

    pub fn notification_duration(&self) -> Duration {
        Duration::from_millis(self.notification_duration_ms)
    }
}
