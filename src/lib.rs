//! appconsole 核心
//!
//! 管理后台前端的路由表与请求层，与浏览器 API 解耦：
//! - `routes` / `guard`: 路由表、登录守卫与导航流程
//! - `logger` / `ring`: 有界日志缓冲区
//! - `client` / `request` / `failure`: 请求管线、传输抽象与错误分类
//! - `base_url` / `config`: API 地址解析与运行时配置
//! - `diagnostics`: 日志读取与导出命令
//!
//! 浏览器端的实现（fetch、localStorage、History API）见 `frontend` crate。

pub mod base_url;
pub mod client;
pub mod config;
pub mod diagnostics;
pub mod failure;
pub mod guard;
pub mod host;
pub mod logger;
pub mod notify;
pub mod request;
pub mod ring;
pub mod routes;
pub mod session;

pub use base_url::resolve_base_url;
pub use client::{ApiCall, ApiClient, ApiEndpoint, ClientContext};
pub use config::ClientConfig;
pub use diagnostics::{DiagnosticCommand, DiagnosticOutput, Diagnostics};
pub use failure::{ApiError, FailureKind};
pub use guard::{LoginGuard, Navigation, NavigationOutcome, RouterCore};
pub use logger::SystemLogger;
pub use routes::{ResolvedRoute, RouteTable, ViewKey};
