//! 应用管理后台前端
//!
//! 采用 Context-Driven 的高内聚低耦合架构：
//! - `appconsole`: 路由表、守卫与请求层（平台无关）
//! - `web::router`: 路由服务（History API）
//! - `web`: fetch、LocalStorage、定时器等浏览器绑定
//! - `components`: UI 组件层

mod components {
    pub mod diagnostics_panel;
    pub mod pages;
    pub mod toast;
}
mod panic_hook;

use std::sync::Arc;

use appconsole::session::TokenStore;
use appconsole::{
    ApiClient, ClientConfig, ClientContext, Diagnostics, LoginGuard, NavigationOutcome,
    ResolvedRoute, RouteTable, RouterCore, SystemLogger, ViewKey, resolve_base_url,
};
use leptos::prelude::*;

use crate::components::diagnostics_panel::DiagnosticsPanel;
use crate::components::pages::{Layout, LoginPage, NotFoundPage, PagePlaceholder};
use crate::components::toast::{ToastCenter, ToastViewport};

// 原生 Web API 封装模块
// 此模块提供对浏览器原生 API 的轻量级封装，并实现核心 crate 定义的宿主接口。
pub(crate) mod web {
    mod console;
    mod download;
    pub mod global_errors;
    mod host;
    mod http;
    pub mod router;
    mod storage;
    mod timer;

    pub use console::BrowserConsoleSink;
    pub use download::download_json;
    pub use host::{BrowserHost, page_hostname, page_origin};
    pub use http::FetchHttpClient;
    pub use storage::LocalTokenStore;
    pub use timer::Timeout;
}

use web::router::{Router, RouterOutlet};
use web::{BrowserConsoleSink, BrowserHost, FetchHttpClient, LocalTokenStore};

/// 页面使用的 API 客户端
#[derive(Clone)]
pub struct ApiContext(pub ApiClient<FetchHttpClient>);

/// 构建期配置，未设置时使用默认值
fn app_config() -> ClientConfig {
    let mut config = ClientConfig::default().with_api_origin(option_env!("APPCONSOLE_API_ORIGIN"));
    if let Some(ms) = option_env!("APPCONSOLE_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
        config.timeout_ms = ms;
    }
    config
}

/// 路由匹配函数
///
/// 根据导航结果返回对应的视图组件，视图只在命中时构建。
fn route_matcher(outcome: NavigationOutcome) -> AnyView {
    match outcome {
        NavigationOutcome::Render(route) | NavigationOutcome::Redirected { to: route, .. } => {
            render_route(route)
        }
        NavigationOutcome::NotFound(path) => view! { <NotFoundPage path=path /> }.into_any(),
    }
}

fn render_route(route: ResolvedRoute) -> AnyView {
    let page = match route.view() {
        ViewKey::Login => return view! { <LoginPage /> }.into_any(),
        ViewKey::Layout
        | ViewKey::Dashboard
        | ViewKey::Apps
        | ViewKey::Modules
        | ViewKey::AuditLog
        | ViewKey::AppConfig
        | ViewKey::FeatureVersions
        | ViewKey::ModuleVersions => view! { <PagePlaceholder route=route.clone() /> }.into_any(),
    };

    if route.layouts().any(|view| view == ViewKey::Layout) {
        view! { <Layout route=route>{page}</Layout> }.into_any()
    } else {
        page
    }
}

#[component]
pub fn App() -> impl IntoView {
    // 1. 宿主与日志
    let host = Arc::new(BrowserHost);
    let mut config = app_config();
    let logger = Arc::new(SystemLogger::new(
        config.log_capacity,
        BrowserConsoleSink,
        host.clone(),
    ));
    if let Err(e) = config.validate() {
        logger.warn("System", format!("Invalid build configuration: {}", e), None);
        config = ClientConfig::default();
    }
    if let Err(e) = RouteTable::default().validate() {
        logger.error("Router", format!("Invalid route table: {}", e), None);
    }
    let config = Arc::new(config);

    // 2. 全局错误捕获
    web::global_errors::install(logger.clone());
    panic_hook::install(logger.clone());

    // 3. 请求层
    let base_url = resolve_base_url(&config, &web::page_hostname(), &web::page_origin());
    logger.log_startup(&base_url);

    let session: Arc<dyn TokenStore> = Arc::new(LocalTokenStore::new(&config.token_key));
    let toasts = ToastCenter::new();
    let ctx = ClientContext {
        config: config.clone(),
        logger: logger.clone(),
        session: session.clone(),
        notifier: Arc::new(toasts.clone()),
        redirector: host.clone(),
        host,
    };
    let client = ApiClient::new(FetchHttpClient::new(config.timeout()), base_url, ctx);

    provide_context(ApiContext(client));
    provide_context(Diagnostics::new(logger.clone()));
    provide_context(toasts);
    provide_context(session.clone());

    // 4. 路由器：注入令牌存储实现守卫
    let core = RouterCore::new(RouteTable::default(), LoginGuard::new(&config.login_path))
        .unwrap_or_else(|e| {
            logger.error("Router", format!("Invalid login route: {}", e), None);
            RouterCore::default()
        });

    view! {
        <Router core=core session=session logger=logger>
            <RouterOutlet matcher=route_matcher />
        </Router>
        <ToastViewport />
        <DiagnosticsPanel />
    }
}
