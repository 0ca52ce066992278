//! 路由服务模块 - 核心引擎
//!
//! 封装了 web_sys 的 History API，所有对 window.history 的操作都集中在此模块。
//! 路由匹配与守卫由核心 crate 的 [`RouterCore`] 完成，
//! 此处只负责"监听 -> 验证 -> 处理 -> 加载"流程中与浏览器相关的部分。

use std::sync::Arc;

use appconsole::session::TokenStore;
use appconsole::{NavigationOutcome, RouterCore, SystemLogger};
use leptos::prelude::*;
use wasm_bindgen::prelude::*;

/// 获取当前浏览器路径（含查询串和哈希）
fn current_path() -> String {
    web_sys::window()
        .map(|w| {
            let location = w.location();
            let path = location.pathname().unwrap_or_else(|_| "/".to_string());
            let search = location.search().unwrap_or_default();
            let hash = location.hash().unwrap_or_default();
            format!("{}{}{}", path, search, hash)
        })
        .unwrap_or_else(|| "/".to_string())
}

/// 推送 History 状态（内部工具函数）
fn push_history_state(path: &str) {
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let _ = history.push_state_with_url(&JsValue::NULL, "", Some(path));
        }
    }
}

/// 替换 History 状态（内部工具函数，用于重定向）
fn replace_history_state(path: &str) {
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let _ = history.replace_state_with_url(&JsValue::NULL, "", Some(path));
        }
    }
}

/// 路由器服务
///
/// 封装所有路由操作，通过 Signal 驱动界面更新。
/// 守卫读取的令牌来自注入的 [`TokenStore`]，与登录流程解耦。
#[derive(Clone, Copy)]
pub struct RouterService {
    /// 当前导航结果（只读信号）
    current: ReadSignal<NavigationOutcome>,
    /// 设置导航结果（写入信号）
    set_current: WriteSignal<NavigationOutcome>,
    core: StoredValue<RouterCore>,
    session: StoredValue<Arc<dyn TokenStore>>,
    logger: StoredValue<Arc<SystemLogger>>,
}

impl RouterService {
    fn new(core: RouterCore, session: Arc<dyn TokenStore>, logger: Arc<SystemLogger>) -> Self {
        let core = StoredValue::new(core);
        let session = StoredValue::new(session);
        let logger = StoredValue::new(logger);

        // 1. 初始化当前路由（从 URL 解析）
        let path = current_path();
        let token = session.with_value(|s| s.token());
        let initial = core.with_value(|c| c.navigate(&path, token.as_deref()));
        if initial.is_redirect() {
            replace_history_state(&initial.location());
        }
        let (current, set_current) = signal(initial);

        Self {
            current,
            set_current,
            core,
            session,
            logger,
        }
    }

    /// 获取当前导航结果信号
    pub fn current(&self) -> ReadSignal<NavigationOutcome> {
        self.current
    }

    /// **核心方法：导航与守卫**
    ///
    /// 流程：请求 -> 静态重定向 -> 验证(Guard) -> 加载
    pub fn navigate(&self, path: &str) {
        self.navigate_with(path, true);
    }

    /// 导航到指定路径
    ///
    /// # Arguments
    /// * `path` - 目标路径
    /// * `use_push` - true 使用 pushState, false 使用 replaceState
    fn navigate_with(&self, path: &str, use_push: bool) {
        let token = self.session.with_value(|s| s.token());
        let outcome = self
            .core
            .with_value(|c| c.navigate(path, token.as_deref()));

        // --- Step 1: 守卫拦截 ---
        if let NavigationOutcome::Redirected { from, to } = &outcome {
            self.logger.with_value(|l| {
                l.warn(
                    "Router",
                    format!("Access denied to {}, redirecting to {}", from, to.path),
                    None,
                )
            });
        }

        // --- Step 2: 加载页面 (更新状态) ---
        if use_push {
            push_history_state(&outcome.location());
        } else {
            replace_history_state(&outcome.location());
        }
        self.set_current.set(outcome);
    }

    /// 初始化浏览器后退/前进按钮监听
    fn init_popstate_listener(&self) {
        let router = *self;

        // popstate 时也执行守卫逻辑，重定向时替换当前记录
        let closure = Closure::<dyn Fn()>::new(move || {
            router.navigate_with(&current_path(), false);
        });

        if let Some(window) = web_sys::window() {
            let _ = window
                .add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref());
        }

        // 泄漏闭包以保持监听器存活
        closure.forget();
    }
}

/// 提供路由服务到 Context 并初始化
fn provide_router(
    core: RouterCore,
    session: Arc<dyn TokenStore>,
    logger: Arc<SystemLogger>,
) -> RouterService {
    let router = RouterService::new(core, session, logger);
    router.init_popstate_listener();
    provide_context(router);
    router
}

/// 从 Context 获取路由服务
pub fn use_router() -> RouterService {
    use_context::<RouterService>()
        .expect("RouterService not found in context. Ensure Router is provided.")
}

/// 导航函数（返回一个可调用的闭包）
pub fn use_navigate() -> impl Fn(&str) + Clone {
    let router = use_router();
    move |to: &str| {
        router.navigate(to);
    }
}

// ============================================================================
// UI 组件
// ============================================================================

/// 路由器根组件
///
/// 提供路由上下文，应在 App 根部使用。
#[component]
pub fn Router(
    /// 路由表与守卫
    core: RouterCore,
    /// 令牌存储，守卫据此判断是否已登录
    session: Arc<dyn TokenStore>,
    logger: Arc<SystemLogger>,
    /// 子组件
    children: Children,
) -> impl IntoView {
    provide_router(core, session, logger);

    children()
}

/// 路由出口组件
///
/// 根据当前导航结果渲染对应的组件。
#[component]
pub fn RouterOutlet(
    /// 路由匹配函数：接收导航结果，返回对应视图
    matcher: fn(NavigationOutcome) -> AnyView,
) -> impl IntoView {
    let router = use_router();

    move || {
        let current = router.current().get();
        matcher(current)
    }
}

/// 站内链接，点击时走路由服务而不是整页加载
#[component]
pub fn Link(
    /// 目标路径
    #[prop(into)]
    to: String,
    #[prop(into, optional)] class: String,
    /// 子内容
    children: Children,
) -> impl IntoView {
    let router = use_router();

    let to_clone = to.clone();
    let on_click = move |ev: web_sys::MouseEvent| {
        ev.prevent_default();
        router.navigate(&to_clone);
    };

    view! {
        <a href=to class=class on:click=on_click>
            {children()}
        </a>
    }
}
