//! 导航守卫与路由核心
//!
//! 导航流程：静态重定向 -> 守卫 -> 加载。
//! 守卫只关心令牌是否存在，令牌由调用方从存储中读取后传入。

use crate::routes::{LOGIN_PATH, ResolvedRoute, RouteTable, RouteTableError, ViewKey};

/// 守卫的判定结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Proceed,
    Redirect(String),
}

/// 全局登录守卫
#[derive(Debug, Clone)]
pub struct LoginGuard {
    login_path: String,
}

impl Default for LoginGuard {
    fn default() -> Self {
        Self::new(LOGIN_PATH)
    }
}

impl LoginGuard {
    pub fn new(login_path: &str) -> Self {
        Self {
            login_path: login_path.to_string(),
        }
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    /// **核心守卫逻辑**：非登录页且没有令牌时跳转登录页
    pub fn check(&self, to: &str, token: Option<&str>) -> Navigation {
        let has_token = token.is_some_and(|t| !t.is_empty());
        if to != self.login_path && !has_token {
            Navigation::Redirect(self.login_path.clone())
        } else {
            Navigation::Proceed
        }
    }
}

/// 一次导航的最终结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// 渲染目标路由
    Render(ResolvedRoute),
    /// 被守卫拦截，渲染重定向后的路由
    Redirected { from: String, to: ResolvedRoute },
    /// 路由表中没有该路径（保留原始请求）
    NotFound(String),
}

impl NavigationOutcome {
    /// 浏览器地址栏应显示的路径，包含查询串与哈希
    pub fn location(&self) -> String {
        match self {
            NavigationOutcome::Render(route) => route.full_path(),
            NavigationOutcome::Redirected { to, .. } => to.full_path(),
            NavigationOutcome::NotFound(path) => path.clone(),
        }
    }

    /// 地址是否与请求的路径不同（需要 replaceState）
    pub fn is_redirect(&self) -> bool {
        match self {
            NavigationOutcome::Render(route) => route.redirected_from.is_some(),
            NavigationOutcome::Redirected { .. } => true,
            NavigationOutcome::NotFound(_) => false,
        }
    }
}

/// 路由核心：路由表 + 守卫
#[derive(Debug, Clone, Default)]
pub struct RouterCore {
    table: RouteTable,
    guard: LoginGuard,
}

impl RouterCore {
    /// 守卫的登录路径必须在路由表中解析到登录视图
    pub fn new(table: RouteTable, guard: LoginGuard) -> Result<Self, RouteTableError> {
        match table.resolve(guard.login_path()) {
            Some(route) if route.view() == ViewKey::Login && route.redirected_from.is_none() => {
                Ok(Self { table, guard })
            }
            _ => Err(RouteTableError::MissingLoginRoute(
                guard.login_path().to_string(),
            )),
        }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    /// **核心方法：导航与守卫**
    pub fn navigate(&self, path: &str, token: Option<&str>) -> NavigationOutcome {
        let resolved = self.table.resolve(path);
        let target = resolved
            .as_ref()
            .map(|r| r.path.clone())
            .unwrap_or_else(|| path.split(['?', '#']).next().unwrap_or("/").to_string());

        match self.guard.check(&target, token) {
            Navigation::Redirect(login) => match self.table.resolve(&login) {
                Some(to) => NavigationOutcome::Redirected { from: target, to },
                None => NavigationOutcome::NotFound(login),
            },
            Navigation::Proceed => match resolved {
                Some(route) => NavigationOutcome::Render(route),
                None => NavigationOutcome::NotFound(path.to_string()),
            },
        }
    }
}
