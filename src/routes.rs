//! 路由定义模块 - 领域模型
//!
//! 纯粹的路由表与匹配逻辑，不依赖于 DOM 或 web_sys。
//! 视图用 [`ViewKey`] 标识，前端在路由命中时才构建对应组件。

use std::collections::{BTreeMap, HashSet};
use std::fmt::Display;

/// 登录页路径，唯一不需要认证的路由
pub const LOGIN_PATH: &str = "/login";

/// 静态重定向的最大跳数
const MAX_REDIRECTS: usize = 8;

/// 视图标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewKey {
    Login,
    /// 带侧边栏的主布局
    Layout,
    Dashboard,
    Apps,
    Modules,
    AuditLog,
    AppConfig,
    FeatureVersions,
    ModuleVersions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RouteMeta {
    pub title: Option<&'static str>,
}

/// 路由表条目
#[derive(Debug, PartialEq, Eq)]
pub struct RouteEntry {
    /// 顶层为绝对路径，子路由为相对父路由的路径
    pub path: &'static str,
    pub name: Option<&'static str>,
    pub view: ViewKey,
    pub meta: RouteMeta,
    /// 精确命中该路径时跳转的目标
    pub redirect: Option<&'static str>,
    pub children: &'static [RouteEntry],
}

const NO_META: RouteMeta = RouteMeta { title: None };

const fn leaf(path: &'static str, name: &'static str, view: ViewKey, title: Option<&'static str>) -> RouteEntry {
    RouteEntry {
        path,
        name: Some(name),
        view,
        meta: RouteMeta { title },
        redirect: None,
        children: &[],
    }
}

/// 应用路由表（有序，先匹配者胜）
pub static ROUTES: &[RouteEntry] = &[
    leaf(LOGIN_PATH, "Login", ViewKey::Login, None),
    RouteEntry {
        path: "/",
        name: None,
        view: ViewKey::Layout,
        meta: NO_META,
        redirect: Some("/dashboard"),
        children: &[
            leaf("dashboard", "Dashboard", ViewKey::Dashboard, None),
            leaf("apps", "Apps", ViewKey::Apps, None),
            leaf("modules", "Modules", ViewKey::Modules, None),
            leaf("system/audit", "AuditLog", ViewKey::AuditLog, Some("操作审计日志")),
        ],
    },
    // APP 详情页面独立于主布局，拥有自己的顶部导航
    leaf("/apps/:id/config", "AppConfig", ViewKey::AppConfig, None),
    leaf(
        "/apps/:appId/collections/:collectionId/versions",
        "FeatureVersions",
        ViewKey::FeatureVersions,
        Some("版本管理"),
    ),
    leaf(
        "/apps/:appId/modules/:moduleCode/versions",
        "ModuleVersions",
        ViewKey::ModuleVersions,
        Some("模块版本管理"),
    ),
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteTableError {
    #[error("同级路由路径重复: {0}")]
    DuplicatePath(String),
    #[error("路由名称重复: {0}")]
    DuplicateName(&'static str),
    #[error("重定向次数过多: {0}")]
    RedirectLoop(String),
    #[error("登录路径未指向登录页: {0}")]
    MissingLoginRoute(String),
    #[error("缺少路由参数 {param} (路由 {name})")]
    MissingParam { name: &'static str, param: String },
}

/// 匹配结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute {
    /// 最终路径（经过静态重定向之后）
    pub path: String,
    /// 从外到内命中的条目，最后一个是叶子
    pub matched: Vec<&'static RouteEntry>,
    pub params: BTreeMap<String, String>,
    /// 原始请求中的查询串与哈希（含 `?` / `#`），重定向后保留
    pub suffix: String,
    /// 发生静态重定向时的原始路径
    pub redirected_from: Option<String>,
}

impl ResolvedRoute {
    pub fn leaf(&self) -> &'static RouteEntry {
        // matched 至少包含一个条目
        self.matched[self.matched.len() - 1]
    }

    pub fn name(&self) -> Option<&'static str> {
        self.leaf().name
    }

    pub fn view(&self) -> ViewKey {
        self.leaf().view
    }

    pub fn title(&self) -> Option<&'static str> {
        self.leaf().meta.title
    }

    /// 外层布局视图（不含叶子）
    pub fn layouts(&self) -> impl Iterator<Item = ViewKey> + '_ {
        self.matched[..self.matched.len() - 1].iter().map(|e| e.view)
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// 带查询串和哈希的完整路径，用于写入浏览器历史
    pub fn full_path(&self) -> String {
        format!("{}{}", self.path, self.suffix)
    }
}

impl Display for ResolvedRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path)
    }
}

/// 路由表
#[derive(Debug, Clone, Copy)]
pub struct RouteTable {
    routes: &'static [RouteEntry],
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new(ROUTES)
    }
}

impl RouteTable {
    pub const fn new(routes: &'static [RouteEntry]) -> Self {
        Self { routes }
    }

    pub fn entries(&self) -> &'static [RouteEntry] {
        self.routes
    }

    /// 将 URL path 解析为路由，未匹配时返回 `None`
    pub fn resolve(&self, path: &str) -> Option<ResolvedRoute> {
        self.resolve_with_redirects(path).ok().flatten()
    }

    /// 解析路由并跟随静态重定向
    pub fn resolve_with_redirects(&self, path: &str) -> Result<Option<ResolvedRoute>, RouteTableError> {
        let original = normalize(path);
        let mut current = original.clone();

        for _ in 0..MAX_REDIRECTS {
            let Some((matched, params)) = match_in(self.routes, "", &current) else {
                return Ok(None);
            };
            let leaf = matched[matched.len() - 1];
            match leaf.redirect {
                Some(target) if target != current => current = normalize(target),
                _ => {
                    let redirected_from = (current != original).then(|| original.clone());
                    return Ok(Some(ResolvedRoute {
                        path: current,
                        matched,
                        params,
                        suffix: suffix(path).to_string(),
                        redirected_from,
                    }));
                }
            }
        }

        Err(RouteTableError::RedirectLoop(original))
    }

    /// 按名称生成路径（反向查找）
    pub fn href(
        &self,
        name: &str,
        params: &BTreeMap<String, String>,
    ) -> Result<Option<String>, RouteTableError> {
        let Some((entry, full)) = find_by_name(self.routes, "", name) else {
            return Ok(None);
        };
        let entry_name = entry.name.unwrap_or_default();

        let mut segments = Vec::new();
        for segment in split(&full) {
            match segment.strip_prefix(':') {
                Some(param) => {
                    let value = params.get(param).ok_or_else(|| RouteTableError::MissingParam {
                        name: entry_name,
                        param: param.to_string(),
                    })?;
                    segments.push(urlencoding::encode(value).into_owned());
                }
                None => segments.push(segment.to_string()),
            }
        }
        Ok(Some(format!("/{}", segments.join("/"))))
    }

    /// 校验路由表：同级路径唯一、名称全局唯一
    pub fn validate(&self) -> Result<(), RouteTableError> {
        let mut names = HashSet::new();
        validate_level(self.routes, &mut names)
    }
}

fn validate_level(
    entries: &'static [RouteEntry],
    names: &mut HashSet<&'static str>,
) -> Result<(), RouteTableError> {
    let mut paths = HashSet::new();
    for entry in entries {
        if !paths.insert(normalize(entry.path)) {
            return Err(RouteTableError::DuplicatePath(entry.path.to_string()));
        }
        if let Some(name) = entry.name {
            if !names.insert(name) {
                return Err(RouteTableError::DuplicateName(name));
            }
        }
        validate_level(entry.children, names)?;
    }
    Ok(())
}

/// 去掉查询串、哈希和多余的斜杠
fn normalize(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let segments: Vec<&str> = split(path).collect();
    format!("/{}", segments.join("/"))
}

/// 路径中 `?` 或 `#` 开始的部分
fn suffix(path: &str) -> &str {
    path.find(['?', '#']).map_or("", |i| &path[i..])
}

fn split(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

fn join(parent: &str, child: &str) -> String {
    if child.starts_with('/') {
        child.to_string()
    } else {
        format!("{}/{}", parent.trim_end_matches('/'), child)
    }
}

type Match = (Vec<&'static RouteEntry>, BTreeMap<String, String>);

fn match_in(entries: &'static [RouteEntry], parent: &str, path: &str) -> Option<Match> {
    for entry in entries {
        let full = join(parent, entry.path);

        if let Some(params) = match_pattern(&full, path) {
            return Some((vec![entry], params));
        }

        if let Some((mut chain, params)) = match_in(entry.children, &full, path) {
            chain.insert(0, entry);
            return Some((chain, params));
        }
    }
    None
}

fn match_pattern(pattern: &str, path: &str) -> Option<BTreeMap<String, String>> {
    let pattern: Vec<&str> = split(pattern).collect();
    let path: Vec<&str> = split(path).collect();
    if pattern.len() != path.len() {
        return None;
    }

    let mut params = BTreeMap::new();
    for (p, s) in pattern.iter().zip(path.iter()) {
        match p.strip_prefix(':') {
            Some(name) => {
                let value = urlencoding::decode(s)
                    .map(|v| v.into_owned())
                    .unwrap_or_else(|_| s.to_string());
                params.insert(name.to_string(), value);
            }
            None if p == s => {}
            None => return None,
        }
    }
    Some(params)
}

fn find_by_name(
    entries: &'static [RouteEntry],
    parent: &str,
    name: &str,
) -> Option<(&'static RouteEntry, String)> {
    for entry in entries {
        let full = join(parent, entry.path);
        if entry.name == Some(name) {
            return Some((entry, full));
        }
        if let Some(found) = find_by_name(entry.children, &full, name) {
            return Some(found);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_table_is_valid() {
        RouteTable::default().validate().unwrap();
    }

    #[test]
    fn test_root_redirects_to_dashboard() {
        let route = RouteTable::default().resolve("/").unwrap();
        assert_eq!(route.path, "/dashboard");
        assert_eq!(route.name(), Some("Dashboard"));
        assert_eq!(route.redirected_from.as_deref(), Some("/"));
        assert_eq!(route.full_path(), "/dashboard");
        assert_eq!(route.layouts().collect::<Vec<_>>(), vec![ViewKey::Layout]);
    }

    #[test]
    fn test_children_mount_under_layout() {
        let table = RouteTable::default();
        let audit = table.resolve("/system/audit").unwrap();
        assert_eq!(audit.view(), ViewKey::AuditLog);
        assert_eq!(audit.title(), Some("操作审计日志"));
        assert_eq!(audit.matched.len(), 2);
        assert_eq!(audit.matched[0].view, ViewKey::Layout);

        let apps = table.resolve("/apps/").unwrap();
        assert_eq!(apps.name(), Some("Apps"));
    }

    #[test]
    fn test_standalone_routes_with_params() {
        let table = RouteTable::default();

        let config = table.resolve("/apps/12/config?tab=modules").unwrap();
        assert_eq!(config.view(), ViewKey::AppConfig);
        assert_eq!(config.path, "/apps/12/config");
        assert_eq!(config.full_path(), "/apps/12/config?tab=modules");
        assert_eq!(config.param("id"), Some("12"));
        assert_eq!(config.layouts().count(), 0);

        let versions = table.resolve("/apps/3/modules/pay%20core/versions").unwrap();
        assert_eq!(versions.name(), Some("ModuleVersions"));
        assert_eq!(versions.param("appId"), Some("3"));
        assert_eq!(versions.param("moduleCode"), Some("pay core"));
        assert_eq!(versions.title(), Some("模块版本管理"));

        let features = table.resolve("/apps/3/collections/8/versions").unwrap();
        assert_eq!(features.view(), ViewKey::FeatureVersions);
        assert_eq!(features.param("collectionId"), Some("8"));
    }

    #[test]
    fn test_redirect_keeps_query_and_hash() {
        let route = RouteTable::default().resolve("/?from=mail#top").unwrap();
        assert_eq!(route.path, "/dashboard");
        assert_eq!(route.suffix, "?from=mail#top");
        assert_eq!(route.full_path(), "/dashboard?from=mail#top");
        assert_eq!(route.redirected_from.as_deref(), Some("/"));
    }

    #[test]
    fn test_unknown_paths() {
        let table = RouteTable::default();
        assert_eq!(table.resolve("/nope"), None);
        assert_eq!(table.resolve("/apps/1"), None);
    }

    #[test]
    fn test_login_route() {
        let login = RouteTable::default().resolve("/login").unwrap();
        assert_eq!(login.view(), ViewKey::Login);
        assert_eq!(login.redirected_from, None);
    }

    #[test]
    fn test_href() {
        let table = RouteTable::default();
        assert_eq!(
            table.href("AuditLog", &BTreeMap::new()).unwrap().as_deref(),
            Some("/system/audit")
        );
        assert_eq!(
            table
                .href("ModuleVersions", &params(&[("appId", "3"), ("moduleCode", "pay core")]))
                .unwrap()
                .as_deref(),
            Some("/apps/3/modules/pay%20core/versions")
        );
        assert_eq!(table.href("Missing", &BTreeMap::new()).unwrap(), None);
        assert!(matches!(
            table.href("AppConfig", &BTreeMap::new()),
            Err(RouteTableError::MissingParam { .. })
        ));
    }

    static DUPLICATE_PATHS: &[RouteEntry] = &[
        leaf("/a", "A", ViewKey::Apps, None),
        leaf("/a/", "B", ViewKey::Modules, None),
    ];

    static DUPLICATE_NAMES: &[RouteEntry] = &[
        leaf("/a", "A", ViewKey::Apps, None),
        RouteEntry {
            path: "/b",
            name: None,
            view: ViewKey::Layout,
            meta: NO_META,
            redirect: None,
            children: &[leaf("c", "A", ViewKey::Modules, None)],
        },
    ];

    static LOOP: &[RouteEntry] = &[
        RouteEntry {
            path: "/x",
            name: None,
            view: ViewKey::Layout,
            meta: NO_META,
            redirect: Some("/y"),
            children: &[],
        },
        RouteEntry {
            path: "/y",
            name: None,
            view: ViewKey::Layout,
            meta: NO_META,
            redirect: Some("/x"),
            children: &[],
        },
    ];

    #[test]
    fn test_validate_rejects_duplicates() {
        assert_eq!(
            RouteTable::new(DUPLICATE_PATHS).validate(),
            Err(RouteTableError::DuplicatePath("/a/".to_string()))
        );
        assert_eq!(
            RouteTable::new(DUPLICATE_NAMES).validate(),
            Err(RouteTableError::DuplicateName("A"))
        );
    }

    #[test]
    fn test_redirect_loop_detected() {
        let table = RouteTable::new(LOOP);
        assert!(matches!(
            table.resolve_with_redirects("/x"),
            Err(RouteTableError::RedirectLoop(_))
        ));
        assert_eq!(table.resolve("/x"), None);
    }
}
