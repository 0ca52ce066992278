//! 页面组件
//!
//! 业务页面的内容不在本项目范围内，这里只渲染占位页：
//! 显示路由标题与参数，并可对同名资源发起一次请求以检查请求层。

use std::sync::Arc;

use appconsole::ResolvedRoute;
use appconsole::session::TokenStore;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::ApiContext;
use crate::web::router::{Link, use_navigate};

/// 导航菜单：路径与显示名
const MENU: &[(&str, &str)] = &[
    ("/dashboard", "仪表盘"),
    ("/apps", "应用管理"),
    ("/modules", "模块管理"),
    ("/system/audit", "操作审计"),
];

fn use_session() -> Arc<dyn TokenStore> {
    use_context::<Arc<dyn TokenStore>>().expect("TokenStore should be provided")
}

/// 带侧边栏的主布局
#[component]
pub fn Layout(
    /// 当前路由，用于高亮菜单和显示标题
    route: ResolvedRoute,
    children: Children,
) -> impl IntoView {
    let session = use_session();
    let navigate = use_navigate();
    let title = route.title().or(route.name()).unwrap_or_default();
    let active = route.path.clone();

    let on_logout = move |_| {
        session.clear_token();
        navigate("/login");
    };

    view! {
        <div class="flex min-h-screen bg-base-200">
            <aside class="w-56 bg-base-100 shadow-md">
                <div class="p-4 text-lg font-bold">"应用管理后台"</div>
                <ul class="menu w-full">
                    {MENU
                        .iter()
                        .map(|(path, label)| {
                            let class = if active.starts_with(path) { "active" } else { "" };
                            view! {
                                <li>
                                    <Link to=*path class=class>{*label}</Link>
                                </li>
                            }
                        })
                        .collect_view()}
                </ul>
            </aside>
            <div class="flex-1 flex flex-col">
                <header class="navbar bg-base-100 shadow-sm px-6">
                    <h1 class="flex-1 text-xl font-semibold">{title}</h1>
                    <button class="btn btn-ghost btn-sm" on:click=on_logout>"退出登录"</button>
                </header>
                <main class="p-6">{children()}</main>
            </div>
        </div>
    }
}

/// 业务页面占位
#[component]
pub fn PagePlaceholder(route: ResolvedRoute) -> impl IntoView {
    let api = use_context::<ApiContext>().expect("ApiContext should be provided");

    let (preview, set_preview) = signal(Option::<String>::None);
    let (loading, set_loading) = signal(false);

    let path = route.path.clone();
    let on_load = move |_| {
        let client = api.0.clone();
        let path = path.clone();
        set_loading.set(true);
        spawn_local(async move {
            // 失败时请求层已经记录日志并提示用户
            if let Ok(body) = client.get(&path).await {
                let text = serde_json::to_string_pretty(&body).unwrap_or_default();
                set_preview.set(Some(text));
            }
            set_loading.set(false);
        });
    };

    let params: Vec<(String, String)> = route.params.clone().into_iter().collect();
    let has_params = !params.is_empty();

    view! {
        <div class="card bg-base-100 shadow">
            <div class="card-body">
                <h2 class="card-title">{route.title().or(route.name()).unwrap_or_default()}</h2>
                <p class="text-sm opacity-70 font-mono">{route.path.clone()}</p>
                <Show when=move || has_params>
                    <table class="table table-sm w-auto">
                        <thead>
                            <tr><th>"参数"</th><th>"值"</th></tr>
                        </thead>
                        <tbody>
                            {params
                                .clone()
                                .into_iter()
                                .map(|(key, value)| view! {
                                    <tr>
                                        <td class="font-mono">{key}</td>
                                        <td class="font-mono">{value}</td>
                                    </tr>
                                })
                                .collect_view()}
                        </tbody>
                    </table>
                </Show>
                <div class="card-actions">
                    <button class="btn btn-sm btn-outline" disabled=move || loading.get() on:click=on_load>
                        "加载数据"
                    </button>
                </div>
                {move || preview.get().map(|text| view! {
                    <pre class="bg-base-200 rounded p-3 text-xs overflow-x-auto">{text}</pre>
                })}
            </div>
        </div>
    }
}

/// 登录页占位：保存一个令牌后进入仪表盘
#[component]
pub fn LoginPage() -> impl IntoView {
    let session = use_session();
    let navigate = use_navigate();
    let (token, set_token) = signal(String::new());

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let value = token.get_untracked();
        if value.trim().is_empty() {
            return;
        }
        session.set_token(value.trim());
        navigate("/dashboard");
    };

    view! {
        <div class="hero min-h-screen bg-base-200">
            <div class="hero-content flex-col w-full max-w-md">
                <h1 class="text-3xl font-bold">"应用管理后台"</h1>
                <div class="card shrink-0 w-full shadow-2xl bg-base-100">
                    <form class="card-body" on:submit=on_submit>
                        <div class="form-control">
                            <label class="label" for="token">
                                <span class="label-text">"访问令牌"</span>
                            </label>
                            <input
                                id="token"
                                type="password"
                                on:input=move |ev| set_token.set(event_target_value(&ev))
                                prop:value=token
                                class="input input-bordered"
                                required
                            />
                        </div>
                        <div class="form-control mt-6">
                            <button class="btn btn-primary">"登录"</button>
                        </div>
                    </form>
                </div>
            </div>
        </div>
    }
}

#[component]
pub fn NotFoundPage(path: String) -> impl IntoView {
    view! {
        <div class="flex items-center justify-center min-h-screen bg-base-200">
            <div class="text-center">
                <h1 class="text-6xl font-bold text-error">"404"</h1>
                <p class="text-xl mt-4">"页面未找到"</p>
                <p class="font-mono opacity-60 mt-2">{path}</p>
                <Link to="/dashboard" class="btn btn-primary mt-6">"返回首页"</Link>
            </div>
        </div>
    }
}
