//! 消息与通知
//!
//! [`ToastCenter`] 实现核心 crate 的 [`Notifier`]，请求管线通过它向用户提示。

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use appconsole::notify::{MessageLevel, Notification, Notifier};
use leptos::prelude::*;

use crate::web::Timeout;

/// 短暂消息的显示时长
const MESSAGE_DURATION: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, PartialEq)]
struct Toast {
    id: u64,
    title: Option<String>,
    text: String,
    level: MessageLevel,
}

/// 提示中心，可在 Context 中共享
#[derive(Clone)]
pub struct ToastCenter {
    toasts: RwSignal<Vec<Toast>>,
    next_id: Arc<AtomicU64>,
}

impl ToastCenter {
    pub fn new() -> Self {
        Self {
            toasts: RwSignal::new(Vec::new()),
            next_id: Arc::new(AtomicU64::new(0)),
        }
    }

    fn push(&self, title: Option<String>, text: String, level: MessageLevel, duration: Duration) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.toasts.update(|list| {
            list.push(Toast {
                id,
                title,
                text,
                level,
            })
        });

        let toasts = self.toasts;
        Timeout::detached(duration, move || {
            toasts.update(|list| list.retain(|t| t.id != id));
        });
    }

    fn dismiss(&self, id: u64) {
        self.toasts.update(|list| list.retain(|t| t.id != id));
    }
}

impl Notifier for ToastCenter {
    fn message(&self, level: MessageLevel, text: &str) {
        self.push(None, text.to_string(), level, MESSAGE_DURATION);
    }

    fn notify(&self, notification: Notification) {
        self.push(
            Some(notification.title),
            notification.message,
            notification.level,
            notification.duration,
        );
    }
}

/// 从 Context 获取提示中心
pub fn use_toasts() -> ToastCenter {
    use_context::<ToastCenter>().expect("ToastCenter should be provided")
}

fn alert_class(level: MessageLevel) -> &'static str {
    match level {
        MessageLevel::Success => "alert alert-success",
        MessageLevel::Info => "alert alert-info",
        MessageLevel::Warning => "alert alert-warning",
        MessageLevel::Error => "alert alert-error",
    }
}

/// 提示显示区域（右上角）
#[component]
pub fn ToastViewport() -> impl IntoView {
    let center = use_toasts();
    let toasts = center.toasts;

    view! {
        <div class="toast toast-top toast-end z-50">
            <For
                each=move || toasts.get()
                key=|toast| toast.id
                children=move |toast| {
                    let center = center.clone();
                    let id = toast.id;
                    view! {
                        <div role="alert" class=alert_class(toast.level)>
                            <div class="flex flex-col">
                                {toast.title.map(|title| view! { <h3 class="font-bold">{title}</h3> })}
                                <span class="whitespace-pre-line text-sm">{toast.text}</span>
                            </div>
                            <button class="btn btn-ghost btn-xs" on:click=move |_| center.dismiss(id)>
                                "✕"
                            </button>
                        </div>
                    }
                }
            />
        </div>
    }
}
