use appconsole::notify::{MessageLevel, Notifier};
use appconsole::{DiagnosticCommand, DiagnosticOutput, Diagnostics};
use leptos::prelude::*;
use serde_json::Value;

use crate::components::toast::use_toasts;
use crate::web::download_json;

const PANEL_ROWS: usize = 20;

fn entries(diagnostics: &Diagnostics, command: DiagnosticCommand) -> Vec<Value> {
    match diagnostics.run(command) {
        Ok(DiagnosticOutput::Entries(entries)) => entries,
        _ => Vec::new(),
    }
}

fn text(value: &Value, key: &str) -> String {
    match &value[key] {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// 诊断面板：查看最近的错误与请求，导出或清空日志
#[component]
pub fn DiagnosticsPanel() -> impl IntoView {
    let diagnostics = use_context::<Diagnostics>().expect("Diagnostics should be provided");
    let toasts = use_toasts();

    let (open, set_open) = signal(false);
    // 每次操作后递增，触发列表重新读取
    let (revision, set_revision) = signal(0u32);
    let (command_text, set_command_text) = signal(String::new());
    // 命令输出，每行一个 JSON 条目
    let (output, set_output) = signal(Vec::<String>::new());
    let toasts_for_input = toasts.clone();

    let errors = {
        let diagnostics = diagnostics.clone();
        move || {
            revision.track();
            entries(&diagnostics, DiagnosticCommand::RecentErrors(PANEL_ROWS))
        }
    };
    let requests = {
        let diagnostics = diagnostics.clone();
        move || {
            revision.track();
            entries(&diagnostics, DiagnosticCommand::RecentRequests(PANEL_ROWS))
        }
    };

    // 统一执行诊断命令，按钮与命令输入共用
    let execute = move |command: DiagnosticCommand| {
        match diagnostics.run(command) {
            Ok(DiagnosticOutput::Entries(entries)) => {
                let lines = entries
                    .iter()
                    .map(|entry| serde_json::to_string(entry).unwrap_or_default())
                    .collect();
                set_output.set(lines);
            }
            Ok(DiagnosticOutput::Export { file_name, content }) => {
                if download_json(&file_name, &content).is_err() {
                    toasts.message(MessageLevel::Error, "日志导出失败");
                }
            }
            Ok(DiagnosticOutput::Cleared) => {
                set_output.set(Vec::new());
                toasts.message(MessageLevel::Success, "日志已清空");
            }
            Err(e) => toasts.message(MessageLevel::Error, &format!("诊断命令执行失败: {}", e)),
        }
        set_revision.update(|r| *r += 1);
    };

    let on_command = {
        let execute = execute.clone();
        move |ev: leptos::web_sys::SubmitEvent| {
            ev.prevent_default();
            let input = command_text.get_untracked();
            match DiagnosticCommand::parse(&input) {
                Some(command) => {
                    execute(command);
                    set_command_text.set(String::new());
                }
                None => toasts_for_input.message(
                    MessageLevel::Warning,
                    "未知命令，可用：logs [n] / errors [n] / requests [n] / export / clear",
                ),
            }
        }
    };

    view! {
        <div class="fixed bottom-4 right-4 z-40 flex flex-col items-end gap-2">
            <Show when=move || open.get()>
                <div class="card w-[32rem] max-h-[70vh] overflow-y-auto bg-base-100 shadow-2xl">
                    <div class="card-body p-4 gap-3">
                        <div class="flex items-center justify-between">
                            <h2 class="card-title text-base">"诊断面板"</h2>
                            <div class="flex gap-2">
                                <button class="btn btn-xs" on:click=move |_| set_revision.update(|r| *r += 1)>"刷新"</button>
                                <button class="btn btn-xs btn-primary" on:click={
                                    let execute = execute.clone();
                                    move |_| execute(DiagnosticCommand::Export)
                                }>"导出日志"</button>
                                <button class="btn btn-xs btn-error btn-outline" on:click={
                                    let execute = execute.clone();
                                    move |_| execute(DiagnosticCommand::Clear)
                                }>"清空"</button>
                            </div>
                        </div>

                        <form class="join w-full" on:submit=on_command.clone()>
                            <input
                                class="input input-bordered input-xs join-item flex-1 font-mono"
                                placeholder="errors 50"
                                on:input=move |ev| set_command_text.set(event_target_value(&ev))
                                prop:value=command_text
                            />
                            <button class="btn btn-xs join-item">"执行"</button>
                        </form>
                        <Show when=move || !output.get().is_empty()>
                            <pre class="bg-base-200 rounded p-2 text-xs max-h-48 overflow-auto">
                                {move || output.get().join("\n")}
                            </pre>
                        </Show>

                        <h3 class="font-semibold text-sm">"最近错误"</h3>
                        <ul class="text-xs font-mono space-y-1">
                            {
                                let errors = errors.clone();
                                move || errors().into_iter().rev().map(|entry| view! {
                                    <li class="text-error">
                                        <span class="opacity-60">{text(&entry, "timestamp")}</span>
                                        " [" {text(&entry, "module")} "] "
                                        {text(&entry, "message")}
                                        <span class="opacity-60">" #" {text(&entry, "id")}</span>
                                    </li>
                                }).collect_view()
                            }
                        </ul>

                        <h3 class="font-semibold text-sm">"最近请求"</h3>
                        <ul class="text-xs font-mono space-y-1">
                            {
                                let requests = requests.clone();
                                move || requests().into_iter().rev().map(|entry| view! {
                                    <li>
                                        <span class="badge badge-ghost badge-xs mr-1">{text(&entry, "method")}</span>
                                        {text(&entry, "url")}
                                    </li>
                                }).collect_view()
                            }
                        </ul>
                    </div>
                </div>
            </Show>
            <button class="btn btn-sm btn-neutral" on:click=move |_| set_open.update(|o| *o = !*o)>
                {move || if open.get() { "关闭诊断" } else { "诊断" }}
            </button>
        </div>
    }
}
