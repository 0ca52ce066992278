//! 用户可见的提示
//!
//! - 消息（toast）：短暂提示，几秒后自动消失
//! - 通知（notification）：带标题的持久提示，用于严重错误

use std::time::Duration;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub level: MessageLevel,
    pub duration: Duration,
}

pub trait Notifier: Send + Sync {
    /// 短暂提示
    fn message(&self, level: MessageLevel, text: &str);
    /// 持久通知
    fn notify(&self, notification: Notification);
}
