use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 推送给单个客户端的通知载荷
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// 消息在服务器全序中的序号，客户端据此检测缺漏与乱序
    pub sequence: u64,
    /// 来源身份的字符串形式（客户端标识或 "server"）
    pub source: String,
    /// 消息文本，入队时已带显示名称前缀
    pub text: String,
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("client unreachable: {0}")]
    Unreachable(String),
    #[error("notify failed: {0}")]
    Unknown(String),
}

impl NotifyError {
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::Unreachable(message.into())
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::Unknown(message.into())
    }
}

/// 回调句柄：调度核心通过它向特定客户端推送通知
///
/// 具体实现由传输层提供，注册时随客户端一并交给注册表保管。
#[async_trait]
pub trait ClientNotifier: Send + Sync {
    async fn notify(&self, notification: Notification) -> Result<(), NotifyError>;
}

/// 内存实现的通知通道（用于进程内适配与测试）
pub mod memory {
    use super::*;
    use tokio::sync::mpsc;

    /// 基于 tokio unbounded channel 的回调实现
    ///
    /// 句柄交给注册表，接收端留在客户端一侧消费。
    pub struct ChannelNotifier {
        sender: mpsc::UnboundedSender<Notification>,
    }

    impl ChannelNotifier {
        pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notification>) {
            let (sender, receiver) = mpsc::unbounded_channel();
            (Self { sender }, receiver)
        }
    }

    #[async_trait]
    impl ClientNotifier for ChannelNotifier {
        async fn notify(&self, notification: Notification) -> Result<(), NotifyError> {
            self.sender
                .send(notification)
                .map_err(|err| NotifyError::unreachable(err.to_string()))
        }
    }

    /// 总是失败的回调实现，用于送达失败路径的测试
    #[derive(Debug, Default)]
    pub struct FailingNotifier;

    #[async_trait]
    impl ClientNotifier for FailingNotifier {
        async fn notify(&self, _notification: Notification) -> Result<(), NotifyError> {
            Err(NotifyError::unreachable("remote listener is gone"))
        }
    }

}
