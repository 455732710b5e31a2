use domain::DomainError;
use thiserror::Error;

use crate::notifier::NotifyError;

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),
    #[error("delivery error: {0}")]
    Notify(#[from] NotifyError),
    /// 队列已随关闭流程停止收新消息
    #[error("message queue is closed")]
    QueueClosed,
}

impl ApplicationError {
    /// 判断是否为"客户端未注册"，调用方据此把操作降级为无操作
    pub fn is_client_not_found(&self) -> bool {
        matches!(
            self,
            ApplicationError::Domain(DomainError::ClientNotFound { .. })
        )
    }
}
