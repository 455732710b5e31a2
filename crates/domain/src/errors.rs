//! 领域模型错误定义
//!
//! 定义了中继核心中所有可能的错误类型，提供清晰的错误上下文。

use thiserror::Error;

/// 领域模型错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// 客户端未注册错误
    ///
    /// 并发注销属于正常情况，调用方必须把它当作可恢复条件处理。
    #[error("客户端未注册: {id}")]
    ClientNotFound { id: String },

    /// 验证错误
    #[error("验证失败: {field}: {message}")]
    ValidationError { field: String, message: String },
}

impl DomainError {
    /// 创建客户端未注册错误
    pub fn client_not_found(id: impl ToString) -> Self {
        Self::ClientNotFound {
            id: id.to_string(),
        }
    }

    /// 创建验证错误
    pub fn validation_error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// 领域模型结果类型
pub type DomainResult<T> = Result<T, DomainError>;
