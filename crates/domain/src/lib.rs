//! 消息中继系统核心领域模型
//!
//! 包含客户端记录、带序号的消息等核心实体，以及相关的业务规则。

pub mod entities;
pub mod errors;
pub mod value_objects;

// 重新导出常用类型
pub use entities::*;
pub use errors::*;
pub use value_objects::*;
