//! 领域实体定义
//!
//! 包含中继核心的实体：客户端记录与带序号的消息。

pub mod client;
pub mod notification;

// 重新导出核心实体
pub use client::{ClientRecord, ClientStatistics};
pub use notification::{SequencedMessage, Source};
