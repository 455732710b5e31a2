//! 客户端记录实体定义
//!
//! 注册表为每个已注册客户端维护一条记录，包含显示名称与使用统计。
//! 记录由注册表独占持有，只能通过注册表操作修改。

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value_objects::{ClientId, Timestamp};

/// 客户端使用统计
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientStatistics {
    /// 注册时间
    pub joined_at: Timestamp,
    /// 已发送消息数，按成功入队的消息计数
    pub sent_messages: u64,
    /// 已接收消息数，按成功送达的通知计数
    pub received_messages: u64,
}

impl ClientStatistics {
    /// 创建新的统计记录，计数从零开始
    pub fn new(joined_at: Timestamp) -> Self {
        Self {
            joined_at,
            sent_messages: 0,
            received_messages: 0,
        }
    }
}

impl fmt::Display for ClientStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            " [sent: {}, received: {}, joined: {}]",
            self.sent_messages, self.received_messages, self.joined_at
        )
    }
}

/// 客户端记录实体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientRecord {
    /// 客户端标识，由传输层分配
    pub id: ClientId,
    /// 显示名称，默认为标识的字符串形式
    pub name: String,
    /// 使用统计
    pub stats: ClientStatistics,
}

impl ClientRecord {
    /// 创建新的客户端记录
    pub fn new(id: ClientId, joined_at: Timestamp) -> Self {
        Self {
            id,
            name: id.to_string(),
            stats: ClientStatistics::new(joined_at),
        }
    }

    /// 更新显示名称
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// 发送计数加一，每条成功入队的消息计一次
    pub fn record_sent(&mut self) {
        self.stats.sent_messages += 1;
    }

    /// 接收计数加一，每次成功送达计一次
    pub fn record_received(&mut self) {
        self.stats.received_messages += 1;
    }

    /// 生成花名册中的一行：`name(id) [statistics]`
    pub fn roster_line(&self) -> String {
        format!("{}({}){}", self.name, self.id, self.stats)
    }
}
