//! 带序号的消息实体定义
//!
//! 消息在入队时获得序号并定稿，之后整体不可变。

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, DomainResult};
use crate::value_objects::{ClientId, Timestamp};

/// 消息来源身份
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Source {
    /// 某个已注册客户端
    Client(ClientId),
    /// 服务器自身，用于加入/离开/改名/花名册等系统公告
    Server,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Client(id) => write!(f, "{id}"),
            Source::Server => f.write_str("server"),
        }
    }
}

/// 带序号的消息
///
/// 序号在服务器生命周期内严格递增；目标集合在入队时根据注册表快照计算；
/// 文本在入队时已经带上显示名称前缀。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequencedMessage {
    sequence: u64,
    source: Source,
    text: String,
    targets: HashSet<ClientId>,
    enqueued_at: Timestamp,
}

impl SequencedMessage {
    /// 定稿一条消息；目标集合为空时拒绝
    pub fn new(
        sequence: u64,
        source: Source,
        text: impl Into<String>,
        targets: HashSet<ClientId>,
        enqueued_at: Timestamp,
    ) -> DomainResult<Self> {
        if targets.is_empty() {
            return Err(DomainError::validation_error(
                "targets",
                "消息必须至少有一个接收者",
            ));
        }

        Ok(Self {
            sequence,
            source,
            text: text.into(),
            targets,
            enqueued_at,
        })
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn targets(&self) -> &HashSet<ClientId> {
        &self.targets
    }

    pub fn enqueued_at(&self) -> Timestamp {
        self.enqueued_at
    }

    /// 判断给定客户端是否在目标集合内
    pub fn is_targeted_at(&self, id: ClientId) -> bool {
        self.targets.contains(&id)
    }
}
