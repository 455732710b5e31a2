//! 聊天服务门面
//!
//! 组合注册表与消息队列，实现面向传输层的五个操作。目标集合
//! （全体、除发送者外的全体、单个客户端）都在这里根据注册表快照计算，
//! 显示名称前缀也在入队时定稿。

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;

use domain::{ClientId, Source};

use crate::clock::Clock;
use crate::error::ApplicationError;
use crate::notifier::ClientNotifier;
use crate::queue::{MessageDraft, MessageQueue};
use crate::registry::ClientRegistry;

/// 面向传输层的调用接口
///
/// 传输适配器只依赖这个 trait；调度核心不依赖任何传输基类。
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// 广播一条来自客户端的文本消息，目标是包括发送者在内的全体
    async fn say(&self, id: ClientId, text: &str) -> Result<(), ApplicationError>;

    /// 服务器的可读名称
    fn server_name(&self) -> &str;

    /// 注册客户端并向其他人公告加入；重复注册是整体替换
    async fn register(
        &self,
        id: ClientId,
        notifier: Arc<dyn ClientNotifier>,
    ) -> Result<(), ApplicationError>;

    /// 注销客户端并向剩余客户端公告离开；未注册时为无操作
    async fn unregister(&self, id: ClientId) -> Result<(), ApplicationError>;

    /// 更新显示名称并向其他人公告改名
    async fn set_name(&self, id: ClientId, name: &str) -> Result<(), ApplicationError>;

    /// 生成花名册，仅投递给请求者本人
    async fn list_clients(&self, id: ClientId) -> Result<(), ApplicationError>;
}

pub struct ChatServiceDependencies {
    pub registry: Arc<ClientRegistry>,
    pub queue: Arc<MessageQueue>,
    pub clock: Arc<dyn Clock>,
    pub server_name: String,
}

pub struct ChatService {
    deps: ChatServiceDependencies,
}

impl ChatService {
    pub fn new(deps: ChatServiceDependencies) -> Self {
        Self { deps }
    }

    /// 以服务器身份入队一条系统公告
    async fn enqueue_system(
        &self,
        text: String,
        targets: HashSet<ClientId>,
    ) -> Result<Option<u64>, ApplicationError> {
        let draft = MessageDraft {
            source: Source::Server,
            text: format!("[{}]: {}", self.deps.server_name, text),
            targets,
        };
        self.deps.queue.enqueue(draft, self.deps.clock.now()).await
    }
}

#[async_trait]
impl ChatApi for ChatService {
    async fn say(&self, id: ClientId, text: &str) -> Result<(), ApplicationError> {
        if text.is_empty() {
            tracing::debug!(client_id = %id, "空消息，忽略");
            return Ok(());
        }

        let sender = self.deps.registry.get(id).await?;
        let targets = self.deps.registry.snapshot_ids(&[]).await;

        let draft = MessageDraft {
            source: Source::Client(id),
            text: format!("[{}]: {}", sender.name, text),
            targets,
        };

        let enqueued = self.deps.queue.enqueue(draft, self.deps.clock.now()).await?;
        if enqueued.is_some() {
            // 发送计数按入队成功的消息计一次，与目标数量无关
            self.deps.registry.record_sent(id).await;
        }
        Ok(())
    }

    fn server_name(&self) -> &str {
        &self.deps.server_name
    }

    async fn register(
        &self,
        id: ClientId,
        notifier: Arc<dyn ClientNotifier>,
    ) -> Result<(), ApplicationError> {
        self.deps
            .registry
            .put(id, notifier, self.deps.clock.now())
            .await;
        let total = self.deps.registry.len().await;
        tracing::info!(
            client_id = %id,
            total = total,
            "客户端已注册"
        );

        let targets = self.deps.registry.snapshot_ids(&[id]).await;
        self.enqueue_system(format!("{id} just joined our chat"), targets)
            .await?;
        Ok(())
    }

    async fn unregister(&self, id: ClientId) -> Result<(), ApplicationError> {
        // 离开公告要用注销时刻的显示名称，先取走记录再公告
        let record = match self.deps.registry.remove(id).await {
            Some(record) => record,
            None => return Ok(()),
        };
        let total = self.deps.registry.len().await;
        tracing::info!(
            client_id = %id,
            total = total,
            "客户端已注销"
        );

        let targets = self.deps.registry.snapshot_ids(&[]).await;
        self.enqueue_system(
            format!("{}({}) just left our chat", record.name, id),
            targets,
        )
        .await?;
        Ok(())
    }

    async fn set_name(&self, id: ClientId, name: &str) -> Result<(), ApplicationError> {
        let previous = self.deps.registry.set_name(id, name).await?;

        let targets = self.deps.registry.snapshot_ids(&[id]).await;
        self.enqueue_system(format!("{previous} now using name: {name}"), targets)
            .await?;
        Ok(())
    }

    async fn list_clients(&self, id: ClientId) -> Result<(), ApplicationError> {
        let mut roster = String::from("Connected Clients\n");
        for record in self.deps.registry.all().await {
            roster.push_str(&record.roster_line());
            roster.push('\n');
        }

        // 花名册走同一条队列路径，目标集合只有请求者一个
        self.enqueue_system(roster, HashSet::from([id])).await?;
        Ok(())
    }
}
