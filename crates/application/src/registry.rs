//! 线程安全的客户端注册表
//!
//! 标识到客户端记录（显示名称、回调句柄、使用统计）的映射。所有操作
//! 互斥；锁只在映射读写期间持有，绝不跨越回调调用，慢客户端因此
//! 不会阻塞注册与入队。

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::RwLock;

use domain::{ClientId, ClientRecord, DomainError, DomainResult, Timestamp};

use crate::notifier::ClientNotifier;

/// 注册表内部条目：记录与回调句柄成对保管
struct RegisteredClient {
    record: ClientRecord,
    notifier: Arc<dyn ClientNotifier>,
}

/// 线程安全的客户端注册表
#[derive(Default)]
pub struct ClientRegistry {
    clients: RwLock<HashMap<ClientId, RegisteredClient>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self {
            clients: RwLock::new(HashMap::new()),
        }
    }

    /// 注册客户端，名称默认为标识的字符串形式，计数清零
    ///
    /// 重复注册同一标识是整体替换，不做合并。
    pub async fn put(&self, id: ClientId, notifier: Arc<dyn ClientNotifier>, joined_at: Timestamp) {
        let record = ClientRecord::new(id, joined_at);
        let mut clients = self.clients.write().await;
        if clients
            .insert(id, RegisteredClient { record, notifier })
            .is_some()
        {
            tracing::debug!(client_id = %id, "已注册的客户端被替换");
        }
    }

    /// 删除记录并返回；标识不存在时为无操作
    pub async fn remove(&self, id: ClientId) -> Option<ClientRecord> {
        let mut clients = self.clients.write().await;
        clients.remove(&id).map(|entry| entry.record)
    }

    /// 读取记录副本
    ///
    /// 客户端可能已并发注销，"未注册"是可恢复条件而不是程序错误。
    pub async fn get(&self, id: ClientId) -> DomainResult<ClientRecord> {
        let clients = self.clients.read().await;
        clients
            .get(&id)
            .map(|entry| entry.record.clone())
            .ok_or_else(|| DomainError::client_not_found(id))
    }

    /// 获取回调句柄；目标在入队后注销时返回 None
    pub async fn notifier(&self, id: ClientId) -> Option<Arc<dyn ClientNotifier>> {
        let clients = self.clients.read().await;
        clients.get(&id).map(|entry| Arc::clone(&entry.notifier))
    }

    /// 更新显示名称，返回更新前的名称
    pub async fn set_name(&self, id: ClientId, name: impl Into<String>) -> DomainResult<String> {
        let mut clients = self.clients.write().await;
        let entry = clients
            .get_mut(&id)
            .ok_or_else(|| DomainError::client_not_found(id))?;
        let previous = entry.record.name.clone();
        entry.record.set_name(name);
        Ok(previous)
    }

    /// 当前所有已注册标识的原子快照，减去排除集合
    pub async fn snapshot_ids(&self, excluding: &[ClientId]) -> HashSet<ClientId> {
        let clients = self.clients.read().await;
        clients
            .keys()
            .filter(|id| !excluding.contains(*id))
            .copied()
            .collect()
    }

    /// 所有记录的快照，用于管理性列表
    pub async fn all(&self) -> Vec<ClientRecord> {
        let clients = self.clients.read().await;
        clients.values().map(|entry| entry.record.clone()).collect()
    }

    /// 发送计数加一；目标已注销时静默忽略
    pub async fn record_sent(&self, id: ClientId) {
        let mut clients = self.clients.write().await;
        if let Some(entry) = clients.get_mut(&id) {
            entry.record.record_sent();
        }
    }

    /// 接收计数加一；目标已注销时静默忽略
    pub async fn record_received(&self, id: ClientId) {
        let mut clients = self.clients.write().await;
        if let Some(entry) = clients.get_mut(&id) {
            entry.record.record_received();
        }
    }

    /// 当前注册数量
    pub async fn len(&self) -> usize {
        self.clients.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.clients.read().await.is_empty()
    }
}
