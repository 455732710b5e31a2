//! 有序消息队列
//!
//! 无界 FIFO：生产者在同一把锁内完成序号分配与入队，通道顺序因此与
//! 序号全序一致；唯一的消费者（投递循环）在另一端阻塞取出。监视器式
//! 的 wait/notify 交接在这里由带专属消费任务的 channel 替代。

use std::collections::HashSet;

use tokio::sync::{mpsc, Mutex};

use domain::{ClientId, SequencedMessage, Source, Timestamp};

use crate::error::ApplicationError;

/// 尚未定序的消息草稿
///
/// 目标集合由门面在入队前根据注册表快照计算。
#[derive(Debug, Clone)]
pub struct MessageDraft {
    pub source: Source,
    pub text: String,
    pub targets: HashSet<ClientId>,
}

/// 队列头部状态：序号计数器与发送端必须在同一临界区内使用
struct QueueHead {
    next_sequence: u64,
    sender: Option<mpsc::UnboundedSender<SequencedMessage>>,
}

/// 队列消费端，由唯一的投递循环持有
pub type MessageReceiver = mpsc::UnboundedReceiver<SequencedMessage>;

/// 无界 FIFO 消息队列
pub struct MessageQueue {
    head: Mutex<QueueHead>,
}

impl MessageQueue {
    /// 创建队列，返回队列本体与消费端
    pub fn new() -> (Self, MessageReceiver) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (
            Self {
                head: Mutex::new(QueueHead {
                    next_sequence: 0,
                    sender: Some(sender),
                }),
            },
            receiver,
        )
    }

    /// 入队：分配下一个序号并定稿消息，返回分配的序号
    ///
    /// 目标集合为空的草稿直接丢弃并返回 `Ok(None)`，不消耗序号，
    /// 序号只为真正入队的消息递增。
    pub async fn enqueue(
        &self,
        draft: MessageDraft,
        enqueued_at: Timestamp,
    ) -> Result<Option<u64>, ApplicationError> {
        if draft.targets.is_empty() {
            tracing::info!(text = %draft.text, "消息没有任何接收者，丢弃");
            return Ok(None);
        }

        let mut head = self.head.lock().await;
        let sequence = head.next_sequence;

        let message = SequencedMessage::new(
            sequence,
            draft.source,
            draft.text,
            draft.targets,
            enqueued_at,
        )?;

        head.sender
            .as_ref()
            .ok_or(ApplicationError::QueueClosed)?
            .send(message)
            .map_err(|_| ApplicationError::QueueClosed)?;
        head.next_sequence += 1;

        Ok(Some(sequence))
    }

    /// 关闭生产端
    ///
    /// 消费端取完已入队的消息后，`recv()` 返回 `None` 作为停止信号。
    pub async fn close(&self) {
        let mut head = self.head.lock().await;
        if head.sender.take().is_some() {
            tracing::debug!("消息队列已关闭");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;
    use uuid::Uuid;

    fn draft_for(targets: HashSet<ClientId>) -> MessageDraft {
        MessageDraft {
            source: Source::Server,
            text: "[server]: test".to_string(),
            targets,
        }
    }

    fn client_id() -> ClientId {
        ClientId::from(Uuid::new_v4())
    }

    #[tokio::test]
    async fn test_sequences_start_at_zero_and_increment() {
        let (queue, mut receiver) = MessageQueue::new();
        let target = client_id();
        let now = OffsetDateTime::now_utc();

        for expected in 0..3 {
            let assigned = queue
                .enqueue(draft_for(HashSet::from([target])), now)
                .await
                .unwrap();
            assert_eq!(assigned, Some(expected));
        }

        for expected in 0..3 {
            let message = receiver.recv().await.unwrap();
            assert_eq!(message.sequence(), expected);
        }
    }

    #[tokio::test]
    async fn test_empty_target_draft_burns_no_sequence_number() {
        let (queue, mut receiver) = MessageQueue::new();
        let now = OffsetDateTime::now_utc();

        let dropped = queue.enqueue(draft_for(HashSet::new()), now).await.unwrap();
        assert_eq!(dropped, None);

        // 被丢弃的消息没有消耗序号，下一条仍然是 0
        let assigned = queue
            .enqueue(draft_for(HashSet::from([client_id()])), now)
            .await
            .unwrap();
        assert_eq!(assigned, Some(0));

        let message = receiver.recv().await.unwrap();
        assert_eq!(message.sequence(), 0);
    }

    #[tokio::test]
    async fn test_close_signals_consumer_and_rejects_producers() {
        let (queue, mut receiver) = MessageQueue::new();
        let now = OffsetDateTime::now_utc();
        queue
            .enqueue(draft_for(HashSet::from([client_id()])), now)
            .await
            .unwrap();

        queue.close().await;
        // 已入队的消息仍可取出，之后收到停止信号
        assert!(receiver.recv().await.is_some());
        assert!(receiver.recv().await.is_none());

        let result = queue
            .enqueue(draft_for(HashSet::from([client_id()])), now)
            .await;
        assert!(matches!(result, Err(ApplicationError::QueueClosed)));
    }
}
