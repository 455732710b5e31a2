//! 投递循环
//!
//! 唯一的消费者按 FIFO 顺序排空队列，逐个目标调用回调。除了每条消息
//! 临时的目标列表之外不持有其他可变状态。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::task::JoinHandle;

use domain::SequencedMessage;

use crate::notifier::Notification;
use crate::queue::{MessageQueue, MessageReceiver};
use crate::registry::ClientRegistry;

/// 投递循环：持有队列消费端与注册表引用
pub struct DispatchLoop {
    receiver: MessageReceiver,
    registry: Arc<ClientRegistry>,
    stop: Arc<AtomicBool>,
}

/// 投递循环的控制句柄
pub struct DispatchHandle {
    stop: Arc<AtomicBool>,
    queue: Arc<MessageQueue>,
    worker: JoinHandle<()>,
}

impl DispatchLoop {
    /// 启动投递工作任务
    pub fn spawn(
        receiver: MessageReceiver,
        registry: Arc<ClientRegistry>,
        queue: Arc<MessageQueue>,
    ) -> DispatchHandle {
        let stop = Arc::new(AtomicBool::new(false));
        let mut dispatch = DispatchLoop {
            receiver,
            registry,
            stop: Arc::clone(&stop),
        };
        let worker = tokio::spawn(async move { dispatch.run().await });

        DispatchHandle {
            stop,
            queue,
            worker,
        }
    }

    /// 主循环：队列为空时挂起等待生产者
    ///
    /// 收到停止信号后送完手上已取出的消息即退出，不再继续排空队列。
    async fn run(&mut self) {
        while let Some(message) = self.receiver.recv().await {
            self.deliver(&message).await;
            if self.stop.load(Ordering::Acquire) {
                tracing::debug!("停止标志已置位，不再继续排空队列");
                break;
            }
        }
        tracing::info!("投递循环退出");
    }

    /// 向消息的每个目标投递
    ///
    /// 单个目标失败只记录日志：不影响同一消息的其余目标，不影响后续
    /// 消息，也不会注销该客户端。
    async fn deliver(&self, message: &SequencedMessage) {
        for &target in message.targets() {
            let notifier = match self.registry.notifier(target).await {
                Some(notifier) => notifier,
                None => {
                    // 目标在入队之后注销，静默跳过
                    tracing::debug!(
                        client_id = %target,
                        sequence = message.sequence(),
                        "目标已注销，跳过"
                    );
                    continue;
                }
            };

            let notification = Notification {
                sequence: message.sequence(),
                source: message.source().to_string(),
                text: message.text().to_owned(),
            };

            match notifier.notify(notification).await {
                Ok(()) => {
                    self.registry.record_received(target).await;
                }
                Err(err) => {
                    tracing::warn!(
                        client_id = %target,
                        sequence = message.sequence(),
                        error = %err,
                        "向客户端投递失败"
                    );
                }
            }
        }
    }
}

impl DispatchHandle {
    /// 优雅关闭：唤醒挂起的工作任务，送完在途消息后退出
    pub async fn shutdown(self) {
        self.stop.store(true, Ordering::Release);
        self.queue.close().await;
        if let Err(err) = self.worker.await {
            tracing::error!(error = %err, "投递任务异常结束");
        }
    }
}
