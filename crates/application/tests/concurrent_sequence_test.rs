//! 并发生产者下的序号一致性测试
//!
//! 验证多个并发生产者入队时序号连续无缺漏，且投递顺序与序号全序一致。

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use application::notifier::memory::ChannelNotifier;
use application::{
    ChatApi, ChatService, ChatServiceDependencies, ClientRegistry, Clock, DispatchLoop,
    MessageDraft, MessageQueue, SystemClock,
};
use domain::{ClientId, Source};
use tokio::time::timeout;
use uuid::Uuid;

const PRODUCERS: usize = 8;
const MESSAGES_PER_PRODUCER: usize = 50;

fn client_id() -> ClientId {
    ClientId::from(Uuid::new_v4())
}

/// 序号在并发入队下连续且无重复，通道顺序与序号顺序一致
#[tokio::test]
async fn test_concurrent_enqueue_assigns_contiguous_sequences() {
    let (queue, mut receiver) = MessageQueue::new();
    let queue = Arc::new(queue);
    let target = client_id();

    // 并发生产者各入队一批消息
    let tasks: Vec<_> = (0..PRODUCERS)
        .map(|producer| {
            let queue = Arc::clone(&queue);
            tokio::spawn(async move {
                let mut assigned = Vec::new();
                for i in 0..MESSAGES_PER_PRODUCER {
                    let draft = MessageDraft {
                        source: Source::Server,
                        text: format!("producer {producer} message {i}"),
                        targets: HashSet::from([target]),
                    };
                    let sequence = queue
                        .enqueue(draft, SystemClock.now())
                        .await
                        .unwrap()
                        .expect("目标非空，消息必定入队");
                    assigned.push(sequence);
                }
                assigned
            })
        })
        .collect();

    let per_producer: Vec<Vec<u64>> = futures::future::join_all(tasks)
        .await
        .into_iter()
        .map(|result| result.unwrap())
        .collect();

    // 每个生产者观察到的序号严格递增
    for assigned in &per_producer {
        assert!(assigned.windows(2).all(|pair| pair[0] < pair[1]));
    }

    // 全部序号恰好覆盖 0..N，无缺号无重复
    let total = (PRODUCERS * MESSAGES_PER_PRODUCER) as u64;
    let mut all: Vec<u64> = per_producer.into_iter().flatten().collect();
    all.sort_unstable();
    assert_eq!(all, (0..total).collect::<Vec<u64>>());

    // 消费端按序号顺序取出：FIFO 与序号全序一致
    queue.close().await;
    let mut next = 0;
    while let Some(message) = receiver.recv().await {
        assert_eq!(message.sequence(), next);
        next += 1;
    }
    assert_eq!(next, total);
}

/// 经过完整服务路径的并发 say：每个客户端观察到同一个严格递增全序
#[tokio::test]
async fn test_concurrent_say_preserves_total_order_for_every_client() {
    let registry = Arc::new(ClientRegistry::new());
    let (queue, receiver) = MessageQueue::new();
    let queue = Arc::new(queue);
    let dispatch = DispatchLoop::spawn(receiver, Arc::clone(&registry), Arc::clone(&queue));

    let service = Arc::new(ChatService::new(ChatServiceDependencies {
        registry,
        queue,
        clock: Arc::new(SystemClock),
        server_name: "RelayServer test on localhost".to_string(),
    }));

    // 三个客户端，每个都并发发送一批消息
    let speakers: Vec<ClientId> = (0..3).map(|_| client_id()).collect();
    let mut receivers = Vec::new();
    for &id in &speakers {
        let (notifier, rx) = ChannelNotifier::channel();
        service.register(id, Arc::new(notifier)).await.unwrap();
        receivers.push(rx);
    }

    let say_tasks: Vec<_> = speakers
        .iter()
        .map(|&id| {
            let service = Arc::clone(&service);
            tokio::spawn(async move {
                for i in 0..20 {
                    service.say(id, &format!("message {i}")).await.unwrap();
                }
            })
        })
        .collect();
    for task in futures::future::join_all(say_tasks).await {
        task.unwrap();
    }

    // 第 i 个客户端会收到它之后的加入公告，再加上全部 60 条 say
    let mut sequence_sets: Vec<Vec<u64>> = Vec::new();
    for (i, receiver) in receivers.iter_mut().enumerate() {
        let expected = (speakers.len() - 1 - i) + 60;
        let mut sequences = Vec::new();
        while sequences.len() < expected {
            let notification = timeout(Duration::from_secs(2), receiver.recv())
                .await
                .expect("等待通知超时")
                .expect("通知通道已关闭");
            sequences.push(notification.sequence);
        }
        // 每个客户端观察到的序号严格递增
        assert!(sequences.windows(2).all(|pair| pair[0] < pair[1]));
        sequence_sets.push(sequences);
    }

    // 加入公告只发给更早的客户端，三方共同看到的恰好是 60 条 say
    let sets: Vec<HashSet<u64>> = sequence_sets
        .iter()
        .map(|sequences| sequences.iter().copied().collect::<HashSet<u64>>())
        .collect();
    let common: HashSet<u64> = sets.iter().skip(1).fold(sets[0].clone(), |acc, set| {
        acc.intersection(set).copied().collect()
    });
    assert_eq!(common.len(), 60);

    dispatch.shutdown().await;
}
