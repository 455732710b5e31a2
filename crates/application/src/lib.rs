//! 调度核心实现。
//!
//! 这里提供线程安全的客户端注册表、有序消息队列、投递循环与聊天服务门面，
//! 以及对外部适配器（回调通知、时钟）的抽象。远程传输、服务发现与进程
//! 启动都是外部协作者，通过 `ChatApi` 与 `ClientNotifier` 两个接口接入。

pub mod clock;
pub mod dispatch;
pub mod error;
pub mod notifier;
pub mod queue;
pub mod registry;
pub mod services;

pub use clock::{Clock, FixedClock, SystemClock};
pub use dispatch::{DispatchHandle, DispatchLoop};
pub use error::ApplicationError;
pub use notifier::{ClientNotifier, Notification, NotifyError};
pub use queue::{MessageDraft, MessageQueue, MessageReceiver};
pub use registry::ClientRegistry;
pub use services::{ChatApi, ChatService, ChatServiceDependencies};
