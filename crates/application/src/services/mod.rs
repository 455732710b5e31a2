mod chat_service;

pub use chat_service::{ChatApi, ChatService, ChatServiceDependencies};
