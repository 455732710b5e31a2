//! 统一配置中心
//!
//! 提供中继服务的全局配置管理，目前只有服务器身份相关的设置。

use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 无法确定主机身份，启动应当中止
    #[error("无法确定主机名，请设置 HOSTNAME 环境变量")]
    HostUnresolved,
}

/// 全局应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    pub server: ServerConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 实例名，可被命令行参数覆盖
    pub name: Option<String>,
    /// 主机标签，出现在服务器的可读名称里
    pub host: String,
}

impl AppConfig {
    /// 从环境变量加载配置
    /// 无法确定主机身份时报错，保证注册出去的名称总是指向真实主机
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = env::var("HOSTNAME")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .ok_or(ConfigError::HostUnresolved)?;

        Ok(Self {
            server: ServerConfig {
                name: env::var("RELAY_SERVER_NAME").ok(),
                host: host.to_lowercase(),
            },
        })
    }

    /// 从环境变量加载配置，开发环境版本
    /// 主机名缺失时退回 localhost，仅用于测试和开发
    pub fn from_env_with_defaults() -> Self {
        let host = env::var("HOSTNAME")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| "localhost".to_string());

        Self {
            server: ServerConfig {
                name: env::var("RELAY_SERVER_NAME").ok(),
                host: host.to_lowercase(),
            },
        }
    }
}

impl ServerConfig {
    /// 组合服务器的可读名称
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => format!("RelayServer {} on {}", name, self.host),
            None => format!("RelayServer on {}", self.host),
        }
    }
}
