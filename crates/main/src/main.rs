//! 主应用程序入口
//!
//! 装配调度核心并运行管理控制台。真实的远程传输（注册调用与回调投递）
//! 由外部适配器通过 `ChatApi` 与 `ClientNotifier` 接入。

mod console;

use std::env;
use std::sync::Arc;

use application::{
    ChatApi, ChatService, ChatServiceDependencies, ClientRegistry, DispatchLoop, MessageQueue,
    SystemClock,
};
use config::AppConfig;
use tracing_subscriber::EnvFilter;

/// 命令行用法说明
const USAGE_TEXT: &[&str] = &["Usage: [-n server-name]", "       [-h|--help]"];

fn usage() {
    for line in USAGE_TEXT {
        println!("{line}");
    }
}

/// 解析命令行参数，`-n <name>` 覆盖配置里的实例名
///
/// `-h`/`--help` 打印用法后以 0 退出；其余参数一律按用法错误以 1 退出。
fn parse_args(config: &mut AppConfig) {
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg.eq_ignore_ascii_case("-n") {
            match args.next() {
                Some(name) => config.server.name = Some(name),
                None => {
                    usage();
                    std::process::exit(1);
                }
            }
        } else if arg.eq_ignore_ascii_case("-h") || arg.eq_ignore_ascii_case("--help") {
            usage();
            std::process::exit(0);
        } else {
            usage();
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // 读取环境变量配置，命令行参数可覆盖实例名
    let mut config = AppConfig::from_env_with_defaults();
    parse_args(&mut config);
    let server_name = config.server.display_name();

    // 装配调度核心：注册表 + 有序队列 + 投递循环
    let registry = Arc::new(ClientRegistry::new());
    let (queue, receiver) = MessageQueue::new();
    let queue = Arc::new(queue);
    let dispatch = DispatchLoop::spawn(receiver, Arc::clone(&registry), Arc::clone(&queue));

    let service = ChatService::new(ChatServiceDependencies {
        registry,
        queue,
        clock: Arc::new(SystemClock),
        server_name,
    });

    tracing::info!(server_name = %service.server_name(), "中继服务器已启动");

    // 管理控制台阻塞运行，直到收到退出命令或输入流结束
    console::read_loop(&service).await?;

    // 优雅关闭：送完在途消息后退出
    println!("\nShutting down, please wait...");
    dispatch.shutdown().await;
    tracing::info!("投递循环已停止，进程退出");

    Ok(())
}
