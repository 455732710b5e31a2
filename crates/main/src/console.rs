//! 管理控制台
//!
//! 只为优雅停机而存在的小型命令解释器：`quit|stop|halt|exit` 触发关闭，
//! `help` 打印用法，其余输入按未知命令回显，EOF 等同于退出。

use std::io::Write;

use application::ChatApi;
use tokio::io::{AsyncBufReadExt, BufReader};

/// 控制台命令
#[derive(Debug, PartialEq, Eq)]
enum ConsoleCommand {
    /// 空行，忽略
    Empty,
    /// 优雅停机
    Shutdown,
    /// 打印可用命令
    Help,
    /// 无法识别的输入
    Unknown,
}

/// 识别一行输入；命令不区分大小写
fn parse_command(line: &str) -> ConsoleCommand {
    let command = line.trim();
    if command.is_empty() {
        return ConsoleCommand::Empty;
    }
    if ["quit", "stop", "halt", "exit"]
        .iter()
        .any(|candidate| command.eq_ignore_ascii_case(candidate))
    {
        return ConsoleCommand::Shutdown;
    }
    if command.eq_ignore_ascii_case("help") {
        return ConsoleCommand::Help;
    }
    ConsoleCommand::Unknown
}

/// 读取标准输入命令直到收到退出命令或 EOF
pub async fn read_loop(service: &dyn ChatApi) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("Server {} started.", service.server_name());

    loop {
        print!("Server> ");
        std::io::stdout().flush()?;

        let line = match lines.next_line().await? {
            Some(line) => line,
            // EOF 等同于退出命令
            None => break,
        };

        match parse_command(&line) {
            ConsoleCommand::Empty => {}
            ConsoleCommand::Shutdown => break,
            ConsoleCommand::Help => {
                println!("Available commands:");
                println!("quit      Shuts down the server.");
                println!("help      This text.");
            }
            ConsoleCommand::Unknown => {
                println!("\nUnknown server command : {}", line.trim());
            }
        }
    }

    Ok(())
}
