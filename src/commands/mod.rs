//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `parsers/`, `models/`, `dos/`, `batch/`, `utils/`
//! - 子模块: dos, levels

pub mod dos;
pub mod levels;

use crate::cli::Commands;
use crate::error::Result;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Dos(args) => dos::execute(args),
        Commands::Levels(args) => levels::execute(args),
    }
}
