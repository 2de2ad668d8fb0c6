//! # cp2kdos - CP2K 能级与态密度工具
//!
//! 读取 CP2K 的 `.MOLog` 或主输出文件中的 EIGENVALUES 块，
//! 按自旋通道计算高斯展宽的态密度 (DOS)。
//!
//! ## 子命令
//! - `dos`    - 计算、导出并绘制 DOS（支持目录批量处理）
//! - `levels` - 能级概要（HOMO/LUMO/能隙）
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── parsers/   (EIGENVALUES 解析器)
//!   │     ├── models/    (能级数据模型)
//!   │     ├── dos/       (展宽计算、导出、绘图)
//!   │     └── batch/     (目录批量处理)
//!   ├── utils/      (工具函数)
//!   └── error.rs    (错误处理)
//! ```

mod batch;
mod cli;
mod commands;
mod dos;
mod error;
mod models;
mod parsers;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
