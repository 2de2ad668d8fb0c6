//! # DOS 计算模块
//!
//! 由离散能级计算高斯展宽的态密度，并提供数据导出与绘图。
//!
//! ## 子模块
//! - `config`: 展宽参数与合法性检查
//! - `engine`: 分箱 + 卷积核心算法
//! - `export`: 两列文本 / CSV 导出
//! - `plot`: 图表生成
//!
//! ## 依赖关系
//! - 被 `commands/dos.rs` 使用

pub mod config;
pub mod engine;
pub mod export;
pub mod plot;

pub use config::DosConfig;
pub use engine::{DosCurve, DosEngine};
