//! # 数据模型模块
//!
//! 定义能级谱数据模型与能量单位换算。
//!
//! ## 依赖关系
//! - 被 `parsers/` 和 `commands/` 使用
//! - 子模块: spectrum, units

pub mod spectrum;
pub mod units;

pub use spectrum::{EnergyLevel, EnergyLevelSet, Spectrum};
