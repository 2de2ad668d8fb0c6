//! # 能量单位换算
//!
//! CP2K 以 Hartree 输出本征值，显示与 DOS 计算统一使用 eV。
//! 换算在解析阶段对每个数值只做一次。
//!
//! ## 依赖关系
//! - 被 `parsers/molog.rs` 使用

/// 1 Hartree 对应的 eV (CODATA 2018)
pub const HARTREE_TO_EV: f64 = 27.211386245988;

/// Hartree -> eV
pub fn hartree_to_ev(value: f64) -> f64 {
    value * HARTREE_TO_EV
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_hartree() {
        assert!((hartree_to_ev(1.0) - 27.211386245988).abs() < 1e-6);
    }

    #[test]
    fn test_negative_value() {
        assert!((hartree_to_ev(-0.4) + 10.8845544983952).abs() < 1e-9);
    }
}
