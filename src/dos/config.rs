//! # DOS 展宽参数
//!
//! 高斯展宽宽度 sigma、能量网格间距 deltaE、截断倍数 nsigma，
//! 以及网格点数上限。所有能量单位为 eV。
//!
//! ## 依赖关系
//! - 被 `dos/engine.rs` 使用
//! - 由 `commands/dos.rs` 从命令行参数构造

use crate::error::{Cp2kDosError, Result};

use serde::{Deserialize, Serialize};

/// 默认高斯展宽 (eV)
pub const DEFAULT_SIGMA: f64 = 0.075;

/// 默认网格间距 (eV)
pub const DEFAULT_DELTA_E: f64 = 0.001;

/// 默认截断倍数
pub const DEFAULT_NSIGMA: usize = 10;

/// 默认网格点数上限
pub const DEFAULT_MAX_POINTS: usize = 10_000_000;

/// sigma / deltaE 低于该值时高斯核欠采样
pub const MIN_SAMPLING_RATIO: f64 = 10.0;

/// 下取整时吸收浮点舍入误差（单位：格点）
const FLOOR_TOLERANCE: f64 = 1e-9;

pub(crate) fn snap_floor(x: f64) -> f64 {
    (x + FLOOR_TOLERANCE).floor()
}

/// DOS 计算参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DosConfig {
    /// 高斯展宽标准差 (eV)，FWHM = sigma * sqrt(8 ln 2)
    pub sigma: f64,
    /// 能量网格间距 (eV)
    pub delta_e: f64,
    /// 高斯核截断于 nsigma 个标准差
    pub nsigma: usize,
    /// 允许的最大网格点数
    pub max_points: usize,
}

impl Default for DosConfig {
    fn default() -> Self {
        Self {
            sigma: DEFAULT_SIGMA,
            delta_e: DEFAULT_DELTA_E,
            nsigma: DEFAULT_NSIGMA,
            max_points: DEFAULT_MAX_POINTS,
        }
    }
}

impl DosConfig {
    pub fn new(sigma: f64, delta_e: f64, nsigma: usize) -> Self {
        Self {
            sigma,
            delta_e,
            nsigma,
            max_points: DEFAULT_MAX_POINTS,
        }
    }

    pub fn with_max_points(mut self, max_points: usize) -> Self {
        self.max_points = max_points;
        self
    }

    /// 检查参数合法性
    pub fn validate(&self) -> Result<()> {
        if !(self.sigma.is_finite() && self.sigma > 0.0) {
            return Err(Cp2kDosError::ConfigError(format!(
                "sigma must be positive, got {}",
                self.sigma
            )));
        }
        if !(self.delta_e.is_finite() && self.delta_e > 0.0) {
            return Err(Cp2kDosError::ConfigError(format!(
                "deltaE must be positive, got {}",
                self.delta_e
            )));
        }
        if self.nsigma < 1 {
            return Err(Cp2kDosError::ConfigError(
                "nsigma must be at least 1".to_string(),
            ));
        }
        if self.max_points < 1 {
            return Err(Cp2kDosError::ConfigError(
                "max_points must be at least 1".to_string(),
            ));
        }

        // 网格至少与高斯核一样长，在制表之前检查
        let kernel_points = 2.0 * snap_floor(self.half_width() / self.delta_e) + 1.0;
        if kernel_points > self.max_points as f64 {
            return Err(Cp2kDosError::ConfigError(format!(
                "Gaussian kernel would need {:.0} points (limit {}), reduce nsigma or increase deltaE",
                kernel_points, self.max_points
            )));
        }
        Ok(())
    }

    /// 高斯核单侧格点数 floor(sigma * nsigma / deltaE)
    pub fn kernel_half_points(&self) -> usize {
        snap_floor(self.half_width() / self.delta_e) as usize
    }

    /// 高斯核半宽 sigma * nsigma (eV)
    pub fn half_width(&self) -> f64 {
        self.sigma * self.nsigma as f64
    }

    pub fn sampling_ratio(&self) -> f64 {
        self.sigma / self.delta_e
    }

    pub fn is_undersampled(&self) -> bool {
        self.sampling_ratio() < MIN_SAMPLING_RATIO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = DosConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.is_undersampled());
    }

    #[test]
    fn test_rejects_non_positive_values() {
        assert!(matches!(
            DosConfig::new(0.0, 0.01, 5).validate(),
            Err(Cp2kDosError::ConfigError(_))
        ));
        assert!(matches!(
            DosConfig::new(-0.1, 0.01, 5).validate(),
            Err(Cp2kDosError::ConfigError(_))
        ));
        assert!(matches!(
            DosConfig::new(0.1, 0.0, 5).validate(),
            Err(Cp2kDosError::ConfigError(_))
        ));
        assert!(matches!(
            DosConfig::new(0.1, 0.01, 0).validate(),
            Err(Cp2kDosError::ConfigError(_))
        ));
        assert!(matches!(
            DosConfig::new(f64::NAN, 0.01, 3).validate(),
            Err(Cp2kDosError::ConfigError(_))
        ));
    }

    #[test]
    fn test_rejects_kernel_above_point_limit() {
        // 2 * 10000 + 1 个核点
        let config = DosConfig::new(1.0, 1e-3, 10).with_max_points(1000);
        assert!(matches!(config.validate(), Err(Cp2kDosError::ConfigError(_))));

        let config = DosConfig::new(1.0, 1e-3, 10).with_max_points(20_001);
        assert!(config.validate().is_ok());
        assert_eq!(config.kernel_half_points(), 10_000);
    }

    #[test]
    fn test_undersampling() {
        // sigma / deltaE = 5
        let config = DosConfig::new(0.05, 0.01, 5);
        assert!(config.is_undersampled());
        assert!((config.half_width() - 0.25).abs() < 1e-12);
    }
}
