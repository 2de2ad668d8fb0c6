//! # 态密度计算
//!
//! 将离散本征值转换为高斯展宽的连续态密度。
//!
//! ## 算法概述
//! 1. 检查参数，sigma/deltaE < 10 时给出欠采样警告
//! 2. 在 [-sigma*nsigma, +sigma*nsigma] 上以 deltaE 为间距制表归一化高斯核
//! 3. 构造能量网格 [min - sigma*nsigma, max + sigma*nsigma]，间距 deltaE
//! 4. 分箱：每个能级落入下取整格点 n = floor((e - start) / deltaE)，权重为 1
//! 5. 与高斯核做 "same" 模式卷积（输出长度等于网格长度，核中心对齐输出点）
//!
//! 分箱不按占据数加权，空轨道与占据轨道贡献相同。
//!
//! ## 依赖关系
//! - 被 `models/spectrum.rs`, `commands/dos.rs` 调用
//! - 使用 `dos/config.rs` 的 DosConfig

use crate::dos::config::snap_floor;
use crate::dos::DosConfig;
use crate::error::{Cp2kDosError, Result};
use crate::utils::output;

use serde::Serialize;
use std::f64::consts::PI;

/// 态密度曲线
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DosCurve {
    /// 均匀能量网格 (eV)
    pub energies: Vec<f64>,
    /// 态密度 (states/eV)
    pub density: Vec<f64>,
    /// 网格间距 (eV)
    pub delta_e: f64,
}

impl DosCurve {
    pub fn len(&self) -> usize {
        self.energies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.energies.is_empty()
    }

    /// 离散积分 sum(density) * deltaE，约等于能级数
    pub fn integral(&self) -> f64 {
        self.density.iter().sum::<f64>() * self.delta_e
    }

    /// 峰值 (energy, density)
    pub fn peak(&self) -> Option<(f64, f64)> {
        self.points().max_by(|a, b| a.1.total_cmp(&b.1))
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.energies
            .iter()
            .copied()
            .zip(self.density.iter().copied())
    }

    /// 能量落在 [lo, hi] 内的点，仅用于显示
    pub fn window(&self, lo: f64, hi: f64) -> Vec<(f64, f64)> {
        self.points().filter(|(e, _)| *e >= lo && *e <= hi).collect()
    }
}

/// 态密度计算器
///
/// 构造时检查参数并制表高斯核，之后可对任意多组能级复用。
#[derive(Debug, Clone)]
pub struct DosEngine {
    config: DosConfig,
    kernel: Vec<f64>,
}

impl DosEngine {
    /// 创建计算器，参数非法时返回 `ConfigError`
    pub fn new(config: DosConfig) -> Result<Self> {
        config.validate()?;

        if config.is_undersampled() {
            output::print_warning(&format!(
                "sigma/deltaE = {:.2} < 10: the Gaussian kernel is undersampled, the DOS may show aliasing artifacts",
                config.sampling_ratio()
            ));
        }

        let kernel = gaussian_kernel(&config);
        Ok(Self { config, kernel })
    }

    pub fn config(&self) -> &DosConfig {
        &self.config
    }

    pub fn kernel(&self) -> &[f64] {
        &self.kernel
    }

    /// 计算态密度
    pub fn compute(&self, energies: &[f64]) -> Result<DosCurve> {
        if energies.is_empty() {
            return Err(Cp2kDosError::EmptyInput);
        }
        if let Some(bad) = energies.iter().find(|e| !e.is_finite()) {
            return Err(Cp2kDosError::InvalidArgument(format!(
                "energy level {} is not finite",
                bad
            )));
        }

        let delta_e = self.config.delta_e;
        let (start, len) = grid_extent(energies, &self.config)?;

        let grid: Vec<f64> = (0..len).map(|i| start + i as f64 * delta_e).collect();
        let comb = bin_levels(energies, start, delta_e, len);
        let density = convolve_same(&comb, &self.kernel);

        Ok(DosCurve {
            energies: grid,
            density,
            delta_e,
        })
    }
}

/// 归一化高斯核，长度 2 * half + 1，中心位于 half
pub fn gaussian_kernel(config: &DosConfig) -> Vec<f64> {
    let sigma = config.sigma;
    let delta_e = config.delta_e;
    let half = config.kernel_half_points();
    let norm = 1.0 / (sigma * (2.0 * PI).sqrt());

    (0..=2 * half)
        .map(|k| {
            let x = (k as f64 - half as f64) * delta_e;
            norm * (-x * x / (2.0 * sigma * sigma)).exp()
        })
        .collect()
}

/// 网格起点与点数
fn grid_extent(energies: &[f64], config: &DosConfig) -> Result<(f64, usize)> {
    let min = energies.iter().copied().fold(f64::INFINITY, f64::min);
    let max = energies.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let start = min - config.half_width();
    let end = max + config.half_width();

    let points = snap_floor((end - start) / config.delta_e) + 1.0;
    if points > config.max_points as f64 {
        return Err(Cp2kDosError::ConfigError(format!(
            "energy grid would need {:.0} points (limit {}), increase deltaE or the point limit",
            points, config.max_points
        )));
    }

    Ok((start, points as usize))
}

/// 按下取整将能级累加到格点上
fn bin_levels(energies: &[f64], start: f64, delta_e: f64, len: usize) -> Vec<f64> {
    let mut comb = vec![0.0; len];
    for &e in energies {
        let n = snap_floor((e - start) / delta_e).max(0.0) as usize;
        comb[n.min(len - 1)] += 1.0;
    }
    comb
}

/// "same" 模式卷积：out[i] = full[i + (K - 1) / 2]
pub fn convolve_same(signal: &[f64], kernel: &[f64]) -> Vec<f64> {
    let n = signal.len();
    let mut out = vec![0.0; n];
    if kernel.is_empty() {
        return out;
    }
    let center = (kernel.len() - 1) / 2;

    // 能级稀疏，只展开非零格点
    for (j, &w) in signal.iter().enumerate() {
        if w == 0.0 {
            continue;
        }
        for (m, &g) in kernel.iter().enumerate() {
            let full = j + m;
            if full < center {
                continue;
            }
            let i = full - center;
            if i >= n {
                break;
            }
            out[i] += w * g;
        }
    }

    out
}
