//! # 能级谱数据模型
//!
//! 存储按自旋分组的能级（本征值 + 占据数）及各自旋通道的 Fermi 能级。
//!
//! ## 结构
//! - `EnergyLevel`: 单个能级 (index, energy, occupation)
//! - `EnergyLevelSet`: 一个自旋通道的全部能级 + Fermi 能级
//! - `Spectrum`: 自旋编号 -> `EnergyLevelSet` 的映射
//!
//! 所有能量单位为 eV。`Spectrum` 与 `EnergyLevelSet` 为值语义，
//! `clone()` 得到的副本与原对象互不影响。
//!
//! ## 依赖关系
//! - 被 `parsers/molog.rs` 构造
//! - 被 `commands/dos.rs`, `commands/levels.rs` 使用

use crate::utils::output;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// 判定各通道 Fermi 能级相等的容差 (eV)
pub const FERMI_TOLERANCE: f64 = 1e-9;

/// 占据数高于该值视为已占据
pub const OCCUPIED_THRESHOLD: f64 = 1e-8;

/// 单个能级
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyLevel {
    /// 轨道编号（从 1 开始）
    pub index: usize,
    /// 本征值 (eV)
    pub energy: f64,
    /// 占据数
    pub occupation: f64,
}

impl EnergyLevel {
    pub fn new(index: usize, energy: f64, occupation: f64) -> Self {
        Self {
            index,
            energy,
            occupation,
        }
    }

    pub fn is_occupied(&self) -> bool {
        self.occupation > OCCUPIED_THRESHOLD
    }
}

/// 一个自旋通道的能级集合
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyLevelSet {
    /// 能级，保持输出文件中的顺序
    levels: Vec<EnergyLevel>,
    /// 该通道的 Fermi 能级 (eV)
    fermi: f64,
}

impl EnergyLevelSet {
    pub fn new(levels: Vec<EnergyLevel>, fermi: f64) -> Self {
        Self { levels, fermi }
    }

    pub fn levels(&self) -> &[EnergyLevel] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn fermi(&self) -> f64 {
        self.fermi
    }

    pub fn energies(&self) -> Vec<f64> {
        self.levels.iter().map(|l| l.energy).collect()
    }

    pub fn occupations(&self) -> Vec<f64> {
        self.levels.iter().map(|l| l.occupation).collect()
    }

    /// 平移所有能级，Fermi 能级保持不变
    pub fn shift(&mut self, delta: f64) {
        for level in self.levels.iter_mut() {
            level.energy += delta;
        }
    }

    /// 最高占据能级 (HOMO)
    pub fn highest_occupied(&self) -> Option<&EnergyLevel> {
        self.levels
            .iter()
            .filter(|l| l.is_occupied())
            .max_by(|a, b| a.energy.total_cmp(&b.energy))
    }

    /// 最低未占据能级 (LUMO)
    pub fn lowest_unoccupied(&self) -> Option<&EnergyLevel> {
        self.levels
            .iter()
            .filter(|l| !l.is_occupied())
            .min_by(|a, b| a.energy.total_cmp(&b.energy))
    }

    /// HOMO-LUMO 能隙
    pub fn gap(&self) -> Option<f64> {
        match (self.highest_occupied(), self.lowest_unoccupied()) {
            (Some(homo), Some(lumo)) => Some(lumo.energy - homo.energy),
            _ => None,
        }
    }

    /// 占据数之和（电子数）
    pub fn total_occupation(&self) -> f64 {
        self.levels.iter().map(|l| l.occupation).sum()
    }

    /// 落在 [lo, hi] 内的能级
    pub fn levels_in_window(&self, lo: f64, hi: f64) -> impl Iterator<Item = &EnergyLevel> {
        self.levels
            .iter()
            .filter(move |l| l.energy >= lo && l.energy <= hi)
    }
}

impl fmt::Display for EnergyLevelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let min = self.levels.iter().map(|l| l.energy).fold(f64::INFINITY, f64::min);
        let max = self
            .levels
            .iter()
            .map(|l| l.energy)
            .fold(f64::NEG_INFINITY, f64::max);

        if self.levels.is_empty() {
            write!(f, "0 levels, Fermi {:.4} eV", self.fermi)
        } else {
            write!(
                f,
                "{} levels in [{:.4}, {:.4}] eV, Fermi {:.4} eV",
                self.levels.len(),
                min,
                max,
                self.fermi
            )
        }
    }
}

/// 多通道 Fermi 能级的判定结果
#[derive(Debug, Clone, PartialEq)]
pub enum FermiLevel {
    /// 所有通道一致
    Consistent(f64),
    /// 通道间不一致，取算术平均
    Divergent { values: Vec<f64>, mean: f64 },
}

impl FermiLevel {
    pub fn value(&self) -> f64 {
        match self {
            FermiLevel::Consistent(v) => *v,
            FermiLevel::Divergent { mean, .. } => *mean,
        }
    }

    pub fn is_consistent(&self) -> bool {
        matches!(self, FermiLevel::Consistent(_))
    }
}

/// 按自旋分组的能级谱
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Spectrum {
    channels: BTreeMap<usize, EnergyLevelSet>,
}

impl Spectrum {
    /// 按顺序分配自旋编号 0, 1, 2, ...
    pub fn from_channels(channels: Vec<EnergyLevelSet>) -> Self {
        Self {
            channels: channels.into_iter().enumerate().collect(),
        }
    }

    pub fn nspin(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn channel(&self, spin: usize) -> Option<&EnergyLevelSet> {
        self.channels.get(&spin)
    }

    /// 按自旋编号升序遍历
    pub fn channels(&self) -> impl Iterator<Item = (usize, &EnergyLevelSet)> {
        self.channels.iter().map(|(s, l)| (*s, l))
    }

    /// 所有通道能级拼接，不重新排序
    pub fn energies(&self) -> Vec<f64> {
        self.channels.values().flat_map(|l| l.energies()).collect()
    }

    /// 所有通道占据数拼接，与 `energies()` 顺序一致
    pub fn occupations(&self) -> Vec<f64> {
        self.channels.values().flat_map(|l| l.occupations()).collect()
    }

    /// 各通道 Fermi 能级的一致性判定
    pub fn fermi_level(&self) -> Option<FermiLevel> {
        let values: Vec<f64> = self.channels.values().map(|l| l.fermi()).collect();
        if values.is_empty() {
            return None;
        }

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        if max - min <= FERMI_TOLERANCE {
            Some(FermiLevel::Consistent(values[0]))
        } else {
            let mean = values.iter().sum::<f64>() / values.len() as f64;
            Some(FermiLevel::Divergent { values, mean })
        }
    }

    /// Fermi 能级；通道间不一致时给出警告并返回平均值
    pub fn fermi(&self) -> Option<f64> {
        let level = self.fermi_level()?;
        if let FermiLevel::Divergent { values, mean } = &level {
            let listed: Vec<String> = values.iter().map(|v| format!("{:.6}", v)).collect();
            output::print_warning(&format!(
                "Fermi energies differ between spin channels: [{}] eV, using mean {:.6} eV",
                listed.join(", "),
                mean
            ));
        }
        Some(level.value())
    }

    /// 平移所有通道的能级，Fermi 能级保持不变
    pub fn shift(&mut self, delta: f64) {
        for levels in self.channels.values_mut() {
            levels.shift(delta);
        }
    }
}

impl fmt::Display for Spectrum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Spectrum containing {} spins", self.channels.len())?;
        for (spin, levels) in &self.channels {
            writeln!(f, "spin {} : {}", spin + 1, levels)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_set(fermi: f64) -> EnergyLevelSet {
        EnergyLevelSet::new(
            vec![
                EnergyLevel::new(1, -5.0, 2.0),
                EnergyLevel::new(2, -3.0, 2.0),
                EnergyLevel::new(3, 1.0, 0.0),
                EnergyLevel::new(4, 2.5, 0.0),
            ],
            fermi,
        )
    }

    #[test]
    fn test_energies_concatenated_in_channel_order() {
        let up = sample_set(-1.0);
        let down = EnergyLevelSet::new(vec![EnergyLevel::new(1, -10.0, 1.0)], -1.0);
        let spectrum = Spectrum::from_channels(vec![up, down]);

        assert_eq!(spectrum.nspin(), 2);
        assert_eq!(spectrum.energies(), vec![-5.0, -3.0, 1.0, 2.5, -10.0]);
        assert_eq!(spectrum.occupations(), vec![2.0, 2.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_consistent_fermi() {
        let spectrum = Spectrum::from_channels(vec![sample_set(-1.0), sample_set(-1.0)]);
        assert_eq!(spectrum.fermi_level(), Some(FermiLevel::Consistent(-1.0)));
        assert_eq!(spectrum.fermi(), Some(-1.0));
    }

    #[test]
    fn test_divergent_fermi_uses_mean() {
        let spectrum = Spectrum::from_channels(vec![sample_set(-1.0), sample_set(-2.0)]);
        let level = spectrum.fermi_level().unwrap();

        assert!(!level.is_consistent());
        assert!((level.value() - (-1.5)).abs() < 1e-12);
        assert!((spectrum.fermi().unwrap() - (-1.5)).abs() < 1e-12);
    }

    #[test]
    fn test_fermi_within_tolerance_is_consistent() {
        let spectrum = Spectrum::from_channels(vec![sample_set(-1.0), sample_set(-1.0 + 1e-12)]);
        assert!(spectrum.fermi_level().unwrap().is_consistent());
    }

    #[test]
    fn test_empty_spectrum_has_no_fermi() {
        assert!(Spectrum::default().fermi().is_none());
    }

    #[test]
    fn test_shift_leaves_fermi_and_occupations() {
        let mut spectrum = Spectrum::from_channels(vec![sample_set(-1.0)]);
        spectrum.shift(1.0);

        assert_eq!(spectrum.energies(), vec![-4.0, -2.0, 2.0, 3.5]);
        assert_eq!(spectrum.occupations(), vec![2.0, 2.0, 0.0, 0.0]);
        assert_eq!(spectrum.fermi(), Some(-1.0));
    }

    #[test]
    fn test_clone_is_independent() {
        let original = Spectrum::from_channels(vec![sample_set(-1.0), sample_set(-1.0)]);
        let mut copy = original.clone();
        copy.shift(-2.0);

        assert_eq!(original.energies()[0], -5.0);
        assert_eq!(copy.energies()[0], -7.0);
        assert_ne!(original, copy);
    }

    #[test]
    fn test_homo_lumo_gap() {
        let levels = sample_set(-1.0);
        assert_eq!(levels.highest_occupied().unwrap().index, 2);
        assert_eq!(levels.lowest_unoccupied().unwrap().index, 3);
        assert!((levels.gap().unwrap() - 4.0).abs() < 1e-12);
        assert!((levels.total_occupation() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_levels_in_window() {
        let levels = sample_set(-1.0);
        let picked: Vec<usize> = levels.levels_in_window(-4.0, 1.0).map(|l| l.index).collect();
        assert_eq!(picked, vec![2, 3]);
    }

    #[test]
    fn test_display() {
        let spectrum = Spectrum::from_channels(vec![sample_set(-1.0)]);
        let text = spectrum.to_string();
        assert!(text.starts_with("Spectrum containing 1 spins"));
        assert!(text.contains("spin 1 : 4 levels"));
    }
}
