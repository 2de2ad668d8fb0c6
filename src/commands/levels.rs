//! # levels 命令实现
//!
//! 以表格形式列出各自旋通道的能级概要（HOMO/LUMO/能隙/总占据数），
//! 可选列出 Fermi 能级附近的全部能级。
//!
//! ## 依赖关系
//! - 使用 `cli/levels.rs` 定义的 LevelsArgs
//! - 使用 `parsers/`, `models/`
//! - 使用 `tabled` 打印表格

use crate::cli::levels::LevelsArgs;
use crate::error::{Cp2kDosError, Result};
use crate::models::{EnergyLevel, EnergyLevelSet, Spectrum};
use crate::parsers;
use crate::utils::output;

use tabled::{Table, Tabled};

/// 通道概要行
#[derive(Debug, Clone, Tabled)]
struct ChannelRow {
    #[tabled(rename = "Spin")]
    spin: usize,
    #[tabled(rename = "Levels")]
    count: usize,
    #[tabled(rename = "Fermi (eV)")]
    fermi: String,
    #[tabled(rename = "HOMO (eV)")]
    homo: String,
    #[tabled(rename = "LUMO (eV)")]
    lumo: String,
    #[tabled(rename = "Gap (eV)")]
    gap: String,
    #[tabled(rename = "Electrons")]
    electrons: String,
}

/// 单个能级行
#[derive(Debug, Clone, Tabled)]
struct LevelRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "E (eV)")]
    energy: String,
    #[tabled(rename = "E - Ef (eV)")]
    relative: String,
    #[tabled(rename = "Occupation")]
    occupation: String,
}

/// 执行 levels 命令
pub fn execute(args: LevelsArgs) -> Result<()> {
    output::print_header("CP2K Energy Levels");

    if args.window <= 0.0 || !args.window.is_finite() {
        return Err(Cp2kDosError::InvalidArgument(format!(
            "window must be a positive number of eV, got {}",
            args.window
        )));
    }

    let spectrum = parsers::parse_spectrum_file(&args.input)?;
    println!("{}", spectrum);

    // 通道不一致时在此给出警告
    let fermi = spectrum.fermi().ok_or(Cp2kDosError::EmptyInput)?;

    println!("{}", Table::new(channel_rows(&spectrum)));

    if args.all {
        for (spin, levels) in spectrum.channels() {
            let rows = level_rows(levels, fermi, args.window);
            output::print_header(&format!(
                "Spin {}: {} level(s) within {:.3} ± {:.3} eV",
                spin,
                rows.len(),
                fermi,
                args.window
            ));
            if rows.is_empty() {
                output::print_skip("No levels in window");
            } else {
                println!("{}", Table::new(&rows));
            }
        }
    }

    output::print_done(&format!(
        "{} spin channel(s), {} level(s), Fermi energy {:.6} eV",
        spectrum.nspin(),
        spectrum.energies().len(),
        fermi
    ));

    Ok(())
}

fn fmt_energy(level: Option<&EnergyLevel>) -> String {
    level
        .map(|l| format!("{:.4}", l.energy))
        .unwrap_or_else(|| "-".to_string())
}

fn channel_rows(spectrum: &Spectrum) -> Vec<ChannelRow> {
    spectrum
        .channels()
        .map(|(spin, levels)| ChannelRow {
            spin,
            count: levels.len(),
            fermi: format!("{:.4}", levels.fermi()),
            homo: fmt_energy(levels.highest_occupied()),
            lumo: fmt_energy(levels.lowest_unoccupied()),
            gap: levels
                .gap()
                .map(|g| format!("{:.4}", g))
                .unwrap_or_else(|| "-".to_string()),
            electrons: format!("{:.3}", levels.total_occupation()),
        })
        .collect()
}

fn level_rows(levels: &EnergyLevelSet, fermi: f64, window: f64) -> Vec<LevelRow> {
    levels
        .levels_in_window(fermi - window, fermi + window)
        .map(|l| LevelRow {
            index: l.index,
            energy: format!("{:.4}", l.energy),
            relative: format!("{:+.4}", l.energy - fermi),
            occupation: format!("{:.3}", l.occupation),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spectrum() -> Spectrum {
        let up = EnergyLevelSet::new(
            vec![
                EnergyLevel::new(1, -10.0, 1.0),
                EnergyLevel::new(2, -1.0, 1.0),
                EnergyLevel::new(3, 0.5, 0.0),
                EnergyLevel::new(4, 8.0, 0.0),
            ],
            -0.2,
        );
        let down = EnergyLevelSet::new(vec![EnergyLevel::new(1, -2.0, 1.0)], -0.2);
        Spectrum::from_channels(vec![up, down])
    }

    #[test]
    fn test_channel_rows() {
        let rows = channel_rows(&spectrum());
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].count, 4);
        assert_eq!(rows[0].homo, "-1.0000");
        assert_eq!(rows[0].lumo, "0.5000");
        assert_eq!(rows[0].gap, "1.5000");
        assert_eq!(rows[0].electrons, "2.000");

        // 没有空轨道
        assert_eq!(rows[1].lumo, "-");
        assert_eq!(rows[1].gap, "-");
    }

    #[test]
    fn test_level_rows_window() {
        let spectrum = spectrum();
        let up = spectrum.channel(0).unwrap();
        let rows = level_rows(up, -0.2, 3.0);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].index, 2);
        assert_eq!(rows[0].relative, "-0.8000");
        assert_eq!(rows[1].relative, "+0.7000");
    }
}
