//! # CP2K MOLog / 输出文件能级解析器
//!
//! 从 CP2K 的 `.MOLog` 或主输出文件中提取各自旋通道的本征值、占据数
//! 与 Fermi 能级，并由 Hartree 换算为 eV。
//!
//! ## 块结构
//! ```text
//!  MO EIGENVALUES AND MO OCCUPATION NUMBERS          <- 表头 (含 EIGENVALUES)
//!                                                    <- 前导行 1
//!  #  MO index    MO eigenvalue [a.u.]   MO occupation   <- 前导行 2
//!         1          -0.934587              2.000000     <- 数据行
//!         ...
//!  Sum:                                     8.000000     <- 数据结束
//!  Fermi energy:     -0.123456                           <- 块尾
//! ```
//!
//! 逐行状态机：表头检测 -> 跳过前导行 -> 累积数据行 -> 查找 Fermi 行。
//! 数据区只接受数据行、空行、`Sum:` 行和 Fermi 行，其余内容视为损坏的块。
//! 表头含 `SCF` 的块是自洽迭代的中间结果，整块跳过。
//!
//! ## 自旋通道
//! - 表头带 `ALPHA` / `BETA` 标记时，同一标记的后出现块覆盖先前的块
//! - 无标记的块按出现顺序各自成为一个通道
//! - 通道编号 0, 1, 2, ... 按首次出现顺序分配
//!
//! ## 依赖关系
//! - 被 `parsers/mod.rs` 调用
//! - 使用 `models/spectrum.rs`, `models/units.rs`

use crate::error::{Cp2kDosError, Result};
use crate::models::units::hartree_to_ev;
use crate::models::{EnergyLevel, EnergyLevelSet, Spectrum};

use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

const HEADER_MARKER: &str = "EIGENVALUES";
const SCF_MARKER: &str = "SCF";
const FERMI_MARKER: &str = "Fermi energy:";
const SUM_MARKER: &str = "Sum:";
const PREAMBLE_LINES: usize = 2;

pub const NO_SPECTRUM: &str = "no spectrum found";
pub const MALFORMED_BLOCK: &str = "malformed spectrum block";

fn fermi_regex() -> &'static Regex {
    static INSTANCE: OnceLock<Regex> = OnceLock::new();
    INSTANCE.get_or_init(|| {
        Regex::new(r"Fermi energy:\s*([-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?)")
            .expect("static Fermi energy pattern")
    })
}

fn spin_regex() -> &'static Regex {
    static INSTANCE: OnceLock<Regex> = OnceLock::new();
    INSTANCE.get_or_init(|| Regex::new(r"(?i)\b(alpha|beta)\b").expect("static spin pattern"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum SpinLabel {
    Alpha,
    Beta,
}

/// 正在读取的块
#[derive(Debug)]
struct OpenBlock {
    header_line: usize,
    spin: Option<SpinLabel>,
    rows: Vec<EnergyLevel>,
}

/// 已完成的块
#[derive(Debug)]
struct ParsedBlock {
    spin: Option<SpinLabel>,
    levels: EnergyLevelSet,
}

#[derive(Debug)]
enum State {
    /// 寻找下一个表头
    Searching,
    /// 跳过 SCF 中间块，直到下一个表头
    SkippingScf,
    /// 跳过表头后的前导行
    Preamble(OpenBlock, usize),
    /// 累积数据行
    Body(OpenBlock),
    /// 数据已结束，寻找 Fermi 行
    Footer(OpenBlock),
}

/// 解析整段文本
pub fn parse_spectrum(content: &str) -> Result<Spectrum> {
    let spectrum = assemble(scan_blocks(content)?);
    if spectrum.is_empty() {
        return Err(Cp2kDosError::ParseError(NO_SPECTRUM.to_string()));
    }
    Ok(spectrum)
}

fn scan_blocks(content: &str) -> Result<Vec<ParsedBlock>> {
    let mut blocks = Vec::new();
    let mut state = State::Searching;

    for (i, line) in content.lines().enumerate() {
        let line_no = i + 1;

        state = match state {
            State::Searching => {
                if is_header(line) {
                    open_block(line, line_no)
                } else {
                    State::Searching
                }
            }
            State::SkippingScf => {
                if is_header(line) {
                    open_block(line, line_no)
                } else {
                    State::SkippingScf
                }
            }
            State::Preamble(block, remaining) => {
                if remaining <= 1 {
                    State::Body(block)
                } else {
                    State::Preamble(block, remaining - 1)
                }
            }
            State::Body(mut block) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    State::Body(block)
                } else if starts_with_index(trimmed) {
                    block.rows.push(parse_row(trimmed, line_no)?);
                    State::Body(block)
                } else if trimmed.starts_with(SUM_MARKER) || line.contains(FERMI_MARKER) {
                    footer_step(block, line, line_no, &mut blocks)?
                } else if is_header(line) {
                    return Err(Cp2kDosError::ParseError(MALFORMED_BLOCK.to_string()));
                } else {
                    return Err(malformed(
                        line_no,
                        &format!("unexpected line in level table '{}'", trimmed),
                    ));
                }
            }
            State::Footer(block) => footer_step(block, line, line_no, &mut blocks)?,
        };
    }

    match state {
        State::Searching | State::SkippingScf => Ok(blocks),
        _ => Err(Cp2kDosError::ParseError(MALFORMED_BLOCK.to_string())),
    }
}

fn is_header(line: &str) -> bool {
    line.contains(HEADER_MARKER)
}

fn open_block(line: &str, line_no: usize) -> State {
    if line.contains(SCF_MARKER) {
        return State::SkippingScf;
    }

    let spin = spin_regex().captures(line).map(|c| {
        if c[1].eq_ignore_ascii_case("alpha") {
            SpinLabel::Alpha
        } else {
            SpinLabel::Beta
        }
    });

    State::Preamble(
        OpenBlock {
            header_line: line_no,
            spin,
            rows: Vec::new(),
        },
        PREAMBLE_LINES,
    )
}

/// 数据结束后的单行处理：遇到 Fermi 行则完成该块
fn footer_step(
    block: OpenBlock,
    line: &str,
    line_no: usize,
    blocks: &mut Vec<ParsedBlock>,
) -> Result<State> {
    if line.contains(FERMI_MARKER) {
        let fermi = fermi_regex()
            .captures(line)
            .and_then(|c| c[1].parse::<f64>().ok())
            .ok_or_else(|| malformed(line_no, "cannot read Fermi energy"))?;
        blocks.push(finish_block(block, fermi, line_no)?);
        Ok(State::Searching)
    } else if is_header(line) {
        // 下一个块已开始，当前块缺少 Fermi 行
        Err(Cp2kDosError::ParseError(MALFORMED_BLOCK.to_string()))
    } else if starts_with_index(line.trim()) {
        Err(malformed(line_no, "level row after the end of the level table"))
    } else {
        Ok(State::Footer(block))
    }
}

fn finish_block(block: OpenBlock, fermi_hartree: f64, line_no: usize) -> Result<ParsedBlock> {
    let mut seen = HashSet::new();
    for row in &block.rows {
        if !seen.insert(row.index) {
            return Err(malformed(
                line_no,
                &format!("duplicate level index {}", row.index),
            ));
        }
    }

    let levels = EnergyLevelSet::new(block.rows, hartree_to_ev(fermi_hartree));
    if levels.is_empty() {
        return Err(malformed(
            block.header_line,
            "block contains no energy levels",
        ));
    }

    Ok(ParsedBlock {
        spin: block.spin,
        levels,
    })
}

fn starts_with_index(trimmed: &str) -> bool {
    trimmed
        .split_whitespace()
        .next()
        .map(|t| t.parse::<i64>().is_ok())
        .unwrap_or(false)
}

/// 解析数据行: index energy[Ha] occupation
fn parse_row(trimmed: &str, line_no: usize) -> Result<EnergyLevel> {
    let parts: Vec<&str> = trimmed.split_whitespace().collect();
    if parts.len() != 3 {
        return Err(malformed(
            line_no,
            &format!(
                "expected 3 columns (index, energy, occupation), found {}",
                parts.len()
            ),
        ));
    }

    let index: usize = parts[0]
        .parse()
        .ok()
        .filter(|i| *i >= 1)
        .ok_or_else(|| malformed(line_no, &format!("invalid level index '{}'", parts[0])))?;
    let energy: f64 = parts[1]
        .parse()
        .map_err(|_| malformed(line_no, &format!("invalid energy '{}'", parts[1])))?;
    let occupation: f64 = parts[2]
        .parse()
        .map_err(|_| malformed(line_no, &format!("invalid occupation '{}'", parts[2])))?;

    if occupation < 0.0 {
        return Err(malformed(
            line_no,
            &format!("negative occupation {}", occupation),
        ));
    }

    Ok(EnergyLevel::new(index, hartree_to_ev(energy), occupation))
}

fn malformed(line_no: usize, reason: &str) -> Cp2kDosError {
    Cp2kDosError::ParseError(format!("{}: line {}: {}", MALFORMED_BLOCK, line_no, reason))
}

/// 按自旋标记合并各块
fn assemble(blocks: Vec<ParsedBlock>) -> Spectrum {
    let mut slots: Vec<EnergyLevelSet> = Vec::new();
    let mut labeled: HashMap<SpinLabel, usize> = HashMap::new();

    for block in blocks {
        match block.spin {
            Some(label) => match labeled.get(&label) {
                Some(&slot) => slots[slot] = block.levels,
                None => {
                    labeled.insert(label, slots.len());
                    slots.push(block.levels);
                }
            },
            None => slots.push(block.levels),
        }
    }

    Spectrum::from_channels(slots)
}
