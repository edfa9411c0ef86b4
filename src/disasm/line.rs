use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One instruction line of disassembler output:
/// `<hex-offset>:  <hex-word>\t<mnemonic>\t<operands>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisasmLine {
    pub offset: u32,
    pub raw: u32,
    pub mnemonic: String,
    pub operands: String,
}

bitflags! {
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Traits: u8 {
const BRANCH = 1 << 0;        // PC-relative branch with an immediate target
const UNCONDITIONAL = 1 << 1; // b / bl: 26-bit displacement
const UNSIGNED = 1 << 2;      // immediate is a 16-bit unsigned field
const PAIRED_SINGLE = 1 << 3; // psq_* load/store: 12-bit displacement
}
}

const UNSIGNED_IMM: &[&str] = &["lis", "ori", "oris", "xori", "xoris", "andi.", "andis."];
const PAIRED_SINGLE_MEM: &[&str] = &["psq_l", "psq_lu", "psq_st", "psq_stu"];

pub fn traits(mnemonic: &str) -> Traits {
    let mut t = Traits::empty();
    // register-indirect forms (blr, bctr, bdnzlr...) carry no displacement
    if mnemonic.starts_with('b') && !mnemonic.contains('r') {
        t |= Traits::BRANCH;
        if mnemonic == "b" || mnemonic == "bl" {
            t |= Traits::UNCONDITIONAL;
        }
    }
    if UNSIGNED_IMM.contains(&mnemonic) {
        t |= Traits::UNSIGNED;
    }
    if PAIRED_SINGLE_MEM.contains(&mnemonic) {
        t |= Traits::PAIRED_SINGLE;
    }
    t
}

fn is_mnemonic_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '+' | '-')
}

fn is_operand_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | ',' | '(' | ')')
}

fn hex_field(s: &str) -> Option<(u32, &str)> {
    let end = s.find(|c: char| !c.is_ascii_hexdigit()).unwrap_or(s.len());
    if end == 0 || end > 8 {
        return None;
    }
    Some((u32::from_str_radix(&s[..end], 16).ok()?, &s[end..]))
}

impl DisasmLine {
    pub fn parse(line: &str) -> Option<Self> {
        let (offset, rest) = hex_field(line.trim_start())?;
        let rest = rest.strip_prefix(':')?.trim_start();
        let (raw, rest) = hex_field(rest)?;
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let rest = rest.trim_start();
        let end = rest.find(|c: char| !is_mnemonic_char(c)).unwrap_or(rest.len());
        if end == 0 {
            return None;
        }
        let mnemonic = rest[..end].to_string();
        let rest = rest[end..].trim_start_matches([' ', '\t']);
        let end = rest.find(|c: char| !is_operand_char(c)).unwrap_or(rest.len());
        Some(Self { offset, raw, mnemonic, operands: rest[..end].to_string() })
    }

    pub fn traits(&self) -> Traits {
        traits(&self.mnemonic)
    }
}

/// Parse every instruction line, dropping anything that does not match.
pub fn parse_lines(text: &str) -> Vec<DisasmLine> {
    text.lines()
        .filter_map(|l| {
            let parsed = DisasmLine::parse(l);
            if parsed.is_none() && !l.trim().is_empty() {
                debug!(line = l, "skipping unparseable disassembly line");
            }
            parsed
        })
        .collect()
}
