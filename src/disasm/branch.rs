use crate::disasm::immediate::signed_hex;
use crate::disasm::line::{DisasmLine, Traits};
use crate::sext::{sext16, sext26};

pub const LABEL_PREFIX: &str = ".loc_0x";

/// Resolved branch: displacement decoded from the raw word, target relative
/// to the start of the disassembled block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Branch {
    pub disp: i32,
    pub target: i64,
    pub in_range: bool,
}

impl Branch {
    /// Word-aligned target, as used for label names.
    pub fn aligned(&self) -> u32 {
        (self.target as u32) & !3
    }

    /// Operand text replacing the disassembler's numeric target.
    pub fn operand(&self) -> String {
        if self.in_range || self.target == 0 {
            label_name(self.aligned())
        } else {
            signed_hex(self.disp as i64)
        }
    }
}

pub fn displacement(line: &DisasmLine) -> i32 {
    if line.traits().contains(Traits::UNCONDITIONAL) {
        sext26(line.raw & 0x03FF_FFFC)
    } else {
        sext16(line.raw & 0xFFFC)
    }
}

/// `line_count` is the number of instructions in the block; a target may
/// sit just past the last one.
pub fn resolve(line: &DisasmLine, line_count: usize) -> Branch {
    let disp = displacement(line);
    let target = line.offset as i64 + disp as i64;
    let index = target >> 2;
    Branch { disp, target, in_range: index > 0 && index <= line_count as i64 }
}

pub fn label_name(target: u32) -> String {
    format!("{LABEL_PREFIX}{:X}", target & !3)
}

/// Put `operand` where the numeric target was, keeping any leading
/// condition-register / BO,BI operands.
pub fn substitute(operands: &str, operand: &str) -> String {
    match operands.rsplit_once(',') {
        Some((head, _)) => format!("{head}, {operand}"),
        None => operand.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(offset: u32, raw: u32, mnemonic: &str, operands: &str) -> DisasmLine {
        DisasmLine { offset, raw, mnemonic: mnemonic.into(), operands: operands.into() }
    }

    #[test]
    fn forward_bl_in_range() {
        let b = resolve(&line(0, 0x4800_0009, "bl", "0x8"), 4);
        assert_eq!(b.disp, 8);
        assert!(b.in_range);
        assert_eq!(b.operand(), ".loc_0x8");
    }

    #[test]
    fn backward_conditional() {
        // bne- cr7,-0x8 at 0x10
        let b = resolve(&line(0x10, 0x409E_FFF8, "bne-", "cr7,0x8"), 8);
        assert_eq!(b.disp, -8);
        assert_eq!(b.target, 8);
        assert!(b.in_range);
        assert_eq!(substitute("cr7,0x8", &b.operand()), "cr7, .loc_0x8");
    }

    #[test]
    fn out_of_range_keeps_displacement() {
        let b = resolve(&line(0, 0x4BFF_FFF0, "b", "-0x10"), 4);
        assert!(!b.in_range);
        assert_eq!(b.operand(), "-0x10");
        let far = resolve(&line(4, 0x4800_0100, "b", "0x104"), 4);
        assert!(!far.in_range);
        assert_eq!(far.operand(), "0x100");
    }

    #[test]
    fn branch_to_start_uses_head_label() {
        let b = resolve(&line(8, 0x4BFF_FFF8, "b", "0x0"), 4);
        assert!(!b.in_range);
        assert_eq!(b.operand(), ".loc_0x0");
    }

    #[test]
    fn target_just_past_end_is_in_range() {
        let b = resolve(&line(0, 0x4800_0010, "b", "0x10"), 4);
        assert!(b.in_range);
    }
}
