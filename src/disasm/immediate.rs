use crate::disasm::line::Traits;
use crate::sext::sext12;

/// `0x1F` / `-0x1F`
pub fn signed_hex(v: i64) -> String {
    if v < 0 {
        format!("-0x{:X}", v.unsigned_abs())
    } else {
        format!("0x{v:X}")
    }
}

/// Render a decimal immediate (optionally followed by `(`, as in a
/// `d(rA)` memory operand) as hex under the mnemonic's signedness.
pub fn format_immediate(value: i64, memory: bool, traits: Traits) -> String {
    let text = if traits.contains(Traits::UNSIGNED) {
        if value < 0 {
            signed_hex(0x10000 + value)
        } else {
            signed_hex(value)
        }
    } else if memory && traits.contains(Traits::PAIRED_SINGLE) {
        signed_hex(sext12(value as u32) as i64)
    } else {
        signed_hex(value)
    };
    if memory {
        text + "("
    } else {
        text
    }
}

/// Convert one operand if it starts with a decimal number. Hex operands and
/// register names are left alone; a bare `0` stays `0`.
fn convert_operand(op: &str, traits: Traits) -> String {
    let end = op.find(|c: char| !(c.is_ascii_digit() || c == '-')).unwrap_or(op.len());
    if end == 0 || op[end..].starts_with('x') {
        return op.to_string();
    }
    let memory = op[end..].starts_with('(');
    let Ok(value) = op[..end].parse::<i64>() else {
        return op.to_string();
    };
    if !memory && &op[..end] == "0" {
        return op.to_string();
    }
    let consumed = end + memory as usize;
    format_immediate(value, memory, traits) + &op[consumed..]
}

/// Format the operand list of a non-branch instruction. Lists of four or
/// more separators (rotate masks and the like) keep their decimal fields,
/// except for paired-single loads/stores.
pub fn format_operands(operands: &str, traits: Traits) -> String {
    let ps = traits.contains(Traits::PAIRED_SINGLE);
    if operands.matches(',').count() >= 4 && !ps {
        return operands.to_string();
    }
    let mut parts = operands.split(',');
    let mut out: Vec<String> = parts.next().map(str::to_string).into_iter().collect();
    out.extend(parts.map(|p| convert_operand(p, traits)));
    out.join(if ps { "," } else { ", " })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_by_default() {
        assert_eq!(format_operands("r3,r3,-1", Traits::empty()), "r3, r3, -0x1");
        assert_eq!(format_operands("r3,r4,32", Traits::empty()), "r3, r4, 0x20");
    }

    #[test]
    fn unsigned_set_folds_negative() {
        assert_eq!(format_operands("r3,-1", Traits::UNSIGNED), "r3, 0xFFFF");
        assert_eq!(format_operands("r3,r3,-32768", Traits::UNSIGNED), "r3, r3, 0x8000");
        assert_eq!(format_operands("r3,r3,255", Traits::UNSIGNED), "r3, r3, 0xFF");
    }

    #[test]
    fn memory_operands() {
        assert_eq!(format_operands("r3,8(r1)", Traits::empty()), "r3, 0x8(r1)");
        assert_eq!(format_operands("r0,-4(r1)", Traits::empty()), "r0, -0x4(r1)");
        assert_eq!(format_operands("r3,0(r4)", Traits::empty()), "r3, 0x0(r4)");
    }

    #[test]
    fn paired_single_uses_12_bit_offsets() {
        assert_eq!(format_operands("f1,4088(r3),0,0", Traits::PAIRED_SINGLE), "f1,-0x8(r3),0,0");
        assert_eq!(format_operands("f1,8(r3),1,2", Traits::PAIRED_SINGLE), "f1,0x8(r3),0x1,0x2");
    }

    #[test]
    fn leaves_zero_hex_and_registers() {
        assert_eq!(format_operands("r3,0", Traits::empty()), "r3, 0");
        assert_eq!(format_operands("r3,0x10", Traits::empty()), "r3, 0x10");
        assert_eq!(format_operands("cr7,r3,r4", Traits::empty()), "cr7, r3, r4");
        assert_eq!(format_operands("r3,r4,2,0,29", Traits::empty()), "r3,r4,2,0,29");
        assert_eq!(format_operands("", Traits::empty()), "");
    }
}
