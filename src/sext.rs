use serde::{Deserialize, Serialize};

/// Field widths that show up in raw PowerPC instruction words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Width {
    /// Paired-single load/store displacement
    W12 = 12,
    /// D-form immediates and conditional branch displacements (BD||0b00)
    W16 = 16,
    /// LI field of an unconditional branch before the implicit shift
    W24 = 24,
    /// Unconditional branch displacement (LI||0b00)
    W26 = 26,
}

impl Width {
    pub fn bits(self) -> u32 {
        self as u32
    }

    pub fn mask(self) -> u32 {
        (1u32 << self.bits()) - 1
    }
}

/// Two's-complement extension of the low `width` bits of `value`.
/// Bits above the field are ignored, so any u32 is a valid input.
pub fn sign_extend(value: u32, width: Width) -> i32 {
    let s = 32 - width.bits();
    ((value << s) as i32) >> s
}

pub fn sext12(value: u32) -> i32 {
    sign_extend(value, Width::W12)
}

pub fn sext16(value: u32) -> i32 {
    sign_extend(value, Width::W16)
}

pub fn sext24(value: u32) -> i32 {
    sign_extend(value, Width::W24)
}

pub fn sext26(value: u32) -> i32 {
    sign_extend(value, Width::W26)
}
