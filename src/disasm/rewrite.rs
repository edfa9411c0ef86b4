//! Fix-ups for quirks of the external disassembler's output. These are not
//! PowerPC semantics; each rule names the mnemonics it applies to and what
//! it does to the line.

use crate::disasm::line::DisasmLine;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rewritten {
    /// Emit the raw word as `.long 0x........`
    Word(u32),
    /// Continue formatting with these operands
    Operands(String),
}

pub struct Rewrite {
    pub name: &'static str,
    pub applies: fn(&DisasmLine) -> bool,
    pub apply: fn(&DisasmLine) -> Rewritten,
}

/// Update-form loads/stores with rA = r0 are invalid forms the disassembler
/// still decodes; keep the original word instead.
fn update_form_r0(l: &DisasmLine) -> bool {
    l.mnemonic.starts_with(['s', 'l']) && l.mnemonic.ends_with('u') && l.operands.ends_with("(r0)")
}

fn keep_word(l: &DisasmLine) -> Rewritten {
    Rewritten::Word(l.raw)
}

/// crclr/crse come out with the repeated bit number appended.
fn cr_set_clear(l: &DisasmLine) -> bool {
    l.mnemonic == "crclr" || l.mnemonic == "crse"
}

fn drop_trailing_number(l: &DisasmLine) -> Rewritten {
    match l.operands.rsplit_once(',') {
        Some((head, tail)) if !tail.is_empty() && tail.bytes().all(|b| b.is_ascii_digit()) => {
            Rewritten::Operands(head.to_string())
        }
        _ => Rewritten::Operands(l.operands.clone()),
    }
}

pub static REWRITES: &[Rewrite] = &[
    Rewrite { name: "update-form-r0", applies: update_form_r0, apply: keep_word },
    Rewrite { name: "cr-set-clear", applies: cr_set_clear, apply: drop_trailing_number },
];

pub fn rewrite(line: &DisasmLine) -> Option<Rewritten> {
    REWRITES.iter().find(|r| (r.applies)(line)).map(|r| (r.apply)(line))
}
