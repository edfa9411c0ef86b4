//! Turns the external disassembler's listing into assembly that can be fed
//! back to the assembler: hex immediates, `.loc_0x..` labels on in-range
//! branch targets, and a fixed column layout.

pub mod branch;
pub mod immediate;
pub mod line;
pub mod rewrite;

use std::collections::BTreeSet;

use crate::config::CodecConfig;
use branch::label_name;
use line::{parse_lines, DisasmLine, Traits};
use rewrite::Rewritten;

#[derive(Debug, Clone, Copy)]
pub struct OpcodeFormatter {
    width: usize,
}

impl Default for OpcodeFormatter {
    fn default() -> Self {
        Self::new(&CodecConfig::default())
    }
}

impl OpcodeFormatter {
    pub fn new(cfg: &CodecConfig) -> Self {
        Self { width: cfg.mnemonic_width }
    }

    fn emit(&self, mnemonic: &str, operands: &str) -> String {
        let mnemonic = if mnemonic == ".word" { ".long" } else { mnemonic };
        let text = format!("  {mnemonic:<w$}{operands}", w = self.width);
        text.trim_end().to_string()
    }

    /// Render one instruction; also returns the label its branch target needs.
    pub fn render(&self, l: &DisasmLine, line_count: usize) -> (String, Option<u32>) {
        let traits = l.traits();
        if traits.contains(Traits::BRANCH) {
            let br = branch::resolve(l, line_count);
            let text = self.emit(&l.mnemonic, &branch::substitute(&l.operands, &br.operand()));
            return (text, br.in_range.then(|| br.aligned()));
        }
        let text = match rewrite::rewrite(l) {
            Some(Rewritten::Word(raw)) => self.emit(".long", &format!("0x{raw:08X}")),
            Some(Rewritten::Operands(ops)) => self.emit(&l.mnemonic, &immediate::format_operands(&ops, traits)),
            None => self.emit(&l.mnemonic, &immediate::format_operands(&l.operands, traits)),
        };
        (text, None)
    }

    /// Format a whole listing. Labels depend on the full block, so all lines
    /// are rendered first and labels merged in by instruction index after.
    pub fn format(&self, disassembly: &str) -> String {
        let lines = parse_lines(disassembly);
        let count = lines.len();

        let mut rendered = Vec::with_capacity(count);
        let mut targets = BTreeSet::new();
        for l in &lines {
            let (text, label) = self.render(l, count);
            rendered.push(text);
            targets.extend(label);
        }

        let mut out = Vec::with_capacity(count + targets.len() + 1);
        out.push(format!("{}:", label_name(0)));
        let mut pending = targets.into_iter().peekable();
        for (index, text) in rendered.into_iter().enumerate() {
            while let Some(t) = pending.next_if(|t| (t >> 2) as usize <= index) {
                out.push(format!("\n{}:", label_name(t)));
            }
            out.push(text);
        }
        out.extend(pending.map(|t| format!("\n{}:", label_name(t))));
        out.join("\n")
    }
}

pub fn format_opcodes(disassembly: &str) -> String {
    OpcodeFormatter::default().format(disassembly)
}
