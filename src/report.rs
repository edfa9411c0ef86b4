//! Annotates external assembler/linker diagnostics with the source line
//! they point at.

use crate::sanitize::split;
use crate::source::HEADER_LINES;

/// Draw a dashed box around `text`.
pub fn enclose(text: &str) -> String {
    let bar = "-".repeat(text.chars().count() + 2);
    format!("{bar}\n|{text}|\n{bar}")
}

/// `file.s:12: Error: msg` -> (12, "Error: msg")
fn assembler_message(line: &str) -> Option<(usize, &str)> {
    let at = line.find(": Error:").or_else(|| line.find(": Warning:"))?;
    let (_, num) = line[..at].rsplit_once(':')?;
    Some((num.trim().parse().ok()?, &line[at + 2..]))
}

/// `... (.text+0x1c): msg` -> (0x1c, "msg")
fn linker_message(line: &str) -> Option<(u32, &str)> {
    let start = line.find("(.text+")? + "(.text+".len();
    let close = start + line[start..].find(')')?;
    let off = line[start..close].trim_start_matches("0x").trim_start_matches("0X");
    let msg = line[close + 1..].trim_start_matches(':').trim();
    Some((u32::from_str_radix(off, 16).ok()?, msg))
}

/// Rewrite diagnostics for a prepared source (see [`crate::source::prepare`]).
/// Assembler messages carry 1-based line numbers into `prepared`; linker
/// messages carry `.text` offsets, which map to the n-th instruction line.
/// Lines that match neither form are dropped.
pub fn annotate(stderr: &str, prepared: &str) -> String {
    let lines: Vec<&str> = prepared.lines().collect();
    let instructions: Vec<&str> = lines
        .iter()
        .skip(HEADER_LINES)
        .copied()
        .filter(|l| split(l).mnemonic.is_some())
        .collect();

    let mut out = String::new();
    for diag in stderr.lines() {
        if let Some((num, msg)) = assembler_message(diag) {
            let instr = lines.get(num.wrapping_sub(1)).map_or("", |l| l.trim_start());
            out.push_str(&format!("{}\n ^{num}: {msg}\n\n", enclose(instr)));
        } else if let Some((off, msg)) = linker_message(diag) {
            let index = (off >> 2) as usize;
            let instr = instructions.get(index).map_or("", |l| l.trim_start());
            out.push_str(&format!("{}\n ^{index}: Error: {msg}\n\n", enclose(instr)));
        }
    }
    out
}
