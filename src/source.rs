//! Preparation of user assembly for the external assembler.

use tracing::debug;

use crate::config::CodecConfig;
use crate::sanitize::sanitize;

/// Number of lines [`prepare`] puts ahead of the user's code.
pub const HEADER_LINES: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prepared {
    pub text: String,
    /// Address taken from a leading `#inject(0x........)` line
    pub inject: Option<u32>,
}

impl Prepared {
    pub fn inject_or(&self, cfg: &CodecConfig) -> u32 {
        self.inject.unwrap_or(cfg.default_inject)
    }
}

/// `#inject(0x80001234)` at the start of a line.
pub fn parse_inject(line: &str) -> Option<u32> {
    let digits = line.strip_prefix("#inject(0x")?;
    let (hex, rest) = (digits.get(..8)?, digits.get(8..)?);
    if !rest.starts_with(')') || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}

/// Drop blank lines and any stale include of the helper file, sanitize
/// each line, and put the include plus the INJECTADDR definition on top.
pub fn prepare(source: &str, cfg: &CodecConfig) -> Prepared {
    let include = cfg.include_line();
    let mut body: Vec<String> = Vec::new();
    let mut inject = None;
    for raw in source.lines() {
        if raw.contains(&include) {
            continue;
        }
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        if body.is_empty() {
            inject = parse_inject(line);
        }
        body.push(sanitize(line));
    }
    let addr = inject.unwrap_or(cfg.default_inject);
    debug!(lines = body.len(), inject = format_args!("{addr:#010X}"), "prepared assembler input");
    let text = format!("{include}\n.set INJECTADDR, 0x{addr:08X}\n\n{}\n", body.join("\n"));
    Prepared { text, inject }
}
