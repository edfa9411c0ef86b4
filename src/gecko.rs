//! Gecko code framing: wraps raw instruction hex in the header/footer layout
//! of a codetype and recovers the payload and parameters from a framed code.
//!
//! Payload text is "raw hex": uppercase 8-digit words, two per line, one
//! space between the words of a line. Any whitespace layout is accepted on
//! input; output is always in that canonical layout.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::codetype::{classify, Bapo, CodeType, Footer, Header, Layout, FOOTERS};
use crate::error::CodecError;

/// Canonical exchange form between framing and the external toolchain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodePacket {
    pub payload: String,
    pub codetype: CodeType,
    pub bapo: Option<Bapo>,
    pub xor: Option<u16>,
    pub checksum: Option<u8>,
}

impl CodePacket {
    pub fn raw(payload: impl Into<String>) -> Self {
        Self { payload: payload.into(), codetype: CodeType::Raw, bapo: None, xor: None, checksum: None }
    }

    pub fn new(payload: impl Into<String>, codetype: CodeType) -> Self {
        Self { codetype, ..Self::raw(payload) }
    }

    pub fn with_bapo(mut self, bapo: Bapo) -> Self {
        self.bapo = Some(bapo);
        self
    }

    pub fn with_guard(mut self, checksum: u8, xor: u16) -> Self {
        self.checksum = Some(checksum);
        self.xor = Some(xor);
        self
    }

    /// Payload bytes, ready to hand to an external disassembler.
    pub fn payload_bytes(&self) -> Result<Vec<u8>, hex::FromHexError> {
        hex::decode(compact(&self.payload))
    }
}

fn compact(text: &str) -> String {
    text.split_whitespace().collect()
}

fn is_hex(text: &str) -> bool {
    !text.is_empty() && text.len() % 2 == 0 && text.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Split compact hex into 8-digit words; the last one may be short.
fn words_of(hex: &str) -> Vec<String> {
    hex.as_bytes()
        .chunks(8)
        .map(|c| String::from_utf8_lossy(c).to_ascii_uppercase())
        .collect()
}

/// Lay words out two per line.
fn layout_words<S: AsRef<str>>(words: &[S]) -> String {
    words
        .chunks(2)
        .map(|pair| pair.iter().map(|w| w.as_ref()).collect::<Vec<_>>().join(" "))
        .collect::<Vec<_>>()
        .join("\n")
}

fn pad_to(mut hex: String, multiple: usize) -> String {
    let rem = hex.len() % multiple;
    if rem != 0 {
        hex.extend(std::iter::repeat('0').take(multiple - rem));
    }
    hex
}

/// Canonical raw hex for a run of bytes (e.g. objcopy output).
pub fn format_rawhex(bytes: &[u8]) -> String {
    layout_words(&words_of(&hex::encode_upper(bytes)))
}

/// Re-lay arbitrary whitespace-separated hex in canonical form. Returns
/// `None` when the text is not hex.
pub fn normalize_rawhex(text: &str) -> Option<String> {
    let hex = compact(text);
    is_hex(&hex).then(|| layout_words(&words_of(&hex)))
}

/// String-level entry point: parses the optional ba/po, xor and checksum
/// fields and frames `payload` as `codetype`.
pub fn construct_code(
    payload: &str,
    bapo: Option<&str>,
    xor: Option<&str>,
    checksum: Option<&str>,
    codetype: CodeType,
) -> Result<String, CodecError> {
    let mut packet = CodePacket::new(payload, codetype);
    if let Some(b) = bapo {
        packet.bapo = Some(b.parse()?);
    }
    if let Some(x) = xor {
        packet.xor = Some(parse_fixed_hex(x, 4, "xor")? as u16);
    }
    if let Some(c) = checksum {
        packet.checksum = Some(parse_fixed_hex(c, 2, "checksum")? as u8);
    }
    construct(&packet)
}

fn parse_fixed_hex(text: &str, digits: usize, field: &'static str) -> Result<u32, CodecError> {
    let t = text.trim();
    let bad = || CodecError::InvalidField { field, value: text.to_string() };
    if t.len() != digits {
        return Err(bad());
    }
    u32::from_str_radix(t, 16).map_err(|_| bad())
}

/// Frame the packet's payload as its codetype.
///
/// A payload that is not hex comes back unchanged so partial assembler
/// output stays visible; bad frame parameters are errors.
pub fn construct(packet: &CodePacket) -> Result<String, CodecError> {
    let Some(layout) = packet.codetype.layout() else {
        return Ok(packet.payload.clone());
    };

    let hex = compact(&packet.payload);
    if !is_hex(&hex) {
        warn!(codetype = %packet.codetype, "payload is not hex, leaving it unframed");
        return Ok(packet.payload.clone());
    }

    let bapo = match (packet.bapo, packet.codetype.needs_bapo()) {
        (Some(b), _) => Some(b),
        (None, true) => return Err(CodecError::MissingField { codetype: packet.codetype, field: "bapo" }),
        (None, false) => None,
    };
    let nbytes = hex.len() / 2;

    let framed = match layout.header {
        Header::PerWord => {
            let bapo = required(bapo, packet.codetype)?;
            let tb = bapo.type_byte(layout);
            words_of(&pad_to(hex, 8))
                .iter()
                .enumerate()
                .map(|(i, w)| {
                    let addr = bapo.address.wrapping_add(4 * i as u32) & 0xFF_FFFF;
                    format!("{tb:02X}{addr:06X} {w}")
                })
                .collect::<Vec<_>>()
                .join("\n")
        }
        Header::ByteCount => {
            let bapo = required(bapo, packet.codetype)?;
            let header = format!("{:02X}{:06X} {nbytes:08X}", bapo.type_byte(layout), bapo.address);
            let body = layout_words(&words_of(&pad_to(hex, 16)));
            format!("{header}\n{body}")
        }
        Header::Subroutine | Header::LineCount | Header::Checksummed => {
            let body = terminate(words_of(&pad_to(hex, 8)), layout);
            let lines = body.len() / 2;
            let header = insert_header(packet, layout, bapo, lines)?;
            format!("{header}\n{}", layout_words(&body))
        }
    };
    debug!(codetype = %packet.codetype, bytes = nbytes, "framed payload");
    Ok(framed)
}

fn required(bapo: Option<Bapo>, codetype: CodeType) -> Result<Bapo, CodecError> {
    bapo.ok_or(CodecError::MissingField { codetype, field: "bapo" })
}

/// Append the codetype's footer so the body fills whole lines.
fn terminate(mut body: Vec<String>, layout: &Layout) -> Vec<String> {
    if let Some(footer) = layout.footer {
        if body.len() % 2 == 1 {
            body.push(footer.pad.to_string());
        } else {
            body.extend(footer.words.iter().map(|w| w.to_string()));
        }
    }
    body
}

fn insert_header(packet: &CodePacket, layout: &Layout, bapo: Option<Bapo>, lines: usize) -> Result<String, CodecError> {
    match layout.header {
        Header::Subroutine => Ok(format!("C0000000 {lines:08X}")),
        Header::LineCount => {
            let bapo = required(bapo, packet.codetype)?;
            Ok(format!("{:02X}{:06X} {lines:08X}", bapo.type_byte(layout), bapo.address))
        }
        _ => {
            let bapo = required(bapo, packet.codetype)?;
            if lines > 0xFF {
                return Err(CodecError::LineCountOverflow { lines });
            }
            let checksum = packet.checksum.ok_or(CodecError::MissingField { codetype: packet.codetype, field: "checksum" })?;
            let xor = packet.xor.ok_or(CodecError::MissingField { codetype: packet.codetype, field: "xor" })?;
            Ok(format!("{:02X}{:06X} {checksum:02X}{xor:04X}{lines:02X}", bapo.type_byte(layout), bapo.address))
        }
    }
}

/// Recover payload and parameters from a framed code.
///
/// Text whose leading type byte is not in the prefix table is taken to be a
/// raw payload already. `c0_footer` says whether a C0 frame ends with the
/// return footer [`construct`] appends; when set the whole footer is
/// stripped, otherwise only the final word is and the `blr` stays.
///
/// Either footer signature (`4E800020 00000000` or `60000000 00000000`) is
/// stripped from C0 and insert frames alike. The frame does not record
/// whether the last line was padded, so an insert payload of odd length
/// whose last word is `60000000` or `4E800020` comes back one word short
/// (`60000000` framed as C2 comes back empty).
pub fn deconstruct(framed: &str, c0_footer: bool) -> CodePacket {
    let hex = compact(framed);
    if hex.is_empty() || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        warn!("code has non-hex characters, treating it as raw");
        return CodePacket::raw(framed);
    }
    let Ok(type_byte) = u8::from_str_radix(&hex[..hex.len().min(2)], 16) else {
        return CodePacket::raw(framed);
    };
    let Some((layout, addr)) = classify(type_byte) else {
        return CodePacket::raw(framed);
    };
    if hex.len() % 8 != 0 || hex.len() < 16 {
        debug!(len = hex.len(), "frame is not whole header+words, treating it as raw");
        return CodePacket::raw(framed);
    }

    let words = words_of(&hex);
    let word = |i: usize| u32::from_str_radix(&words[i], 16).unwrap_or(0);
    let bapo = addr.map(|(region, high)| Bapo::new(region, high, word(0)));
    let mut packet = CodePacket { bapo, ..CodePacket::new(String::new(), layout.codetype) };

    match layout.header {
        Header::PerWord => {
            let values: Vec<&String> = words.iter().skip(1).step_by(2).collect();
            packet.payload = layout_words(&values);
        }
        Header::ByteCount => {
            let nbytes = word(1) as usize;
            let body: String = words[2..].concat();
            let take = (nbytes * 2).min(body.len());
            if take < nbytes * 2 {
                warn!(nbytes, available = body.len() / 2, "byte-run frame is shorter than its header says");
            }
            packet.payload = layout_words(&words_of(&body[..take]));
        }
        Header::Subroutine | Header::LineCount | Header::Checksummed => {
            let count = if layout.header == Header::Checksummed { word(1) & 0xFF } else { word(1) };
            let declared = count as usize;
            let mut body = words[2..].to_vec();
            if declared * 2 != body.len() {
                warn!(declared, found = body.len().div_ceil(2), "line count does not match frame body");
            }
            if layout.header == Header::Checksummed {
                packet.checksum = u8::from_str_radix(&words[1][..2], 16).ok();
                packet.xor = u16::from_str_radix(&words[1][2..6], 16).ok();
            }
            if let Some(footer) = layout.footer {
                let full = layout.header != Header::Subroutine || c0_footer;
                strip_footer(&mut body, footer, full);
            }
            packet.payload = layout_words(&body);
        }
    }
    packet
}

fn strip_footer(body: &mut Vec<String>, footer: Footer, full: bool) {
    let n = body.len();
    let ends_with = |f: &Footer| n >= 2 && body[n - 2] == f.words[0] && body[n - 1] == f.words[1];
    if full && FOOTERS.iter().any(ends_with) {
        body.truncate(n - 2);
    } else if body.last().is_some_and(|w| w == footer.pad || (!full && w == footer.words[1])) {
        body.pop();
    }
}
