use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CodecError;

/// Gecko code framings understood by the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CodeType {
    /// No framing: the payload is passed through as-is
    Raw,
    /// 04/14: one 32-bit write per payload word
    Write32,
    /// 06/16: byte-run write
    WriteString,
    /// C0: execute the payload as a subroutine
    Execute,
    /// C2/D2: insert the payload at an address hook
    Insert,
    /// C4/D4: insert with a branch-and-link hook
    InsertLink,
    /// F2/F4: checksum-guarded insert
    InsertXor,
}

impl CodeType {
    pub const ALL: [CodeType; 7] = [
        CodeType::Raw,
        CodeType::Write32,
        CodeType::WriteString,
        CodeType::Execute,
        CodeType::Insert,
        CodeType::InsertLink,
        CodeType::InsertXor,
    ];

    pub fn layout(self) -> Option<&'static Layout> {
        LAYOUTS.iter().find(|l| l.codetype == self)
    }

    /// Whether frames of this type carry a ba/po address.
    pub fn needs_bapo(self) -> bool {
        !matches!(self, CodeType::Raw | CodeType::Execute)
    }

    pub fn needs_checksum(self) -> bool {
        self == CodeType::InsertXor
    }
}

impl fmt::Display for CodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CodeType::Raw => "RAW",
            CodeType::Write32 => "04/14",
            CodeType::WriteString => "06/16",
            CodeType::Execute => "C0",
            CodeType::Insert => "C2/D2",
            CodeType::InsertLink => "C4/D4",
            CodeType::InsertXor => "F2/F4",
        };
        f.write_str(s)
    }
}

impl FromStr for CodeType {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s.chars().filter(|c| *c != '/').collect::<String>().to_ascii_uppercase();
        match key.as_str() {
            "RAW" => Ok(CodeType::Raw),
            "04" | "0414" => Ok(CodeType::Write32),
            "06" | "0616" => Ok(CodeType::WriteString),
            "C0" => Ok(CodeType::Execute),
            "C2" | "C2D2" => Ok(CodeType::Insert),
            "C4" | "C4D4" => Ok(CodeType::InsertLink),
            "F2" | "F2F4" => Ok(CodeType::InsertXor),
            _ => Err(CodecError::InvalidField { field: "codetype", value: s.to_string() }),
        }
    }
}

/// How the header of a frame is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Header {
    /// `TTAAAAAA WWWWWWWW` repeated for every payload word
    PerWord,
    /// `TTAAAAAA NNNNNNNN` with N the payload byte count
    ByteCount,
    /// `C0000000 NNNNNNNN` with N the body line count
    Subroutine,
    /// `TTAAAAAA NNNNNNNN` with N the body line count
    LineCount,
    /// `TTAAAAAA CCXXXXNN`: checksum, xor, one-byte line count
    Checksummed,
}

/// Encode/decode table entry for one framed codetype.
#[derive(Debug, Clone, Copy)]
pub struct Layout {
    pub codetype: CodeType,
    /// Type byte for a ba (`8x......`) address
    pub ba: u8,
    /// Type byte for a po (`0x......`) address
    pub po: u8,
    pub header: Header,
    pub footer: Option<Footer>,
}

/// Terminator appended to a frame body: `words` after a complete line,
/// `pad` alone when the body ends mid-line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Footer {
    pub words: [&'static str; 2],
    pub pad: &'static str,
}

/// C0 bodies must return; a lone pad word is another `blr`. So payload
/// `4E800020` frames as `4E800020 4E800020`, not `4E800020 00000000`: a
/// zero pad would make an odd payload ending in `blr` frame the same as the
/// even payload without it, and the frame could not be taken apart again.
pub const EXEC_FOOTER: Footer = Footer { words: ["4E800020", "00000000"], pad: "4E800020" };
/// The loader writes the branch back over the closing zero word.
pub const INSERT_FOOTER: Footer = Footer { words: ["60000000", "00000000"], pad: "00000000" };

/// Footer signatures accepted when taking any C0 or insert frame apart.
pub const FOOTERS: [Footer; 2] = [EXEC_FOOTER, INSERT_FOOTER];

pub static LAYOUTS: &[Layout] = &[
    Layout { codetype: CodeType::Write32, ba: 0x04, po: 0x14, header: Header::PerWord, footer: None },
    Layout { codetype: CodeType::WriteString, ba: 0x06, po: 0x16, header: Header::ByteCount, footer: None },
    Layout { codetype: CodeType::Execute, ba: 0xC0, po: 0xC0, header: Header::Subroutine, footer: Some(EXEC_FOOTER) },
    Layout { codetype: CodeType::Insert, ba: 0xC2, po: 0xD2, header: Header::LineCount, footer: Some(INSERT_FOOTER) },
    Layout { codetype: CodeType::InsertLink, ba: 0xC4, po: 0xD4, header: Header::LineCount, footer: Some(INSERT_FOOTER) },
    Layout { codetype: CodeType::InsertXor, ba: 0xF2, po: 0xF4, header: Header::Checksummed, footer: Some(INSERT_FOOTER) },
];

/// Look up the layout owning a frame's leading type byte. Returns the
/// address half the byte encodes alongside it; `None` means the text is not
/// a recognized frame.
pub fn classify(type_byte: u8) -> Option<(&'static Layout, Option<(Region, bool)>)> {
    if type_byte == 0xC0 {
        return CodeType::Execute.layout().map(|l| (l, None));
    }
    let high = type_byte & 1 == 1;
    let even = type_byte & !1;
    LAYOUTS.iter().filter(|l| l.header != Header::Subroutine).find_map(|l| {
        if even == l.ba {
            Some((l, Some((Region::Base, high))))
        } else if even == l.po {
            Some((l, Some((Region::Pointer, high))))
        } else {
            None
        }
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    /// `8.......`: address relative to the base address register
    Base,
    /// `0.......`: address relative to the pointer register
    Pointer,
}

/// The 8-digit ba/po field: region digit, sub-type bit, 24-bit address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Bapo {
    pub region: Region,
    /// Low bit of the second digit, folded into the type byte
    pub high: bool,
    pub address: u32,
}

impl Bapo {
    pub fn new(region: Region, high: bool, address: u32) -> Self {
        Self { region, high, address: address & 0xFF_FFFF }
    }

    pub fn type_byte(&self, layout: &Layout) -> u8 {
        let base = match self.region {
            Region::Base => layout.ba,
            Region::Pointer => layout.po,
        };
        base | self.high as u8
    }
}

impl FromStr for Bapo {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || CodecError::InvalidAddressEncoding { bapo: s.to_string() };
        let t = s.trim();
        if t.len() != 8 || !t.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(bad());
        }
        let b = t.as_bytes();
        let region = match b[0] {
            b'8' => Region::Base,
            b'0' => Region::Pointer,
            _ => return Err(bad()),
        };
        let high = match b[1] {
            b'0' => false,
            b'1' => true,
            _ => return Err(bad()),
        };
        let address = u32::from_str_radix(&t[2..], 16).map_err(|_| bad())?;
        Ok(Bapo { region, high, address })
    }
}

impl fmt::Display for Bapo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let region = match self.region {
            Region::Base => '8',
            Region::Pointer => '0',
        };
        write!(f, "{region}{}{:06X}", self.high as u8, self.address)
    }
}

impl TryFrom<String> for Bapo {
    type Error = CodecError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Bapo> for String {
    fn from(value: Bapo) -> Self {
        value.to_string()
    }
}
