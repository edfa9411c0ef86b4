pub mod codetype;
pub mod config;
pub mod disasm;
pub mod error;
pub mod gecko;
pub mod report;
pub mod sanitize;
pub mod sext;
pub mod source;

pub use codetype::{Bapo, CodeType, Region};
pub use config::CodecConfig;
pub use disasm::{format_opcodes, OpcodeFormatter};
pub use error::CodecError;
pub use gecko::{construct, construct_code, deconstruct, format_rawhex, CodePacket};
pub use sanitize::sanitize;
pub use source::{prepare, Prepared};

/// Codec entry points bound to one configuration.
#[derive(Debug, Clone, Default)]
pub struct Codec {
    pub cfg: CodecConfig,
}

impl Codec {
    pub fn new(cfg: CodecConfig) -> Self {
        Self { cfg }
    }

    pub fn construct(&self, packet: &CodePacket) -> Result<String, CodecError> {
        gecko::construct(packet)
    }

    pub fn deconstruct(&self, framed: &str, c0_footer: bool) -> CodePacket {
        gecko::deconstruct(framed, c0_footer)
    }

    pub fn format_opcodes(&self, disassembly: &str) -> String {
        OpcodeFormatter::new(&self.cfg).format(disassembly)
    }

    pub fn sanitize(&self, line: &str) -> String {
        sanitize::sanitize(line)
    }

    pub fn prepare_source(&self, source: &str) -> Prepared {
        source::prepare(source, &self.cfg)
    }

    pub fn annotate_errors(&self, stderr: &str, prepared: &Prepared) -> String {
        report::annotate(stderr, &prepared.text)
    }
}
