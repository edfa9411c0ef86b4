use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// File named by the `.include` line injected ahead of assembler input
    pub include_path: String,
    /// INJECTADDR used when the source has no `#inject(0x........)` line
    pub default_inject: u32,
    /// Column width mnemonics are padded to in formatted disassembly
    pub mnemonic_width: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            include_path: "__includes.s".into(),
            default_inject: 0x8000_0000,
            mnemonic_width: 10,
        }
    }
}

impl CodecConfig {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// The `.include` directive as it appears in prepared assembler input.
    pub fn include_line(&self) -> String {
        format!(".include \"{}\"", self.include_path.replace('\\', "/"))
    }
}
