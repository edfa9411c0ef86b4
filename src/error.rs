use crate::codetype::CodeType;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Invalid ba/po address {bapo:?}: expected 8 hex digits starting with 80, 81, 00 or 01")]
    InvalidAddressEncoding { bapo: String },
    #[error("Number of lines ({lines:#X}) must be lower than 0x100")]
    LineCountOverflow { lines: usize },
    #[error("Codetype {codetype} requires a {field} value")]
    MissingField { codetype: CodeType, field: &'static str },
    #[error("Invalid {field} value {value:?}")]
    InvalidField { field: &'static str, value: String },
}
