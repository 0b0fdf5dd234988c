use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use crate::image::{self, Image, ImageError};
use crate::parse::{self, MalformedRecord};

/// Byte written into addresses no record covers.
pub const DEFAULT_FILL_BYTE: u8 = 0xff;

/// Converts the text of a Hex file into a contiguous image spanning the
/// lowest through highest written address.
pub fn convert(content: &str, fill: u8) -> Result<Image> {
    convert_lines(content.lines(), fill)
}

pub fn convert_lines<'a, I>(lines: I, fill: u8) -> Result<Image>
where
    I: IntoIterator<Item = &'a str>,
{
    let memory = parse::parse_lines(lines)?;
    if memory.is_empty() {
        return Err(ConvertError::EmptyResult);
    }

    image::materialize(&memory, fill).map_err(|e| match e {
        ImageError::Empty => ConvertError::EmptyResult,
        ImageError::TooLarge { len } => ConvertError::TooLarge { len },
    })
}

/// Reads and converts a Hex file. Bytes that are not valid UTF-8 are
/// tolerated outside of records.
pub fn convert_file<P>(path: P, fill: u8) -> Result<Image>
where
    P: AsRef<Path>,
{
    let content = fs::read(path).map_err(ConvertError::ReadFile)?;
    convert(&String::from_utf8_lossy(&content), fill)
}

#[derive(Debug)]
pub enum ConvertError {
    ReadFile(io::Error),
    MalformedRecord(MalformedRecord),
    EmptyResult,
    TooLarge { len: u64 },
}

impl From<MalformedRecord> for ConvertError {
    fn from(error: MalformedRecord) -> Self {
        ConvertError::MalformedRecord(error)
    }
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvertError::ReadFile(io_error) => write!(f, "error reading the file: {io_error}"),
            ConvertError::MalformedRecord(error) => write!(f, "{error}"),
            ConvertError::EmptyResult => write!(f, "no valid data found"),
            ConvertError::TooLarge { len } => {
                write!(f, "image of {len} bytes is too large for this platform")
            }
        }
    }
}

impl std::error::Error for ConvertError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConvertError::ReadFile(io_error) => Some(io_error),
            ConvertError::MalformedRecord(error) => Some(error),
            ConvertError::EmptyResult | ConvertError::TooLarge { .. } => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;
