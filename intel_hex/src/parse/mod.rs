use std::fmt;

use bytes::Buf;
use log::{debug, warn};

use crate::common::{MemoryMap, Record, RecordKind};

mod hex;

pub use hex::InvalidHexDigit;

const START_CODE_CHAR: u8 = b':';

/// Parses the full text of a Hex file into the bytes it writes.
pub fn parse_str(content: &str) -> Result<MemoryMap> {
    parse_lines(content.lines())
}

/// Parses Hex file lines in order, stopping at the first malformed record.
pub fn parse_lines<'a, I>(lines: I) -> Result<MemoryMap>
where
    I: IntoIterator<Item = &'a str>,
{
    let state = lines.into_iter().enumerate().try_fold(
        ParserState::default(),
        |mut state, (line_idx, line)| -> Result<ParserState> {
            state.process_line(line_idx + 1, line)?;
            Ok(state)
        },
    )?;
    Ok(state.memory)
}

/// Decodes a single line. Returns `Ok(None)` for lines that are not records:
/// blank lines and anything not starting with the start code.
pub fn parse_record(line_no: usize, line: &str) -> Result<Option<Record>> {
    let line = line.trim();
    match line.as_bytes().split_first() {
        Some((&START_CODE_CHAR, fields)) => {
            RecordParser::new(line_no, line, fields).parse().map(Some)
        }
        _ => Ok(None),
    }
}

#[derive(Debug, Default)]
struct ParserState {
    upper_addr: u32,
    memory: MemoryMap,
}

impl ParserState {
    fn process_line(&mut self, line_no: usize, line: &str) -> Result<()> {
        let Some(record) = parse_record(line_no, line)? else {
            return Ok(());
        };
        debug!(
            "line {line_no}: {} record, address {:#06x}, {} bytes",
            record.kind, record.addr, record.byte_count
        );

        match record.kind {
            RecordKind::Data => self.store_data(&record),
            // Records after the EOF record are still processed.
            RecordKind::EndOfFile => {}
            RecordKind::ExtendedSegmentAddress => {
                let segment = extended_address(line_no, line, &record)?;
                self.upper_addr = u32::from(segment) * 16;
            }
            RecordKind::ExtendedLinearAddress => {
                let upper = extended_address(line_no, line, &record)?;
                self.upper_addr = u32::from(upper) << 16;
            }
            RecordKind::Unknown(kind) => {
                warn!("line {line_no}: ignoring record with unknown type {kind:#04x}");
            }
        }
        Ok(())
    }

    fn store_data(&mut self, record: &Record) {
        let base_addr = self.upper_addr.wrapping_add(u32::from(record.addr));
        for (offset, &value) in (0u32..).zip(&record.data) {
            self.memory.insert(base_addr.wrapping_add(offset), value);
        }
    }
}

fn extended_address(line_no: usize, line: &str, record: &Record) -> Result<u16> {
    if record.data.len() < 2 {
        return Err(malformed_record(
            line_no,
            line,
            Field::Data,
            ParseFieldError::AddressTooShort,
        ));
    }
    Ok(record.data.as_slice().get_u16())
}

struct RecordParser<'a> {
    line_no: usize,
    line: &'a str,
    cursor: &'a [u8],
}

impl<'a> RecordParser<'a> {
    fn new(line_no: usize, line: &'a str, fields: &'a [u8]) -> Self {
        RecordParser {
            line_no,
            line,
            cursor: fields,
        }
    }

    fn parse(&mut self) -> Result<Record> {
        let byte_count = self
            .parse_field(Field::ByteCount, size_of_field(ConstantSizeField::ByteCount))?
            .as_slice()
            .get_u8();
        let addr = self
            .parse_field(Field::Address, size_of_field(ConstantSizeField::Address))?
            .as_slice()
            .get_u16();
        let kind = self
            .parse_field(Field::Type, size_of_field(ConstantSizeField::Type))?
            .as_slice()
            .get_u8();
        let data = self.parse_field(Field::Data, byte_count as usize * 2)?;
        let checksum = self.parse_checksum()?;

        Ok(Record {
            byte_count,
            addr,
            kind: RecordKind::from_int(kind),
            data,
            checksum,
        })
    }

    fn parse_checksum(&mut self) -> Result<Option<u8>> {
        if self.cursor.is_empty() {
            return Ok(None);
        }
        let field_size = size_of_field(ConstantSizeField::Checksum);
        let field_bytes = self.parse_field(Field::Checksum, field_size)?;
        Ok(Some(field_bytes.as_slice().get_u8()))
    }

    fn parse_field(&mut self, field: Field, field_size: usize) -> Result<Vec<u8>> {
        self.check_space_for_field(field, field_size)?;
        let hex_string = &self.cursor[..field_size];
        self.cursor = &self.cursor[field_size..];
        hex::hex_string_to_bytes(hex_string)
            .map_err(|e| self.error(field, ParseFieldError::InvalidHex(e)))
    }

    fn check_space_for_field(&self, field: Field, field_size: usize) -> Result<()> {
        if self.cursor.len() >= field_size {
            Ok(())
        } else if self.cursor.is_empty() {
            Err(self.error(field, ParseFieldError::Missing))
        } else {
            Err(self.error(field, ParseFieldError::Incomplete))
        }
    }

    fn error(&self, field: Field, kind: ParseFieldError) -> MalformedRecord {
        malformed_record(self.line_no, self.line, field, kind)
    }
}

fn malformed_record(line_no: usize, line: &str, field: Field, kind: ParseFieldError) -> MalformedRecord {
    MalformedRecord {
        line_no,
        line: line.trim().to_string(),
        field,
        kind,
    }
}

/// A line starting with the start code that could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedRecord {
    pub line_no: usize,
    pub line: String,
    pub field: Field,
    pub kind: ParseFieldError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseFieldError {
    Missing,
    Incomplete,
    InvalidHex(InvalidHexDigit),
    /// Extended address records carry a 16-bit value.
    AddressTooShort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    ByteCount,
    Address,
    Type,
    Data,
    Checksum,
}

enum ConstantSizeField {
    ByteCount,
    Address,
    Type,
    Checksum,
}

fn size_of_field(field: ConstantSizeField) -> usize {
    use ConstantSizeField::*;
    match field {
        ByteCount => 2,
        Address => 4,
        Type => 2,
        Checksum => 2,
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Field::*;
        match self {
            ByteCount => write!(f, "ByteCount"),
            Address => write!(f, "Address"),
            Type => write!(f, "Type"),
            Data => write!(f, "Data"),
            Checksum => write!(f, "Checksum"),
        }
    }
}

impl fmt::Display for MalformedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "malformed record on line {} \"{}\": failed to parse {} field: ",
            self.line_no, self.line, self.field
        )?;
        use ParseFieldError::*;
        match &self.kind {
            Missing => write!(f, "field missing"),
            Incomplete => write!(f, "field incomplete"),
            InvalidHex(error) => write!(f, "{error}"),
            AddressTooShort => write!(f, "extended address needs 2 bytes"),
        }
    }
}

impl std::error::Error for MalformedRecord {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            ParseFieldError::InvalidHex(error) => Some(error),
            _ => None,
        }
    }
}

type Result<T> = std::result::Result<T, MalformedRecord>;
