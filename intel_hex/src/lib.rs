//! Reconstructs flat binary images from Intel HEX files.
//!
//! Conversion runs in two passes: every record is parsed into a sparse
//! [`MemoryMap`], then the map is laid out as a contiguous [`Image`] covering
//! the lowest through highest written address.
//!
//! ```
//! let image = intel_hex::convert(":0300300002337A1E\n:00000001FF\n", intel_hex::DEFAULT_FILL_BYTE)?;
//! assert_eq!(image.base_addr(), 0x30);
//! assert_eq!(image.data(), &[0x02, 0x33, 0x7a]);
//! # Ok::<(), intel_hex::ConvertError>(())
//! ```

mod common;
mod convert;
mod image;
mod parse;

pub use common::{AddressRange, MemoryMap, Record, RecordKind};
pub use convert::{convert, convert_file, convert_lines, ConvertError, DEFAULT_FILL_BYTE};
pub use image::{materialize, Image, ImageError};
pub use parse::{
    parse_lines, parse_record, parse_str, Field, InvalidHexDigit, MalformedRecord, ParseFieldError,
};
