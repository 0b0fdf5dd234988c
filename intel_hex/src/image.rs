use std::fmt;

use log::{error, info};

use crate::common::{AddressRange, MemoryMap};

/// Contiguous memory image. Byte `i` holds the value at `base_addr + i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    base_addr: u32,
    data: Vec<u8>,
}

impl Image {
    pub fn base_addr(&self) -> u32 {
        self.base_addr
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn range(&self) -> AddressRange {
        let last_offset = self.data.len().saturating_sub(1) as u32;
        AddressRange {
            start: self.base_addr,
            end: self.base_addr + last_offset,
        }
    }

    /// Value at an absolute address, if the address lies inside the image.
    pub fn get(&self, addr: u32) -> Option<u8> {
        let offset = addr.checked_sub(self.base_addr)?;
        self.data.get(offset as usize).copied()
    }
}

/// Lays out every byte of `memory` between its lowest and highest address,
/// filling addresses that were never written with `fill`.
pub fn materialize(memory: &MemoryMap, fill: u8) -> Result<Image> {
    let range = memory.address_range().ok_or(ImageError::Empty)?;
    let len = usize::try_from(range.len()).map_err(|_| ImageError::TooLarge { len: range.len() })?;
    info!("address range {range}, {len} bytes");

    let mut data = vec![fill; len];
    for (addr, value) in memory.iter() {
        let offset = (addr - range.start) as usize;
        match data.get_mut(offset) {
            Some(slot) => *slot = value,
            None => error!("address {addr:#010x} lies outside image range {range}"),
        }
    }

    Ok(Image {
        base_addr: range.start,
        data,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageError {
    Empty,
    /// The range does not fit in this platform's address space.
    TooLarge { len: u64 },
}

impl fmt::Display for ImageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use ImageError::*;
        match self {
            Empty => write!(f, "no bytes to lay out"),
            TooLarge { len } => write!(f, "image of {len} bytes is too large for this platform"),
        }
    }
}

impl std::error::Error for ImageError {}

pub type Result<T> = std::result::Result<T, ImageError>;
