use std::collections::BTreeMap;
use std::fmt;

/// A single decoded line of an Intel HEX file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub byte_count: u8,
    /// Address as encoded in the record, before the upper address offset is applied.
    pub addr: u16,
    pub kind: RecordKind,
    pub data: Vec<u8>,
    /// Parsed when present, never validated.
    pub checksum: Option<u8>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RecordKind {
    Data,
    EndOfFile,
    ExtendedSegmentAddress,
    ExtendedLinearAddress,
    Unknown(u8),
}

impl RecordKind {
    pub fn from_int(kind: u8) -> Self {
        use RecordKind::*;
        match kind {
            0 => Data,
            1 => EndOfFile,
            2 => ExtendedSegmentAddress,
            4 => ExtendedLinearAddress,
            t => Unknown(t),
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use RecordKind::*;
        match self {
            Data => write!(f, "Data"),
            EndOfFile => write!(f, "EndOfFile"),
            ExtendedSegmentAddress => write!(f, "ExtendedSegmentAddress"),
            ExtendedLinearAddress => write!(f, "ExtendedLinearAddress"),
            Unknown(kind) => write!(f, "Unknown({kind:#04x})"),
        }
    }
}

/// Sparse mapping from absolute 32-bit addresses to the byte last written there.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryMap {
    bytes: BTreeMap<u32, u8>,
}

impl MemoryMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` at `addr`, returning the value it replaced.
    pub fn insert(&mut self, addr: u32, value: u8) -> Option<u8> {
        self.bytes.insert(addr, value)
    }

    pub fn get(&self, addr: u32) -> Option<u8> {
        self.bytes.get(&addr).copied()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Lowest and highest written addresses, or `None` for an empty map.
    pub fn address_range(&self) -> Option<AddressRange> {
        let (&start, _) = self.bytes.first_key_value()?;
        let (&end, _) = self.bytes.last_key_value()?;
        Some(AddressRange { start, end })
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, u8)> + '_ {
        self.bytes.iter().map(|(&addr, &value)| (addr, value))
    }
}

impl FromIterator<(u32, u8)> for MemoryMap {
    fn from_iter<I: IntoIterator<Item = (u32, u8)>>(iter: I) -> Self {
        MemoryMap {
            bytes: iter.into_iter().collect(),
        }
    }
}

/// Inclusive address range.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AddressRange {
    pub start: u32,
    pub end: u32,
}

impl AddressRange {
    /// Number of addresses covered. Computed in 64 bits since the full
    /// 32-bit space holds 2^32 addresses.
    pub fn len(&self) -> u64 {
        u64::from(self.end) - u64::from(self.start) + 1
    }

    pub fn contains(&self, addr: u32) -> bool {
        addr >= self.start && addr <= self.end
    }
}

impl fmt::Display for AddressRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#010x}..={:#010x}", self.start, self.end)
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;

    use std::path::PathBuf;
    use std::process;
    use std::sync::OnceLock;

    static WORKSPACE_PATH: OnceLock<PathBuf> = OnceLock::new();

    pub fn test_file_path(name: &str) -> PathBuf {
        let workspace_path = WORKSPACE_PATH.get_or_init(|| {
            let output = process::Command::new(env!("CARGO"))
                .arg("locate-project")
                .arg("--workspace")
                .arg("--message-format=plain")
                .output()
                .unwrap()
                .stdout;
            let cargo_toml_path = String::from_utf8(output).unwrap();
            PathBuf::from(cargo_toml_path.trim())
                .parent()
                .unwrap()
                .to_path_buf()
        });

        let mut file_path = workspace_path.clone();
        file_path.push("test_files");
        file_path.push(name);
        file_path
    }

    #[test]
    fn record_kind_from_int() {
        assert_eq!(RecordKind::from_int(0), RecordKind::Data);
        assert_eq!(RecordKind::from_int(1), RecordKind::EndOfFile);
        assert_eq!(RecordKind::from_int(2), RecordKind::ExtendedSegmentAddress);
        assert_eq!(RecordKind::from_int(4), RecordKind::ExtendedLinearAddress);
        assert_eq!(RecordKind::from_int(3), RecordKind::Unknown(3));
        assert_eq!(RecordKind::from_int(5), RecordKind::Unknown(5));
        assert_eq!(RecordKind::from_int(0xff), RecordKind::Unknown(0xff));
    }

    #[test]
    fn later_insert_wins() {
        let mut memory = MemoryMap::new();
        assert_eq!(memory.insert(0x10, 0xaa), None);
        assert_eq!(memory.insert(0x10, 0xbb), Some(0xaa));
        assert_eq!(memory.get(0x10), Some(0xbb));
        assert_eq!(memory.len(), 1);
    }

    #[test]
    fn address_range_of_empty_map() {
        assert_eq!(MemoryMap::new().address_range(), None);
    }

    #[test]
    fn address_range_spans_min_to_max() {
        let memory: MemoryMap = [(0x300, 1), (0x20, 2), (0x1000, 3)].into_iter().collect();
        assert_eq!(
            memory.address_range(),
            Some(AddressRange { start: 0x20, end: 0x1000 })
        );
    }

    #[test]
    fn full_address_space_len_does_not_overflow() {
        let range = AddressRange { start: 0, end: u32::MAX };
        assert_eq!(range.len(), 1 << 32);
        assert!(range.contains(u32::MAX));
    }

    #[test]
    fn single_address_range_len() {
        let range = AddressRange { start: 0x42, end: 0x42 };
        assert_eq!(range.len(), 1);
        assert!(!range.contains(0x43));
        assert_eq!(range.to_string(), "0x00000042..=0x00000042");
    }
}
