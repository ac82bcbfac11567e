use super::consts::*;
use crate::common::binary::{self, BinaryError};
use std::io::{self, Read, Seek, SeekFrom};
use zerocopy::{FromBytes, LE, U16, U32, U64};
use zerocopy_derive::FromBytes as DeriveFromBytes;

/// Raw directory entry as stored on disk (128 bytes)
#[derive(Debug, Clone, DeriveFromBytes)]
#[repr(C)]
struct RawDirectoryEntry {
    /// Entry name in UTF-16LE (64 bytes, null-padded)
    name: [u8; 64],
    /// Length of name in bytes (including null terminator)
    name_len: U16<LE>,
    /// Entry type (1 = storage, 2 = stream, 5 = root)
    entry_type: u8,
    /// Node color (0 = red, 1 = black)
    node_color: u8,
    sid_left: U32<LE>,
    sid_right: U32<LE>,
    sid_child: U32<LE>,
    clsid: [u8; 16],
    state_bits: U32<LE>,
    creation_time: U64<LE>,
    modified_time: U64<LE>,
    start_sector: U32<LE>,
    stream_size: U64<LE>,
}

/// Read-only view of an OLE2 compound file.
///
/// The FAT, MiniFAT and directory are loaded eagerly by [`OleFile::open`];
/// stream contents are read on demand.
#[derive(Debug)]
pub struct OleFile<R: Read + Seek> {
    reader: R,
    sector_size: usize,
    mini_stream_cutoff: u32,
    fat: Vec<u32>,
    minifat: Vec<u32>,
    /// All directory entries indexed by SID; unused slots are `None`
    entries: Vec<Option<DirectoryEntry>>,
    /// Mini stream data (loaded on first small-stream read)
    ministream: Option<Vec<u8>>,
}

/// An OLE directory entry (stream or storage)
#[derive(Debug, Clone)]
pub struct DirectoryEntry {
    /// Storage ID (index in directory)
    pub sid: u32,
    /// Entry name
    pub name: String,
    /// Entry type (`STGTY_*`)
    pub entry_type: u8,
    pub sid_left: u32,
    pub sid_right: u32,
    pub sid_child: u32,
    /// Raw CLSID bytes
    pub clsid: [u8; 16],
    /// First sector of the stream
    pub start_sector: u32,
    /// Size of the stream in bytes
    pub size: u64,
}

impl DirectoryEntry {
    pub fn is_stream(&self) -> bool {
        self.entry_type == STGTY_STREAM
    }

    pub fn is_storage(&self) -> bool {
        self.entry_type == STGTY_STORAGE || self.entry_type == STGTY_ROOT
    }
}

/// Error types for compound file parsing and writing
#[derive(Debug)]
pub enum OleError {
    Io(io::Error),
    InvalidFormat(String),
    InvalidData(String),
    NotOleFile,
    CorruptedFile(String),
    StreamNotFound(String),
}

impl From<io::Error> for OleError {
    fn from(err: io::Error) -> Self {
        OleError::Io(err)
    }
}

impl From<BinaryError> for OleError {
    fn from(err: BinaryError) -> Self {
        OleError::InvalidData(err.to_string())
    }
}

impl std::fmt::Display for OleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OleError::Io(e) => write!(f, "IO error: {}", e),
            OleError::InvalidFormat(s) => write!(f, "Invalid format: {}", s),
            OleError::InvalidData(s) => write!(f, "Invalid data: {}", s),
            OleError::NotOleFile => write!(f, "Not an OLE file"),
            OleError::CorruptedFile(s) => write!(f, "Corrupted file: {}", s),
            OleError::StreamNotFound(s) => write!(f, "Stream not found: {}", s),
        }
    }
}

impl std::error::Error for OleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OleError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl<R: Read + Seek> OleFile<R> {
    /// Open and parse a compound file from a reader.
    pub fn open(mut reader: R) -> Result<Self, OleError> {
        let file_size = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(0))?;

        if file_size < MINIMAL_OLEFILE_SIZE as u64 {
            return Err(OleError::NotOleFile);
        }

        let mut header = [0u8; 512];
        reader.read_exact(&mut header)?;
        if &header[0..8] != MAGIC {
            return Err(OleError::NotOleFile);
        }

        let dll_version = binary::read_u16_le(&header, 0x1A)?;
        let byte_order = binary::read_u16_le(&header, 0x1C)?;
        let sector_shift = binary::read_u16_le(&header, 0x1E)?;
        let first_dir_sector = binary::read_u32_le(&header, 0x30)?;
        let mini_stream_cutoff = binary::read_u32_le(&header, 0x38)?;
        let first_minifat_sector = binary::read_u32_le(&header, 0x3C)?;
        let num_minifat_sectors = binary::read_u32_le(&header, 0x40)?;
        let first_difat_sector = binary::read_u32_le(&header, 0x44)?;
        let num_difat_sectors = binary::read_u32_le(&header, 0x48)?;

        if byte_order != 0xFFFE {
            return Err(OleError::InvalidFormat("Invalid byte order".to_string()));
        }

        let sector_size = match (dll_version, sector_shift) {
            (3, 9) => SECTOR_SIZE_V3,
            (4, 12) => SECTOR_SIZE_V4,
            _ => {
                return Err(OleError::InvalidFormat(format!(
                    "Unsupported version {} with sector shift {}",
                    dll_version, sector_shift
                )));
            },
        };

        let mut ole = OleFile {
            reader,
            sector_size,
            mini_stream_cutoff,
            fat: Vec::new(),
            minifat: Vec::new(),
            entries: Vec::new(),
            ministream: None,
        };

        ole.load_fat(&header, first_difat_sector, num_difat_sectors)?;
        ole.load_directory(first_dir_sector)?;
        if num_minifat_sectors > 0 && first_minifat_sector != ENDOFCHAIN {
            ole.load_minifat(first_minifat_sector)?;
        }

        Ok(ole)
    }

    /// Load the FAT from the header DIFAT slots and any DIFAT sectors.
    fn load_fat(
        &mut self,
        header: &[u8; 512],
        first_difat_sector: u32,
        num_difat_sectors: u32,
    ) -> Result<(), OleError> {
        let mut fat_sectors = Vec::new();
        for i in 0..HEADER_DIFAT_ENTRIES {
            let sector = binary::read_u32_le(header, 0x4C + i * 4)?;
            if sector > MAXREGSECT {
                break;
            }
            fat_sectors.push(sector);
        }

        let ids_per_difat = self.sector_size / 4 - 1;
        let mut difat_sector = first_difat_sector;
        for _ in 0..num_difat_sectors {
            if difat_sector > MAXREGSECT {
                break;
            }
            let data = self.read_sector(difat_sector)?;
            for i in 0..ids_per_difat {
                let sector = binary::read_u32_le(&data, i * 4)?;
                if sector > MAXREGSECT {
                    break;
                }
                fat_sectors.push(sector);
            }
            difat_sector = binary::read_u32_le(&data, ids_per_difat * 4)?;
        }

        let entries_per_sector = self.sector_size / 4;
        self.fat.reserve(fat_sectors.len() * entries_per_sector);
        for sector_id in fat_sectors {
            let data = self.read_sector(sector_id)?;
            for i in 0..entries_per_sector {
                self.fat.push(binary::read_u32_le(&data, i * 4)?);
            }
        }

        Ok(())
    }

    fn load_minifat(&mut self, first_minifat_sector: u32) -> Result<(), OleError> {
        let data = self.read_chain(first_minifat_sector)?;
        self.minifat = data
            .chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        Ok(())
    }

    fn load_directory(&mut self, first_dir_sector: u32) -> Result<(), OleError> {
        let data = self.read_chain(first_dir_sector)?;
        let count = data.len() / DIRENTRY_SIZE;
        if count == 0 {
            return Err(OleError::CorruptedFile("Empty directory".to_string()));
        }

        self.entries = Vec::with_capacity(count);
        for sid in 0..count {
            let raw_bytes = &data[sid * DIRENTRY_SIZE..(sid + 1) * DIRENTRY_SIZE];
            let raw = RawDirectoryEntry::read_from_bytes(raw_bytes).map_err(|_| {
                OleError::InvalidFormat("Failed to parse directory entry".to_string())
            })?;
            if raw.entry_type == STGTY_EMPTY {
                self.entries.push(None);
                continue;
            }
            self.entries.push(Some(self.decode_entry(&raw, sid as u32)));
        }

        match self.entries.first() {
            Some(Some(root)) if root.entry_type == STGTY_ROOT => Ok(()),
            _ => Err(OleError::CorruptedFile("Missing root entry".to_string())),
        }
    }

    fn decode_entry(&self, raw: &RawDirectoryEntry, sid: u32) -> DirectoryEntry {
        let name_len = (raw.name_len.get() as usize).saturating_sub(2).min(64);
        let name = binary::decode_utf16le(&raw.name[..name_len])
            .trim_end_matches('\0')
            .to_string();

        // Version 3 files only define the low 32 bits of the size
        let size = if self.sector_size == SECTOR_SIZE_V3 {
            raw.stream_size.get() & 0xFFFF_FFFF
        } else {
            raw.stream_size.get()
        };

        DirectoryEntry {
            sid,
            name,
            entry_type: raw.entry_type,
            sid_left: raw.sid_left.get(),
            sid_right: raw.sid_right.get(),
            sid_child: raw.sid_child.get(),
            clsid: raw.clsid,
            start_sector: raw.start_sector.get(),
            size,
        }
    }

    fn read_sector(&mut self, sector_id: u32) -> Result<Vec<u8>, OleError> {
        let position = (sector_id as u64 + 1) * self.sector_size as u64;
        self.reader.seek(SeekFrom::Start(position))?;
        let mut buffer = vec![0u8; self.sector_size];
        self.reader.read_exact(&mut buffer)?;
        Ok(buffer)
    }

    /// Follow a FAT chain, refusing cycles and out-of-range links.
    fn read_chain(&mut self, start_sector: u32) -> Result<Vec<u8>, OleError> {
        let mut data = Vec::new();
        let mut sector = start_sector;
        let mut remaining = self.fat.len();

        while sector != ENDOFCHAIN {
            if sector as usize >= self.fat.len() {
                return Err(OleError::CorruptedFile(format!(
                    "Sector {} outside the FAT",
                    sector
                )));
            }
            if remaining == 0 {
                return Err(OleError::CorruptedFile("Cycle in FAT chain".to_string()));
            }
            remaining -= 1;
            data.extend_from_slice(&self.read_sector(sector)?);
            sector = self.fat[sector as usize];
        }

        Ok(data)
    }

    fn read_mini_chain(&mut self, start_sector: u32, size: u64) -> Result<Vec<u8>, OleError> {
        if self.ministream.is_none() {
            let root_start = self.root()?.start_sector;
            let data = self.read_chain(root_start)?;
            self.ministream = Some(data);
        }
        let ministream = self
            .ministream
            .as_deref()
            .ok_or_else(|| OleError::CorruptedFile("Mini stream unavailable".to_string()))?;

        let mut data = Vec::with_capacity(size as usize);
        let mut sector = start_sector;
        let mut remaining = self.minifat.len();

        while sector != ENDOFCHAIN {
            if sector as usize >= self.minifat.len() || remaining == 0 {
                return Err(OleError::CorruptedFile(
                    "Invalid sector index in MiniFAT".to_string(),
                ));
            }
            remaining -= 1;
            let position = sector as usize * MINI_SECTOR_SIZE;
            let chunk = ministream
                .get(position..position + MINI_SECTOR_SIZE)
                .ok_or_else(|| OleError::CorruptedFile("Mini sector out of bounds".to_string()))?;
            data.extend_from_slice(chunk);
            sector = self.minifat[sector as usize];
        }

        data.truncate(size as usize);
        Ok(data)
    }

    fn root(&self) -> Result<&DirectoryEntry, OleError> {
        self.entries
            .first()
            .and_then(Option::as_ref)
            .ok_or_else(|| OleError::CorruptedFile("Missing root entry".to_string()))
    }

    fn entry(&self, sid: u32) -> Option<&DirectoryEntry> {
        self.entries.get(sid as usize).and_then(Option::as_ref)
    }

    /// CLSID of the root storage.
    pub fn root_clsid(&self) -> [u8; 16] {
        self.root().map(|r| r.clsid).unwrap_or([0; 16])
    }

    /// List every stream as a path of storage names ending in the stream name.
    pub fn list_streams(&self) -> Vec<Vec<String>> {
        let mut streams = Vec::new();
        if let Ok(root) = self.root() {
            let mut visited = vec![false; self.entries.len()];
            self.collect_streams(root.sid_child, &mut Vec::new(), &mut streams, &mut visited);
        }
        streams
    }

    fn collect_streams(
        &self,
        sid: u32,
        path: &mut Vec<String>,
        streams: &mut Vec<Vec<String>>,
        visited: &mut [bool],
    ) {
        let Some(entry) = self.entry(sid) else {
            return;
        };
        if std::mem::replace(&mut visited[sid as usize], true) {
            return;
        }

        self.collect_streams(entry.sid_left, path, streams, visited);

        path.push(entry.name.clone());
        if entry.is_stream() {
            streams.push(path.clone());
        } else if entry.is_storage() {
            self.collect_streams(entry.sid_child, path, streams, visited);
        }
        path.pop();

        self.collect_streams(entry.sid_right, path, streams, visited);
    }

    /// Read a stream by path.
    pub fn open_stream(&mut self, path: &[&str]) -> Result<Vec<u8>, OleError> {
        let entry = self.find_entry(path)?.clone();
        if !entry.is_stream() {
            return Err(OleError::InvalidFormat(format!(
                "{} is not a stream",
                path.join("/")
            )));
        }

        if entry.size < self.mini_stream_cutoff as u64 {
            self.read_mini_chain(entry.start_sector, entry.size)
        } else {
            let mut data = self.read_chain(entry.start_sector)?;
            if (data.len() as u64) < entry.size {
                return Err(OleError::CorruptedFile(format!(
                    "Stream {} is shorter than its directory size",
                    entry.name
                )));
            }
            data.truncate(entry.size as usize);
            Ok(data)
        }
    }

    /// Find a directory entry by path; names compare case-insensitively.
    pub fn find_entry(&self, path: &[&str]) -> Result<&DirectoryEntry, OleError> {
        let not_found = || OleError::StreamNotFound(path.join("/"));
        let mut current = self.root()?;

        for name in path {
            current = self
                .find_child(current.sid_child, name, self.entries.len())
                .ok_or_else(not_found)?;
        }

        Ok(current)
    }

    fn find_child(&self, sid: u32, name: &str, depth: usize) -> Option<&DirectoryEntry> {
        if depth == 0 {
            return None;
        }
        let entry = self.entry(sid)?;
        if entry.name.eq_ignore_ascii_case(name) {
            return Some(entry);
        }
        self.find_child(entry.sid_left, name, depth - 1)
            .or_else(|| self.find_child(entry.sid_right, name, depth - 1))
    }

    /// Check if a stream or storage exists
    pub fn exists(&self, path: &[&str]) -> bool {
        self.find_entry(path).is_ok()
    }
}

/// Check whether a buffer starts like a compound file.
pub fn is_ole_file(data: &[u8]) -> bool {
    data.len() >= MINIMAL_OLEFILE_SIZE && &data[0..8] == MAGIC
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_rejects_short_input() {
        let err = OleFile::open(Cursor::new(vec![0u8; 100])).unwrap_err();
        assert!(matches!(err, OleError::NotOleFile));
    }

    #[test]
    fn test_rejects_wrong_magic() {
        let err = OleFile::open(Cursor::new(vec![0u8; MINIMAL_OLEFILE_SIZE])).unwrap_err();
        assert!(matches!(err, OleError::NotOleFile));
        assert!(!is_ole_file(&[0u8; MINIMAL_OLEFILE_SIZE]));
    }
}
