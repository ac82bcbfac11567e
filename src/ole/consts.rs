//! Compound file (MS-CFB) constants.

/// Magic bytes that start every compound file
pub const MAGIC: &[u8; 8] = b"\xD0\xCF\x11\xE0\xA1\xB1\x1A\xE1";

/// Smallest valid compound file with 512-byte sectors (header + FAT + directory)
pub const MINIMAL_OLEFILE_SIZE: usize = 1536;

/// Size of a directory entry in bytes
pub const DIRENTRY_SIZE: usize = 128;

/// Sector size for version 3 files
pub const SECTOR_SIZE_V3: usize = 512;

/// Sector size for version 4 files
pub const SECTOR_SIZE_V4: usize = 4096;

/// Mini sector size
pub const MINI_SECTOR_SIZE: usize = 64;

/// Streams shorter than this live in the mini stream
pub const MINI_STREAM_CUTOFF: u32 = 4096;

/// Number of FAT sector ids stored in the header
pub const HEADER_DIFAT_ENTRIES: usize = 109;

/// Maximum regular sector ID
pub const MAXREGSECT: u32 = 0xFFFF_FFFA;
/// Marks a DIFAT sector in the FAT
pub const DIFSECT: u32 = 0xFFFF_FFFC;
/// Marks a FAT sector in the FAT
pub const FATSECT: u32 = 0xFFFF_FFFD;
/// End of a sector chain
pub const ENDOFCHAIN: u32 = 0xFFFF_FFFE;
/// Unallocated sector
pub const FREESECT: u32 = 0xFFFF_FFFF;

/// Unallocated directory entry
pub const NOSTREAM: u32 = 0xFFFF_FFFF;

/// Empty directory entry
pub const STGTY_EMPTY: u8 = 0;
/// Storage entry
pub const STGTY_STORAGE: u8 = 1;
/// Stream entry
pub const STGTY_STREAM: u8 = 2;
/// Root storage entry
pub const STGTY_ROOT: u8 = 5;
