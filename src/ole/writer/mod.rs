//! Compound file writer.
//!
//! Streams are buffered in memory and laid out when [`OleWriter::write_to`]
//! runs: large streams first, then the mini stream, the directory, the
//! MiniFAT, DIFAT and finally the FAT sectors.

mod directory;
mod fat;
mod header;
mod minifat;

#[cfg(test)]
mod tests;

use super::consts::*;
use super::file::OleError;
use directory::DirectoryBuilder;
use fat::FatBuilder;
use header::HeaderBuilder;
use minifat::MiniFatBuilder;
use std::io::{Cursor, Seek, SeekFrom, Write};

/// Builds a version 3 (512-byte sector) compound file.
#[derive(Debug, Default)]
pub struct OleWriter {
    root_clsid: [u8; 16],
    /// Streams in insertion order; allocation follows this order
    streams: Vec<(Vec<String>, Vec<u8>)>,
}

impl OleWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the CLSID stored on the root entry.
    pub fn set_root_clsid(&mut self, clsid: [u8; 16]) {
        self.root_clsid = clsid;
    }

    /// Add or replace the stream at `path`; parent storages are implied.
    pub fn create_stream(&mut self, path: &[&str], data: &[u8]) -> Result<(), OleError> {
        if path.is_empty() || path.iter().any(|p| p.is_empty()) {
            return Err(OleError::InvalidData("Empty stream path".to_string()));
        }
        if let Some(name) = path.iter().find(|p| p.encode_utf16().count() > 31) {
            return Err(OleError::InvalidData(format!(
                "Entry name longer than 31 characters: {}",
                name
            )));
        }

        let owned: Vec<String> = path.iter().map(|s| s.to_string()).collect();
        match self.streams.iter_mut().find(|(p, _)| *p == owned) {
            Some((_, existing)) => *existing = data.to_vec(),
            None => self.streams.push((owned, data.to_vec())),
        }
        Ok(())
    }

    /// Number of buffered streams.
    pub fn stream_count(&self) -> usize {
        self.streams.len()
    }

    /// Serialize the compound file into `writer`.
    pub fn write_to<W: Write + Seek>(&self, writer: &mut W) -> Result<(), OleError> {
        let sector_size = SECTOR_SIZE_V3;
        let mut fat = FatBuilder::new(sector_size);
        let mut minifat = MiniFatBuilder::new();

        // Small streams go to the mini stream; large ones get FAT chains
        // in insertion order so the first large stream starts at sector 0.
        let mut placed: Vec<(&[String], u32, u64)> = Vec::with_capacity(self.streams.len());
        let mut large: Vec<(u32, &[u8])> = Vec::new();
        for (path, data) in &self.streams {
            let start = if data.len() < MINI_STREAM_CUTOFF as usize {
                minifat.allocate_chain(data)
            } else {
                let start = fat.allocate_chain(data.len());
                large.push((start, data.as_slice()));
                start
            };
            placed.push((path.as_slice(), start, data.len() as u64));
        }

        let ministream_start = if minifat.is_empty() {
            ENDOFCHAIN
        } else {
            fat.allocate_chain(minifat.ministream().len())
        };

        let mut directory =
            DirectoryBuilder::new(ministream_start, minifat.ministream().len() as u64);
        directory.set_root_clsid(self.root_clsid);
        for (path, start, size) in &placed {
            directory.add_stream_path(path, *start, *size);
        }
        let dir_stream = directory.generate_directory_stream();
        let dir_start = fat.allocate_chain(dir_stream.len());

        let minifat_sectors = minifat.generate_minifat_sectors(sector_size);
        let minifat_start = if minifat_sectors.is_empty() {
            ENDOFCHAIN
        } else {
            fat.allocate_chain(minifat_sectors.len() * sector_size)
        };

        // The FAT has to describe its own sectors and the DIFAT sectors,
        // so iterate until the counts settle.
        let entries_per_sector = (sector_size / 4) as u32;
        let ids_per_difat = entries_per_sector - 1;
        let used = fat.total_sectors();
        let (mut n_fat, mut n_difat) = (0u32, 0u32);
        loop {
            let next_fat = (used + n_fat + n_difat).div_ceil(entries_per_sector);
            let next_difat = next_fat
                .saturating_sub(HEADER_DIFAT_ENTRIES as u32)
                .div_ceil(ids_per_difat);
            if next_fat == n_fat && next_difat == n_difat {
                break;
            }
            n_fat = next_fat;
            n_difat = next_difat;
        }

        let difat_start = fat.allocate_special(n_difat, DIFSECT);
        let fat_start = fat.allocate_special(n_fat, FATSECT);
        fat.validate()
            .map_err(|e| OleError::InvalidData(format!("FAT validation failed: {}", e)))?;

        let fat_sector_ids: Vec<u32> = (0..n_fat).map(|i| fat_start + i).collect();
        let mut header = HeaderBuilder::new();
        header.set_first_dir_sector(dir_start);
        header.set_minifat(minifat_start, minifat_sectors.len() as u32);
        header.set_fat_sectors(&fat_sector_ids);
        if n_difat > 0 {
            header.set_difat(difat_start, n_difat);
        }

        writer.write_all(&header.generate())?;

        let mut put = |sector: u32, data: &[u8]| -> Result<(), OleError> {
            if sector == ENDOFCHAIN || data.is_empty() {
                return Ok(());
            }
            writer.seek(SeekFrom::Start((sector as u64 + 1) * sector_size as u64))?;
            writer.write_all(data)?;
            let pad = data.len().next_multiple_of(sector_size) - data.len();
            writer.write_all(&vec![0u8; pad])?;
            Ok(())
        };

        for (start, data) in &large {
            put(*start, data)?;
        }
        put(ministream_start, minifat.ministream())?;
        put(dir_start, &dir_stream)?;
        put(minifat_start, &minifat_sectors.concat())?;
        put(difat_start, &header.generate_difat_sectors(difat_start).concat())?;
        put(fat_start, &fat.generate_fat_sectors().concat())?;

        writer.flush()?;
        Ok(())
    }

    /// Serialize into a byte vector.
    pub fn to_bytes(&self) -> Result<Vec<u8>, OleError> {
        let mut cursor = Cursor::new(Vec::new());
        self.write_to(&mut cursor)?;
        Ok(cursor.into_inner())
    }
}
