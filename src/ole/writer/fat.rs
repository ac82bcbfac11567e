//! FAT allocation.
//!
//! Chains are allocated contiguously, so sector `n` of a chain links to
//! `n + 1` and the last one to `ENDOFCHAIN`. FAT and DIFAT sectors are
//! reserved with their marker values once the layout is known.

use super::super::consts::*;
use std::collections::HashSet;

#[derive(Debug)]
pub struct FatBuilder {
    fat: Vec<u32>,
    sector_size: usize,
}

impl FatBuilder {
    pub fn new(sector_size: usize) -> Self {
        Self {
            fat: Vec::new(),
            sector_size,
        }
    }

    /// Allocate a chain for `size` bytes; empty streams get `ENDOFCHAIN`.
    pub fn allocate_chain(&mut self, size: usize) -> u32 {
        if size == 0 {
            return ENDOFCHAIN;
        }

        let start = self.fat.len() as u32;
        let count = size.div_ceil(self.sector_size) as u32;
        self.fat.extend((start + 1..start + count).chain([ENDOFCHAIN]));
        start
    }

    /// Reserve `count` sectors marked with `marker` (`FATSECT` or `DIFSECT`).
    pub fn allocate_special(&mut self, count: u32, marker: u32) -> u32 {
        if count == 0 {
            return ENDOFCHAIN;
        }

        let start = self.fat.len() as u32;
        self.fat.extend(std::iter::repeat_n(marker, count as usize));
        start
    }

    pub fn total_sectors(&self) -> u32 {
        self.fat.len() as u32
    }

    #[cfg(test)]
    pub fn entries(&self) -> &[u32] {
        &self.fat
    }

    /// FAT sectors as raw bytes, padded with `FREESECT`.
    pub fn generate_fat_sectors(&self) -> Vec<Vec<u8>> {
        let per_sector = self.sector_size / 4;
        self.fat
            .chunks(per_sector)
            .map(|chunk| {
                let mut sector = vec![0xFFu8; self.sector_size];
                for (i, value) in chunk.iter().enumerate() {
                    sector[i * 4..i * 4 + 4].copy_from_slice(&value.to_le_bytes());
                }
                sector
            })
            .collect()
    }

    /// Check that links stay in range and no sector is linked twice.
    pub fn validate(&self) -> Result<(), String> {
        let mut linked = HashSet::new();
        for (sector, &next) in self.fat.iter().enumerate() {
            match next {
                ENDOFCHAIN | FREESECT | FATSECT | DIFSECT => {},
                _ if next as usize >= self.fat.len() => {
                    return Err(format!("Invalid next sector {} at sector {}", next, sector));
                },
                _ if next as usize == sector || !linked.insert(next) => {
                    return Err(format!("Circular reference detected at sector {}", next));
                },
                _ => {},
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_chain() {
        let mut fat = FatBuilder::new(512);
        assert_eq!(fat.allocate_chain(1024), 0);
        assert_eq!(fat.allocate_chain(1), 2);
        assert_eq!(fat.entries(), &[1, ENDOFCHAIN, ENDOFCHAIN]);
        assert_eq!(fat.allocate_chain(0), ENDOFCHAIN);
        assert_eq!(fat.total_sectors(), 3);
    }

    #[test]
    fn test_special_sectors_and_validation() {
        let mut fat = FatBuilder::new(512);
        fat.allocate_chain(1500);
        let start = fat.allocate_special(2, FATSECT);
        assert_eq!(start, 3);
        assert_eq!(&fat.entries()[3..], &[FATSECT, FATSECT]);
        assert!(fat.validate().is_ok());

        let sectors = fat.generate_fat_sectors();
        assert_eq!(sectors.len(), 1);
        assert_eq!(&sectors[0][0..4], &1u32.to_le_bytes());
        assert_eq!(&sectors[0][20..24], &FREESECT.to_le_bytes());
    }
}
