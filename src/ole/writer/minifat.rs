//! Mini stream allocation for streams below the 4096-byte cutoff.

use super::super::consts::*;

#[derive(Debug, Default)]
pub struct MiniFatBuilder {
    minifat: Vec<u32>,
    ministream: Vec<u8>,
}

impl MiniFatBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `data` to the mini stream and return its first mini sector.
    pub fn allocate_chain(&mut self, data: &[u8]) -> u32 {
        if data.is_empty() {
            return ENDOFCHAIN;
        }

        let start = self.minifat.len() as u32;
        let count = data.len().div_ceil(MINI_SECTOR_SIZE) as u32;
        self.minifat
            .extend((start + 1..start + count).chain([ENDOFCHAIN]));

        self.ministream.extend_from_slice(data);
        self.ministream
            .resize((start + count) as usize * MINI_SECTOR_SIZE, 0);
        start
    }

    /// Mini stream contents, a whole number of mini sectors.
    pub fn ministream(&self) -> &[u8] {
        &self.ministream
    }

    pub fn is_empty(&self) -> bool {
        self.minifat.is_empty()
    }

    /// MiniFAT sectors as raw bytes, padded with `FREESECT`.
    pub fn generate_minifat_sectors(&self, sector_size: usize) -> Vec<Vec<u8>> {
        self.minifat
            .chunks(sector_size / 4)
            .map(|chunk| {
                let mut sector = vec![0xFFu8; sector_size];
                for (i, value) in chunk.iter().enumerate() {
                    sector[i * 4..i * 4 + 4].copy_from_slice(&value.to_le_bytes());
                }
                sector
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chains_are_padded_to_mini_sectors() {
        let mut minifat = MiniFatBuilder::new();
        assert_eq!(minifat.allocate_chain(&[0xAA; 50]), 0);
        assert_eq!(minifat.allocate_chain(&[0xBB; 100]), 1);
        assert_eq!(minifat.minifat, vec![ENDOFCHAIN, 2, ENDOFCHAIN]);
        assert_eq!(minifat.ministream().len(), 3 * MINI_SECTOR_SIZE);
        assert_eq!(minifat.ministream()[64], 0xBB);
        assert_eq!(minifat.ministream()[50], 0);
    }

    #[test]
    fn test_empty_chain() {
        let mut minifat = MiniFatBuilder::new();
        assert_eq!(minifat.allocate_chain(&[]), ENDOFCHAIN);
        assert!(minifat.is_empty());
        assert!(minifat.generate_minifat_sectors(512).is_empty());
    }
}
