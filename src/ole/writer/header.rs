//! Header block and DIFAT sectors for version 3 files.

use super::super::consts::*;

pub struct HeaderBuilder {
    first_dir_sector: u32,
    first_minifat_sector: u32,
    num_minifat_sectors: u32,
    first_difat_sector: u32,
    num_difat_sectors: u32,
    fat_sectors: Vec<u32>,
}

impl HeaderBuilder {
    pub fn new() -> Self {
        Self {
            first_dir_sector: 0,
            first_minifat_sector: ENDOFCHAIN,
            num_minifat_sectors: 0,
            first_difat_sector: ENDOFCHAIN,
            num_difat_sectors: 0,
            fat_sectors: Vec::new(),
        }
    }

    pub fn set_first_dir_sector(&mut self, sector: u32) {
        self.first_dir_sector = sector;
    }

    pub fn set_minifat(&mut self, first_sector: u32, num_sectors: u32) {
        self.first_minifat_sector = first_sector;
        self.num_minifat_sectors = num_sectors;
    }

    pub fn set_difat(&mut self, first_sector: u32, num_sectors: u32) {
        self.first_difat_sector = first_sector;
        self.num_difat_sectors = num_sectors;
    }

    /// All FAT sector ids; the first 109 go into the header.
    pub fn set_fat_sectors(&mut self, sectors: &[u32]) {
        self.fat_sectors = sectors.to_vec();
    }

    pub fn generate(&self) -> Vec<u8> {
        let mut header = vec![0u8; SECTOR_SIZE_V3];
        let mut put_u16 = |offset: usize, value: u16| {
            header[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
        };
        put_u16(0x18, 0x003E); // minor version
        put_u16(0x1A, 3); // major version
        put_u16(0x1C, 0xFFFE); // byte order
        put_u16(0x1E, 9); // sector shift
        put_u16(0x20, 6); // mini sector shift

        header[0..8].copy_from_slice(MAGIC);
        let fields = [
            (0x2C, self.fat_sectors.len() as u32),
            (0x30, self.first_dir_sector),
            (0x38, MINI_STREAM_CUTOFF),
            (0x3C, self.first_minifat_sector),
            (0x40, self.num_minifat_sectors),
            (0x44, self.first_difat_sector),
            (0x48, self.num_difat_sectors),
        ];
        for (offset, value) in fields {
            header[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
        }

        for slot in 0..HEADER_DIFAT_ENTRIES {
            let id = self.fat_sectors.get(slot).copied().unwrap_or(FREESECT);
            let offset = 0x4C + slot * 4;
            header[offset..offset + 4].copy_from_slice(&id.to_le_bytes());
        }

        header
    }

    /// DIFAT sectors holding the FAT ids beyond the header's 109 slots.
    /// Each sector ends with the id of the next one, or `ENDOFCHAIN`.
    pub fn generate_difat_sectors(&self, first_difat_sector: u32) -> Vec<Vec<u8>> {
        let ids_per_sector = SECTOR_SIZE_V3 / 4 - 1;
        let overflow = self.fat_sectors.get(HEADER_DIFAT_ENTRIES..).unwrap_or(&[]);
        let count = overflow.chunks(ids_per_sector).len();

        overflow
            .chunks(ids_per_sector)
            .enumerate()
            .map(|(index, ids)| {
                let mut sector = vec![0xFFu8; SECTOR_SIZE_V3];
                for (i, id) in ids.iter().enumerate() {
                    sector[i * 4..i * 4 + 4].copy_from_slice(&id.to_le_bytes());
                }
                let next = if index + 1 < count {
                    first_difat_sector + index as u32 + 1
                } else {
                    ENDOFCHAIN
                };
                sector[SECTOR_SIZE_V3 - 4..].copy_from_slice(&next.to_le_bytes());
                sector
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn u32_at(data: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes([
            data[offset],
            data[offset + 1],
            data[offset + 2],
            data[offset + 3],
        ])
    }

    #[test]
    fn test_header_fields() {
        let mut builder = HeaderBuilder::new();
        builder.set_first_dir_sector(10);
        builder.set_fat_sectors(&[11, 12]);
        let header = builder.generate();

        assert_eq!(header.len(), 512);
        assert_eq!(&header[0..8], MAGIC);
        assert_eq!(&header[0x1C..0x1E], &0xFFFEu16.to_le_bytes());
        assert_eq!(u32_at(&header, 0x2C), 2);
        assert_eq!(u32_at(&header, 0x30), 10);
        assert_eq!(u32_at(&header, 0x4C), 11);
        assert_eq!(u32_at(&header, 0x50), 12);
        assert_eq!(u32_at(&header, 0x54), FREESECT);
        assert_eq!(u32_at(&header, 0x3C), ENDOFCHAIN);
    }

    #[test]
    fn test_difat_sectors_chain() {
        let mut builder = HeaderBuilder::new();
        let ids: Vec<u32> = (0..250).collect();
        builder.set_fat_sectors(&ids);

        let sectors = builder.generate_difat_sectors(300);
        assert_eq!(sectors.len(), 2);
        assert_eq!(u32_at(&sectors[0], 0), 109);
        assert_eq!(u32_at(&sectors[0], 508), 301);
        assert_eq!(u32_at(&sectors[1], 508), ENDOFCHAIN);
        assert!(HeaderBuilder::new().generate_difat_sectors(0).is_empty());
    }
}
