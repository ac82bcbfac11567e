//! Picture store: the drawing group's blip store plus the `Pictures` stream it points into.

use super::escher::escher_type;
use super::records::{Record, RecordBuilder};
use crate::common::binary::{read_u16_le, read_u32_le, read_u8};
use crate::common::Result;

const BSE_FIXED_SIZE: usize = 36;
const NO_DELAY: u32 = 0xFFFF_FFFF;

/// One blip store entry with its picture data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlipEntry {
    pub blip_type_win32: u8,
    pub blip_type_mac: u8,
    pub uid: [u8; 16],
    pub tag: u16,
    pub ref_count: u32,
    pub name: Vec<u8>,
    /// Complete blip record (header included); empty for a vacated slot
    pub blip: Vec<u8>,
}

impl BlipEntry {
    fn parse(bse: &Record<'_>, pictures: Option<&[u8]>) -> Result<Self> {
        let d = bse.data;
        let mut uid = [0u8; 16];
        uid.copy_from_slice(crate::common::binary::read_bytes(d, 2, 16)?);
        let size = read_u32_le(d, 20)?;
        let fo_delay = read_u32_le(d, 28)?;
        let name_len = read_u8(d, 33)? as usize;
        let name_end = (BSE_FIXED_SIZE + name_len).min(d.len());
        let name = d[BSE_FIXED_SIZE..name_end].to_vec();

        let embedded = &d[name_end..];
        let blip = if !embedded.is_empty() {
            embedded.to_vec()
        } else if size == 0 || fo_delay == NO_DELAY {
            Vec::new()
        } else {
            match pictures.map(|stream| Record::parse(stream, fo_delay as usize)) {
                Some(Ok(record)) => record.raw.to_vec(),
                Some(Err(e)) => {
                    log::warn!("blip at Pictures offset {fo_delay} unreadable: {e}");
                    Vec::new()
                },
                None => {
                    log::warn!("blip store references a missing Pictures stream");
                    Vec::new()
                },
            }
        };

        Ok(Self {
            blip_type_win32: read_u8(d, 0)?,
            blip_type_mac: read_u8(d, 1)?,
            uid,
            tag: read_u16_le(d, 18)?,
            ref_count: read_u32_le(d, 24)?,
            name,
            blip,
        })
    }

    fn to_record(&self, fo_delay: u32) -> Vec<u8> {
        let mut data = Vec::with_capacity(BSE_FIXED_SIZE + self.name.len());
        data.push(self.blip_type_win32);
        data.push(self.blip_type_mac);
        data.extend_from_slice(&self.uid);
        data.extend_from_slice(&self.tag.to_le_bytes());
        data.extend_from_slice(&(self.blip.len() as u32).to_le_bytes());
        data.extend_from_slice(&self.ref_count.to_le_bytes());
        data.extend_from_slice(&fo_delay.to_le_bytes());
        data.push(0);
        data.push(self.name.len() as u8);
        data.extend_from_slice(&[0, 0]);
        data.extend_from_slice(&self.name);

        let mut builder = RecordBuilder::new(2, self.blip_type_win32 as u16, escher_type::BSE);
        builder.write_data(&data);
        builder.build()
    }
}

/// Ordered blip store. Shapes reference entries by 1-based index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PictureStore {
    entries: Vec<BlipEntry>,
}

impl PictureStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a `BStoreContainer`, resolving delayed blips from the `Pictures` stream.
    pub fn load(bstore: Option<&Record<'_>>, pictures: Option<&[u8]>) -> Result<Self> {
        let Some(bstore) = bstore else {
            return Ok(Self::default());
        };
        let entries = bstore
            .children()?
            .iter()
            .filter(|child| child.record_type() == escher_type::BSE)
            .map(|bse| BlipEntry::parse(bse, pictures))
            .collect::<Result<Vec<_>>>()?;
        log::debug!("picture store: {} entries", entries.len());
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry by 1-based index.
    pub fn get(&self, index: u32) -> Option<&BlipEntry> {
        index
            .checked_sub(1)
            .and_then(|i| self.entries.get(i as usize))
    }

    /// Append an entry and return its 1-based index.
    pub fn push(&mut self, entry: BlipEntry) -> u32 {
        self.entries.push(entry);
        self.entries.len() as u32
    }

    /// Copy entry `index` of `source` into this store, reusing an entry with the same
    /// uid. Returns the index in this store.
    pub fn import(&mut self, source: &PictureStore, index: u32) -> Option<u32> {
        let entry = source.get(index)?;
        if entry.uid != [0u8; 16]
            && let Some(existing) = self.entries.iter().position(|e| e.uid == entry.uid)
        {
            return Some(existing as u32 + 1);
        }
        Some(self.push(entry.clone()))
    }

    /// Encode the `BStoreContainer` record and the `Pictures` stream.
    pub fn encode(&self) -> (Option<Vec<u8>>, Vec<u8>) {
        if self.entries.is_empty() {
            return (None, Vec::new());
        }
        let mut pictures = Vec::new();
        let mut container =
            RecordBuilder::container(self.entries.len() as u16, escher_type::BSTORE_CONTAINER);
        for entry in &self.entries {
            let fo_delay = if entry.blip.is_empty() {
                0
            } else {
                let offset = pictures.len() as u32;
                pictures.extend_from_slice(&entry.blip);
                offset
            };
            container.write_child(&entry.to_record(fo_delay));
        }
        (Some(container.build()), pictures)
    }
}
