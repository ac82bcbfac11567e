//! Persist directory and user edits.
//!
//! Objects in the document stream are addressed by persist id. Each save appends a
//! persist directory block and a `UserEditAtom` that links to the previous edit, so the
//! live directory is the union of every block, newest entry winning.

use std::collections::{BTreeMap, HashSet};

use super::records::{Record, RecordBuilder, record_type};
use crate::common::binary::{read_u16_le, read_u32_le};
use crate::common::{Error, Result};

const PPT_VERSION: u32 = 0x0300_106D;
const LAST_VIEW_SLIDE: u16 = 1;
const USER_EDIT_PADWORD: u16 = 0x07B9;
const FIRST_SLIDE_ID: u32 = 256;

/// `UserEditAtom` payload (28 bytes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserEditAtom {
    pub last_slide_id_ref: u32,
    pub version: u32,
    /// Offset of the previous edit, 0 for the first
    pub offset_last_edit: u32,
    pub offset_persist_directory: u32,
    pub doc_persist_id_ref: u32,
    /// Highest persist id in use
    pub persist_id_seed: u32,
    pub last_view: u16,
    pub unused: u16,
}

impl UserEditAtom {
    /// A single-edit atom for a freshly written stream.
    pub fn new(
        offset_persist_directory: u32,
        doc_persist_id_ref: u32,
        persist_id_seed: u32,
        has_slides: bool,
    ) -> Self {
        Self {
            last_slide_id_ref: if has_slides { FIRST_SLIDE_ID } else { 0 },
            version: PPT_VERSION,
            offset_last_edit: 0,
            offset_persist_directory,
            doc_persist_id_ref,
            persist_id_seed,
            last_view: LAST_VIEW_SLIDE,
            unused: USER_EDIT_PADWORD,
        }
    }

    pub fn parse(record: &Record<'_>) -> Result<Self> {
        if record.record_type() != record_type::USER_EDIT_ATOM {
            return Err(Error::CorruptedFile(format!(
                "expected UserEditAtom, found record 0x{:04X}",
                record.record_type()
            )));
        }
        let d = record.data;
        Ok(Self {
            last_slide_id_ref: read_u32_le(d, 0)?,
            version: read_u32_le(d, 4)?,
            offset_last_edit: read_u32_le(d, 8)?,
            offset_persist_directory: read_u32_le(d, 12)?,
            doc_persist_id_ref: read_u32_le(d, 16)?,
            persist_id_seed: read_u32_le(d, 20)?,
            last_view: read_u16_le(d, 24)?,
            unused: read_u16_le(d, 26).unwrap_or(0),
        })
    }

    pub fn to_record(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(28);
        data.extend_from_slice(&self.last_slide_id_ref.to_le_bytes());
        data.extend_from_slice(&self.version.to_le_bytes());
        data.extend_from_slice(&self.offset_last_edit.to_le_bytes());
        data.extend_from_slice(&self.offset_persist_directory.to_le_bytes());
        data.extend_from_slice(&self.doc_persist_id_ref.to_le_bytes());
        data.extend_from_slice(&self.persist_id_seed.to_le_bytes());
        data.extend_from_slice(&self.last_view.to_le_bytes());
        data.extend_from_slice(&self.unused.to_le_bytes());

        let mut builder = RecordBuilder::new(0, 0, record_type::USER_EDIT_ATOM);
        builder.write_data(&data);
        builder.build()
    }
}

/// Persist id to stream offset map of the live edit.
#[derive(Debug, Clone, Default)]
pub struct PersistDirectory {
    offsets: BTreeMap<u32, u32>,
    /// Persist id of the document container
    pub doc_persist_id: u32,
    /// Highest persist id the newest edit declares in use
    pub persist_id_seed: u32,
}

impl PersistDirectory {
    /// Walk the edit chain from `current_edit` and merge every directory block.
    pub fn load(stream: &[u8], current_edit: u32) -> Result<Self> {
        let mut directory = PersistDirectory::default();
        let mut visited = HashSet::new();
        let mut offset = current_edit;
        let mut newest = true;

        loop {
            if !visited.insert(offset) {
                return Err(Error::CorruptedFile(format!(
                    "user edit chain loops back to offset {offset}"
                )));
            }
            let edit = UserEditAtom::parse(&Record::parse(stream, offset as usize)?)?;
            if newest {
                directory.doc_persist_id = edit.doc_persist_id_ref;
                directory.persist_id_seed = edit.persist_id_seed;
                newest = false;
            }

            let block = Record::parse(stream, edit.offset_persist_directory as usize)?;
            match block.record_type() {
                record_type::PERSIST_PTR_HOLDER | record_type::PERSIST_PTR_INCREMENTAL_BLOCK => {
                    for (id, target) in parse_directory_block(block.data)? {
                        directory.offsets.entry(id).or_insert(target);
                    }
                },
                other => {
                    return Err(Error::CorruptedFile(format!(
                        "expected persist directory, found record 0x{other:04X}"
                    )));
                },
            }

            if edit.offset_last_edit == 0 {
                break;
            }
            offset = edit.offset_last_edit;
        }

        if let Some(&max) = directory.offsets.keys().next_back() {
            directory.persist_id_seed = directory.persist_id_seed.max(max);
        }
        log::debug!(
            "persist directory: {} objects across {} edits",
            directory.offsets.len(),
            visited.len()
        );
        Ok(directory)
    }

    #[inline]
    pub fn offset_of(&self, persist_id: u32) -> Option<u32> {
        self.offsets.get(&persist_id).copied()
    }

    /// Every `(persist id, offset)` in id order.
    pub fn entries(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.offsets.iter().map(|(&id, &offset)| (id, offset))
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

/// Decode the `(info, offsets...)` groups of a directory block.
fn parse_directory_block(data: &[u8]) -> Result<Vec<(u32, u32)>> {
    let mut entries = Vec::new();
    let mut pos = 0;
    while pos + 4 <= data.len() {
        let info = read_u32_le(data, pos)?;
        pos += 4;
        let base = info & 0x000F_FFFF;
        let count = info >> 20;
        for i in 0..count {
            entries.push((base + i, read_u32_le(data, pos)?));
            pos += 4;
        }
    }
    Ok(entries)
}

/// Collects persist offsets for one freshly written stream.
#[derive(Debug, Default)]
pub struct PersistPtrBuilder {
    refs: BTreeMap<u32, u32>,
}

impl PersistPtrBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offset(&mut self, persist_id: u32, offset: u32) {
        self.refs.insert(persist_id, offset);
    }

    /// Highest id recorded so far.
    pub fn max_id(&self) -> u32 {
        self.refs.keys().next_back().copied().unwrap_or(0)
    }

    /// Directory payload: one info word per contiguous id run, then its offsets.
    pub fn generate_payload(&self) -> Vec<u8> {
        let ids: Vec<u32> = self.refs.keys().copied().collect();
        let mut payload = Vec::with_capacity(ids.len() * 4 + 8);

        let mut i = 0;
        while i < ids.len() {
            let base = ids[i];
            let mut j = i + 1;
            // The count field is 12 bits wide.
            while j < ids.len() && ids[j] == ids[j - 1] + 1 && j - i < 0x0FFF {
                j += 1;
            }
            let count = (j - i) as u32;
            let info = (count << 20) | (base & 0x000F_FFFF);
            payload.extend_from_slice(&info.to_le_bytes());
            for id in &ids[i..j] {
                payload.extend_from_slice(&self.refs[id].to_le_bytes());
            }
            i = j;
        }
        payload
    }

    pub fn generate_record(&self) -> Vec<u8> {
        let mut builder = RecordBuilder::new(0, 0, record_type::PERSIST_PTR_INCREMENTAL_BLOCK);
        builder.write_data(&self.generate_payload());
        builder.build()
    }
}
