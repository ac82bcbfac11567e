//! Directory stream generation.
//!
//! Siblings are ordered the way Office expects (shorter names first, then
//! case-insensitive) and linked as a chain hanging off the midpoint entry,
//! which keeps lookups by name working without a full red-black tree.

use super::super::consts::*;
use std::cmp::Ordering;
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct Entry {
    name: String,
    entry_type: u8,
    start_sector: u32,
    size: u64,
    sid_left: u32,
    sid_right: u32,
    sid_child: u32,
    clsid: [u8; 16],
}

impl Entry {
    fn new(name: &str, entry_type: u8, start_sector: u32, size: u64) -> Self {
        Self {
            name: name.to_string(),
            entry_type,
            start_sector,
            size,
            sid_left: NOSTREAM,
            sid_right: NOSTREAM,
            sid_child: NOSTREAM,
            clsid: [0; 16],
        }
    }

    fn to_bytes(&self) -> [u8; DIRENTRY_SIZE] {
        let mut data = [0u8; DIRENTRY_SIZE];

        let units: Vec<u16> = self.name.encode_utf16().take(31).collect();
        for (i, unit) in units.iter().enumerate() {
            data[i * 2..i * 2 + 2].copy_from_slice(&unit.to_le_bytes());
        }
        let name_len = ((units.len() + 1) * 2) as u16;
        data[64..66].copy_from_slice(&name_len.to_le_bytes());
        data[66] = self.entry_type;
        data[67] = 1; // black
        data[68..72].copy_from_slice(&self.sid_left.to_le_bytes());
        data[72..76].copy_from_slice(&self.sid_right.to_le_bytes());
        data[76..80].copy_from_slice(&self.sid_child.to_le_bytes());
        data[80..96].copy_from_slice(&self.clsid);
        data[116..120].copy_from_slice(&self.start_sector.to_le_bytes());
        data[120..128].copy_from_slice(&self.size.to_le_bytes());
        data
    }
}

pub struct DirectoryBuilder {
    /// Index is the SID; the root is SID 0
    entries: Vec<Entry>,
    storages: HashMap<Vec<String>, u32>,
    children: HashMap<u32, Vec<u32>>,
}

impl DirectoryBuilder {
    pub fn new(ministream_start: u32, ministream_size: u64) -> Self {
        let root = Entry::new("Root Entry", STGTY_ROOT, ministream_start, ministream_size);
        Self {
            entries: vec![root],
            storages: HashMap::from([(Vec::new(), 0)]),
            children: HashMap::new(),
        }
    }

    pub fn set_root_clsid(&mut self, clsid: [u8; 16]) {
        self.entries[0].clsid = clsid;
    }

    /// Return the SID of the storage at `path`, creating missing levels.
    fn storage_sid(&mut self, path: &[String]) -> u32 {
        if let Some(&sid) = self.storages.get(path) {
            return sid;
        }
        let (name, parent_path) = match path.split_last() {
            Some(split) => split,
            None => return 0,
        };
        let parent = self.storage_sid(parent_path);
        let sid = self.push(parent, Entry::new(name, STGTY_STORAGE, 0, 0));
        self.storages.insert(path.to_vec(), sid);
        sid
    }

    fn push(&mut self, parent: u32, entry: Entry) -> u32 {
        let sid = self.entries.len() as u32;
        self.entries.push(entry);
        self.children.entry(parent).or_default().push(sid);
        sid
    }

    /// Add a stream at `path`; the path is never empty.
    pub fn add_stream_path(&mut self, path: &[String], start_sector: u32, size: u64) -> u32 {
        let Some((name, parent_path)) = path.split_last() else {
            return 0;
        };
        let parent = self.storage_sid(parent_path);
        self.push(parent, Entry::new(name, STGTY_STREAM, start_sector, size))
    }

    /// Link every storage's children and serialize all entries in SID order.
    pub fn generate_directory_stream(&mut self) -> Vec<u8> {
        let parents: Vec<(u32, Vec<u32>)> = self
            .children
            .iter()
            .map(|(parent, kids)| (*parent, kids.clone()))
            .collect();
        for (parent, kids) in parents {
            self.link_children(parent, kids);
        }

        self.entries.iter().flat_map(Entry::to_bytes).collect()
    }

    fn link_children(&mut self, parent: u32, mut kids: Vec<u32>) {
        kids.sort_by(|&a, &b| {
            compare_names(&self.entries[a as usize].name, &self.entries[b as usize].name)
        });
        let Some(&midpoint) = kids.get(kids.len() / 2) else {
            return;
        };
        self.entries[parent as usize].sid_child = midpoint;

        let mid = kids.len() / 2;
        // Entries before the midpoint chain leftwards, the rest rightwards.
        for i in 0..mid {
            let sid = kids[i] as usize;
            self.entries[sid].sid_left = if i > 0 { kids[i - 1] } else { NOSTREAM };
        }
        self.entries[midpoint as usize].sid_left = if mid > 0 { kids[mid - 1] } else { NOSTREAM };
        for i in mid..kids.len() {
            let sid = kids[i] as usize;
            self.entries[sid].sid_right = kids.get(i + 1).copied().unwrap_or(NOSTREAM);
        }
    }
}

/// Office's sibling order: length first, then case-insensitive name.
fn compare_names(a: &str, b: &str) -> Ordering {
    let (len_a, len_b) = (a.encode_utf16().count(), b.encode_utf16().count());
    len_a
        .cmp(&len_b)
        .then_with(|| a.to_uppercase().cmp(&b.to_uppercase()))
}
