//! Document-level state carried from a loaded deck into the written one.

use std::collections::{BTreeMap, BTreeSet};

use super::escher::{DrawingGroup, escher_type};
use super::records::{Record, record_type};
use crate::common::Result;

/// Class id of a PowerPoint 97-2003 document
pub const POWERPOINT_CLSID: [u8; 16] = [
    0x10, 0x8D, 0x81, 0x64, 0x9B, 0x4F, 0xCF, 0x11, 0x86, 0xEA, 0x00, 0xAA, 0x00, 0xB9, 0x29, 0xE8,
];

/// Master id of the first main master in decks PowerPoint writes.
pub const FIRST_MASTER_ID: u32 = 0x8000_0000;

/// A direct child of the document container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentChild {
    /// Carried verbatim
    Raw(Vec<u8>),
    /// Regenerated drawing group
    DrawingGroup,
    /// Regenerated slide list
    SlideList,
}

/// Everything about a deck except its slides and pictures.
#[derive(Debug, Clone)]
pub struct DocumentTemplate {
    pub root_clsid: [u8; 16],
    pub doc_persist_id: u32,
    pub children: Vec<DocumentChild>,
    /// Persist objects other than slides and notes, by persist id
    pub objects: BTreeMap<u32, Vec<u8>>,
    pub drawing_group: DrawingGroup,
    /// Drawing ids used by `objects`
    pub used_dgids: BTreeSet<u32>,
    /// Master that new slides bind to
    pub default_master_id: u32,
    /// Other compound-file streams, by path
    pub streams: Vec<(Vec<String>, Vec<u8>)>,
    pub user_name: String,
}

impl DocumentTemplate {
    /// Highest persist id the template itself occupies.
    pub fn max_persist_id(&self) -> u32 {
        self.objects
            .keys()
            .next_back()
            .copied()
            .unwrap_or(0)
            .max(self.doc_persist_id)
    }

    /// Record which drawing ids the kept objects use.
    pub fn collect_used_dgids(&mut self) -> Result<()> {
        let mut used = BTreeSet::new();
        for bytes in self.objects.values() {
            if let Some(dgid) = drawing_id(&Record::parse(bytes, 0)?)? {
                used.insert(dgid);
            }
        }
        self.used_dgids = used;
        Ok(())
    }
}

/// Drawing id of a persist object's `PPDrawing`, if it has one.
pub fn drawing_id(object: &Record<'_>) -> Result<Option<u32>> {
    let Some(drawing) = object.find_child(record_type::PP_DRAWING)? else {
        return Ok(None);
    };
    let Some(container) = drawing.find_child(escher_type::DG_CONTAINER)? else {
        return Ok(None);
    };
    Ok(container
        .find_child(escher_type::DG)?
        .map(|dg| dg.instance() as u32))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ppt::escher::dg_record;
    use crate::ppt::records::RecordBuilder;

    #[test]
    fn test_drawing_id_of_master() {
        let mut dg_container = RecordBuilder::container(0, escher_type::DG_CONTAINER);
        dg_container.write_child(&dg_record(3, 2, 3 * 1024 + 1));
        let mut drawing = RecordBuilder::container(0, record_type::PP_DRAWING);
        drawing.write_child(&dg_container.build());
        let mut master = RecordBuilder::container(0, record_type::MAIN_MASTER);
        master.write_child(&drawing.build());
        let bytes = master.build();

        let record = Record::parse(&bytes, 0).unwrap();
        assert_eq!(drawing_id(&record).unwrap(), Some(3));
    }
}
