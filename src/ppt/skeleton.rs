//! The smallest document PowerPoint accepts: one main master, an "Arial" font entry
//! and an empty slide list.

use std::collections::{BTreeMap, BTreeSet};

use super::document::{DocumentChild, DocumentTemplate, FIRST_MASTER_ID, POWERPOINT_CLSID};
use super::escher::{
    DrawingGroup, FileIdCluster, Rect, SPIDS_PER_CLUSTER, ShapeFlags, background_properties,
    dg_record, drawing_group_default_properties, escher_type, shape_type, sp_record,
    split_menu_colors_record,
};
use super::records::{RecordBuilder, atom, record_type, slide_list};
use crate::common::binary::encode_utf16le;

const DOC_PERSIST_ID: u32 = 1;
const MASTER_PERSIST_ID: u32 = 2;
const MASTER_DGID: u32 = 1;

/// Scheme colors: background, text, shadow, title text, fill, accent, two more accents.
const DEFAULT_COLOR_SCHEME: [u32; 8] = [
    0x00FF_FFFF,
    0x0000_0000,
    0x0080_8080,
    0x0000_0000,
    0x0099_6630,
    0x00CC_9963,
    0x00FF_CC66,
    0x00B2_56AE,
];

const SUMMARY_INFORMATION: &str = "\u{0005}SummaryInformation";
const DOCUMENT_SUMMARY_INFORMATION: &str = "\u{0005}DocumentSummaryInformation";

const FMTID_SUMMARY: [u8; 16] = [
    0xE0, 0x85, 0x9F, 0xF2, 0xF9, 0x4F, 0x68, 0x10, 0xAB, 0x91, 0x08, 0x00, 0x2B, 0x27, 0xB3, 0xD9,
];
const FMTID_DOC_SUMMARY: [u8; 16] = [
    0x02, 0xD5, 0xCD, 0xD5, 0x9C, 0x2E, 0x1B, 0x10, 0x93, 0x97, 0x08, 0x00, 0x2B, 0x2C, 0xF9, 0xAE,
];

/// `ColorSchemeAtom` with the default scheme.
pub(crate) fn color_scheme_record() -> Vec<u8> {
    let scheme: Vec<u8> = DEFAULT_COLOR_SCHEME
        .iter()
        .flat_map(|c| c.to_le_bytes())
        .collect();
    atom(0, 1, record_type::COLOR_SCHEME_ATOM, &scheme)
}

/// Document state of a deck with no slides.
pub fn blank_document() -> DocumentTemplate {
    let mut objects = BTreeMap::new();
    objects.insert(MASTER_PERSIST_ID, main_master());

    let drawing_group = DrawingGroup {
        spid_max: SPIDS_PER_CLUSTER + 2,
        clusters: vec![FileIdCluster::new(MASTER_DGID, 2)],
        trailing: vec![
            drawing_group_default_properties().to_record(escher_type::OPT),
            split_menu_colors_record(),
        ],
    };

    DocumentTemplate {
        root_clsid: POWERPOINT_CLSID,
        doc_persist_id: DOC_PERSIST_ID,
        children: vec![
            DocumentChild::Raw(document_atom()),
            DocumentChild::Raw(environment()),
            DocumentChild::DrawingGroup,
            DocumentChild::Raw(master_list()),
            DocumentChild::SlideList,
            DocumentChild::Raw(atom(0, 0, record_type::END_DOCUMENT, &[])),
        ],
        objects,
        drawing_group,
        used_dgids: BTreeSet::from([MASTER_DGID]),
        default_master_id: FIRST_MASTER_ID,
        streams: vec![
            (
                vec![SUMMARY_INFORMATION.to_string()],
                property_set(FMTID_SUMMARY, &code_page_section()),
            ),
            (
                vec![DOCUMENT_SUMMARY_INFORMATION.to_string()],
                property_set(FMTID_DOC_SUMMARY, &empty_section()),
            ),
        ],
        user_name: String::new(),
    }
}

fn document_atom() -> Vec<u8> {
    let mut data = Vec::with_capacity(40);
    // slide and notes page size, master units
    for value in [5760u32, 4320, 4320, 5760] {
        data.extend_from_slice(&value.to_le_bytes());
    }
    // server zoom 1/2
    data.extend_from_slice(&1u32.to_le_bytes());
    data.extend_from_slice(&2u32.to_le_bytes());
    // no notes master, no handout master
    data.extend_from_slice(&0u32.to_le_bytes());
    data.extend_from_slice(&0u32.to_le_bytes());
    data.extend_from_slice(&1u16.to_le_bytes());
    data.extend_from_slice(&0u16.to_le_bytes());
    data.extend_from_slice(&[0, 0, 0, 1]);
    atom(1, 0, record_type::DOCUMENT_ATOM, &data)
}

fn environment() -> Vec<u8> {
    let mut face = encode_utf16le("Arial");
    face.resize(64, 0);
    // charset, flags, font type, pitch and family
    face.extend_from_slice(&[0, 0, 4, 0x22]);

    let mut fonts = RecordBuilder::container(0, record_type::FONT_COLLECTION);
    fonts.write_child(&atom(0, 0, record_type::FONT_ENTITY_ATOM, &face));
    let mut environment = RecordBuilder::container(0, record_type::ENVIRONMENT);
    environment.write_child(&fonts.build());
    environment.build()
}

fn master_list() -> Vec<u8> {
    let mut entry = Vec::with_capacity(20);
    entry.extend_from_slice(&MASTER_PERSIST_ID.to_le_bytes());
    entry.extend_from_slice(&0u32.to_le_bytes());
    entry.extend_from_slice(&0u32.to_le_bytes());
    entry.extend_from_slice(&FIRST_MASTER_ID.to_le_bytes());
    entry.extend_from_slice(&0u32.to_le_bytes());

    let mut list = RecordBuilder::container(slide_list::MASTERS, record_type::SLIDE_LIST_WITH_TEXT);
    list.write_child(&atom(0, 0, record_type::SLIDE_PERSIST_ATOM, &entry));
    list.build()
}

fn main_master() -> Vec<u8> {
    let mut slide_atom = Vec::with_capacity(24);
    slide_atom.extend_from_slice(&0u32.to_le_bytes());
    slide_atom.extend_from_slice(&[1, 2, 0, 0, 0, 0, 0, 0]);
    slide_atom.extend_from_slice(&0u32.to_le_bytes());
    slide_atom.extend_from_slice(&0u32.to_le_bytes());
    slide_atom.extend_from_slice(&0u16.to_le_bytes());
    slide_atom.extend_from_slice(&0u16.to_le_bytes());

    let base = MASTER_DGID * SPIDS_PER_CLUSTER;
    let mut patriarch = RecordBuilder::container(0, escher_type::SP_CONTAINER);
    patriarch.write_child(&atom(1, 0, escher_type::SPGR, &Rect::default().to_ltrb_bytes()));
    patriarch.write_child(&sp_record(
        shape_type::NOT_PRIMITIVE,
        base,
        ShapeFlags::GROUP | ShapeFlags::PATRIARCH,
    ));
    let mut group = RecordBuilder::container(0, escher_type::SPGR_CONTAINER);
    group.write_child(&patriarch.build());

    let mut background = RecordBuilder::container(0, escher_type::SP_CONTAINER);
    background.write_child(&sp_record(
        shape_type::RECTANGLE,
        base + 1,
        ShapeFlags::BACKGROUND | ShapeFlags::HAVE_SPT,
    ));
    background.write_child(&background_properties().to_record(escher_type::OPT));

    let mut drawing = RecordBuilder::container(0, escher_type::DG_CONTAINER);
    drawing.write_child(&dg_record(MASTER_DGID, 2, base + 1));
    drawing.write_child(&group.build());
    drawing.write_child(&background.build());
    let mut pp_drawing = RecordBuilder::container(0, record_type::PP_DRAWING);
    pp_drawing.write_child(&drawing.build());

    // One level, no overrides: everything comes from the defaults.
    let style = [1u8, 0, 0, 0, 0, 0, 0, 0, 0, 0];

    let mut master = RecordBuilder::container(0, record_type::MAIN_MASTER);
    master.write_child(&atom(2, 0, record_type::SLIDE_ATOM, &slide_atom));
    master.write_child(&pp_drawing.build());
    master.write_child(&color_scheme_record());
    master.write_child(&atom(0, 0, record_type::TX_MASTER_STYLE_ATOM, &style));
    master.write_child(&atom(0, 1, record_type::TX_MASTER_STYLE_ATOM, &style));
    master.build()
}

/// Property set stream with a single section.
fn property_set(fmtid: [u8; 16], section: &[u8]) -> Vec<u8> {
    let mut s = Vec::with_capacity(48 + section.len());
    s.extend_from_slice(&0xFFFEu16.to_le_bytes());
    s.extend_from_slice(&0u16.to_le_bytes());
    s.extend_from_slice(&0u32.to_le_bytes());
    s.extend_from_slice(&[0u8; 16]);
    s.extend_from_slice(&1u32.to_le_bytes());
    s.extend_from_slice(&fmtid);
    s.extend_from_slice(&48u32.to_le_bytes());
    s.extend_from_slice(section);
    s
}

/// Section holding only the code page property (1252).
fn code_page_section() -> Vec<u8> {
    let mut section = Vec::with_capacity(24);
    section.extend_from_slice(&24u32.to_le_bytes());
    section.extend_from_slice(&1u32.to_le_bytes());
    // property 1 at offset 16
    section.extend_from_slice(&1u32.to_le_bytes());
    section.extend_from_slice(&16u32.to_le_bytes());
    // VT_I2
    section.extend_from_slice(&2u16.to_le_bytes());
    section.extend_from_slice(&0u16.to_le_bytes());
    section.extend_from_slice(&1252i16.to_le_bytes());
    section.extend_from_slice(&0i16.to_le_bytes());
    section
}

fn empty_section() -> Vec<u8> {
    let mut section = Vec::with_capacity(8);
    section.extend_from_slice(&8u32.to_le_bytes());
    section.extend_from_slice(&0u32.to_le_bytes());
    section
}
