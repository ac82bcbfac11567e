//! Encode a [`Presentation`] as a single-edit `.ppt` file.
//!
//! Stream layout: document container at offset 0, then the kept persist objects in id
//! order, then one container per slide, then the persist directory and the
//! `UserEditAtom` that the `Current User` stream points at.

use std::collections::BTreeSet;

use super::current_user::CurrentUser;
use super::document::{DocumentChild, DocumentTemplate, POWERPOINT_CLSID};
use super::escher::{
    Anchor, FileIdCluster, Rect, SPIDS_PER_CLUSTER, ShapeFlags, background_properties,
    dg_record, escher_type, shape_type, sp_record,
};
use super::persist::{PersistPtrBuilder, UserEditAtom};
use super::records::{RecordBuilder, atom, record_type, slide_list};
use super::skeleton::color_scheme_record;
use super::{CURRENT_USER_STREAM, DOCUMENT_STREAM, PICTURES_STREAM};
use crate::common::binary::encode_utf16le;
use crate::common::{Error, Result};
use crate::deck::{GenericShape, Presentation, Shape, ShapeFrame, Slide, TextRun};
use crate::ole::OleWriter;

const FIRST_SLIDE_ID: u32 = 256;
/// `SlidePersistAtom` flag: the slide has shapes outside the outline
const SLIDE_PERSIST_NON_OUTLINE_DATA: u32 = 0x04;

pub fn write_presentation(presentation: &Presentation) -> Result<Vec<u8>> {
    let template = &presentation.document;
    let slides = presentation.slides();

    let (bstore, pictures) = presentation.pictures().encode();
    let mut plan = DrawingPlan::new(template, slides.len());

    let first_slide_persist = template.max_persist_id() + 1;
    let mut encoded_slides = Vec::with_capacity(slides.len());
    for (index, slide) in slides.iter().enumerate() {
        let (dgid, base) = plan.assign(index);
        let (bytes, shape_count) =
            encode_slide(slide, dgid, base, template.default_master_id)?;
        plan.record_usage(index, shape_count);
        encoded_slides.push(bytes);
    }

    let dgg = plan.drawing_group_record(template, bstore.as_deref());
    let document = encode_document(template, &dgg, first_slide_persist, slides.len());

    let mut stream = Vec::new();
    let mut persist = PersistPtrBuilder::new();
    persist.set_offset(template.doc_persist_id, 0);
    stream.extend_from_slice(&document);
    for (&id, bytes) in &template.objects {
        persist.set_offset(id, stream_offset(&stream)?);
        stream.extend_from_slice(bytes);
    }
    for (index, bytes) in encoded_slides.iter().enumerate() {
        persist.set_offset(first_slide_persist + index as u32, stream_offset(&stream)?);
        stream.extend_from_slice(bytes);
    }

    let persist_offset = stream_offset(&stream)?;
    stream.extend_from_slice(&persist.generate_record());
    let edit_offset = stream_offset(&stream)?;
    let edit = UserEditAtom::new(
        persist_offset,
        template.doc_persist_id,
        persist.max_id(),
        !slides.is_empty(),
    );
    stream.extend_from_slice(&edit.to_record());

    let mut current_user = CurrentUser::new(edit_offset);
    current_user.user_name = template.user_name.clone();

    let mut ole = OleWriter::new();
    ole.set_root_clsid(if template.root_clsid == [0u8; 16] {
        POWERPOINT_CLSID
    } else {
        template.root_clsid
    });
    ole.create_stream(&[DOCUMENT_STREAM], &stream)?;
    ole.create_stream(&[CURRENT_USER_STREAM], &current_user.to_bytes())?;
    if !pictures.is_empty() {
        ole.create_stream(&[PICTURES_STREAM], &pictures)?;
    }
    for (path, bytes) in &template.streams {
        let parts: Vec<&str> = path.iter().map(String::as_str).collect();
        ole.create_stream(&parts, bytes)?;
    }

    log::debug!(
        "encoded deck: {} slides, {} bytes of records, {} bytes of pictures",
        slides.len(),
        stream.len(),
        pictures.len()
    );
    Ok(ole.to_bytes()?)
}

fn stream_offset(stream: &[u8]) -> Result<u32> {
    u32::try_from(stream.len())
        .map_err(|_| Error::Unsupported("document stream exceeds 4 GiB".to_string()))
}

/// Drawing ids and shape id clusters for the slides being written.
///
/// Clusters of drawings kept from the template stay where they are. Clusters of dropped
/// drawings are reused for new slides before new clusters are appended, so the table
/// does not grow from one save to the next.
struct DrawingPlan {
    clusters: Vec<FileIdCluster>,
    pinned: Vec<bool>,
    /// Cluster slot and dgid per slide
    slots: Vec<(usize, u32)>,
}

impl DrawingPlan {
    fn new(template: &DocumentTemplate, slide_count: usize) -> Self {
        let clusters = template.drawing_group.clusters.clone();
        let pinned: Vec<bool> = clusters
            .iter()
            .map(|c| template.used_dgids.contains(&c.dgid.get()))
            .collect();

        let mut taken: BTreeSet<u32> = template.used_dgids.clone();
        let mut free_slots = pinned
            .iter()
            .enumerate()
            .filter(|&(_, &p)| !p)
            .map(|(i, _)| i);
        let mut next_slot = clusters.len();
        let mut next_dgid = 1u32;
        let mut slots = Vec::with_capacity(slide_count);
        for _ in 0..slide_count {
            let slot = free_slots.next().unwrap_or_else(|| {
                next_slot += 1;
                next_slot - 1
            });
            while taken.contains(&next_dgid) {
                next_dgid += 1;
            }
            taken.insert(next_dgid);
            slots.push((slot, next_dgid));
        }

        Self {
            clusters,
            pinned,
            slots,
        }
    }

    /// Drawing id and first shape id of slide `index`.
    fn assign(&self, index: usize) -> (u32, u32) {
        let (slot, dgid) = self.slots[index];
        (dgid, (slot as u32 + 1) * SPIDS_PER_CLUSTER)
    }

    fn record_usage(&mut self, index: usize, shape_count: u32) {
        let (slot, dgid) = self.slots[index];
        if slot >= self.clusters.len() {
            self.clusters.resize(slot + 1, FileIdCluster::new(0, 0));
        }
        self.clusters[slot] = FileIdCluster::new(dgid, shape_count);
    }

    fn drawing_group_record(&self, template: &DocumentTemplate, bstore: Option<&[u8]>) -> Vec<u8> {
        let assigned: BTreeSet<usize> = self.slots.iter().map(|&(slot, _)| slot).collect();
        let mut clusters = self.clusters.clone();
        for (slot, cluster) in clusters.iter_mut().enumerate() {
            let pinned = self.pinned.get(slot).copied().unwrap_or(false);
            if !pinned && !assigned.contains(&slot) {
                *cluster = FileIdCluster::new(0, 0);
            }
        }
        while clusters.last().is_some_and(|c| c.dgid.get() == 0) {
            clusters.pop();
        }

        let in_use = clusters.iter().enumerate().filter(|(_, c)| c.dgid.get() != 0);
        let spid_max = in_use
            .clone()
            .map(|(slot, c)| (slot as u32 + 1) * SPIDS_PER_CLUSTER + c.cspid_cur.get())
            .max()
            .unwrap_or(SPIDS_PER_CLUSTER);
        let shapes_saved = in_use.clone().map(|(_, c)| c.cspid_cur.get()).sum();
        let drawings_saved = in_use.count() as u32;

        let dgg = template.drawing_group.to_record(
            &clusters,
            spid_max,
            shapes_saved,
            drawings_saved,
            bstore,
        );
        let mut group = RecordBuilder::container(0, record_type::PP_DRAWING_GROUP);
        group.write_child(&dgg);
        group.build()
    }
}

fn encode_document(
    template: &DocumentTemplate,
    drawing_group: &[u8],
    first_slide_persist: u32,
    slide_count: usize,
) -> Vec<u8> {
    let mut document = RecordBuilder::container(0, record_type::DOCUMENT);
    for child in &template.children {
        match child {
            DocumentChild::Raw(bytes) => {
                document.write_child(bytes);
            },
            DocumentChild::DrawingGroup => {
                document.write_child(drawing_group);
            },
            DocumentChild::SlideList if slide_count > 0 => {
                let mut list =
                    RecordBuilder::container(slide_list::SLIDES, record_type::SLIDE_LIST_WITH_TEXT);
                for index in 0..slide_count as u32 {
                    let mut entry = Vec::with_capacity(20);
                    entry.extend_from_slice(&(first_slide_persist + index).to_le_bytes());
                    entry.extend_from_slice(&SLIDE_PERSIST_NON_OUTLINE_DATA.to_le_bytes());
                    entry.extend_from_slice(&0u32.to_le_bytes());
                    entry.extend_from_slice(&(FIRST_SLIDE_ID + index).to_le_bytes());
                    entry.extend_from_slice(&0u32.to_le_bytes());
                    list.write_child(&atom(0, 0, record_type::SLIDE_PERSIST_ATOM, &entry));
                }
                document.write_child(&list.build());
            },
            DocumentChild::SlideList => {},
        }
    }
    document.build()
}

/// Hands out consecutive shape ids within one drawing's cluster.
struct SpidAllocator {
    base: u32,
    next: u32,
}

impl SpidAllocator {
    fn new(base: u32) -> Self {
        Self { base, next: base }
    }

    fn allocate(&mut self) -> Result<u32> {
        if self.next - self.base >= SPIDS_PER_CLUSTER {
            return Err(Error::Unsupported(format!(
                "a slide drawing is limited to {} shapes",
                SPIDS_PER_CLUSTER - 2
            )));
        }
        self.next += 1;
        Ok(self.next - 1)
    }

    fn used(&self) -> u32 {
        self.next - self.base
    }

    fn last(&self) -> u32 {
        self.next.saturating_sub(1)
    }
}

/// Encode a slide container; returns the bytes and the number of shape ids used.
fn encode_slide(
    slide: &Slide,
    dgid: u32,
    base_spid: u32,
    default_master: u32,
) -> Result<(Vec<u8>, u32)> {
    let layout = slide.layout();
    let mut slide_atom = Vec::with_capacity(24);
    slide_atom.extend_from_slice(&layout.geometry.to_le_bytes());
    slide_atom.extend_from_slice(&layout.placeholders);
    let master = if layout.master_id == 0 {
        default_master
    } else {
        layout.master_id
    };
    slide_atom.extend_from_slice(&master.to_le_bytes());
    slide_atom.extend_from_slice(&0u32.to_le_bytes());
    slide_atom.extend_from_slice(&layout.flags.to_le_bytes());
    slide_atom.extend_from_slice(&0u16.to_le_bytes());

    let mut spids = SpidAllocator::new(base_spid);
    let patriarch_spid = spids.allocate()?;
    let background_spid = spids.allocate()?;

    let mut group = RecordBuilder::container(0, escher_type::SPGR_CONTAINER);
    let mut patriarch = RecordBuilder::container(0, escher_type::SP_CONTAINER);
    patriarch.write_child(&atom(1, 0, escher_type::SPGR, &Rect::default().to_ltrb_bytes()));
    patriarch.write_child(&sp_record(
        shape_type::NOT_PRIMITIVE,
        patriarch_spid,
        ShapeFlags::GROUP | ShapeFlags::PATRIARCH,
    ));
    group.write_child(&patriarch.build());
    for shape in slide.shapes() {
        group.write_child(&encode_shape(shape, &mut spids, false)?);
    }

    let background = match &slide.background {
        Some(frame) => encode_frame(frame, background_spid, None, None),
        None => {
            let mut frame = ShapeFrame::new(shape_type::RECTANGLE);
            frame.flags = ShapeFlags::BACKGROUND | ShapeFlags::HAVE_SPT;
            frame.properties = background_properties();
            encode_frame(&frame, background_spid, None, None)
        },
    };

    let mut drawing = RecordBuilder::container(0, escher_type::DG_CONTAINER);
    drawing.write_child(&dg_record(dgid, spids.used(), spids.last()));
    drawing.write_child(&group.build());
    drawing.write_child(&background);
    let mut pp_drawing = RecordBuilder::container(0, record_type::PP_DRAWING);
    pp_drawing.write_child(&drawing.build());

    let mut container = RecordBuilder::container(0, record_type::SLIDE);
    container.write_child(&atom(2, 0, record_type::SLIDE_ATOM, &slide_atom));
    container.write_child(&slide.leading_records);
    container.write_child(&pp_drawing.build());
    if slide.trailing_records.is_empty() {
        container.write_child(&color_scheme_record());
    } else {
        container.write_child(&slide.trailing_records);
    }
    Ok((container.build(), spids.used()))
}

/// Encode a shape (and group members) with fresh shape ids.
fn encode_shape(shape: &Shape, spids: &mut SpidAllocator, in_group: bool) -> Result<Vec<u8>> {
    let frame = shape.frame();
    let spid = spids.allocate()?;
    let mut frame = frame.clone();
    frame.flags.set(ShapeFlags::CHILD, in_group);
    frame.flags.remove(ShapeFlags::PATRIARCH);

    let Shape::Generic(GenericShape {
        text,
        group: Some(group),
        ..
    }) = shape
    else {
        return Ok(encode_frame(&frame, spid, shape.text_run(), None));
    };

    let mut container = RecordBuilder::container(0, escher_type::SPGR_CONTAINER);
    container.write_child(&encode_frame(&frame, spid, text.as_ref(), Some(group.bounds)));
    for child in &group.children {
        container.write_child(&encode_shape(child, spids, true)?);
    }
    Ok(container.build())
}

/// Encode one `SpContainer`.
fn encode_frame(
    frame: &ShapeFrame,
    spid: u32,
    text: Option<&TextRun>,
    bounds: Option<Rect>,
) -> Vec<u8> {
    let mut container = RecordBuilder::container(0, escher_type::SP_CONTAINER);
    if let Some(bounds) = bounds {
        container.write_child(&atom(1, 0, escher_type::SPGR, &bounds.to_ltrb_bytes()));
    }
    let mut flags = frame.flags;
    flags.set(ShapeFlags::HAVE_ANCHOR, frame.anchor.is_some());
    container.write_child(&sp_record(frame.geometry, spid, flags));
    if !frame.properties.is_empty() {
        container.write_child(&frame.properties.to_record(escher_type::OPT));
    }
    for record in &frame.escher_extras {
        container.write_child(record);
    }
    if let Some(anchor) = &frame.anchor {
        let anchor = match (anchor, frame.flags.contains(ShapeFlags::CHILD)) {
            (Anchor::Client(rect), true) => Anchor::Child(*rect),
            (other, _) => *other,
        };
        container.write_child(&anchor.to_record());
    }
    if frame.placeholder.is_some() || !frame.client_extras.is_empty() {
        let mut client = RecordBuilder::container(0, escher_type::CLIENT_DATA);
        if let Some(placeholder) = &frame.placeholder {
            client.write_child(&atom(
                0,
                0,
                record_type::OE_PLACEHOLDER_ATOM,
                &placeholder.to_bytes(),
            ));
        }
        for record in &frame.client_extras {
            client.write_child(record);
        }
        container.write_child(&client.build());
    }
    if let Some(text) = text {
        let mut textbox = RecordBuilder::container(0, escher_type::CLIENT_TEXTBOX);
        textbox.write_child(&encode_text_block(text));
        container.write_child(&textbox.build());
    }
    container.build()
}

/// Header atom, text atom, style atom and kept records of a text block.
pub(crate) fn encode_text_block(run: &TextRun) -> Vec<u8> {
    let mut out = atom(
        0,
        0,
        record_type::TEXT_HEADER_ATOM,
        &run.text_type().to_u32().to_le_bytes(),
    );
    let text = run.text();
    if text.chars().all(|c| (c as u32) < 0x100) {
        let bytes: Vec<u8> = text.chars().map(|c| c as u8).collect();
        out.extend(atom(0, 0, record_type::TEXT_BYTES_ATOM, &bytes));
    } else {
        out.extend(atom(0, 0, record_type::TEXT_CHARS_ATOM, &encode_utf16le(text)));
    }
    if let Some(style) = run.style() {
        out.extend(atom(0, 0, record_type::STYLE_TEXT_PROP_ATOM, &style.to_bytes()));
    }
    for record in &run.extras {
        out.extend_from_slice(record);
    }
    out
}
