//! Decode a `.ppt` file into a [`Presentation`].

use std::collections::{BTreeMap, HashSet};
use std::io::Cursor;

use super::current_user::CurrentUser;
use super::document::{DocumentChild, DocumentTemplate, FIRST_MASTER_ID};
use super::escher::{
    Anchor, DrawingGroup, Placeholder, PropertyTable, Rect, ShapeFlags, escher_type, parse_sp,
};
use super::persist::PersistDirectory;
use super::pictures::PictureStore;
use super::records::{Record, record_type, slide_list};
use super::text_prop::StyleTextProp;
use super::{CURRENT_USER_STREAM, DOCUMENT_STREAM, PICTURES_STREAM};
use crate::common::binary::{decode_utf16le, read_u32_le};
use crate::common::{Error, Result};
use crate::deck::{Group, Presentation, Shape, ShapeFrame, Slide, SlideLayout, TextRun, TextType};
use crate::ole::{OleFile, is_ole_file};

/// One entry of a `SlideListWithText`.
#[derive(Debug)]
struct SlideListEntry {
    persist_id: u32,
    /// Text blocks that shapes reference through `OutlineTextRefAtom`
    texts: Vec<TextRun>,
}

pub fn read_presentation(data: &[u8]) -> Result<Presentation> {
    if !is_ole_file(data) {
        return Err(Error::NotPresentation(
            "missing compound file signature".to_string(),
        ));
    }
    let mut ole = OleFile::open(Cursor::new(data))?;
    if !ole.exists(&[DOCUMENT_STREAM]) {
        return Err(Error::NotPresentation(format!(
            "no '{DOCUMENT_STREAM}' stream"
        )));
    }
    let stream = ole.open_stream(&[DOCUMENT_STREAM])?;
    let current_user = CurrentUser::parse(&ole.open_stream(&[CURRENT_USER_STREAM])?)?;
    let pictures_stream = if ole.exists(&[PICTURES_STREAM]) {
        Some(ole.open_stream(&[PICTURES_STREAM])?)
    } else {
        None
    };

    let directory = PersistDirectory::load(&stream, current_user.offset_to_current_edit)?;
    let doc_offset = directory.offset_of(directory.doc_persist_id).ok_or_else(|| {
        Error::CorruptedFile(format!(
            "document persist id {} has no offset",
            directory.doc_persist_id
        ))
    })?;
    let document = Record::parse(&stream, doc_offset as usize)?;
    if document.record_type() != record_type::DOCUMENT {
        return Err(Error::CorruptedFile(format!(
            "persist id {} is record 0x{:04X}, not a document",
            directory.doc_persist_id,
            document.record_type()
        )));
    }

    let mut children = Vec::new();
    let mut slide_entries = Vec::new();
    let mut dropped: HashSet<u32> = HashSet::new();
    let mut default_master_id = None;
    let mut drawing_group = DrawingGroup::default();
    let mut pictures = PictureStore::new();

    for child in document.children()? {
        match (child.record_type(), child.instance()) {
            (record_type::SLIDE_LIST_WITH_TEXT, slide_list::SLIDES) => {
                slide_entries = parse_slide_list(&child)?;
                children.push(DocumentChild::SlideList);
            },
            (record_type::SLIDE_LIST_WITH_TEXT, slide_list::NOTES) => {
                dropped.extend(parse_slide_list(&child)?.iter().map(|e| e.persist_id));
            },
            (record_type::SLIDE_LIST_WITH_TEXT, slide_list::MASTERS) => {
                default_master_id = first_slide_id(&child)?;
                children.push(DocumentChild::Raw(child.raw.to_vec()));
            },
            (record_type::PP_DRAWING_GROUP, _) => {
                let container = child.find_child(escher_type::DGG_CONTAINER)?.ok_or_else(|| {
                    Error::CorruptedFile("drawing group without DggContainer".to_string())
                })?;
                let (group, bstore) = DrawingGroup::parse(&container)?;
                pictures = PictureStore::load(bstore.as_ref(), pictures_stream.as_deref())?;
                drawing_group = group;
                children.push(DocumentChild::DrawingGroup);
            },
            _ => children.push(DocumentChild::Raw(child.raw.to_vec())),
        }
    }
    ensure_marker(&mut children, DocumentChild::DrawingGroup);
    ensure_marker(&mut children, DocumentChild::SlideList);

    let mut slides = Vec::with_capacity(slide_entries.len());
    for entry in &slide_entries {
        dropped.insert(entry.persist_id);
        let offset = directory.offset_of(entry.persist_id).ok_or_else(|| {
            Error::CorruptedFile(format!("slide persist id {} has no offset", entry.persist_id))
        })?;
        let record = Record::parse(&stream, offset as usize)?;
        if record.record_type() != record_type::SLIDE {
            return Err(Error::CorruptedFile(format!(
                "slide persist id {} is record 0x{:04X}",
                entry.persist_id,
                record.record_type()
            )));
        }
        slides.push(decode_slide(&record, &entry.texts)?);
    }

    let mut objects = BTreeMap::new();
    for (id, offset) in directory.entries() {
        if id == directory.doc_persist_id || dropped.contains(&id) {
            continue;
        }
        match Record::parse(&stream, offset as usize) {
            Ok(record) if record.record_type() == record_type::SLIDE => {
                log::debug!("dropping unlisted slide object {id}");
            },
            Ok(record) => {
                objects.insert(id, record.raw.to_vec());
            },
            Err(e) => log::warn!("skipping unreadable persist object {id}: {e}"),
        }
    }

    let streams = ole
        .list_streams()
        .into_iter()
        .filter(|path| {
            !(path.len() == 1
                && [DOCUMENT_STREAM, CURRENT_USER_STREAM, PICTURES_STREAM]
                    .contains(&path[0].as_str()))
        })
        .map(|path| {
            let parts: Vec<&str> = path.iter().map(String::as_str).collect();
            let bytes = ole.open_stream(&parts)?;
            Ok((path, bytes))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut template = DocumentTemplate {
        root_clsid: ole.root_clsid(),
        doc_persist_id: directory.doc_persist_id,
        children,
        objects,
        drawing_group,
        used_dgids: Default::default(),
        default_master_id: default_master_id.unwrap_or(FIRST_MASTER_ID),
        streams,
        user_name: current_user.user_name,
    };
    template.collect_used_dgids()?;

    log::debug!(
        "loaded deck: {} slides, {} persist objects, {} pictures",
        slides.len(),
        template.objects.len(),
        pictures.len()
    );
    Ok(Presentation::from_parts(slides, pictures, template))
}

fn ensure_marker(children: &mut Vec<DocumentChild>, marker: DocumentChild) {
    if children.contains(&marker) {
        return;
    }
    // Before the trailing EndDocument atom.
    let at = children.len().saturating_sub(1);
    children.insert(at, marker);
}

/// Slide id of the first entry of a slide list.
fn first_slide_id(list: &Record<'_>) -> Result<Option<u32>> {
    Ok(match list.find_child(record_type::SLIDE_PERSIST_ATOM)? {
        Some(atom) => Some(read_u32_le(atom.data, 12)?),
        None => None,
    })
}

fn parse_slide_list(list: &Record<'_>) -> Result<Vec<SlideListEntry>> {
    let mut entries: Vec<SlideListEntry> = Vec::new();
    let mut pending: Vec<Record<'_>> = Vec::new();

    for child in list.children()? {
        if child.record_type() == record_type::SLIDE_PERSIST_ATOM {
            if let Some(entry) = entries.last_mut() {
                entry.texts = split_text_blocks(&pending);
            }
            pending.clear();
            entries.push(SlideListEntry {
                persist_id: read_u32_le(child.data, 0)?,
                texts: Vec::new(),
            });
        } else {
            pending.push(child);
        }
    }
    if let Some(entry) = entries.last_mut() {
        entry.texts = split_text_blocks(&pending);
    }
    Ok(entries)
}

/// Split a record run into text blocks, each starting at a `TextHeaderAtom`.
fn split_text_blocks(records: &[Record<'_>]) -> Vec<TextRun> {
    let mut blocks = Vec::new();
    let mut start = None;
    for (i, record) in records.iter().enumerate() {
        if record.record_type() == record_type::TEXT_HEADER_ATOM {
            if let Some(s) = start {
                blocks.extend(decode_text_block(&records[s..i]));
            }
            start = Some(i);
        }
    }
    if let Some(s) = start {
        blocks.extend(decode_text_block(&records[s..]));
    }
    blocks
}

/// Decode records starting with a `TextHeaderAtom`.
fn decode_text_block(records: &[Record<'_>]) -> Option<TextRun> {
    let (header, rest) = records.split_first()?;
    let text_type = TextType::from_u32(read_u32_le(header.data, 0).ok()?);

    let mut text = String::new();
    let mut style_bytes = None;
    let mut extras = Vec::new();
    for record in rest {
        match record.record_type() {
            record_type::TEXT_CHARS_ATOM => text = decode_utf16le(record.data),
            record_type::TEXT_BYTES_ATOM => text = record.data.iter().map(|&b| b as char).collect(),
            record_type::STYLE_TEXT_PROP_ATOM => style_bytes = Some(record.data),
            _ => extras.push(record.raw.to_vec()),
        }
    }
    let text_len = text.encode_utf16().count();
    let style = style_bytes.map(|bytes| StyleTextProp::decode(bytes, text_len));
    Some(TextRun::from_parts(text_type, text, style, extras))
}

fn decode_slide(record: &Record<'_>, texts: &[TextRun]) -> Result<Slide> {
    let mut layout = SlideLayout::default();
    let mut leading = Vec::new();
    let mut trailing = Vec::new();
    let mut shapes = Vec::new();
    let mut background = None;
    let mut seen_drawing = false;

    for child in record.children()? {
        match child.record_type() {
            record_type::SLIDE_ATOM => layout = SlideLayout::parse(child.data)?,
            record_type::PP_DRAWING => {
                seen_drawing = true;
                (shapes, background) = decode_drawing(&child, texts)?;
            },
            _ if seen_drawing => trailing.extend_from_slice(child.raw),
            _ => leading.extend_from_slice(child.raw),
        }
    }
    Ok(Slide::from_parts(shapes, layout, background, leading, trailing))
}

/// Shapes and background of a `PPDrawing`. The patriarch is not a model shape.
fn decode_drawing(
    drawing: &Record<'_>,
    texts: &[TextRun],
) -> Result<(Vec<Shape>, Option<ShapeFrame>)> {
    let Some(container) = drawing.find_child(escher_type::DG_CONTAINER)? else {
        return Ok((Vec::new(), None));
    };
    let mut shapes = Vec::new();
    let mut background = None;
    for child in container.children()? {
        match child.record_type() {
            escher_type::SPGR_CONTAINER => {
                let (_, members) = decode_group_members(&child, texts)?;
                shapes = members;
            },
            escher_type::SP_CONTAINER => {
                let (frame, _, _) = decode_frame(&child, texts)?;
                if frame.flags.contains(ShapeFlags::BACKGROUND) {
                    background = Some(frame);
                }
            },
            escher_type::DG => {},
            other => log::debug!("ignoring drawing record 0x{other:04X}"),
        }
    }
    Ok((shapes, background))
}

/// The group's own shape container (first child) and its members.
fn decode_group_members<'a>(
    spgr: &Record<'a>,
    texts: &[TextRun],
) -> Result<(Option<Record<'a>>, Vec<Shape>)> {
    let mut children = spgr.children()?.into_iter();
    let own = children.next();
    let mut members = Vec::new();
    for child in children {
        match child.record_type() {
            escher_type::SP_CONTAINER => {
                let (frame, text, _) = decode_frame(&child, texts)?;
                if frame.flags.contains(ShapeFlags::DELETED) {
                    continue;
                }
                members.push(Shape::from_frame(frame, text, None));
            },
            escher_type::SPGR_CONTAINER => members.push(decode_group(&child, texts)?),
            other => log::debug!("ignoring group member record 0x{other:04X}"),
        }
    }
    Ok((own, members))
}

fn decode_group(spgr: &Record<'_>, texts: &[TextRun]) -> Result<Shape> {
    let (own, children) = decode_group_members(spgr, texts)?;
    let own = own.ok_or_else(|| Error::CorruptedFile("empty shape group".to_string()))?;
    let (frame, text, bounds) = decode_frame(&own, texts)?;
    Ok(Shape::from_frame(
        frame,
        text,
        Some(Group {
            bounds: bounds.unwrap_or_default(),
            children,
        }),
    ))
}

/// Decode one `SpContainer`: frame, text block and group bounds.
fn decode_frame(
    container: &Record<'_>,
    texts: &[TextRun],
) -> Result<(ShapeFrame, Option<TextRun>, Option<Rect>)> {
    let mut sp = None;
    let mut frame = ShapeFrame::new(0);
    let mut text = None;
    let mut bounds = None;

    for child in container.children()? {
        match child.record_type() {
            escher_type::SP => {
                let (spid, flags) = parse_sp(child.data)?;
                frame.geometry = child.instance();
                frame.shape_id = spid;
                frame.flags = flags;
                sp = Some(spid);
            },
            escher_type::SPGR => bounds = Some(Rect::parse_ltrb(child.data)?),
            escher_type::OPT => {
                frame.properties = PropertyTable::parse(child.data, child.instance())?;
            },
            escher_type::CLIENT_ANCHOR => frame.anchor = Some(Anchor::parse_client(child.data)?),
            escher_type::CHILD_ANCHOR => {
                frame.anchor = Some(Anchor::Child(Rect::parse_ltrb(child.data)?));
            },
            escher_type::CLIENT_DATA => {
                for record in child.children()? {
                    if record.record_type() == record_type::OE_PLACEHOLDER_ATOM {
                        frame.placeholder = Some(Placeholder::parse(record.data)?);
                    } else {
                        frame.client_extras.push(record.raw.to_vec());
                    }
                }
            },
            escher_type::CLIENT_TEXTBOX => text = decode_textbox(&child, texts)?,
            _ => frame.escher_extras.push(child.raw.to_vec()),
        }
    }

    if sp.is_none() {
        return Err(Error::CorruptedFile(
            "shape container without Sp record".to_string(),
        ));
    }
    Ok((frame, text, bounds))
}

/// Text of a client textbox: inline, or resolved from the slide list.
fn decode_textbox(textbox: &Record<'_>, texts: &[TextRun]) -> Result<Option<TextRun>> {
    let records = textbox.children()?;
    if let Some(reference) = records
        .iter()
        .find(|r| r.record_type() == record_type::OUTLINE_TEXT_REF_ATOM)
    {
        let index = read_u32_le(reference.data, 0)? as usize;
        let resolved = texts.get(index).cloned();
        if resolved.is_none() {
            log::warn!(
                "text reference {index} out of range ({} blocks in slide list)",
                texts.len()
            );
        }
        return Ok(resolved);
    }
    let start = records
        .iter()
        .position(|r| r.record_type() == record_type::TEXT_HEADER_ATOM);
    Ok(start.and_then(|s| split_text_blocks(&records[s..]).into_iter().next()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ppt::records::{RecordBuilder, atom};

    fn text_block(text_type: u32, text: &str) -> Vec<u8> {
        let mut out = atom(0, 0, record_type::TEXT_HEADER_ATOM, &text_type.to_le_bytes());
        out.extend(atom(0, 0, record_type::TEXT_BYTES_ATOM, text.as_bytes()));
        out
    }

    #[test]
    fn test_slide_list_text_blocks() {
        let mut list =
            RecordBuilder::container(slide_list::SLIDES, record_type::SLIDE_LIST_WITH_TEXT);
        let mut persist = [0u8; 20];
        persist[0..4].copy_from_slice(&3u32.to_le_bytes());
        list.write_child(&atom(0, 0, record_type::SLIDE_PERSIST_ATOM, &persist));
        list.write_child(&text_block(0, "Amazing Grace"));
        list.write_child(&text_block(1, "How sweet the sound"));
        persist[0..4].copy_from_slice(&4u32.to_le_bytes());
        list.write_child(&atom(0, 0, record_type::SLIDE_PERSIST_ATOM, &persist));
        let bytes = list.build();

        let entries = parse_slide_list(&Record::parse(&bytes, 0).unwrap()).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].persist_id, 3);
        assert_eq!(entries[0].texts.len(), 2);
        assert_eq!(entries[0].texts[0].text_type(), TextType::Title);
        assert_eq!(entries[0].texts[1].text(), "How sweet the sound");
        assert!(entries[1].texts.is_empty());
    }

    #[test]
    fn test_outline_reference_resolves() {
        let texts = vec![
            TextRun::new(TextType::Title, "Title"),
            TextRun::new(TextType::Body, "Body"),
        ];
        let mut textbox = RecordBuilder::container(0, escher_type::CLIENT_TEXTBOX);
        textbox.write_child(&atom(0, 0, record_type::OUTLINE_TEXT_REF_ATOM, &1u32.to_le_bytes()));
        let bytes = textbox.build();
        let run = decode_textbox(&Record::parse(&bytes, 0).unwrap(), &texts).unwrap();
        assert_eq!(run.map(|r| r.text().to_string()), Some("Body".to_string()));

        let mut dangling = RecordBuilder::container(0, escher_type::CLIENT_TEXTBOX);
        dangling.write_child(&atom(0, 0, record_type::OUTLINE_TEXT_REF_ATOM, &9u32.to_le_bytes()));
        let bytes = dangling.build();
        assert!(decode_textbox(&Record::parse(&bytes, 0).unwrap(), &texts).unwrap().is_none());
    }

    #[test]
    fn test_non_ole_input_is_rejected() {
        assert!(matches!(
            read_presentation(b"definitely not a deck"),
            Err(Error::NotPresentation(_))
        ));
    }
}
