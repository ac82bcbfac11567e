//! Escher (Office drawing) records as embedded in PowerPoint streams.
//!
//! Based on the OfficeArt record layouts: drawing group (`Dgg`), drawings (`Dg`),
//! shape containers, property tables and client anchors.

use bitflags::bitflags;
use zerocopy::byteorder::{I16, I32, LittleEndian, U16, U32};
use zerocopy::{FromBytes, IntoBytes};
use zerocopy_derive::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use super::records::{Record, RecordBuilder, atom};
use crate::common::binary::read_u16_le;
use crate::common::{Error, Result};

/// Escher record types
pub mod escher_type {
    pub const DGG_CONTAINER: u16 = 0xF000;
    pub const BSTORE_CONTAINER: u16 = 0xF001;
    pub const DG_CONTAINER: u16 = 0xF002;
    pub const SPGR_CONTAINER: u16 = 0xF003;
    pub const SP_CONTAINER: u16 = 0xF004;
    pub const SOLVER_CONTAINER: u16 = 0xF005;
    pub const DGG: u16 = 0xF006;
    pub const BSE: u16 = 0xF007;
    pub const DG: u16 = 0xF008;
    pub const SPGR: u16 = 0xF009;
    pub const SP: u16 = 0xF00A;
    pub const OPT: u16 = 0xF00B;
    pub const CLIENT_TEXTBOX: u16 = 0xF00D;
    pub const CHILD_ANCHOR: u16 = 0xF00F;
    pub const CLIENT_ANCHOR: u16 = 0xF010;
    pub const CLIENT_DATA: u16 = 0xF011;
    pub const BLIP_FIRST: u16 = 0xF018;
    pub const BLIP_LAST: u16 = 0xF117;
    pub const SPLIT_MENU_COLORS: u16 = 0xF11E;
    pub const TERTIARY_OPT: u16 = 0xF122;
}

/// Shape geometry types (`Sp` record instance)
pub mod shape_type {
    pub const NOT_PRIMITIVE: u16 = 0;
    pub const RECTANGLE: u16 = 1;
    pub const LINE: u16 = 20;
    pub const PICTURE_FRAME: u16 = 75;
    pub const HOST_CONTROL: u16 = 201;
    pub const TEXT_BOX: u16 = 202;
}

bitflags! {
    /// Flags of the `Sp` record
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ShapeFlags: u32 {
        /// Shape is a group
        const GROUP = 0x0001;
        /// Shape is a child of a group
        const CHILD = 0x0002;
        /// Shape is the topmost group (patriarch)
        const PATRIARCH = 0x0004;
        /// Shape has been deleted
        const DELETED = 0x0008;
        /// Shape is an OLE object
        const OLE_SHAPE = 0x0010;
        /// Shape has a valid master
        const HAVE_MASTER = 0x0020;
        /// Shape is flipped horizontally
        const FLIP_H = 0x0040;
        /// Shape is flipped vertically
        const FLIP_V = 0x0080;
        /// Shape is a connector
        const CONNECTOR = 0x0100;
        /// Shape has an anchor
        const HAVE_ANCHOR = 0x0200;
        /// Shape is a background shape
        const BACKGROUND = 0x0400;
        /// Shape has a shape type property
        const HAVE_SPT = 0x0800;
    }
}

/// Property numbers (low 14 bits of the property id)
pub mod prop_id {
    pub const TEXT_ID: u16 = 0x0080;
    pub const WRAP_TEXT: u16 = 0x0085;
    pub const ANCHOR_TEXT: u16 = 0x0087;
    pub const TEXT_BOOLEANS: u16 = 0x00BF;
    pub const PIB: u16 = 0x0104;
    pub const PROTECTION_BOOLEANS: u16 = 0x017F;
    pub const FILL_TYPE: u16 = 0x0180;
    pub const FILL_COLOR: u16 = 0x0181;
    pub const FILL_BACK_COLOR: u16 = 0x0183;
    pub const FILL_BLIP: u16 = 0x0186;
    pub const FILL_RECT_RIGHT: u16 = 0x0193;
    pub const FILL_RECT_BOTTOM: u16 = 0x0194;
    pub const FILL_BOOLEANS: u16 = 0x01BF;
    pub const LINE_COLOR: u16 = 0x01C0;
    pub const LINE_FILL_BLIP: u16 = 0x01C5;
    pub const LINE_BOOLEANS: u16 = 0x01FF;
    pub const SHADOW_COLOR: u16 = 0x0201;
    pub const BW_MODE: u16 = 0x0304;
}

/// Property id flag: the value is a blip store index
pub const PROP_IS_BLIP: u16 = 0x4000;
/// Property id flag: the value is the length of trailing complex data
pub const PROP_IS_COMPLEX: u16 = 0x8000;
const PROP_NUMBER_MASK: u16 = 0x3FFF;

/// Scheme color flag of an OfficeArt color reference
pub const SCHEME_COLOR: u32 = 0x0800_0000;

/// Largest number of shape ids one drawing cluster can hand out.
pub const SPIDS_PER_CLUSTER: u32 = 1024;

type U16Le = U16<LittleEndian>;
type U32Le = U32<LittleEndian>;
type I16Le = I16<LittleEndian>;
type I32Le = I32<LittleEndian>;

/// Drawing group header (without clusters)
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
pub struct DggHeader {
    /// One more than the highest shape id in use
    pub spid_max: U32Le,
    /// Number of clusters + 1
    pub cidcl: U32Le,
    pub csp_saved: U32Le,
    pub cdg_saved: U32Le,
}

/// File id cluster entry
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned,
)]
#[repr(C)]
pub struct FileIdCluster {
    pub dgid: U32Le,
    /// Shape ids used in the cluster
    pub cspid_cur: U32Le,
}

impl FileIdCluster {
    pub fn new(dgid: u32, cspid_cur: u32) -> Self {
        Self {
            dgid: dgid.into(),
            cspid_cur: cspid_cur.into(),
        }
    }
}

/// `Dg` record payload
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
pub struct DgData {
    /// Number of shapes in this drawing
    pub csp: U32Le,
    /// Last shape id used
    pub spid_cur: U32Le,
}

/// `Sp` record payload
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
pub struct SpData {
    pub spid: U32Le,
    pub flags: U32Le,
}

/// `Spgr` record payload and 16-byte anchors
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
struct RectData {
    a: I32Le,
    b: I32Le,
    c: I32Le,
    d: I32Le,
}

/// 8-byte client anchor (top, left, right, bottom)
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
struct SmallRectData {
    top: I16Le,
    left: I16Le,
    right: I16Le,
    bottom: I16Le,
}

/// `OEPlaceholderAtom` payload
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned)]
#[repr(C)]
struct PlaceholderData {
    position: U32Le,
    placement_id: u8,
    size: u8,
    unused: U16Le,
}

/// Rectangle in master units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Decode an `Spgr` payload or child anchor (left, top, right, bottom).
    pub fn parse_ltrb(data: &[u8]) -> Result<Self> {
        let (raw, _) = RectData::read_from_prefix(data)
            .map_err(|_| Error::CorruptedFile("rectangle record too short".to_string()))?;
        Ok(Self::new(raw.a.get(), raw.b.get(), raw.c.get(), raw.d.get()))
    }

    pub fn to_ltrb_bytes(&self) -> Vec<u8> {
        RectData {
            a: self.left.into(),
            b: self.top.into(),
            c: self.right.into(),
            d: self.bottom.into(),
        }
        .as_bytes()
        .to_vec()
    }

    fn fits_i16(&self) -> bool {
        [self.left, self.top, self.right, self.bottom]
            .iter()
            .all(|&v| i16::try_from(v).is_ok())
    }
}

/// Position of a shape: relative to the slide or to the enclosing group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Client(Rect),
    Child(Rect),
}

impl Anchor {
    pub fn rect(&self) -> Rect {
        match self {
            Anchor::Client(r) | Anchor::Child(r) => *r,
        }
    }

    /// Decode a `ClientAnchor` payload. Both the 8-byte and the 16-byte form store
    /// top, left, right, bottom.
    pub fn parse_client(data: &[u8]) -> Result<Self> {
        if data.len() >= 16 {
            let (raw, _) = RectData::read_from_prefix(data)
                .map_err(|_| Error::CorruptedFile("client anchor too short".to_string()))?;
            return Ok(Anchor::Client(Rect::new(
                raw.b.get(),
                raw.a.get(),
                raw.c.get(),
                raw.d.get(),
            )));
        }
        let (raw, _) = SmallRectData::read_from_prefix(data)
            .map_err(|_| Error::CorruptedFile("client anchor too short".to_string()))?;
        Ok(Anchor::Client(Rect::new(
            raw.left.get() as i32,
            raw.top.get() as i32,
            raw.right.get() as i32,
            raw.bottom.get() as i32,
        )))
    }

    /// Encode as a complete escher record.
    pub fn to_record(&self) -> Vec<u8> {
        match self {
            Anchor::Child(r) => atom(0, 0, escher_type::CHILD_ANCHOR, &r.to_ltrb_bytes()),
            Anchor::Client(r) if r.fits_i16() => {
                let raw = SmallRectData {
                    top: (r.top as i16).into(),
                    left: (r.left as i16).into(),
                    right: (r.right as i16).into(),
                    bottom: (r.bottom as i16).into(),
                };
                atom(0, 0, escher_type::CLIENT_ANCHOR, raw.as_bytes())
            },
            Anchor::Client(r) => {
                let raw = RectData {
                    a: r.top.into(),
                    b: r.left.into(),
                    c: r.right.into(),
                    d: r.bottom.into(),
                };
                atom(0, 0, escher_type::CLIENT_ANCHOR, raw.as_bytes())
            },
        }
    }
}

/// Placeholder ids of `OEPlaceholderAtom`
pub mod placeholder_id {
    pub const NONE: u8 = 0;
    pub const MASTER_TITLE: u8 = 1;
    pub const MASTER_BODY: u8 = 2;
    pub const TITLE: u8 = 13;
    pub const BODY: u8 = 14;
    pub const CENTER_TITLE: u8 = 15;
}

/// Placeholder binding of a shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder {
    pub position: u32,
    pub placement_id: u8,
    pub size: u8,
}

impl Placeholder {
    pub fn parse(data: &[u8]) -> Result<Self> {
        let (raw, _) = PlaceholderData::read_from_prefix(data)
            .map_err(|_| Error::CorruptedFile("placeholder atom too short".to_string()))?;
        Ok(Self {
            position: raw.position.get(),
            placement_id: raw.placement_id,
            size: raw.size,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        PlaceholderData {
            position: self.position.into(),
            placement_id: self.placement_id,
            size: self.size,
            unused: 0u16.into(),
        }
        .as_bytes()
        .to_vec()
    }
}

/// One entry of a property table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    /// Property id including the blip and complex flags
    pub id: u16,
    pub value: u32,
    /// Trailing data of a complex property
    pub complex: Vec<u8>,
}

impl Property {
    pub fn simple(number: u16, value: u32) -> Self {
        Self {
            id: number & PROP_NUMBER_MASK,
            value,
            complex: Vec::new(),
        }
    }

    #[inline]
    pub fn number(&self) -> u16 {
        self.id & PROP_NUMBER_MASK
    }

    #[inline]
    pub fn is_complex(&self) -> bool {
        self.id & PROP_IS_COMPLEX != 0
    }

    /// Whether the value indexes the blip store.
    pub fn is_blip_ref(&self) -> bool {
        !self.is_complex()
            && matches!(
                self.number(),
                prop_id::PIB | prop_id::FILL_BLIP | prop_id::LINE_FILL_BLIP
            )
    }
}

/// `Opt` property table, kept sorted by property number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyTable {
    properties: Vec<Property>,
}

impl PropertyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode `count` entries followed by their complex data.
    pub fn parse(data: &[u8], count: u16) -> Result<Self> {
        let mut properties = Vec::with_capacity(count as usize);
        let mut pos = 0;
        for _ in 0..count {
            let id = read_u16_le(data, pos)?;
            let value = crate::common::binary::read_u32_le(data, pos + 2)?;
            properties.push(Property {
                id,
                value,
                complex: Vec::new(),
            });
            pos += 6;
        }
        for property in properties.iter_mut().filter(|p| p.is_complex()) {
            let len = property.value as usize;
            let end = (pos + len).min(data.len());
            if end - pos < len {
                log::warn!(
                    "complex property 0x{:04X} truncated ({} of {} bytes)",
                    property.number(),
                    end - pos,
                    len
                );
            }
            property.complex = data[pos..end].to_vec();
            property.value = property.complex.len() as u32;
            pos = end;
        }
        Ok(Self { properties })
    }

    /// Encode as a complete `Opt` record of the given type.
    pub fn to_record(&self, record_type: u16) -> Vec<u8> {
        let mut builder = RecordBuilder::new(3, self.properties.len() as u16, record_type);
        for property in &self.properties {
            builder.write_data(&property.id.to_le_bytes());
            builder.write_data(&property.value.to_le_bytes());
        }
        for property in self.properties.iter().filter(|p| p.is_complex()) {
            builder.write_data(&property.complex);
        }
        builder.build()
    }

    pub fn get(&self, number: u16) -> Option<u32> {
        self.properties
            .iter()
            .find(|p| p.number() == number)
            .map(|p| p.value)
    }

    /// Set a simple property, keeping the table sorted.
    pub fn set(&mut self, number: u16, value: u32) {
        match self.properties.iter_mut().find(|p| p.number() == number) {
            Some(existing) => {
                existing.id &= !PROP_IS_COMPLEX;
                existing.value = value;
                existing.complex.clear();
            },
            None => {
                let at = self
                    .properties
                    .partition_point(|p| p.number() < number);
                self.properties.insert(at, Property::simple(number, value));
            },
        }
    }

    pub fn remove(&mut self, number: u16) -> Option<u32> {
        let at = self.properties.iter().position(|p| p.number() == number)?;
        Some(self.properties.remove(at).value)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Property> {
        self.properties.iter()
    }

    /// Mutable access to every non-zero blip store reference.
    pub fn blip_refs_mut(&mut self) -> impl Iterator<Item = &mut u32> {
        self.properties
            .iter_mut()
            .filter(|p| p.is_blip_ref() && p.value != 0)
            .map(|p| &mut p.value)
    }
}

impl FromIterator<(u16, u32)> for PropertyTable {
    fn from_iter<T: IntoIterator<Item = (u16, u32)>>(iter: T) -> Self {
        let mut table = PropertyTable::new();
        for (number, value) in iter {
            table.set(number, value);
        }
        table
    }
}

/// Properties of a slide's background shape.
pub fn background_properties() -> PropertyTable {
    [
        (prop_id::PROTECTION_BOOLEANS, 0x0001_0001),
        (prop_id::FILL_COLOR, SCHEME_COLOR),
        (prop_id::FILL_BACK_COLOR, SCHEME_COLOR | 0x05),
        (prop_id::FILL_RECT_RIGHT, 10_064_750),
        (prop_id::FILL_RECT_BOTTOM, 7_778_750),
        (prop_id::FILL_BOOLEANS, 0x0012_0012),
        (prop_id::LINE_BOOLEANS, 0x0008_0000),
        (prop_id::BW_MODE, 9),
    ]
    .into_iter()
    .collect()
}

/// Default shape properties of a new drawing group.
pub fn drawing_group_default_properties() -> PropertyTable {
    let mut table: PropertyTable = [
        (prop_id::FILL_COLOR, SCHEME_COLOR | 0x04),
        (prop_id::FILL_BACK_COLOR, SCHEME_COLOR),
        (prop_id::FILL_BOOLEANS, 0x0010_0010),
        (prop_id::LINE_COLOR, SCHEME_COLOR | 0x01),
        (prop_id::LINE_BOOLEANS, 0x0008_0008),
        (prop_id::SHADOW_COLOR, SCHEME_COLOR | 0x02),
    ]
    .into_iter()
    .collect();
    for number in [prop_id::FILL_BLIP, prop_id::LINE_FILL_BLIP] {
        table.set(number, 0);
        if let Some(p) = table.properties.iter_mut().find(|p| p.number() == number) {
            p.id |= PROP_IS_BLIP;
        }
    }
    table
}

/// Default split menu colors of a new drawing group.
pub fn split_menu_colors_record() -> Vec<u8> {
    let mut data = Vec::with_capacity(16);
    for color in [0x0800_0004u32, 0x0800_0001, 0x0800_0002, 0x1000_00F7] {
        data.extend_from_slice(&color.to_le_bytes());
    }
    atom(0, 4, escher_type::SPLIT_MENU_COLORS, &data)
}

/// Drawing-group state: cluster table plus the records kept verbatim.
#[derive(Debug, Clone, Default)]
pub struct DrawingGroup {
    pub spid_max: u32,
    pub clusters: Vec<FileIdCluster>,
    /// Records after the blip store (default properties, split menu colors, ...)
    pub trailing: Vec<Vec<u8>>,
}

impl DrawingGroup {
    /// Decode a `DggContainer`, returning the blip store container when present.
    pub fn parse<'a>(container: &Record<'a>) -> Result<(Self, Option<Record<'a>>)> {
        let mut group = DrawingGroup::default();
        let mut bstore = None;
        for child in container.children()? {
            match child.record_type() {
                escher_type::DGG => {
                    let (header, rest) = DggHeader::read_from_prefix(child.data)
                        .map_err(|_| Error::CorruptedFile("Dgg record too short".to_string()))?;
                    group.spid_max = header.spid_max.get();
                    let count = header.cidcl.get().saturating_sub(1) as usize;
                    group.clusters = rest
                        .chunks_exact(8)
                        .take(count)
                        .filter_map(|chunk| FileIdCluster::read_from_bytes(chunk).ok())
                        .collect();
                },
                escher_type::BSTORE_CONTAINER => bstore = Some(child),
                _ => group.trailing.push(child.raw.to_vec()),
            }
        }
        Ok((group, bstore))
    }

    /// Encode a `DggContainer` with the given cluster table and blip store.
    pub fn to_record(
        &self,
        clusters: &[FileIdCluster],
        spid_max: u32,
        shapes_saved: u32,
        drawings_saved: u32,
        bstore: Option<&[u8]>,
    ) -> Vec<u8> {
        let header = DggHeader {
            spid_max: spid_max.into(),
            cidcl: (clusters.len() as u32 + 1).into(),
            csp_saved: shapes_saved.into(),
            cdg_saved: drawings_saved.into(),
        };
        let mut dgg = RecordBuilder::new(0, 0, escher_type::DGG);
        dgg.write_data(header.as_bytes());
        for cluster in clusters {
            dgg.write_data(cluster.as_bytes());
        }

        let mut container = RecordBuilder::container(0, escher_type::DGG_CONTAINER);
        container.write_child(&dgg.build());
        if let Some(bstore) = bstore {
            container.write_child(bstore);
        }
        for record in &self.trailing {
            container.write_child(record);
        }
        container.build()
    }
}

/// Encode an `Sp` record.
pub fn sp_record(geometry: u16, spid: u32, flags: ShapeFlags) -> Vec<u8> {
    let data = SpData {
        spid: spid.into(),
        flags: flags.bits().into(),
    };
    atom(2, geometry, escher_type::SP, data.as_bytes())
}

/// Encode a `Dg` record.
pub fn dg_record(dgid: u32, shape_count: u32, last_spid: u32) -> Vec<u8> {
    let data = DgData {
        csp: shape_count.into(),
        spid_cur: last_spid.into(),
    };
    atom(0, dgid as u16, escher_type::DG, data.as_bytes())
}

/// Decode an `Sp` payload into shape id and flags.
pub fn parse_sp(data: &[u8]) -> Result<(u32, ShapeFlags)> {
    let (raw, _) = SpData::read_from_prefix(data)
        .map_err(|_| Error::CorruptedFile("Sp record too short".to_string()))?;
    Ok((
        raw.spid.get(),
        ShapeFlags::from_bits_retain(raw.flags.get()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_table_sorted_insert() {
        let mut table = PropertyTable::new();
        table.set(prop_id::FILL_COLOR, 1);
        table.set(prop_id::PIB, 2);
        table.set(prop_id::FILL_TYPE, 9);
        let numbers: Vec<u16> = table.iter().map(Property::number).collect();
        assert_eq!(
            numbers,
            vec![prop_id::PIB, prop_id::FILL_TYPE, prop_id::FILL_COLOR]
        );
        table.set(prop_id::FILL_TYPE, 0);
        assert_eq!(table.get(prop_id::FILL_TYPE), Some(0));
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_complex_property_round_trip() {
        let mut builder = RecordBuilder::new(3, 2, escher_type::OPT);
        builder.write_data(&(0x0080u16).to_le_bytes());
        builder.write_data(&7u32.to_le_bytes());
        builder.write_data(&(0x0145u16 | PROP_IS_COMPLEX).to_le_bytes());
        builder.write_data(&4u32.to_le_bytes());
        builder.write_data(&[1, 2, 3, 4]);
        let bytes = builder.build();

        let record = Record::parse(&bytes, 0).unwrap();
        let table = PropertyTable::parse(record.data, record.instance()).unwrap();
        assert_eq!(table.get(0x0145), Some(4));
        assert_eq!(table.to_record(escher_type::OPT), bytes);
    }

    #[test]
    fn test_blip_refs_skip_empty_and_complex() {
        let mut table = drawing_group_default_properties();
        assert_eq!(table.blip_refs_mut().count(), 0);
        table.set(prop_id::PIB, 3);
        for value in table.blip_refs_mut() {
            *value += 10;
        }
        assert_eq!(table.get(prop_id::PIB), Some(13));
    }

    #[test]
    fn test_client_anchor_forms() {
        let small = Anchor::Client(Rect::new(432, 384, 5328, 1104));
        let bytes = small.to_record();
        assert_eq!(bytes.len(), 16);
        let record = Record::parse(&bytes, 0).unwrap();
        assert_eq!(Anchor::parse_client(record.data).unwrap(), small);

        let large = Anchor::Client(Rect::new(0, 0, 70_000, 40_000));
        let record_bytes = large.to_record();
        let record = Record::parse(&record_bytes, 0).unwrap();
        assert_eq!(record.data.len(), 16);
        assert_eq!(Anchor::parse_client(record.data).unwrap(), large);
    }

    #[test]
    fn test_dgg_round_trip() {
        let group = DrawingGroup {
            spid_max: 0,
            clusters: Vec::new(),
            trailing: vec![split_menu_colors_record()],
        };
        let clusters = [FileIdCluster::new(1, 3), FileIdCluster::new(2, 5)];
        let bytes = group.to_record(&clusters, 3077, 8, 2, None);
        let record = Record::parse(&bytes, 0).unwrap();
        let (parsed, bstore) = DrawingGroup::parse(&record).unwrap();
        assert!(bstore.is_none());
        assert_eq!(parsed.spid_max, 3077);
        assert_eq!(parsed.clusters, clusters);
        assert_eq!(parsed.trailing.len(), 1);
    }

    #[test]
    fn test_sp_record_round_trip() {
        let flags = ShapeFlags::HAVE_ANCHOR | ShapeFlags::HAVE_SPT;
        let bytes = sp_record(shape_type::TEXT_BOX, 1026, flags);
        let record = Record::parse(&bytes, 0).unwrap();
        assert_eq!(record.instance(), shape_type::TEXT_BOX);
        let (spid, flags) = parse_sp(record.data).unwrap();
        assert_eq!(spid, 1026);
        assert!(flags.contains(ShapeFlags::HAVE_SPT));
    }
}
