//! Record framing shared by the PowerPoint stream and its embedded Escher drawings.
//!
//! Every record starts with the same 8-byte header:
//! - version (low 4 bits) and instance (high 12 bits), packed into a u16
//! - record type (u16)
//! - payload length (u32)
//!
//! A version of `0xF` marks a container whose payload is a sequence of records.

use crate::common::binary::{read_u16_le, read_u32_le};
use crate::common::{Error, Result};

/// Size of a record header in bytes.
pub const HEADER_SIZE: usize = 8;

/// Version nibble that marks container records.
pub const CONTAINER_VERSION: u8 = 0x0F;

/// PowerPoint record types used by the reader and writer.
pub mod record_type {
    pub const DOCUMENT: u16 = 1000;
    pub const DOCUMENT_ATOM: u16 = 1001;
    pub const END_DOCUMENT: u16 = 1002;
    pub const SLIDE: u16 = 1006;
    pub const SLIDE_ATOM: u16 = 1007;
    pub const NOTES: u16 = 1008;
    pub const ENVIRONMENT: u16 = 1010;
    pub const SLIDE_PERSIST_ATOM: u16 = 1011;
    pub const MAIN_MASTER: u16 = 1016;
    pub const PP_DRAWING_GROUP: u16 = 1035;
    pub const PP_DRAWING: u16 = 1036;
    pub const FONT_COLLECTION: u16 = 2005;
    pub const FONT_ENTITY_ATOM: u16 = 2006;
    pub const COLOR_SCHEME_ATOM: u16 = 2032;
    pub const OE_PLACEHOLDER_ATOM: u16 = 3011;
    pub const TEXT_HEADER_ATOM: u16 = 3999;
    pub const TEXT_CHARS_ATOM: u16 = 4000;
    pub const STYLE_TEXT_PROP_ATOM: u16 = 4001;
    pub const TX_MASTER_STYLE_ATOM: u16 = 4003;
    pub const TEXT_BYTES_ATOM: u16 = 4008;
    pub const OUTLINE_TEXT_REF_ATOM: u16 = 3998;
    pub const CSTRING: u16 = 4026;
    pub const SLIDE_LIST_WITH_TEXT: u16 = 4080;
    pub const USER_EDIT_ATOM: u16 = 4085;
    pub const CURRENT_USER_ATOM: u16 = 4086;
    pub const PROG_TAGS: u16 = 5000;
    pub const PERSIST_PTR_HOLDER: u16 = 6001;
    pub const PERSIST_PTR_INCREMENTAL_BLOCK: u16 = 6002;
}

/// Instances of the `SlideListWithText` container.
pub mod slide_list {
    pub const SLIDES: u16 = 0;
    pub const MASTERS: u16 = 1;
    pub const NOTES: u16 = 2;
}

/// Record header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordHeader {
    /// Record version (4 bits)
    pub version: u8,
    /// Record instance (12 bits)
    pub instance: u16,
    /// Record type
    pub record_type: u16,
    /// Payload length, header excluded
    pub length: u32,
}

impl RecordHeader {
    pub fn new(version: u8, instance: u16, record_type: u16, length: u32) -> Self {
        Self {
            version: version & 0x0F,
            instance: instance & 0x0FFF,
            record_type,
            length,
        }
    }

    /// Decode the header at `offset`.
    pub fn parse(data: &[u8], offset: usize) -> Result<Self> {
        let ver_inst = read_u16_le(data, offset)?;
        let record_type = read_u16_le(data, offset + 2)?;
        let length = read_u32_le(data, offset + 4)?;
        Ok(Self {
            version: (ver_inst & 0x000F) as u8,
            instance: ver_inst >> 4,
            record_type,
            length,
        })
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut out = [0u8; HEADER_SIZE];
        let ver_inst = (self.version as u16 & 0x0F) | ((self.instance & 0x0FFF) << 4);
        out[0..2].copy_from_slice(&ver_inst.to_le_bytes());
        out[2..4].copy_from_slice(&self.record_type.to_le_bytes());
        out[4..8].copy_from_slice(&self.length.to_le_bytes());
        out
    }

    #[inline]
    pub fn is_container(&self) -> bool {
        self.version == CONTAINER_VERSION
    }
}

/// A record borrowed from a larger buffer.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    pub header: RecordHeader,
    /// Payload bytes
    pub data: &'a [u8],
    /// Header and payload
    pub raw: &'a [u8],
}

impl<'a> Record<'a> {
    /// Parse the record starting at `offset`. The declared length must fit the buffer.
    pub fn parse(data: &'a [u8], offset: usize) -> Result<Self> {
        let header = RecordHeader::parse(data, offset)?;
        let start = offset + HEADER_SIZE;
        let end = start
            .checked_add(header.length as usize)
            .filter(|&end| end <= data.len())
            .ok_or_else(|| {
                Error::CorruptedFile(format!(
                    "record 0x{:04X} at offset {} overruns its buffer ({} + {} > {})",
                    header.record_type,
                    offset,
                    start,
                    header.length,
                    data.len()
                ))
            })?;
        Ok(Self {
            header,
            data: &data[start..end],
            raw: &data[offset..end],
        })
    }

    #[inline]
    pub fn record_type(&self) -> u16 {
        self.header.record_type
    }

    #[inline]
    pub fn instance(&self) -> u16 {
        self.header.instance
    }

    #[inline]
    pub fn is_container(&self) -> bool {
        self.header.is_container()
    }

    /// Child records of a container. Atoms have no children.
    pub fn children(&self) -> Result<Vec<Record<'a>>> {
        if !self.is_container() {
            return Ok(Vec::new());
        }
        parse_sequence(self.data)
    }

    /// First direct child of the given type.
    pub fn find_child(&self, record_type: u16) -> Result<Option<Record<'a>>> {
        Ok(self
            .children()?
            .into_iter()
            .find(|child| child.record_type() == record_type))
    }
}

/// Parse back-to-back records filling `data` exactly.
pub fn parse_sequence(data: &[u8]) -> Result<Vec<Record<'_>>> {
    let mut records = Vec::new();
    let mut offset = 0;
    while offset < data.len() {
        let record = Record::parse(data, offset)?;
        offset += record.raw.len();
        records.push(record);
    }
    Ok(records)
}

/// Builds one record, either an atom from payload bytes or a container from children.
#[derive(Debug)]
pub struct RecordBuilder {
    version: u8,
    instance: u16,
    record_type: u16,
    data: Vec<u8>,
}

impl RecordBuilder {
    pub fn new(version: u8, instance: u16, record_type: u16) -> Self {
        Self {
            version,
            instance,
            record_type,
            data: Vec::new(),
        }
    }

    /// Start a container record.
    pub fn container(instance: u16, record_type: u16) -> Self {
        Self::new(CONTAINER_VERSION, instance, record_type)
    }

    /// Append raw payload bytes.
    pub fn write_data(&mut self, data: &[u8]) -> &mut Self {
        self.data.extend_from_slice(data);
        self
    }

    /// Append an already encoded child record.
    pub fn write_child(&mut self, child: &[u8]) -> &mut Self {
        self.data.extend_from_slice(child);
        self
    }

    /// Finalize into header and payload bytes.
    pub fn build(self) -> Vec<u8> {
        let header = RecordHeader::new(
            self.version,
            self.instance,
            self.record_type,
            self.data.len() as u32,
        );
        let mut out = Vec::with_capacity(HEADER_SIZE + self.data.len());
        out.extend_from_slice(&header.to_bytes());
        out.extend_from_slice(&self.data);
        out
    }
}

/// Encode an atom in one call.
pub fn atom(version: u8, instance: u16, record_type: u16, data: &[u8]) -> Vec<u8> {
    let mut builder = RecordBuilder::new(version, instance, record_type);
    builder.write_data(data);
    builder.build()
}
