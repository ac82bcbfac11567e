//! The `Current User` stream: points at the live `UserEditAtom`.
//!
//! Layout of the atom payload (after its 8-byte record header):
//!
//! | offset | field                |
//! |--------|----------------------|
//! | 8      | size (always 0x14)   |
//! | 12     | header token         |
//! | 16     | offsetToCurrentEdit  |
//! | 20     | lenUserName (ANSI)   |
//! | 22     | docFileVersion       |
//! | 24     | major, minor version |
//! | 26     | unused               |
//! | 28     | ANSI user name       |
//! | ..     | relVersion (u32)     |

use super::records::{RecordHeader, record_type};
use crate::common::binary::{read_u16_le, read_u32_le};
use crate::common::{Error, Result};

/// Token of an unencrypted document.
pub const TOKEN_PLAIN: u32 = 0xE391_C05F;
/// Token of an encrypted document.
pub const TOKEN_ENCRYPTED: u32 = 0xF3D1_C4DF;

const ATOM_SIZE_FIELD: u32 = 0x14;
const DOC_FILE_VERSION: u16 = 0x03F4;
const MAJOR_VERSION: u8 = 3;
const MINOR_VERSION: u8 = 0;
const RELEASE_VERSION: u32 = 8;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    /// Offset of the newest `UserEditAtom` in the document stream
    pub offset_to_current_edit: u32,
    /// ANSI user name, when present
    pub user_name: String,
}

impl CurrentUser {
    pub fn new(offset_to_current_edit: u32) -> Self {
        Self {
            offset_to_current_edit,
            user_name: String::new(),
        }
    }

    /// Parse the stream. Encrypted documents are rejected.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let header = RecordHeader::parse(data, 0)?;
        if header.record_type != record_type::CURRENT_USER_ATOM {
            return Err(Error::InvalidFormat(format!(
                "Current User stream starts with record 0x{:04X}",
                header.record_type
            )));
        }

        let token = read_u32_le(data, 12)?;
        match token {
            TOKEN_PLAIN => {},
            TOKEN_ENCRYPTED => {
                return Err(Error::Unsupported(
                    "encrypted presentations are not supported".to_string(),
                ));
            },
            other => {
                return Err(Error::InvalidFormat(format!(
                    "unknown Current User token 0x{other:08X}"
                )));
            },
        }

        let offset_to_current_edit = read_u32_le(data, 16)?;
        let name_len = read_u16_le(data, 20)? as usize;
        let user_name = data
            .get(28..28 + name_len)
            .map(|bytes| bytes.iter().map(|&b| b as char).collect())
            .unwrap_or_default();

        Ok(Self {
            offset_to_current_edit,
            user_name,
        })
    }

    /// Encode the stream. The user name is stored as Latin-1 and truncated to 255 bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let name: Vec<u8> = self
            .user_name
            .chars()
            .map(|c| if (c as u32) < 0x100 { c as u8 } else { b'?' })
            .take(255)
            .collect();

        let mut payload = Vec::with_capacity(24 + name.len());
        payload.extend_from_slice(&ATOM_SIZE_FIELD.to_le_bytes());
        payload.extend_from_slice(&TOKEN_PLAIN.to_le_bytes());
        payload.extend_from_slice(&self.offset_to_current_edit.to_le_bytes());
        payload.extend_from_slice(&(name.len() as u16).to_le_bytes());
        payload.extend_from_slice(&DOC_FILE_VERSION.to_le_bytes());
        payload.push(MAJOR_VERSION);
        payload.push(MINOR_VERSION);
        payload.extend_from_slice(&[0u8; 2]);
        payload.extend_from_slice(&name);
        payload.extend_from_slice(&RELEASE_VERSION.to_le_bytes());

        let header = RecordHeader::new(0, 0, record_type::CURRENT_USER_ATOM, payload.len() as u32);
        let mut out = header.to_bytes().to_vec();
        out.extend_from_slice(&payload);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_matches_powerpoint() {
        let bytes = CurrentUser::new(0x1234).to_bytes();
        assert_eq!(bytes.len(), 32);
        assert_eq!(&bytes[0..4], &[0x00, 0x00, 0xF6, 0x0F]);
        assert_eq!(read_u32_le(&bytes, 4).unwrap(), 24);
        assert_eq!(read_u32_le(&bytes, 16).unwrap(), 0x1234);
        assert_eq!(CurrentUser::parse(&bytes).unwrap().offset_to_current_edit, 0x1234);
    }

    #[test]
    fn test_user_name_is_kept() {
        let mut user = CurrentUser::new(7);
        user.user_name = "deacon".to_string();
        let parsed = CurrentUser::parse(&user.to_bytes()).unwrap();
        assert_eq!(parsed, user);
    }

    #[test]
    fn test_encrypted_token_is_unsupported() {
        let mut bytes = CurrentUser::new(0).to_bytes();
        bytes[12..16].copy_from_slice(&TOKEN_ENCRYPTED.to_le_bytes());
        assert!(matches!(
            CurrentUser::parse(&bytes),
            Err(Error::Unsupported(_))
        ));
    }
}
