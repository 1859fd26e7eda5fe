//! Persisted record format.
//!
//! ```text
//! ┌───────────┬─────────┬──────────────────┬───────────┐
//! │ MAGIC u32 │ VER u8  │ BODY (postcard)  │ CRC32 u32 │
//! └───────────┴─────────┴──────────────────┴───────────┘
//! ```
//!
//! Integers in the header and CRC are little-endian. The CRC-32 (IEEE)
//! covers every byte before it, exactly as written to flash.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::profile::IntegrityError;

/// Magic tag for profile records ("GLMP")
pub const PROFILE_MAGIC: u32 = 0x474C_4D50;

/// Magic tag for the global settings record ("GLMG")
pub const GLOBAL_MAGIC: u32 = 0x474C_4D47;

/// Current record format version
pub const RECORD_VERSION: u8 = 1;

/// Bytes of magic plus version
const HEADER_LEN: usize = 5;

/// Trailing CRC bytes
const CRC_LEN: usize = 4;

/// Largest encoded record, bounded by what a flash backend stores per key
pub const MAX_RECORD_LEN: usize = glimmer_hal::MAX_ITEM_LEN;

#[derive(Serialize, Deserialize)]
struct Record<T> {
    #[serde(with = "postcard::fixint::le")]
    magic: u32,
    version: u8,
    body: T,
}

/// Record does not fit the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EncodeError;

/// Serialize `body` with header and CRC into `buffer`, returning the length
pub fn encode<T: Serialize>(magic: u32, body: &T, buffer: &mut [u8]) -> Result<usize, EncodeError> {
    let record = Record {
        magic,
        version: RECORD_VERSION,
        body,
    };
    let len = postcard::to_slice(&record, buffer)
        .map_err(|_| EncodeError)?
        .len();

    let crc = crc32(&buffer[..len]);
    let end = len + CRC_LEN;
    if buffer.len() < end {
        return Err(EncodeError);
    }
    buffer[len..end].copy_from_slice(&crc.to_le_bytes());
    Ok(end)
}

/// Check header and CRC, then deserialize the body
pub fn decode<T: DeserializeOwned>(magic: u32, bytes: &[u8]) -> Result<T, IntegrityError> {
    if bytes.len() < HEADER_LEN + CRC_LEN {
        return Err(IntegrityError::Truncated);
    }

    let stored_magic = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    if stored_magic != magic {
        return Err(IntegrityError::BadMagic);
    }
    if bytes[4] != RECORD_VERSION {
        return Err(IntegrityError::UnsupportedVersion);
    }

    let (payload, crc_bytes) = bytes.split_at(bytes.len() - CRC_LEN);
    let stored_crc = u32::from_le_bytes([crc_bytes[0], crc_bytes[1], crc_bytes[2], crc_bytes[3]]);
    if crc32(payload) != stored_crc {
        return Err(IntegrityError::BadChecksum);
    }

    let (record, rest): (Record<T>, _) =
        postcard::take_from_bytes(payload).map_err(|_| IntegrityError::Malformed)?;
    if !rest.is_empty() {
        return Err(IntegrityError::Malformed);
    }
    Ok(record.body)
}

/// CRC-32 (IEEE 802.3)
pub fn crc32(data: &[u8]) -> u32 {
    !crc32_update(0xFFFF_FFFF, data)
}

fn crc32_update(crc: u32, data: &[u8]) -> u32 {
    const POLY: u32 = 0xEDB88320;
    let mut crc = crc;

    for &byte in data {
        crc ^= byte as u32;
        for _ in 0..8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ POLY;
            } else {
                crc >>= 1;
            }
        }
    }

    crc
}
