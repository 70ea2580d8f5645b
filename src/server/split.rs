//! Split reply reassembly.
//!
//! ```text
//! FE FF FF FF  <id: i32>  <total: u8>  <number: u8>  <size: u16>  <payload>
//! ```
//!
//! Pre-Orange Box servers drop `size` and pack `total` (low nibble) and
//! `number` (high nibble) into one byte. The payload of fragment 0 starts
//! with the simple `FF FF FF FF` header of the joined reply.

use crate::error::{QueryError, Result};
use crate::packet::{PacketReader, HEADER_SPLIT};

const COMPRESSED_FLAG: u32 = 0x8000_0000;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct SplitHeader {
    id: i32,
    total: u8,
    number: u8,
}

fn parse_fragment(data: &[u8], pre_orange_box: bool) -> Result<(SplitHeader, &[u8])> {
    let mut reader = PacketReader::new(data);

    if reader.read_i32() != Some(HEADER_SPLIT) {
        return Err(QueryError::BadPacketHeader);
    }

    let id = reader.read_i32().ok_or(QueryError::BadPacketHeader)?;

    if id as u32 & COMPRESSED_FLAG != 0 {
        return Err(QueryError::Compressed);
    }

    let (total, number) = if pre_orange_box {
        let packed = reader.read_u8().ok_or(QueryError::BadPacketHeader)?;
        (packed & 0x0F, packed >> 4)
    } else {
        let total = reader.read_u8().ok_or(QueryError::BadPacketHeader)?;
        let number = reader.read_u8().ok_or(QueryError::BadPacketHeader)?;
        reader.read_u16().ok_or(QueryError::BadPacketHeader)?;
        (total, number)
    };

    if total == 0 || number >= total {
        return Err(QueryError::BadPacketHeader);
    }

    Ok((SplitHeader { id, total, number }, reader.remaining()))
}

/// Fragments of one split reply, keyed by their index.
pub(super) struct SplitCollector {
    id: i32,
    pre_orange_box: bool,
    fragments: Vec<Option<Vec<u8>>>,
}

impl SplitCollector {
    /// Start collecting from the first fragment received.
    pub fn new(lead: &[u8], pre_orange_box: bool) -> Result<Self> {
        let (header, payload) = parse_fragment(lead, pre_orange_box)?;

        let mut fragments = vec![None; header.total as usize];
        fragments[header.number as usize] = Some(payload.to_vec());

        Ok(Self {
            id: header.id,
            pre_orange_box,
            fragments,
        })
    }

    pub fn push(&mut self, data: &[u8]) -> Result<()> {
        let (header, payload) = parse_fragment(data, self.pre_orange_box)?;

        if header.id != self.id {
            debug!("Ignoring fragment of split reply 0x{:X}, collecting 0x{:X}", header.id, self.id);
            return Ok(());
        }

        if header.total as usize != self.fragments.len() {
            return Err(QueryError::BadPacketHeader);
        }

        self.fragments[header.number as usize] = Some(payload.to_vec());

        Ok(())
    }

    pub fn is_complete(&self) -> bool {
        self.fragments.iter().all(Option::is_some)
    }

    /// Join the payloads in fragment order. Missing fragments are skipped.
    pub fn join(self) -> Vec<u8> {
        self.fragments.into_iter().flatten().flatten().collect()
    }
}
