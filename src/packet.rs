//! Cursor over a received datagram.
//!
//! All integers on the wire are little-endian. Reads return `None` when the
//! buffer is too short and leave the cursor where it was.

/// Out-of-band marker prefixing every query datagram.
pub const PACKET_PREFIX: [u8; 4] = [0xFF, 0xFF, 0xFF, 0xFF];

/// Header of a reply that fits in one datagram.
pub const HEADER_SIMPLE: i32 = -1;
/// Header of a reply split across several datagrams.
pub const HEADER_SPLIT: i32 = -2;

#[derive(Debug)]
pub struct PacketReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> PacketReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Bytes not consumed yet.
    pub fn remaining(&self) -> &'a [u8] {
        &self.buf[self.pos..]
    }

    /// Read `N` raw bytes.
    pub fn read_bytes<const N: usize>(&mut self) -> Option<[u8; N]> {
        let end = self.pos.checked_add(N)?;
        let bytes: [u8; N] = self.buf.get(self.pos..end)?.try_into().ok()?;
        self.pos = end;
        Some(bytes)
    }

    pub fn read_u8(&mut self) -> Option<u8> {
        self.read_bytes::<1>().map(|[b]| b)
    }

    pub fn read_i8(&mut self) -> Option<i8> {
        self.read_bytes().map(i8::from_le_bytes)
    }

    pub fn read_u16(&mut self) -> Option<u16> {
        self.read_bytes().map(u16::from_le_bytes)
    }

    pub fn read_i16(&mut self) -> Option<i16> {
        self.read_bytes().map(i16::from_le_bytes)
    }

    pub fn read_u32(&mut self) -> Option<u32> {
        self.read_bytes().map(u32::from_le_bytes)
    }

    pub fn read_i32(&mut self) -> Option<i32> {
        self.read_bytes().map(i32::from_le_bytes)
    }

    /// Read a NUL-terminated string.
    ///
    /// Returns `None` if no terminator is left in the buffer. Invalid UTF-8 is
    /// replaced rather than rejected, servers put arbitrary bytes in cvars.
    pub fn try_read_string(&mut self) -> Option<String> {
        let rest = self.remaining();
        let end = rest.iter().position(|&b| b == 0)?;
        let value = String::from_utf8_lossy(&rest[..end]).into_owned();
        self.pos += end + 1;
        Some(value)
    }
}
