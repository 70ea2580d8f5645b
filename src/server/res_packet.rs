use tokio::net::UdpSocket;

use super::req_packet::CHALLENGE_SIZE;
use super::Challenge;
use crate::config::QueryConfig;
use crate::error::{QueryError, Result};
use crate::packet::{PacketReader, HEADER_SIMPLE, HEADER_SPLIT};

/// A single received datagram, header included.
pub(super) struct ResPacket {
    pub data: Vec<u8>,
}

impl ResPacket {
    pub const HEADER_CHALLENGE: u8 = 0x41;

    pub async fn rcv(sock: &UdpSocket, config: &QueryConfig) -> Result<Self> {
        let mut buf = vec![0u8; config.max_packet_size];

        let len = tokio::time::timeout(config.timeout, sock.recv(&mut buf))
            .await
            .map_err(|err| {
                error!("Failed to receive the packet from server: {}", err);
                std::io::Error::new(std::io::ErrorKind::TimedOut, err)
            })??;

        buf.truncate(len);

        Ok(Self { data: buf })
    }

    /// Decide whether this reply answers the request or only hands out a
    /// challenge to retry with.
    pub fn classify(self, expected: u8) -> Result<Challenge> {
        let mut reader = PacketReader::new(&self.data);

        match reader.read_i32() {
            // Split replies never carry a challenge.
            Some(HEADER_SPLIT) => return Ok(Challenge::Immediate(self.data)),
            Some(HEADER_SIMPLE) => {}
            _ => return Err(QueryError::BadPacketHeader),
        }

        match reader.read_u8() {
            Some(Self::HEADER_CHALLENGE) => reader
                .read_bytes::<CHALLENGE_SIZE>()
                .map(Challenge::Retry)
                .ok_or_else(|| {
                    error!("Received packet with a challenge header, but invalid payload!");
                    QueryError::BadChallenge
                }),
            Some(tag) if tag == expected => Ok(Challenge::Immediate(self.data)),
            _ => Err(QueryError::BadChallenge),
        }
    }
}
