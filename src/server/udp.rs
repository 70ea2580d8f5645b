use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};

use tokio::net::UdpSocket;

use super::res_packet::ResPacket;
use super::split::SplitCollector;
use super::{Challenge, Exchange};
use crate::config::QueryConfig;
use crate::error::Result;

/// [`Exchange`] over a connected UDP socket.
pub struct UdpExchange {
    sock: UdpSocket,
    config: QueryConfig,
}

impl UdpExchange {
    pub async fn connect(addr: SocketAddr, config: QueryConfig) -> std::io::Result<Self> {
        let sock = match addr {
            SocketAddr::V4(_) => UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).await?,
            SocketAddr::V6(_) => UdpSocket::bind((Ipv6Addr::UNSPECIFIED, 0)).await?,
        };
        sock.connect(addr).await?;

        Ok(Self { sock, config })
    }

    pub fn peer_addr(&self) -> std::io::Result<SocketAddr> {
        self.sock.peer_addr()
    }
}

impl Exchange for UdpExchange {
    async fn challenge(&self, request: &[u8], expected: u8) -> Result<Challenge> {
        self.sock.send(request).await?;

        ResPacket::rcv(&self.sock, &self.config).await?.classify(expected)
    }

    async fn reassemble(&self, lead: Vec<u8>) -> Result<Vec<u8>> {
        let mut collector = SplitCollector::new(&lead, self.config.pre_orange_box)?;

        while !collector.is_complete() {
            let packet = ResPacket::rcv(&self.sock, &self.config).await?;
            collector.push(&packet.data)?;
        }

        Ok(collector.join())
    }
}
