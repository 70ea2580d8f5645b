use std::net::SocketAddr;

use crate::config::QueryConfig;
use crate::error::{QueryError, Result};
use crate::packet::{PacketReader, HEADER_SIMPLE, HEADER_SPLIT};
use crate::rules::{RulesInfo, A2S_RULES_RESPONSE};

mod req_packet;
mod res_packet;
mod split;
mod udp;

use req_packet::*;

pub use udp::UdpExchange;

/// Outcome of sending a request through the challenge handshake.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Challenge {
    /// The server answered. Holds the whole datagram, header included.
    Immediate(Vec<u8>),
    /// The server wants the request again with this challenge.
    Retry([u8; 4]),
}

/// The network side of a query: one request/reply round trip, and
/// collecting the rest of a split reply.
#[allow(async_fn_in_trait)]
pub trait Exchange {
    /// Send `request` and classify the reply. `expected` is the type byte of
    /// a final answer.
    async fn challenge(&self, request: &[u8], expected: u8) -> Result<Challenge>;

    /// Given the first fragment of a split reply, receive the remaining ones
    /// and return the joined payload.
    async fn reassemble(&self, lead: Vec<u8>) -> Result<Vec<u8>>;
}

pub struct ServerQuery<E = UdpExchange> {
    exchange: E,
    config: QueryConfig,
}

impl ServerQuery {
    pub async fn new(addr: SocketAddr) -> std::io::Result<Self> {
        Self::with_config(addr, QueryConfig::default()).await
    }

    pub async fn with_config(addr: SocketAddr, config: QueryConfig) -> std::io::Result<Self> {
        let exchange = UdpExchange::connect(addr, config).await?;

        Ok(Self::from_exchange(exchange, config))
    }
}

impl<E: Exchange> ServerQuery<E> {
    pub fn from_exchange(exchange: E, config: QueryConfig) -> Self {
        Self { exchange, config }
    }

    pub fn exchange(&self) -> &E {
        &self.exchange
    }

    /// Query the server's rules (cvars).
    pub async fn a2s_rules(&self) -> Result<RulesInfo> {
        let mut challenge = NO_CHALLENGE;
        let mut challenge_counter = 0;

        let data = loop {
            let request = RulesRequest::new(challenge);

            match self.exchange.challenge(&request.to_raw(), A2S_RULES_RESPONSE).await? {
                Challenge::Immediate(data) => break data,
                Challenge::Retry(token) => {
                    if challenge_counter >= self.config.max_challenge_hops {
                        return Err(QueryError::ChallengeLimit(challenge_counter));
                    }

                    debug!("Received challenge [{:02X?}], re-sending rules request", token);

                    challenge = token;
                    challenge_counter += 1;
                }
            }
        };

        match PacketReader::new(&data).read_i32() {
            Some(HEADER_SIMPLE) => RulesInfo::parse(&data),
            Some(HEADER_SPLIT) => {
                let data = self.exchange.reassemble(data).await?;
                RulesInfo::parse(&data)
            }
            _ => Err(QueryError::BadPacketHeader),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use super::*;
    use crate::rules::tests::encode_rules;

    #[derive(Default)]
    struct ScriptedExchange {
        replies: RefCell<VecDeque<Result<Challenge>>>,
        joined: RefCell<Option<Result<Vec<u8>>>>,
        requests: RefCell<Vec<Vec<u8>>>,
        leads: RefCell<Vec<Vec<u8>>>,
    }

    impl ScriptedExchange {
        fn new(replies: Vec<Result<Challenge>>) -> Self {
            Self {
                replies: RefCell::new(replies.into()),
                ..Default::default()
            }
        }

        fn with_joined(self, joined: Result<Vec<u8>>) -> Self {
            *self.joined.borrow_mut() = Some(joined);
            self
        }
    }

    impl Exchange for ScriptedExchange {
        async fn challenge(&self, request: &[u8], expected: u8) -> Result<Challenge> {
            assert_eq!(expected, A2S_RULES_RESPONSE);
            self.requests.borrow_mut().push(request.to_vec());
            self.replies
                .borrow_mut()
                .pop_front()
                .unwrap_or(Ok(Challenge::Retry([0x01, 0x02, 0x03, 0x04])))
        }

        async fn reassemble(&self, lead: Vec<u8>) -> Result<Vec<u8>> {
            self.leads.borrow_mut().push(lead);
            self.joined.borrow_mut().take().expect("unexpected reassemble")
        }
    }

    fn query(exchange: ScriptedExchange) -> ServerQuery<ScriptedExchange> {
        ServerQuery::from_exchange(exchange, QueryConfig::default())
    }

    const SPLIT_LEAD: [u8; 12] = [0xFE, 0xFF, 0xFF, 0xFF, 0x07, 0x00, 0x00, 0x00, 0x02, 0x00, 0xE0, 0x04];

    #[tokio::test]
    async fn test_example_exchange() {
        let reply = b"\xFF\xFF\xFF\xFF\x45\x02\x00sv_cheats\x000\x00mp_friendlyfire\x001\x00".to_vec();
        let query = query(ScriptedExchange::new(vec![Ok(Challenge::Immediate(reply))]));

        let info = query.a2s_rules().await.unwrap();

        assert_eq!(
            *query.exchange().requests.borrow(),
            vec![vec![0xFF, 0xFF, 0xFF, 0xFF, 0x56, 0xFF, 0xFF, 0xFF, 0xFF]]
        );
        assert_eq!(info.count(), 2);
        assert_eq!(info.get("sv_cheats"), Some("0"));
        assert_eq!(info.get("mp_friendlyfire"), Some("1"));
    }

    #[tokio::test]
    async fn test_challenge_is_echoed_verbatim() {
        let query = query(ScriptedExchange::new(vec![
            Ok(Challenge::Retry([0x4B, 0xA1, 0xD5, 0x22])),
            Ok(Challenge::Immediate(encode_rules(1, &[("sv_gravity", "800")]))),
        ]));

        let info = query.a2s_rules().await.unwrap();

        assert_eq!(info.get("sv_gravity"), Some("800"));
        assert_eq!(
            *query.exchange().requests.borrow(),
            vec![
                vec![0xFF, 0xFF, 0xFF, 0xFF, 0x56, 0xFF, 0xFF, 0xFF, 0xFF],
                vec![0xFF, 0xFF, 0xFF, 0xFF, 0x56, 0x4B, 0xA1, 0xD5, 0x22],
            ]
        );
    }

    #[tokio::test]
    async fn test_challenge_limit() {
        let query = ServerQuery::from_exchange(
            ScriptedExchange::new(Vec::new()),
            QueryConfig::default().with_max_challenge_hops(3),
        );

        let result = query.a2s_rules().await;

        assert!(matches!(result, Err(QueryError::ChallengeLimit(3))));
        assert_eq!(query.exchange().requests.borrow().len(), 4);
    }

    #[tokio::test]
    async fn test_split_reply_is_reassembled() {
        let query = query(
            ScriptedExchange::new(vec![Ok(Challenge::Immediate(SPLIT_LEAD.to_vec()))])
                .with_joined(Ok(encode_rules(2, &[("a", "1"), ("b", "2")]))),
        );

        let info = query.a2s_rules().await.unwrap();

        assert_eq!(*query.exchange().leads.borrow(), vec![SPLIT_LEAD.to_vec()]);
        assert_eq!(info.count(), 2);
        assert_eq!(info.len(), 2);
    }

    #[tokio::test]
    async fn test_reassembled_payload_is_revalidated() {
        let query = query(
            ScriptedExchange::new(vec![Ok(Challenge::Immediate(SPLIT_LEAD.to_vec()))])
                .with_joined(Ok(SPLIT_LEAD.to_vec())),
        );

        assert!(matches!(query.a2s_rules().await, Err(QueryError::BadPacketHeader)));
    }

    #[tokio::test]
    async fn test_reassemble_error_passes_through() {
        let query = query(
            ScriptedExchange::new(vec![Ok(Challenge::Immediate(SPLIT_LEAD.to_vec()))])
                .with_joined(Err(QueryError::Compressed)),
        );

        assert!(matches!(query.a2s_rules().await, Err(QueryError::Compressed)));
    }

    #[tokio::test]
    async fn test_bad_header_skips_decoder() {
        let mut reply = encode_rules(1, &[("a", "1")]);
        reply[..4].copy_from_slice(&0x1234_5678i32.to_le_bytes());
        let query = query(ScriptedExchange::new(vec![Ok(Challenge::Immediate(reply))]));

        assert!(matches!(query.a2s_rules().await, Err(QueryError::BadPacketHeader)));
        assert!(query.exchange().leads.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_short_reply() {
        let query = query(ScriptedExchange::new(vec![Ok(Challenge::Immediate(vec![0xFF, 0xFF]))]));

        assert!(matches!(query.a2s_rules().await, Err(QueryError::BadPacketHeader)));
    }

    #[tokio::test]
    async fn test_bad_tag() {
        let mut reply = encode_rules(1, &[("a", "1")]);
        reply[4] = 0x49;
        let query = query(ScriptedExchange::new(vec![Ok(Challenge::Immediate(reply))]));

        assert!(matches!(query.a2s_rules().await, Err(QueryError::BadRulesReply)));
    }

    #[tokio::test]
    async fn test_transport_error_passes_through() {
        let err = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let query = query(ScriptedExchange::new(vec![Err(err.into())]));

        match query.a2s_rules().await {
            Err(QueryError::Io(err)) => assert_eq!(err.kind(), std::io::ErrorKind::ConnectionRefused),
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(query.exchange().requests.borrow().len(), 1);
    }
}
