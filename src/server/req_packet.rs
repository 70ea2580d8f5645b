use crate::packet::PACKET_PREFIX;
use crate::rules::A2S_RULES_REQUEST;

/// Challenge value asking the server to issue a real one.
pub(super) const NO_CHALLENGE: [u8; CHALLENGE_SIZE] = [0xFF, 0xFF, 0xFF, 0xFF];
pub(super) const CHALLENGE_SIZE: usize = 4;

/// `FF FF FF FF 56 <challenge>`
///
/// A new request is built for every attempt.
pub(super) struct RulesRequest {
    challenge: [u8; CHALLENGE_SIZE],
}

impl RulesRequest {
    pub fn new(challenge: [u8; CHALLENGE_SIZE]) -> Self {
        Self { challenge }
    }

    pub fn to_raw(&self) -> Vec<u8> {
        let mut buffer = Vec::with_capacity(PACKET_PREFIX.len() + 1 + CHALLENGE_SIZE);

        buffer.extend(PACKET_PREFIX);
        buffer.push(A2S_RULES_REQUEST);
        buffer.extend(self.challenge);

        buffer
    }
}
