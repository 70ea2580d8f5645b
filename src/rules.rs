//! A2S_RULES reply decoding.
//!
//! ```text
//! FF FF FF FF  45  <count: u16>  (<name>\0 <value>\0) * count
//! ```

use std::collections::HashMap;

use serde::Serialize;

use crate::error::{QueryError, Result};
use crate::packet::{PacketReader, HEADER_SIMPLE};

pub const A2S_RULES_REQUEST: u8 = 0x56;
pub const A2S_RULES_RESPONSE: u8 = 0x45;

/// Server rules as returned by A2S_RULES.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct RulesInfo {
    /// Number of rules the server announced. May be larger than the number
    /// of rules actually decoded.
    #[serde(rename = "Count")]
    count: u16,

    #[serde(rename = "Rules")]
    rules: HashMap<String, String>,
}

/// A single rule, borrowed from [`RulesInfo`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Rule<'a> {
    #[serde(rename = "Name")]
    pub name: &'a str,
    #[serde(rename = "Value")]
    pub value: &'a str,
}

impl RulesInfo {
    /// Decode a complete (already reassembled) rules reply.
    ///
    /// Decoding stops quietly at the first name/value pair that is cut off;
    /// everything before it is kept.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut reader = PacketReader::new(data);

        if reader.read_i32() != Some(HEADER_SIMPLE) {
            return Err(QueryError::BadPacketHeader);
        }

        if reader.read_u8() != Some(A2S_RULES_RESPONSE) {
            return Err(QueryError::BadRulesReply);
        }

        let count = reader.read_u16().ok_or(QueryError::BadRulesReply)?;
        let mut rules = HashMap::with_capacity(count as usize);

        for _ in 0..count {
            let Some(name) = reader.try_read_string() else {
                break;
            };
            let Some(value) = reader.try_read_string() else {
                break;
            };

            rules.insert(name, value);
        }

        if rules.len() < count as usize {
            trace!("Rules reply announced {} rules, decoded {}", count, rules.len());
        }

        Ok(Self { count, rules })
    }

    pub fn count(&self) -> u16 {
        self.count
    }

    pub fn rules(&self) -> &HashMap<String, String> {
        &self.rules
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.rules.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Rule<'_>> {
        self.rules.iter().map(|(name, value)| Rule { name, value })
    }

    pub fn into_rules(self) -> HashMap<String, String> {
        self.rules
    }
}
