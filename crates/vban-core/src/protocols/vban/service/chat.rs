use serde::{Deserialize, Serialize};

use super::ServiceHeader;
use crate::protocols::common::strings::{trim_nul_padding, write_fixed_str};
use crate::protocols::vban::layout;

/// UTF-8 chat message in a fixed 676-byte, null-padded buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatPacket {
    pub header: ServiceHeader,
    pub text: String,
}

impl ChatPacket {
    pub(crate) fn from_payload(header: ServiceHeader, payload: &[u8]) -> Self {
        Self {
            header,
            text: String::from_utf8_lossy(trim_nul_padding(payload)).into_owned(),
        }
    }

    /// Longer messages are cut at the last whole character that fits.
    pub(crate) fn to_payload(&self) -> Vec<u8> {
        let mut payload = Vec::with_capacity(layout::SERVICE_PAYLOAD_LEN);
        write_fixed_str(&mut payload, &self.text, layout::SERVICE_PAYLOAD_LEN);
        payload
    }
}

#[cfg(test)]
mod tests {
    use super::ChatPacket;
    use crate::protocols::vban::layout;
    use crate::protocols::vban::service::ServiceHeader;

    #[test]
    fn chat_payload_is_fixed_size() {
        let chat = ChatPacket {
            header: ServiceHeader::new("chat", 1),
            text: "hello ✓".to_string(),
        };
        let payload = chat.to_payload();
        assert_eq!(payload.len(), layout::SERVICE_PAYLOAD_LEN);
        let decoded = ChatPacket::from_payload(chat.header.clone(), &payload);
        assert_eq!(decoded, chat);
    }

    #[test]
    fn chat_truncates_long_text() {
        let chat = ChatPacket {
            header: ServiceHeader::new("chat", 1),
            text: "x".repeat(700),
        };
        let decoded = ChatPacket::from_payload(chat.header.clone(), &chat.to_payload());
        assert_eq!(decoded.text.len(), layout::SERVICE_PAYLOAD_LEN);
    }
}
