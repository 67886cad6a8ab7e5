use serde::{Deserialize, Serialize};

use super::ServiceHeader;
use crate::protocols::common::strings::trim_nul_padding;

/// Variable-length UTF-8 answer to a service request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestReplyPacket {
    pub header: ServiceHeader,
    pub answer: String,
}

impl RequestReplyPacket {
    pub(crate) fn from_payload(header: ServiceHeader, payload: &[u8]) -> Self {
        Self {
            header,
            answer: String::from_utf8_lossy(trim_nul_padding(payload)).into_owned(),
        }
    }
}
