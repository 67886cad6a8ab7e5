//! Capture sources.
//!
//! A source yields raw link-layer frames; it knows nothing about VBAN. The
//! analysis layer pulls frames until the source reports the end.

mod pcap;

pub use pcap::PcapFileSource;

use pcap_parser::Linktype;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct PacketEvent {
    pub ts: Option<f64>,
    pub linktype: Linktype,
    pub data: Vec<u8>,
}

pub trait PacketSource {
    fn next_packet(&mut self) -> Result<Option<PacketEvent>, SourceError>;
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PCAP parse error ({context}): {message}")]
    Pcap {
        context: &'static str,
        message: String,
    },
}

impl SourceError {
    fn pcap(context: &'static str, err: impl std::fmt::Display) -> Self {
        SourceError::Pcap {
            context,
            message: err.to_string(),
        }
    }
}
