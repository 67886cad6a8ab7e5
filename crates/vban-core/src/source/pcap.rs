use std::fs::File;
use std::io::{Chain, Cursor, Read};
use std::path::Path;

use pcap_parser::traits::PcapReaderIterator;
use pcap_parser::{Block, LegacyPcapReader, Linktype, PcapBlockOwned, PcapError, PcapNGReader};

use super::{PacketEvent, PacketSource, SourceError};

const PCAP_READER_BUFFER_SIZE: usize = 65536;
const PCAPNG_MAGIC: [u8; 4] = [0x0a, 0x0d, 0x0d, 0x0a];

/// The four magic bytes put back in front of the remaining stream.
type Rewound<R> = Chain<Cursor<[u8; 4]>, R>;

/// PCAP or PCAPNG capture read from any byte stream.
///
/// The format is picked from the magic bytes, so the reader does not need
/// to be seekable.
///
/// # Examples
/// ```no_run
/// use std::path::Path;
///
/// use vban_core::{PacketSource, PcapFileSource};
///
/// let mut source = PcapFileSource::open(Path::new("capture.pcapng"))?;
/// while let Some(event) = source.next_packet()? {
///     println!("{} bytes", event.data.len());
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct PcapFileSource<R: Read = File> {
    inner: CaptureReader<R>,
}

enum CaptureReader<R: Read> {
    Legacy {
        reader: LegacyPcapReader<Rewound<R>>,
        linktype: Option<Linktype>,
    },
    Ng {
        reader: PcapNGReader<Rewound<R>>,
        linktypes: Vec<Linktype>,
    },
}

impl PcapFileSource<File> {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        Self::from_reader(File::open(path)?)
    }
}

impl<R: Read> PcapFileSource<R> {
    pub fn from_reader(reader: R) -> Result<Self, SourceError> {
        let inner = create_reader(reader)?;
        Ok(Self { inner })
    }
}

impl<R: Read> PacketSource for PcapFileSource<R> {
    fn next_packet(&mut self) -> Result<Option<PacketEvent>, SourceError> {
        next_packet(&mut self.inner)
    }
}

fn read_magic<R: Read>(mut reader: R) -> Result<([u8; 4], Rewound<R>), SourceError> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    Ok((magic, Cursor::new(magic).chain(reader)))
}

fn is_pcapng_magic(magic: &[u8; 4]) -> bool {
    magic == &PCAPNG_MAGIC
}

fn create_reader<R: Read>(reader: R) -> Result<CaptureReader<R>, SourceError> {
    let (magic, stream) = read_magic(reader)?;
    if is_pcapng_magic(&magic) {
        let reader = PcapNGReader::new(PCAP_READER_BUFFER_SIZE, stream)
            .map_err(|e| SourceError::pcap("pcapng reader init", e))?;
        Ok(CaptureReader::Ng {
            reader,
            linktypes: Vec::new(),
        })
    } else {
        let reader = LegacyPcapReader::new(PCAP_READER_BUFFER_SIZE, stream)
            .map_err(|e| SourceError::pcap("pcap reader init", e))?;
        Ok(CaptureReader::Legacy {
            reader,
            linktype: None,
        })
    }
}

fn next_packet<R: Read>(reader: &mut CaptureReader<R>) -> Result<Option<PacketEvent>, SourceError> {
    loop {
        match reader {
            CaptureReader::Legacy { reader, linktype } => match reader.next() {
                Ok((offset, block)) => {
                    let event = match block {
                        PcapBlockOwned::LegacyHeader(header) => {
                            *linktype = Some(header.network);
                            None
                        }
                        PcapBlockOwned::Legacy(packet) => Some(PacketEvent {
                            ts: Some(packet.ts_sec as f64 + packet.ts_usec as f64 * 1e-6),
                            linktype: linktype.unwrap_or(Linktype::ETHERNET),
                            data: packet.data.to_vec(),
                        }),
                        _ => None,
                    };
                    reader.consume(offset);
                    if event.is_some() {
                        return Ok(event);
                    }
                }
                Err(PcapError::Eof) => return Ok(None),
                Err(PcapError::Incomplete(_)) => {
                    reader
                        .refill()
                        .map_err(|e| SourceError::pcap("pcap reader refill", e))?;
                }
                Err(e) => return Err(SourceError::pcap("pcap reader next", e)),
            },
            CaptureReader::Ng { reader, linktypes } => match reader.next() {
                Ok((offset, block)) => {
                    let event = match block {
                        PcapBlockOwned::NG(Block::InterfaceDescription(intf)) => {
                            linktypes.push(intf.linktype);
                            None
                        }
                        PcapBlockOwned::NG(Block::EnhancedPacket(packet)) => Some(PacketEvent {
                            ts: Some(pcapng_ts_to_seconds(packet.ts_high, packet.ts_low)),
                            linktype: linktype_for_interface(linktypes, packet.if_id),
                            data: packet.data.to_vec(),
                        }),
                        _ => None,
                    };
                    reader.consume(offset);
                    if event.is_some() {
                        return Ok(event);
                    }
                }
                Err(PcapError::Eof) => return Ok(None),
                Err(PcapError::Incomplete(_)) => {
                    reader
                        .refill()
                        .map_err(|e| SourceError::pcap("pcapng reader refill", e))?;
                }
                Err(e) => return Err(SourceError::pcap("pcapng reader next", e)),
            },
        }
    }
}

/// Linktype of a PCAPNG interface, Ethernet when the interface is unknown.
fn linktype_for_interface(linktypes: &[Linktype], if_id: u32) -> Linktype {
    linktypes
        .get(if_id as usize)
        .copied()
        .unwrap_or(Linktype::ETHERNET)
}

/// PCAPNG timestamps default to microsecond resolution.
fn pcapng_ts_to_seconds(ts_high: u32, ts_low: u32) -> f64 {
    let ts = ((ts_high as u64) << 32) | (ts_low as u64);
    ts as f64 * 1e-6
}
