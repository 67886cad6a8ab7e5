//! Frame counter bookkeeping kept by callers, never by the codec.
//!
//! [`FrameCounterTracker`] watches incoming counters per stream and reports
//! gaps, reorders and duplicates. [`FrameCounters`] hands out the outgoing
//! counters a sender stamps on its packets. Both are advisory: decoding and
//! encoding never consult them.

use std::collections::HashMap;
use std::hash::Hash;

use super::header::SubProtocol;
use super::layout::MAX_FRAME_COUNTER;
use super::packet::Packet;

const HALF_RANGE: u32 = 1 << 31;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameCounterEvent {
    /// Counter 0: the sender does not number its frames.
    Untracked,
    First,
    InOrder,
    Gap { missing: u32 },
    Reordered { last: u32 },
    Duplicate,
}

/// Last counter seen per stream key.
#[derive(Debug)]
pub struct FrameCounterTracker<K> {
    last: HashMap<K, u32>,
}

impl<K> Default for FrameCounterTracker<K> {
    fn default() -> Self {
        Self {
            last: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash> FrameCounterTracker<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, key: K, counter: u32) -> FrameCounterEvent {
        if counter == 0 {
            return FrameCounterEvent::Untracked;
        }
        let Some(last) = self.last.get_mut(&key) else {
            self.last.insert(key, counter);
            return FrameCounterEvent::First;
        };
        let previous = *last;
        let expected = next_counter(previous);
        let event = if counter == expected {
            FrameCounterEvent::InOrder
        } else if counter == previous {
            FrameCounterEvent::Duplicate
        } else {
            // Counters up to half the range ahead are gaps, anything else is late.
            let ahead = counter.wrapping_sub(expected);
            if ahead < HALF_RANGE {
                FrameCounterEvent::Gap { missing: ahead }
            } else {
                FrameCounterEvent::Reordered { last: previous }
            }
        };
        if !matches!(
            event,
            FrameCounterEvent::Reordered { .. } | FrameCounterEvent::Duplicate
        ) {
            *last = counter;
        }
        event
    }

    pub fn last(&self, key: &K) -> Option<u32> {
        self.last.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.last.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last.is_empty()
    }
}

/// Counter following `counter`, skipping 0 after the maximum.
pub fn next_counter(counter: u32) -> u32 {
    if counter >= MAX_FRAME_COUNTER {
        1
    } else {
        counter + 1
    }
}

/// Outgoing counters, one sequence per sub-protocol.
#[derive(Debug, Default)]
pub struct FrameCounters {
    current: HashMap<SubProtocol, u32>,
}

impl FrameCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next counter for `sub_protocol`: 1, 2, ... restarting at 1 after the maximum.
    pub fn next(&mut self, sub_protocol: SubProtocol) -> u32 {
        let current = self.current.entry(sub_protocol).or_insert(0);
        *current = next_counter(*current);
        *current
    }

    /// Assign the next counter of the packet's sub-protocol and return it.
    pub fn stamp(&mut self, packet: &mut Packet) -> u32 {
        let counter = self.next(packet.sub_protocol());
        packet.set_frame_counter(counter);
        counter
    }
}
