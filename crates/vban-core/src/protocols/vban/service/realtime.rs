//! Real-time packet registration and streaming.
//!
//! A register request carries its timeout in part 3; when the reply bit is
//! set the same service type is an answer and part 3 holds the answer code.

use serde::{Deserialize, Serialize};

use super::ServiceHeader;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegisterAnswer {
    NoService,
    Registered,
    Busy,
}

impl RegisterAnswer {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(RegisterAnswer::NoService),
            1 => Some(RegisterAnswer::Registered),
            2 => Some(RegisterAnswer::Busy),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            RegisterAnswer::NoService => 0,
            RegisterAnswer::Registered => 1,
            RegisterAnswer::Busy => 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RealTimeRegisterPacket {
    pub header: ServiceHeader,
    /// Broadcast duration requested, in seconds.
    pub timeout: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RealTimeRegisterAnswerPacket {
    pub header: ServiceHeader,
    /// Raw answer code; unlisted codes are preserved.
    pub answer_code: u8,
}

impl RealTimeRegisterAnswerPacket {
    pub fn answer(&self) -> Option<RegisterAnswer> {
        RegisterAnswer::from_code(self.answer_code)
    }
}

/// Opaque real-time payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RealTimePacket {
    pub header: ServiceHeader,
    pub data: Vec<u8>,
}
