//! Packet scheduling disciplines.
//!
//! Both disciplines take a batch in arrival order and return a new `Vec` in
//! transmission order. The input batch is never modified.

use crate::error::{Result, RouterError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// Packet priority. Lower values are sent first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum Priority {
    /// Latency sensitive traffic such as VoIP.
    High = 0,
    /// Video and other interactive streams.
    Medium = 1,
    /// Bulk data.
    Low = 2,
}

impl Priority {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl TryFrom<u8> for Priority {
    type Error = RouterError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Priority::High),
            1 => Ok(Priority::Medium),
            2 => Ok(Priority::Low),
            other => Err(RouterError::InvalidPriority(other)),
        }
    }
}

impl From<Priority> for u8 {
    fn from(priority: Priority) -> Self {
        priority.as_u8()
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.as_u8())
    }
}

/// A packet waiting for transmission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Packet {
    pub source: Ipv4Addr,
    pub destination: Ipv4Addr,
    pub payload: String,
    pub priority: Priority,
}

impl Packet {
    /// Create a packet, validating the raw priority value.
    pub fn new(
        source: Ipv4Addr,
        destination: Ipv4Addr,
        payload: impl Into<String>,
        priority: u8,
    ) -> Result<Self> {
        Ok(Packet {
            source,
            destination,
            payload: payload.into(),
            priority: Priority::try_from(priority)?,
        })
    }
}

/// Scheduling discipline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Discipline {
    /// Send in arrival order.
    #[default]
    Fifo,
    /// Send by ascending priority, arrival order within a priority.
    Priority,
}

impl Discipline {
    pub fn as_str(&self) -> &'static str {
        match self {
            Discipline::Fifo => "fifo",
            Discipline::Priority => "priority",
        }
    }
}

impl FromStr for Discipline {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fifo" => Ok(Discipline::Fifo),
            "priority" => Ok(Discipline::Priority),
            other => Err(format!("unknown discipline: {other}")),
        }
    }
}

impl fmt::Display for Discipline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// First come, first served: the batch in arrival order.
pub fn schedule_fifo(batch: &[Packet]) -> Vec<Packet> {
    batch.to_vec()
}

/// Strict priority with arrival order as the tie-break.
pub fn schedule_priority(batch: &[Packet]) -> Vec<Packet> {
    let mut out = batch.to_vec();
    // sort_by_key is stable.
    out.sort_by_key(|packet| packet.priority);
    out
}

/// Schedule `batch` under `discipline`.
pub fn schedule(batch: &[Packet], discipline: Discipline) -> Vec<Packet> {
    match discipline {
        Discipline::Fifo => schedule_fifo(batch),
        Discipline::Priority => schedule_priority(batch),
    }
}
