//! Frame encoding for the CPUMonitorJr display protocol.
//!
//! Every frame starts with a one-byte discriminant. The rest of the layout is
//! fixed per kind; see [`Frame::time`], [`Frame::identity`] and
//! [`Frame::stats`].

use chrono::{Datelike, Timelike};

use super::packing::{pack_decimal, round_percent};
use crate::core::{
    FRAME_TYPE_IDENTITY, FRAME_TYPE_STATS, FRAME_TYPE_TIME, IDENTITY_SEPARATOR, MAX_CORES,
    STATS_HEADER_SIZE, TIME_FRAME_SIZE, YEAR_BASE,
};

/// Frame kind, carried in the first byte of every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FrameKind {
    /// Date and wall clock.
    Time = FRAME_TYPE_TIME,
    /// Host name and addresses.
    Identity = FRAME_TYPE_IDENTITY,
    /// Memory, temperatures and per-core utilisation.
    Stats = FRAME_TYPE_STATS,
}

impl FrameKind {
    /// Convert frame kind to its byte representation.
    pub fn as_byte(self) -> u8 {
        self as u8
    }
}

/// Host identity shown on the display.
///
/// Any field may hold a placeholder such as "External address not
/// available"; the codec does not inspect the contents.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Identity {
    /// Host name.
    pub hostname: String,
    /// Address of the host on the local network.
    pub lan_address: String,
    /// Public address of the host.
    pub external_address: String,
}

impl Identity {
    /// Create an identity from its three fields.
    pub fn new(
        hostname: impl Into<String>,
        lan_address: impl Into<String>,
        external_address: impl Into<String>,
    ) -> Self {
        Self {
            hostname: hostname.into(),
            lan_address: lan_address.into(),
            external_address: external_address.into(),
        }
    }
}

/// One sample of system statistics.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatsSample {
    /// Percent of physical memory in use.
    pub memory_percent: f64,
    /// Utilisation of each logical core, in percent.
    pub core_percents: Vec<f64>,
    /// Average over all temperature sensors, in °C (0 when none).
    pub average_temperature: f64,
    /// Hottest temperature sensor, in °C (0 when none).
    pub max_temperature: f64,
}

/// An encoded frame, ready to be sent as one binary message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    kind: FrameKind,
    bytes: Vec<u8>,
}

impl Frame {
    /// Encode a time frame.
    ///
    /// Wire format (8 bytes):
    /// ```text
    /// +------+------+-------+-----+---------+------+--------+--------+
    /// | 0x00 | year | month | day | weekday | hour | minute | second |
    /// +------+------+-------+-----+---------+------+--------+--------+
    /// ```
    /// `year` is `year - 2000` clamped to `0..=255`; `weekday` is 0 for
    /// Sunday through 6 for Saturday.
    pub fn time<T: Datelike + Timelike>(now: &T) -> Self {
        let year = (now.year() - YEAR_BASE).clamp(0, i32::from(u8::MAX)) as u8;
        let bytes: [u8; TIME_FRAME_SIZE] = [
            FrameKind::Time.as_byte(),
            year,
            now.month() as u8,
            now.day() as u8,
            now.weekday().num_days_from_sunday() as u8,
            now.hour() as u8,
            now.minute() as u8,
            now.second() as u8,
        ];
        Self {
            kind: FrameKind::Time,
            bytes: bytes.to_vec(),
        }
    }

    /// Encode an identity frame: `0x01` followed by `host;lan;external;`.
    ///
    /// Non-ASCII characters are dropped.
    pub fn identity(identity: &Identity) -> Self {
        let fields = [
            &identity.hostname,
            &identity.lan_address,
            &identity.external_address,
        ];

        let mut bytes = Vec::with_capacity(1 + fields.iter().map(|f| f.len() + 1).sum::<usize>());
        bytes.push(FrameKind::Identity.as_byte());
        for field in fields {
            bytes.extend(field.chars().filter(char::is_ascii).map(|c| c as u8));
            bytes.push(IDENTITY_SEPARATOR as u8);
        }

        Self {
            kind: FrameKind::Identity,
            bytes,
        }
    }

    /// Encode a stats frame.
    ///
    /// Wire format (8 + n bytes):
    /// ```text
    /// +------+-----+-----+-----+-----+-----+-----+---+-----------+
    /// | 0x02 | mem | mem | avg | avg | max | max | n | n x core% |
    /// |      |  W  |  D  |  W  |  D  |  W  |  D  |   | (0..=100) |
    /// +------+-----+-----+-----+-----+-----+-----+---+-----------+
    /// ```
    /// At most 255 cores are carried; extra cores are dropped.
    pub fn stats(sample: &StatsSample) -> Self {
        let (mem_whole, mem_dec) = pack_decimal(sample.memory_percent);
        let (avg_whole, avg_dec) = pack_decimal(sample.average_temperature);
        let (max_whole, max_dec) = pack_decimal(sample.max_temperature);
        let cores = sample.core_percents.len().min(MAX_CORES);

        let mut bytes = Vec::with_capacity(STATS_HEADER_SIZE + cores);
        bytes.extend_from_slice(&[
            FrameKind::Stats.as_byte(),
            mem_whole,
            mem_dec,
            avg_whole,
            avg_dec,
            max_whole,
            max_dec,
            cores as u8,
        ]);
        bytes.extend(
            sample.core_percents[..cores]
                .iter()
                .map(|&pct| round_percent(pct)),
        );

        Self {
            kind: FrameKind::Stats,
            bytes,
        }
    }

    /// Frame kind.
    pub fn kind(&self) -> FrameKind {
        self.kind
    }

    /// Encoded bytes, discriminant included.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Encoded length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the encoding is empty (never true for a constructed frame).
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Consume the frame and return its bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}
