//! Data models for switch telemetry.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::EssStatError;

/// Administrative state of a port.
///
/// Serialized as its raw device code so JSON output matches what the
/// switch reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum PortState {
    Disabled,
    Enabled,
}

impl PortState {
    pub fn code(self) -> u8 {
        match self {
            PortState::Disabled => 0,
            PortState::Enabled => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PortState::Disabled => "Disabled",
            PortState::Enabled => "Enabled",
        }
    }
}

impl From<PortState> for u8 {
    fn from(state: PortState) -> Self {
        state.code()
    }
}

impl TryFrom<u8> for PortState {
    type Error = EssStatError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(PortState::Disabled),
            1 => Ok(PortState::Enabled),
            other => Err(EssStatError::UnknownEnumCode {
                field: "state",
                raw: other.to_string(),
            }),
        }
    }
}

/// Negotiated link of a port.
///
/// Codes 1 and 4 are reported by the firmware with no known meaning and are
/// kept as opaque values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum LinkStatus {
    Down,
    Ls1,
    Half10,
    Full10,
    Ls4,
    Full100,
    Full1000,
}

impl LinkStatus {
    pub fn code(self) -> u8 {
        match self {
            LinkStatus::Down => 0,
            LinkStatus::Ls1 => 1,
            LinkStatus::Half10 => 2,
            LinkStatus::Full10 => 3,
            LinkStatus::Ls4 => 4,
            LinkStatus::Full100 => 5,
            LinkStatus::Full1000 => 6,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LinkStatus::Down => "Link Down",
            LinkStatus::Ls1 => "LS 1",
            LinkStatus::Half10 => "10M Half",
            LinkStatus::Full10 => "10M Full",
            LinkStatus::Ls4 => "LS 4",
            LinkStatus::Full100 => "100M Full",
            LinkStatus::Full1000 => "1000M Full",
        }
    }
}

impl From<LinkStatus> for u8 {
    fn from(link: LinkStatus) -> Self {
        link.code()
    }
}

impl TryFrom<u8> for LinkStatus {
    type Error = EssStatError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Ok(match code {
            0 => LinkStatus::Down,
            1 => LinkStatus::Ls1,
            2 => LinkStatus::Half10,
            3 => LinkStatus::Full10,
            4 => LinkStatus::Ls4,
            5 => LinkStatus::Full100,
            6 => LinkStatus::Full1000,
            other => {
                return Err(EssStatError::UnknownEnumCode {
                    field: "link_status",
                    raw: other.to_string(),
                })
            }
        })
    }
}

/// Telemetry for one switch port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortRecord {
    /// 1-based port number.
    pub port: usize,
    pub state: PortState,
    pub link_status: LinkStatus,
    /// Packet counters since the last reset or boot.
    #[serde(rename = "TxGoodPkt")]
    pub tx_good_pkt: u64,
    #[serde(rename = "TxBadPkt")]
    pub tx_bad_pkt: u64,
    #[serde(rename = "RxGoodPkt")]
    pub rx_good_pkt: u64,
    #[serde(rename = "RxBadPkt")]
    pub rx_bad_pkt: u64,
}

impl PortRecord {
    /// Scalar value of one metric; enumerated fields yield their raw code.
    pub fn value(&self, metric: Metric) -> u64 {
        match metric {
            Metric::State => u64::from(self.state.code()),
            Metric::LinkStatus => u64::from(self.link_status.code()),
            Metric::TxGoodPkt => self.tx_good_pkt,
            Metric::TxBadPkt => self.tx_bad_pkt,
            Metric::RxGoodPkt => self.rx_good_pkt,
            Metric::RxBadPkt => self.rx_bad_pkt,
        }
    }
}

/// The queryable fields of a [`PortRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    State,
    LinkStatus,
    TxGoodPkt,
    TxBadPkt,
    RxGoodPkt,
    RxBadPkt,
}

impl Metric {
    pub const ALL: [Metric; 6] = [
        Metric::State,
        Metric::LinkStatus,
        Metric::TxGoodPkt,
        Metric::TxBadPkt,
        Metric::RxGoodPkt,
        Metric::RxBadPkt,
    ];

    /// Name as it appears in JSON keys and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Metric::State => "state",
            Metric::LinkStatus => "link_status",
            Metric::TxGoodPkt => "TxGoodPkt",
            Metric::TxBadPkt => "TxBadPkt",
            Metric::RxGoodPkt => "RxGoodPkt",
            Metric::RxBadPkt => "RxBadPkt",
        }
    }
}

impl FromStr for Metric {
    type Err = EssStatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Metric::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| EssStatError::InvalidMetric(s.to_string()))
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// All ports decoded from one fetch of the port statistics page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortSnapshot {
    pub captured_at: NaiveDateTime,
    pub max_port_num: usize,
    pub ports: Vec<PortRecord>,
}

impl PortSnapshot {
    /// Record of a 1-based port; `0` is rejected like any other port outside
    /// `1..=max_port_num`.
    pub fn port(&self, port: usize) -> Result<&PortRecord, EssStatError> {
        let invalid = || EssStatError::InvalidPort {
            port,
            max_port_num: self.max_port_num,
        };
        if port == 0 || port > self.max_port_num {
            return Err(invalid());
        }
        self.ports.get(port - 1).ok_or_else(invalid)
    }

    /// Looks up a single metric on a single port.
    pub fn metric(&self, port: usize, metric: Metric) -> Result<u64, EssStatError> {
        self.port(port).map(|record| record.value(metric))
    }
}

/// Device identity as shown on the system info page.
///
/// Values are copied verbatim; a field the page does not carry is empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemInfo {
    pub description: String,
    pub mac: String,
    pub ip: String,
    pub netmask: String,
    pub gateway: String,
    pub firmware: String,
    pub hardware: String,
}

impl SystemInfo {
    /// Field names paired with their values, in page order.
    pub fn fields(&self) -> [(&'static str, &str); 7] {
        [
            ("description", self.description.as_str()),
            ("mac", self.mac.as_str()),
            ("ip", self.ip.as_str()),
            ("netmask", self.netmask.as_str()),
            ("gateway", self.gateway.as_str()),
            ("firmware", self.firmware.as_str()),
            ("hardware", self.hardware.as_str()),
        ]
    }
}

/// System info decoded from one fetch of the system info page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemSnapshot {
    pub captured_at: NaiveDateTime,
    pub info: SystemInfo,
}
