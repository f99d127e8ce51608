//! Rendering of snapshots into the supported output encodings.

use itertools::Itertools;
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::error::EssStatError;
use crate::models::{Metric, PortSnapshot, SystemSnapshot};

/// Timestamp layout used by the summary and single-line encodings.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One fully resolved rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputMode {
    /// A single scalar: `metric` of `port`.
    PointQuery { port: usize, metric: Metric },
    /// Zabbix low-level discovery JSON.
    Discovery,
    Json,
    /// Everything on one comma-separated line.
    SingleLine,
    /// One `port;state;link;counters` line per port.
    Stats,
    /// Timestamp and port count only.
    Summary,
}

/// The output flags a caller asked for, possibly several at once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputRequest {
    pub point: Option<(usize, Metric)>,
    pub discovery: bool,
    pub json: bool,
    pub single_line: bool,
    pub stats: bool,
}

impl OutputRequest {
    /// Picks the highest-precedence requested mode, falling back to
    /// [`OutputMode::Summary`].
    pub fn resolve(&self) -> OutputMode {
        let precedence = [
            self.point
                .map(|(port, metric)| OutputMode::PointQuery { port, metric }),
            self.discovery.then_some(OutputMode::Discovery),
            self.json.then_some(OutputMode::Json),
            self.single_line.then_some(OutputMode::SingleLine),
            self.stats.then_some(OutputMode::Stats),
        ];
        precedence
            .into_iter()
            .flatten()
            .next()
            .unwrap_or(OutputMode::Summary)
    }
}

/// Renders a port statistics snapshot.
pub fn render_ports(snapshot: &PortSnapshot, mode: &OutputMode) -> Result<String, EssStatError> {
    let timestamp = snapshot.captured_at.format(TIMESTAMP_FORMAT).to_string();

    let out = match mode {
        OutputMode::PointQuery { port, metric } => {
            snapshot.port(*port)?.value(*metric).to_string()
        }
        OutputMode::Discovery => discovery(&snapshot.ports)?,
        OutputMode::Json => serde_json::to_string(&snapshot.ports)?,
        OutputMode::SingleLine => {
            let head = [timestamp, snapshot.max_port_num.to_string()];
            let ports = snapshot.ports.iter().flat_map(|p| {
                [
                    p.port.to_string(),
                    p.state.code().to_string(),
                    p.link_status.code().to_string(),
                    p.tx_good_pkt.to_string(),
                    p.tx_bad_pkt.to_string(),
                    p.rx_good_pkt.to_string(),
                    p.rx_bad_pkt.to_string(),
                ]
            });
            head.into_iter().chain(ports).join(",")
        }
        OutputMode::Stats => snapshot
            .ports
            .iter()
            .map(|p| {
                format!(
                    "{};{};{};{},{},{},{}",
                    p.port,
                    p.state.label(),
                    p.link_status.label(),
                    p.tx_good_pkt,
                    p.tx_bad_pkt,
                    p.rx_good_pkt,
                    p.rx_bad_pkt
                )
            })
            .join("\n"),
        OutputMode::Summary => format!("{}\nmax_port_num={}", timestamp, snapshot.max_port_num),
    };
    Ok(out)
}

/// Renders a system info snapshot.
///
/// Port metrics do not exist on this page, so a point query is rejected.
pub fn render_system(snapshot: &SystemSnapshot, mode: &OutputMode) -> Result<String, EssStatError> {
    let timestamp = snapshot.captured_at.format(TIMESTAMP_FORMAT).to_string();
    let fields = snapshot.info.fields();

    let out = match mode {
        OutputMode::PointQuery { metric, .. } => {
            return Err(EssStatError::InvalidMetric(metric.to_string()))
        }
        OutputMode::Discovery => discovery(std::slice::from_ref(&snapshot.info))?,
        OutputMode::Json => serde_json::to_string(&snapshot.info)?,
        OutputMode::SingleLine => std::iter::once(timestamp.as_str())
            .chain(fields.iter().map(|(_, value)| *value))
            .join(","),
        OutputMode::Stats | OutputMode::Summary => std::iter::once(timestamp)
            .chain(fields.iter().map(|(name, value)| format!("{name}={value}")))
            .join("\n"),
    };
    Ok(out)
}

/// Wraps serialized records as `{"data":[{"{#FIELD}":value,...},...]}`.
fn discovery<T: Serialize>(items: &[T]) -> Result<String, EssStatError> {
    let data = items
        .iter()
        .map(|item| -> Result<Value, EssStatError> {
            Ok(match serde_json::to_value(item)? {
                Value::Object(fields) => Value::Object(
                    fields
                        .into_iter()
                        .map(|(key, value)| (format!("{{#{}}}", key.to_uppercase()), value))
                        .collect::<Map<String, Value>>(),
                ),
                other => other,
            })
        })
        .collect::<Result<Vec<Value>, EssStatError>>()?;

    Ok(serde_json::to_string(&json!({ "data": data }))?)
}
