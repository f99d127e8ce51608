//! Port and system telemetry for TP-Link Easy Smart switches, scraped from
//! the JavaScript variables embedded in their web admin pages.

pub mod builder;
pub mod config;
pub mod data;
pub mod decode;
pub mod error;
pub mod extract;
pub mod fetcher;
pub mod layout;
pub mod models;
pub mod output;
pub mod pipeline;

pub use error::EssStatError;
pub use layout::Layout;
pub use models::{
    LinkStatus, Metric, PortRecord, PortSnapshot, PortState, SystemInfo, SystemSnapshot,
};
pub use output::{render_ports, render_system, OutputMode, OutputRequest};
pub use pipeline::{port_snapshot, system_snapshot};
