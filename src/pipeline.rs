//! Page-to-snapshot composition of the extraction stages.

use chrono::NaiveDateTime;
use scraper::Html;
use tracing::{debug, info};

use crate::builder::{build_ports, build_system_info};
use crate::decode::decode;
use crate::error::EssStatError;
use crate::layout::Layout;
use crate::models::{PortSnapshot, SystemSnapshot};

/// Decodes a port statistics page.
///
/// Either the whole snapshot is produced or the first error is returned.
pub fn port_snapshot(html: &str, captured_at: NaiveDateTime) -> Result<PortSnapshot, EssStatError> {
    let layout = Layout::detect(html)?;
    let doc = Html::parse_document(html);

    let blob = layout.source().extract(&doc)?;
    debug!("Raw field blob: {}", blob.text);

    let columns = decode(&blob)?;
    let ports = build_ports(blob.max_port_num, &columns)?;
    info!("Decoded {} ports from {} layout", ports.len(), layout);

    Ok(PortSnapshot {
        captured_at,
        max_port_num: blob.max_port_num,
        ports,
    })
}

/// Decodes a system info page.
pub fn system_snapshot(
    html: &str,
    captured_at: NaiveDateTime,
) -> Result<SystemSnapshot, EssStatError> {
    let info = build_system_info(html)?;
    Ok(SystemSnapshot { captured_at, info })
}
