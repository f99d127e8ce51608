//! Typed records from decoded raw columns.

use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::debug;

use crate::decode::{RawColumns, PKTS_STRIDE};
use crate::error::EssStatError;
use crate::models::{LinkStatus, PortRecord, PortState, SystemInfo};

static INFO_DS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)var\s+info_ds\s*=\s*\{(.*?)\}\s*;").expect("info_ds regex is valid")
});
static INFO_FIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\b(\w+)\s*:\s*\[\s*"([^"]*)""#).expect("info field regex is valid")
});

const COUNTER_FIELDS: [&str; PKTS_STRIDE] = ["TxGoodPkt", "TxBadPkt", "RxGoodPkt", "RxBadPkt"];

/// Builds records for ports `1..=max_port_num` from the raw columns.
pub fn build_ports(
    max_port_num: usize,
    columns: &RawColumns,
) -> Result<Vec<PortRecord>, EssStatError> {
    check_len("state", columns.state.len(), max_port_num)?;
    check_len("link_status", columns.link_status.len(), max_port_num)?;
    check_len("pkts", columns.pkts.len() / PKTS_STRIDE, max_port_num)?;

    (1..=max_port_num)
        .map(|port| -> Result<PortRecord, EssStatError> {
            let idx = port - 1;
            let state = parse_code::<PortState>("state", &columns.state[idx])?;
            let link_status = parse_code::<LinkStatus>("link_status", &columns.link_status[idx])?;

            let counters = &columns.pkts[idx * PKTS_STRIDE..(idx + 1) * PKTS_STRIDE];
            let mut parsed = [0u64; PKTS_STRIDE];
            for ((slot, raw), field) in parsed.iter_mut().zip(counters).zip(COUNTER_FIELDS) {
                *slot = raw
                    .parse()
                    .map_err(|_| EssStatError::InvalidCounter { port, field })?;
            }
            let [tx_good_pkt, tx_bad_pkt, rx_good_pkt, rx_bad_pkt] = parsed;

            Ok(PortRecord {
                port,
                state,
                link_status,
                tx_good_pkt,
                tx_bad_pkt,
                rx_good_pkt,
                rx_bad_pkt,
            })
        })
        .collect()
}

fn check_len(field: &str, have: usize, need: usize) -> Result<(), EssStatError> {
    if have < need {
        return Err(EssStatError::MalformedFieldBlob(format!(
            "{field} covers {have} ports, max_port_num is {need}"
        )));
    }
    Ok(())
}

fn parse_code<T>(field: &'static str, raw: &str) -> Result<T, EssStatError>
where
    T: TryFrom<u8, Error = EssStatError>,
{
    let unknown = || EssStatError::UnknownEnumCode {
        field,
        raw: raw.to_string(),
    };
    let code: u8 = raw.parse().map_err(|_| unknown())?;
    T::try_from(code).map_err(|_| unknown())
}

/// Reads the `info_ds` object of the system info page.
///
/// Each field is the first quoted string of its single-element array. A
/// field the firmware does not emit is left empty; a page without an
/// `info_ds` object at all is rejected.
pub fn build_system_info(html: &str) -> Result<SystemInfo, EssStatError> {
    let block = INFO_DS_RE
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| EssStatError::FieldNotFound("info_ds".to_string()))?;

    let mut fields: HashMap<&str, &str> = HashMap::new();
    for caps in INFO_FIELD_RE.captures_iter(block) {
        if let (Some(key), Some(value)) = (caps.get(1), caps.get(2)) {
            fields.entry(key.as_str()).or_insert(value.as_str());
        }
    }
    let field = |key: &str| fields.get(key).map(|v| v.to_string()).unwrap_or_default();

    let info = SystemInfo {
        description: field("descriStr"),
        mac: field("macStr"),
        ip: field("ipStr"),
        netmask: field("netmaskStr"),
        gateway: field("gatewayStr"),
        firmware: field("firmwareStr"),
        hardware: field("hardwareStr"),
    };
    debug!("System info: {:?}", info);
    Ok(info)
}
