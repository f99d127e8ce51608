//! Decoding of packed field arrays into canonical raw columns.
//!
//! Both layouts end up as `name:[v0,v1,...,0,0]` entries. The trailing
//! `0,0` pair is firmware padding and never belongs to a port.

use itertools::Itertools;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use crate::error::EssStatError;
use crate::extract::RawBlob;

/// Group name of the interleaved Convoluted payload.
pub const INTERLEAVED_GROUP: &str = "tmp_info";

/// Counters per port in the `pkts` array.
pub const PKTS_STRIDE: usize = 4;
/// Values per port in the interleaved payload.
pub const INTERLEAVED_STRIDE: usize = 6;

static ENTRY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\w+)\s*:\s*(\[[^\]]*\]|[^,\n\]]*)").expect("entry regex is valid")
});
static SENTINEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^(?:(.*),)?\s*0\s*,\s*0\s*$").expect("sentinel regex is valid")
});

/// Sentinel-stripped payloads keyed by field group name, in page order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldGroups {
    groups: Vec<(String, String)>,
}

impl FieldGroups {
    pub fn get(&self, name: &str) -> Result<&str, EssStatError> {
        self.groups
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, payload)| payload.as_str())
            .ok_or_else(|| EssStatError::FieldNotFound(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|(key, _)| key.as_str())
    }
}

/// Per-port raw strings in one layout-independent shape.
///
/// Port `i` (0-based) owns `state[i]`, `link_status[i]` and
/// `pkts[i*4..i*4+4]` as TxGood, TxBad, RxGood, RxBad.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawColumns {
    pub state: Vec<String>,
    pub link_status: Vec<String>,
    pub pkts: Vec<String>,
}

/// Splits a blob into its groups and arranges them for the blob's layout.
pub fn decode(blob: &RawBlob) -> Result<RawColumns, EssStatError> {
    let groups = split_groups(&blob.text)?;
    debug!("Field groups: {}", groups.names().join(", "));
    blob.layout.source().arrange(&groups)
}

/// Splits `key:[...]` entries and strips the sentinel from each array.
pub fn split_groups(text: &str) -> Result<FieldGroups, EssStatError> {
    let mut groups = Vec::new();
    for caps in ENTRY_RE.captures_iter(text) {
        let key = &caps[1];
        let payload = strip_sentinel(key, &caps[2])?;
        groups.push((key.to_string(), payload.to_string()));
    }

    if groups.is_empty() {
        return Err(EssStatError::MalformedFieldBlob(
            "no key:[...] entries found".to_string(),
        ));
    }
    Ok(FieldGroups { groups })
}

fn strip_sentinel<'a>(key: &str, value: &'a str) -> Result<&'a str, EssStatError> {
    let inner = value
        .trim()
        .strip_prefix('[')
        .and_then(|v| v.strip_suffix(']'))
        .ok_or_else(|| EssStatError::MalformedFieldBlob(format!("{key} is not an array")))?;

    SENTINEL_RE
        .captures(inner)
        .map(|caps| caps.get(1).map_or("", |m| m.as_str().trim()))
        .ok_or_else(|| {
            EssStatError::MalformedFieldBlob(format!("{key} does not end in the 0,0 sentinel"))
        })
}

/// Standard layout: three independent comma-separated arrays.
pub fn arrange_parallel(groups: &FieldGroups) -> Result<RawColumns, EssStatError> {
    let columns = RawColumns {
        state: split_commas(groups.get("state")?),
        link_status: split_commas(groups.get("link_status")?),
        pkts: split_commas(groups.get("pkts")?),
    };

    if columns.pkts.len() % PKTS_STRIDE != 0 {
        return Err(EssStatError::MalformedFieldBlob(format!(
            "pkts has {} values, not a multiple of {}",
            columns.pkts.len(),
            PKTS_STRIDE
        )));
    }
    Ok(columns)
}

/// Convoluted layout: one stream of `(state, link, txg, txb, rxg, rxb)`
/// tuples, redistributed into the Standard columns.
pub fn arrange_interleaved(groups: &FieldGroups) -> Result<RawColumns, EssStatError> {
    let values: Vec<&str> = groups
        .get(INTERLEAVED_GROUP)?
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|v| !v.is_empty())
        .collect();

    if values.len() % INTERLEAVED_STRIDE != 0 {
        return Err(EssStatError::MalformedFieldBlob(format!(
            "{} has {} values, not a multiple of {}",
            INTERLEAVED_GROUP,
            values.len(),
            INTERLEAVED_STRIDE
        )));
    }

    let mut columns = RawColumns::default();
    for (state, link, tx_good, tx_bad, rx_good, rx_bad) in values.into_iter().tuples() {
        columns.state.push(state.to_string());
        columns.link_status.push(link.to_string());
        columns
            .pkts
            .extend([tx_good, tx_bad, rx_good, rx_bad].map(str::to_string));
    }
    Ok(columns)
}

fn split_commas(payload: &str) -> Vec<String> {
    if payload.is_empty() {
        return Vec::new();
    }
    payload.split(',').map(|v| v.trim().to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Layout;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_split_groups_multiline() {
        let text = "state:[1,1,0,0,0,0],\nlink_status:[6,0,0,0,0,0],\npkts:[1,2,3,4,0,0]";
        let groups = split_groups(text).unwrap();
        assert_eq!(groups.names().collect::<Vec<_>>(), ["state", "link_status", "pkts"]);
        assert_eq!(groups.get("state").unwrap(), "1,1,0,0");
        assert_eq!(groups.get("pkts").unwrap(), "1,2,3,4");
    }

    #[test]
    fn test_split_groups_single_line() {
        let text = "state:[1,0,0], link_status:[5,0,0], pkts:[9,8,7,6,0,0]";
        let groups = split_groups(text).unwrap();
        assert_eq!(groups.get("link_status").unwrap(), "5");
    }

    #[test]
    fn test_sentinel_only_array_is_empty() {
        let groups = split_groups("state:[0,0]").unwrap();
        assert_eq!(groups.get("state").unwrap(), "");
    }

    #[test]
    fn test_missing_sentinel() {
        assert!(matches!(
            split_groups("state:[1,1,0]"),
            Err(EssStatError::MalformedFieldBlob(_))
        ));
        assert!(matches!(
            split_groups("state:[1,1,0,1]"),
            Err(EssStatError::MalformedFieldBlob(_))
        ));
    }

    #[test]
    fn test_scalar_entry_rejected() {
        assert!(matches!(
            split_groups("state:1"),
            Err(EssStatError::MalformedFieldBlob(_))
        ));
    }

    #[test]
    fn test_no_entries() {
        assert!(split_groups("").is_err());
    }

    #[test]
    fn test_parallel_missing_group() {
        let groups = split_groups("state:[1,0,0]\nlink_status:[6,0,0]").unwrap();
        assert!(matches!(
            arrange_parallel(&groups),
            Err(EssStatError::FieldNotFound(f)) if f == "pkts"
        ));
    }

    #[test]
    fn test_parallel_bad_pkts_stride() {
        let groups = split_groups("state:[1,0,0]\nlink_status:[6,0,0]\npkts:[1,2,3,0,0]").unwrap();
        assert!(matches!(
            arrange_parallel(&groups),
            Err(EssStatError::MalformedFieldBlob(_))
        ));
    }

    #[test]
    fn test_interleaved_bad_stride() {
        let groups = split_groups("tmp_info:[1,6,1,2,3,0,0]").unwrap();
        assert!(matches!(
            arrange_interleaved(&groups),
            Err(EssStatError::MalformedFieldBlob(_))
        ));
    }

    #[test]
    fn test_interleaved_matches_parallel() {
        let standard = RawBlob {
            layout: Layout::Standard,
            max_port_num: 3,
            text: "state:[1,0,1,0,0]\nlink_status:[5,0,2,0,0]\n\
                   pkts:[10,1,20,2,0,0,0,0,30,3,40,4,0,0]"
                .to_string(),
        };
        let convoluted = RawBlob {
            layout: Layout::Convoluted,
            max_port_num: 3,
            text: "tmp_info:[1,5,10,1,20,2 0,0,0,0,0,0 1,2,30,3,40,4,0,0]".to_string(),
        };

        let expected = RawColumns {
            state: strings(&["1", "0", "1"]),
            link_status: strings(&["5", "0", "2"]),
            pkts: strings(&["10", "1", "20", "2", "0", "0", "0", "0", "30", "3", "40", "4"]),
        };
        assert_eq!(decode(&standard).unwrap(), expected);
        assert_eq!(decode(&convoluted).unwrap(), expected);
    }
}
