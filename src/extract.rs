//! Field extraction from the embedded port statistics script.
//!
//! Each firmware layout is a [`LayoutSource`]: it produces a [`RawBlob`] in
//! the shared `key:[values,0,0]` grammar and later arranges the decoded
//! groups into the canonical columns. Supporting another firmware means
//! adding another implementation.

use itertools::Itertools;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use tracing::debug;

use crate::decode::{self, FieldGroups, RawColumns};
use crate::error::EssStatError;
use crate::layout::Layout;

static SCRIPT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("script").expect("script selector is valid"));
static MAX_PORT_NUM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"var\s+max_port_num\s*=\s*(\d+)\s*;").expect("max_port_num regex is valid")
});
static ALL_INFO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)var\s+all_info\s*=\s*\{\s*(.*?)\s*\}\s*;").expect("all_info regex is valid")
});
static TMP_INFO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)\btmp_info\s*=\s*"([^"]*)"\s*;"#).expect("tmp_info regex is valid")
});
static TMP_INFO2_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)\btmp_info2\s*=\s*"([^"]*)"\s*;"#).expect("tmp_info2 regex is valid")
});

/// Port count and undecoded field text pulled from a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBlob {
    pub layout: Layout,
    pub max_port_num: usize,
    /// `key:[v0,v1,...,0,0]` entries, one or more.
    pub text: String,
}

/// Layout-specific half of the pipeline.
pub trait LayoutSource: Sync {
    /// Locates `max_port_num` and the packed field arrays.
    fn extract(&self, doc: &Html) -> Result<RawBlob, EssStatError>;

    /// Turns sentinel-stripped field groups into the canonical columns.
    fn arrange(&self, groups: &FieldGroups) -> Result<RawColumns, EssStatError>;
}

/// Firmware that ships a single `var all_info = {...};` object.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardLayout;

impl LayoutSource for StandardLayout {
    fn extract(&self, doc: &Html) -> Result<RawBlob, EssStatError> {
        let script = doc
            .select(&SCRIPT)
            .next()
            .map(script_text)
            .ok_or(EssStatError::LayoutUnrecognized)?;

        let max_port_num = max_port_num(&script)?;
        let text = capture(&ALL_INFO_RE, &script, "all_info")?;

        Ok(RawBlob {
            layout: Layout::Standard,
            max_port_num,
            text: text.to_string(),
        })
    }

    fn arrange(&self, groups: &FieldGroups) -> Result<RawColumns, EssStatError> {
        decode::arrange_parallel(groups)
    }
}

/// Firmware that splits port data into `tmp_info` and `tmp_info2` strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConvolutedLayout;

impl ConvolutedLayout {
    /// Joins the two string payloads and pads them with the `0,0` sentinel
    /// this firmware leaves out, so the shared decoder can strip it.
    pub fn harmonize(tmp_info: &str, tmp_info2: &str) -> String {
        let joined = [tmp_info, tmp_info2]
            .iter()
            .map(|part| part.trim().trim_matches(','))
            .filter(|part| !part.is_empty())
            .join(",");
        if joined.is_empty() {
            format!("{}:[0,0]", decode::INTERLEAVED_GROUP)
        } else {
            format!("{}:[{},0,0]", decode::INTERLEAVED_GROUP, joined)
        }
    }
}

impl LayoutSource for ConvolutedLayout {
    fn extract(&self, doc: &Html) -> Result<RawBlob, EssStatError> {
        // A page without <body> keeps the data scripts in <head>.
        let scripts: String = doc.select(&SCRIPT).map(script_text).join("\n");

        let max_port_num = max_port_num(&scripts)?;
        let tmp_info = capture(&TMP_INFO_RE, &scripts, "tmp_info")?;
        let tmp_info2 = capture(&TMP_INFO2_RE, &scripts, "tmp_info2")?;

        Ok(RawBlob {
            layout: Layout::Convoluted,
            max_port_num,
            text: Self::harmonize(tmp_info, tmp_info2),
        })
    }

    fn arrange(&self, groups: &FieldGroups) -> Result<RawColumns, EssStatError> {
        decode::arrange_interleaved(groups)
    }
}

fn script_text(script: ElementRef<'_>) -> String {
    script.text().collect()
}

fn max_port_num(script: &str) -> Result<usize, EssStatError> {
    let raw = capture(&MAX_PORT_NUM_RE, script, "max_port_num")?;
    let n = raw
        .parse()
        .map_err(|_| EssStatError::FieldNotFound("max_port_num".to_string()))?;
    debug!("max_port_num={}", n);
    Ok(n)
}

fn capture<'a>(re: &Regex, haystack: &'a str, field: &str) -> Result<&'a str, EssStatError> {
    re.captures(haystack)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| EssStatError::FieldNotFound(field.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const STANDARD: &str = r#"
    <html><head><title>Port Statistics</title></head><body>
    <script type="text/javascript">
    var max_port_num = 2;
    var all_info = {
    state:[1,1,0,0],
    link_status:[6,0,0,0],
    pkts:[100,0,50,0,0,0,0,0,0,0]
    };
    </script>
    </body></html>
    "#;

    const CONVOLUTED: &str = r#"
    <html><head><script>var max_port_num = 2;</script></head><body>
    <script>
    tmp_info = "1,6,100,0,50,0 1,0,0,0,0,0";
    tmp_info2 = "";
    </script>
    </body></html>
    "#;

    #[test]
    fn test_standard_extract() {
        let doc = Html::parse_document(STANDARD);
        let blob = StandardLayout.extract(&doc).unwrap();
        assert_eq!(blob.max_port_num, 2);
        assert_eq!(blob.layout, Layout::Standard);
        assert!(blob.text.starts_with("state:[1,1,0,0]"));
        assert!(blob.text.ends_with("pkts:[100,0,50,0,0,0,0,0,0,0]"));
    }

    #[test]
    fn test_standard_missing_all_info() {
        let doc = Html::parse_document("<body><script>var max_port_num = 8;</script></body>");
        assert!(matches!(
            StandardLayout.extract(&doc),
            Err(EssStatError::FieldNotFound(f)) if f == "all_info"
        ));
    }

    #[test]
    fn test_standard_missing_max_port_num() {
        let doc = Html::parse_document("<body><script>var all_info = {state:[0,0]};</script></body>");
        assert!(matches!(
            StandardLayout.extract(&doc),
            Err(EssStatError::FieldNotFound(f)) if f == "max_port_num"
        ));
    }

    #[test]
    fn test_convoluted_extract() {
        let doc = Html::parse_document(CONVOLUTED);
        let blob = ConvolutedLayout.extract(&doc).unwrap();
        assert_eq!(blob.max_port_num, 2);
        assert_eq!(blob.text, "tmp_info:[1,6,100,0,50,0 1,0,0,0,0,0,0,0]");
    }

    #[test]
    fn test_convoluted_without_body() {
        let html = r#"<html><head>
        <script>var max_port_num = 1;</script>
        <script>tmp_info = "1,6,1,2,3,4"; tmp_info2 = "";</script>
        </head></html>"#;
        let doc = Html::parse_document(html);
        let blob = ConvolutedLayout.extract(&doc).unwrap();
        assert_eq!(blob.max_port_num, 1);
        assert_eq!(blob.text, "tmp_info:[1,6,1,2,3,4,0,0]");
    }

    #[test]
    fn test_convoluted_missing_tmp_info2() {
        let html = r#"<html><head><script>var max_port_num = 1;</script></head>
        <body><script>tmp_info = "1,6,1,2,3,4";</script></body></html>"#;
        let doc = Html::parse_document(html);
        assert!(matches!(
            ConvolutedLayout.extract(&doc),
            Err(EssStatError::FieldNotFound(f)) if f == "tmp_info2"
        ));
    }

    #[test]
    fn test_harmonize_joins_and_pads() {
        assert_eq!(
            ConvolutedLayout::harmonize("1,6,1,2,3,4", "0,0,0,0,0,0"),
            "tmp_info:[1,6,1,2,3,4,0,0,0,0,0,0,0,0]"
        );
        assert_eq!(ConvolutedLayout::harmonize(" ", ""), "tmp_info:[0,0]");
    }
}
