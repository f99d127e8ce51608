//! Firmware layout detection for the port statistics page.
//!
//! Two firmware generations embed port data differently. The older one
//! keeps everything in a single `all_info` object; a later build emits
//! malformed markup where the page's first script is the one inside
//! `<head>`, and moves the port data into `tmp_info` strings.
//!
//! Head membership is decided from the raw source order. An HTML5 parser
//! would hoist any stray leading `<script>` into an implied `<head>` and
//! misreport the layout.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;
use tracing::debug;

use crate::error::EssStatError;
use crate::extract::{ConvolutedLayout, LayoutSource, StandardLayout};

static SCRIPT_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<script[\s>]").expect("script tag regex is valid"));
static HEAD_OPEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<head[\s>]").expect("head tag regex is valid"));
static HEAD_CLOSE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)</head\s*>").expect("head close regex is valid"));

/// Known ways the firmware lays out the port statistics script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// One script holding `max_port_num` and the `all_info` object.
    Standard,
    /// `max_port_num` in the head script, `tmp_info`/`tmp_info2` elsewhere.
    Convoluted,
}

impl Layout {
    /// Inspects the page source once and picks the layout.
    ///
    /// `Convoluted` when the first `<script>` opens after `<head>` and before
    /// `</head>` (or with the head never closed).
    pub fn detect(html: &str) -> Result<Self, EssStatError> {
        let script = SCRIPT_OPEN_RE
            .find(html)
            .ok_or(EssStatError::LayoutUnrecognized)?
            .start();

        let in_head = HEAD_OPEN_RE.find(html).is_some_and(|head| {
            head.start() < script
                && HEAD_CLOSE_RE
                    .find_at(html, head.end())
                    .is_none_or(|close| close.start() > script)
        });

        let layout = if in_head {
            Layout::Convoluted
        } else {
            Layout::Standard
        };
        debug!("Detected {} page layout", layout);
        Ok(layout)
    }

    /// Strategy that extracts and arranges fields for this layout.
    pub fn source(self) -> &'static dyn LayoutSource {
        match self {
            Layout::Standard => &StandardLayout,
            Layout::Convoluted => &ConvolutedLayout,
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layout::Standard => f.write_str("standard"),
            Layout::Convoluted => f.write_str("convoluted"),
        }
    }
}
