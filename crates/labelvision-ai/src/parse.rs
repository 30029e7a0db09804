// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Parsing of the model's free-text answer.
//
// The prompt asks for:
//
//   Identified Items:
//   - Item 1
//   - Item 2
//   Summary:
//   Short summary
//
// Models do not always comply, so anything unrecognised degrades to a
// summary cut from the raw text and an empty item list.

use serde::{Deserialize, Serialize};
use tracing::warn;

pub const ITEMS_MARKER: &str = "Identified Items:";
pub const SUMMARY_MARKER: &str = "Summary:";

/// Characters of raw text kept as the summary when the format is not followed.
pub const FALLBACK_SUMMARY_CHARS: usize = 100;

/// Items and summary extracted from one image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelAnalysis {
    pub identified_items: Vec<String>,
    pub summary: String,
}

pub fn parse_label_response(raw: &str) -> LabelAnalysis {
    let raw = raw.trim();

    let (Some((_, after_items)), Some((_, summary_section))) =
        (raw.split_once(ITEMS_MARKER), raw.split_once(SUMMARY_MARKER))
    else {
        warn!("vision response did not follow the expected format");
        return LabelAnalysis {
            identified_items: Vec::new(),
            summary: raw.chars().take(FALLBACK_SUMMARY_CHARS).collect(),
        };
    };

    let items_section = after_items
        .split_once(SUMMARY_MARKER)
        .map_or(after_items, |(items, _)| items);

    let identified_items: Vec<String> = items_section
        .lines()
        .filter_map(|line| line.trim().strip_prefix('-'))
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(String::from)
        .collect();
    if identified_items.is_empty() {
        warn!("no items extracted from vision response");
    }

    let summary = summary_section
        .trim()
        .lines()
        .next()
        .unwrap_or_default()
        .trim()
        .to_string();

    LabelAnalysis {
        identified_items,
        summary,
    }
}
