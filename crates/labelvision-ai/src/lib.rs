// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// LabelVision AI: turns a photo of a drawer or shelf into a list of item
// names plus a short summary for the label header.  Nothing in the print path
// depends on this crate.

pub mod client;
pub mod image_data;
pub mod parse;

pub use client::VisionClient;
pub use image_data::LabelImage;
pub use parse::{LabelAnalysis, parse_label_response};
