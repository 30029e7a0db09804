// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>

pub mod health;
pub mod print;
pub mod printers;
pub mod shutdown;
pub mod static_files;
pub mod vision;
