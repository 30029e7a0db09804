// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Tracing subscriber setup.
//
// `RUST_LOG` wins when set and valid. Otherwise the configured level applies,
// with chatty transport crates held at `warn`. actix's request `Logger` emits
// through the `log` facade, which the fmt subscriber bridges.

use tracing_subscriber::EnvFilter;

const QUIET_TARGETS: &[(&str, &str)] = &[
    ("actix_server", "warn"),
    ("actix_web", "warn"),
    ("actix_web::middleware::logger", "info"),
    ("hyper", "warn"),
    ("hyper_util", "warn"),
    ("reqwest", "warn"),
    ("rustls", "warn"),
    ("h2", "warn"),
];

/// Filter string for `level` plus the quieting directives.
pub fn directives(level: &str) -> String {
    let mut parts = vec![level.trim().to_string()];
    parts.extend(QUIET_TARGETS.iter().map(|(t, l)| format!("{t}={l}")));
    parts.join(",")
}

/// Build the filter. The second value is a problem worth reporting once the
/// subscriber is up.
pub fn build_filter(level: &str, rust_log: Option<&str>) -> (EnvFilter, Option<String>) {
    let mut problem = None;

    if let Some(spec) = rust_log.map(str::trim).filter(|s| !s.is_empty()) {
        match EnvFilter::try_new(spec) {
            Ok(filter) => return (filter, None),
            Err(e) => problem = Some(format!("ignoring invalid RUST_LOG '{spec}': {e}")),
        }
    }

    match EnvFilter::try_new(directives(level)) {
        Ok(filter) => (filter, problem),
        Err(e) => (
            EnvFilter::new(directives("info")),
            Some(format!("invalid log_level '{level}', using info: {e}")),
        ),
    }
}

pub fn init(level: &str) {
    let rust_log = std::env::var("RUST_LOG").ok();
    let (filter, problem) = build_filter(level, rust_log.as_deref());

    if tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_err()
    {
        return;
    }
    if let Some(problem) = problem {
        tracing::warn!("{problem}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_quiet_transport_crates() {
        let d = directives("debug");
        assert!(d.starts_with("debug,"));
        assert!(d.contains("actix_server=warn"));
        assert!(d.contains("reqwest=warn"));
    }

    #[test]
    fn rust_log_takes_precedence() {
        let (filter, problem) = build_filter("info", Some("labelvision=trace"));
        assert!(problem.is_none());
        assert!(filter.to_string().contains("labelvision=trace"));
    }

    #[test]
    fn bad_inputs_fall_back_with_a_reported_problem() {
        let (_, problem) = build_filter("info", Some("=[not a filter"));
        assert!(problem.expect("problem").contains("RUST_LOG"));

        let (_, problem) = build_filter("loud=[", None);
        assert!(problem.expect("problem").contains("log_level"));
    }

    #[test]
    fn blank_rust_log_is_ignored() {
        let (_, problem) = build_filter("info", Some("   "));
        assert!(problem.is_none());
    }
}
