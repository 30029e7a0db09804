// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Route table. Everything under `/api` is the service API; the static bundle
// is registered as the app's default service by the caller.

use actix_cors::Cors;
use actix_web::web;

use crate::error::json_error_handler;
use crate::handlers::{health, print, printers, shutdown, vision};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .route("/health", web::get().to(health::health))
            .route("/printers", web::get().to(printers::list))
            .route("/print", web::post().to(print::print))
            .route(
                "/process-image-for-label",
                web::post().to(vision::process_image),
            )
            .route("/shutdown", web::post().to(shutdown::shutdown)),
    );
}

/// JSON extractor settings shared by every endpoint.
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(json_error_handler)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Arc;

    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;
    use labelvision_core::AppConfig;
    use labelvision_print::testing::{SimulatedCups, SimulatedSpooler};
    use labelvision_print::{CupsBackend, PrinterBackend, SpoolerBackend, UnavailableBackend};
    use serde_json::{Value, json};

    use super::*;
    use crate::handlers::static_files;
    use crate::state::AppState;

    const PDF: &[u8] = b"%PDF-1.4\n1 0 obj\n<<>>\nendobj\n%%EOF";

    macro_rules! app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($state))
                    .app_data(json_config(1024 * 1024))
                    .configure(configure)
                    .default_service(web::to(static_files::serve)),
            )
            .await
        };
    }

    struct Fixture {
        state: AppState,
        _spool: tempfile::TempDir,
        web: tempfile::TempDir,
    }

    fn fixture_with(backend: Arc<dyn PrinterBackend>, spool: tempfile::TempDir) -> Fixture {
        let web = tempfile::tempdir().expect("web root");
        let config = AppConfig {
            web_root: Some(web.path().to_path_buf()),
            ..AppConfig::default()
        };
        Fixture {
            state: AppState::new(backend, &config),
            _spool: spool,
            web,
        }
    }

    fn cups(printers: &[&str]) -> Fixture {
        let spool = tempfile::tempdir().expect("spool dir");
        let backend = CupsBackend::with_spool_dir(SimulatedCups::new(printers), spool.path());
        fixture_with(Arc::new(backend), spool)
    }

    fn unavailable() -> Fixture {
        fixture_with(
            Arc::new(UnavailableBackend),
            tempfile::tempdir().expect("spool dir"),
        )
    }

    fn print_body(printer: &str) -> Value {
        json!({ "pdfData": STANDARD.encode(PDF), "printerName": printer, "labelSummary": "Screws" })
    }

    #[actix_web::test]
    async fn health_is_ok_under_every_backend() {
        let none: Arc<dyn PrinterBackend> = Arc::new(UnavailableBackend);
        let cups_backend: Arc<dyn PrinterBackend> = Arc::new(CupsBackend::new(SimulatedCups::new(&["P"])));
        let spooler: Arc<dyn PrinterBackend> =
            Arc::new(SpoolerBackend::new(SimulatedSpooler::new(&["P"])));
        let backends = [(none, "none"), (cups_backend, "cups"), (spooler, "win32")];
        for (backend, label) in backends {
            let fx = fixture_with(backend, tempfile::tempdir().expect("spool"));
            let app = app!(fx.state);
            let req = test::TestRequest::get().uri("/api/health").to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK);
            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["status"], "ok");
            assert_eq!(body["printer_lib"], label);
            assert_eq!(body["platform"], labelvision_core::host_platform());
        }
    }

    #[actix_web::test]
    async fn printers_are_listed_and_stable_across_calls() {
        let fx = cups(&["LabelPrinter", "Office"]);
        let app = app!(fx.state);

        let mut seen = Vec::new();
        for _ in 0..2 {
            let req = test::TestRequest::get().uri("/api/printers").to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::OK);
            let names: Vec<String> = test::read_body_json(resp).await;
            seen.push(names.into_iter().collect::<HashSet<_>>());
        }
        assert_eq!(seen[0], seen[1]);
        assert!(seen[0].contains("LabelPrinter"));
    }

    #[actix_web::test]
    async fn enumeration_failure_degrades_to_empty_list() {
        let spool = tempfile::tempdir().expect("spool");
        let api = SimulatedCups::new(&["A"]).failing_at(labelvision_print::testing::CupsStep::Connect);
        let fx = fixture_with(Arc::new(CupsBackend::with_spool_dir(api, spool.path())), spool);
        let app = app!(fx.state);

        let req = test::TestRequest::get().uri("/api/printers").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let names: Vec<String> = test::read_body_json(resp).await;
        assert!(names.is_empty());
    }

    #[actix_web::test]
    async fn print_to_known_printer_succeeds() {
        let fx = cups(&["LabelPrinter"]);
        let app = app!(fx.state);

        let req = test::TestRequest::post()
            .uri("/api/print")
            .set_json(print_body("LabelPrinter"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        let message = body["message"].as_str().expect("message");
        assert!(message.contains("LabelPrinter"), "{message}");
    }

    #[actix_web::test]
    async fn print_to_unknown_printer_is_404() {
        let fx = cups(&["LabelPrinter"]);
        let app = app!(fx.state);

        let req = test::TestRequest::post()
            .uri("/api/print")
            .set_json(print_body("Nonexistent"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["detail"].as_str().expect("detail").contains("Nonexistent"));
    }

    #[actix_web::test]
    async fn invalid_base64_is_400_not_500() {
        let fx = cups(&["LabelPrinter"]);
        let app = app!(fx.state);

        let req = test::TestRequest::post()
            .uri("/api/print")
            .set_json(json!({ "pdfData": "@@not-base64@@", "printerName": "LabelPrinter" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["detail"], "Invalid Base64 encoding for pdfData");
    }

    #[actix_web::test]
    async fn missing_fields_are_listed() {
        let fx = cups(&["LabelPrinter"]);
        let app = app!(fx.state);

        let req = test::TestRequest::post()
            .uri("/api/print")
            .set_json(json!({ "labelSummary": "x" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(
            body["detail"],
            "Missing required field(s): 'pdfData', 'printerName'"
        );

        let req = test::TestRequest::post()
            .uri("/api/print")
            .set_json(json!({ "pdfData": STANDARD.encode(PDF), "printerName": "" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["detail"], "Missing required field(s): 'printerName'");
    }

    #[actix_web::test]
    async fn non_json_body_is_400() {
        let fx = cups(&["LabelPrinter"]);
        let app = app!(fx.state);

        let req = test::TestRequest::post()
            .uri("/api/print")
            .insert_header(("content-type", "text/plain"))
            .set_payload("pdfData=abc")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["detail"], "Request must be JSON");
    }

    #[actix_web::test]
    async fn body_over_the_payload_limit_is_413() {
        let fx = cups(&["LabelPrinter"]);
        let config = AppConfig {
            max_payload_bytes: 256,
            ..AppConfig::default()
        };
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(fx.state))
                .app_data(json_config(config.max_payload_bytes))
                .configure(configure),
        )
        .await;

        let big = json!({ "pdfData": STANDARD.encode(vec![b'x'; 1024]), "printerName": "LabelPrinter" });
        let req = test::TestRequest::post().uri("/api/print").set_json(big).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["detail"], "Request body too large");

        let small = json!({ "pdfData": STANDARD.encode(b"%PDF"), "printerName": "LabelPrinter" });
        let req = test::TestRequest::post().uri("/api/print").set_json(small).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn unavailable_backend_is_500_everywhere() {
        let fx = unavailable();
        let app = app!(fx.state);

        let req = test::TestRequest::get().uri("/api/printers").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["detail"].as_str().expect("detail").contains("not available"));

        let req = test::TestRequest::post()
            .uri("/api/print")
            .set_json(print_body("Nonexistent"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[actix_web::test]
    async fn vision_without_key_is_503() {
        let fx = cups(&["P"]);
        let app = app!(fx.state);

        let req = test::TestRequest::post()
            .uri("/api/process-image-for-label")
            .set_json(json!({ "imageData": "aGVsbG8=" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["detail"], "AI service not configured. Check GEMINI_API_KEY.");
    }

    #[actix_web::test]
    async fn vision_rejects_bad_input_before_calling_out() {
        let web = tempfile::tempdir().expect("web");
        let config = AppConfig {
            api_key: Some("test-key".into()),
            web_root: Some(web.path().to_path_buf()),
            ..AppConfig::default()
        };
        let state = AppState::new(Arc::new(UnavailableBackend), &config);
        let app = app!(state);

        let cases = [
            (json!({}), "Missing 'imageData' (Base64) in request body"),
            (json!({ "imageData": "%%%" }), "Invalid Base64 encoding for imageData"),
            (json!({ "imageData": "aGVsbG8gd29ybGQ=" }), "Invalid or unsupported image data"),
        ];
        for (body, detail) in cases {
            let req = test::TestRequest::post()
                .uri("/api/process-image-for-label")
                .set_json(body)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{detail}");
            let body: Value = test::read_body_json(resp).await;
            assert_eq!(body["detail"], detail);
        }
    }

    #[actix_web::test]
    async fn shutdown_without_server_is_500() {
        let fx = cups(&["P"]);
        let app = app!(fx.state);
        let req = test::TestRequest::post().uri("/api/shutdown").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["detail"], "Shutdown not available.");
    }

    #[actix_web::test]
    async fn static_bundle_serves_files_and_falls_back_to_index() {
        let fx = cups(&["P"]);
        std::fs::write(fx.web.path().join("index.html"), "<html>app</html>").expect("index");
        std::fs::write(fx.web.path().join("style.css"), "body{}").expect("css");
        let app = app!(fx.state);

        let req = test::TestRequest::get().uri("/style.css").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get("content-type").and_then(|v| v.to_str().ok()),
            Some("text/css")
        );

        let req = test::TestRequest::get().uri("/labels/edit").to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, web::Bytes::from_static(b"<html>app</html>"));
    }

    #[actix_web::test]
    async fn missing_bundle_is_404_json() {
        let fx = cups(&["P"]);
        let app = app!(fx.state);
        let req = test::TestRequest::get().uri("/").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(
            body["error"],
            "Web application not found. Please build the frontend."
        );
    }
}
