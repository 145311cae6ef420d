use base64::{engine::general_purpose::STANDARD, Engine as _};
use lol::{
    builder::{ytotech, BuildError, Builder, Request, Ytotech},
    files::Files,
    params::{Parameters, Settings},
};
use mockito::{Matcher, Server};
use serde_json::json;

fn request(biblio: &str) -> Request {
    let parameters = Parameters::resolve(
        Settings {
            service: "ytotech".into(),
            biblio: biblio.into(),
            patterns: vec!["main.tex".into()],
            ..Default::default()
        },
        false,
    )
    .unwrap();
    let mut files = Files::new();
    files.insert("main.tex", b"hello".to_vec());
    files.insert("logo.png", vec![0xff, 0x00]);
    Request { parameters, files }
}

#[test]
fn body_marks_main_and_paths() {
    let body = serde_json::to_value(ytotech::build_body(&request(""))).unwrap();
    assert_eq!(
        body,
        json!({
            "compiler": "pdflatex",
            "resources": [
                { "path": "logo.png", "file": STANDARD.encode([0xffu8, 0x00]) },
                { "main": true, "file": STANDARD.encode("hello") },
            ]
        })
    );
}

#[test]
fn body_carries_bibliography_command() {
    let body = serde_json::to_value(ytotech::build_body(&request("biber"))).unwrap();
    assert_eq!(body["options"]["bibliography"]["command"], "biber");
}

#[test]
fn error_log_prefers_logs_field() {
    let log = ytotech::error_log(br#"{"error":"COMPILATION_ERROR","logs":"! Missing $ inserted."}"#);
    assert_eq!(log, "! Missing $ inserted.");
    let log = ytotech::error_log(br#"{"error":"SERVER_ERROR"}"#);
    assert_eq!(log, "SERVER_ERROR");
    let raw = ytotech::error_log(b"<html>Bad gateway</html>");
    assert!(raw.contains("not a valid json"));
    assert!(raw.contains("Bad gateway"));
}

#[test]
fn returns_pdf_on_success() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/builds/sync")
        .match_header("content-type", "application/json")
        .match_body(Matcher::PartialJson(json!({ "compiler": "pdflatex" })))
        .with_status(201)
        .with_body("%PDF-1.7 fake")
        .create();

    let builder = Ytotech::new(
        reqwest::blocking::Client::new(),
        &format!("{}/builds/sync", server.url()),
    );
    let pdf = builder.build_pdf(&request("")).unwrap();

    mock.assert();
    assert_eq!(pdf, b"%PDF-1.7 fake");
}

#[test]
fn returns_logs_on_failure() {
    let mut server = Server::new();
    let mock = server
        .mock("POST", "/builds/sync")
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":"COMPILATION_ERROR","logs":"! LaTeX Error: File `x.sty' not found."}"#)
        .create();

    let builder = Ytotech::new(
        reqwest::blocking::Client::new(),
        &format!("{}/builds/sync", server.url()),
    );
    let err = builder.build_pdf(&request("bibtex")).unwrap_err();

    mock.assert();
    assert!(matches!(err, BuildError::Compilation { status: 400, .. }));
    let shown = err.to_string();
    assert!(shown.contains("ytotech compilation error (status code 400)"));
    assert!(shown.contains("x.sty' not found"));
}

#[test]
fn service_selects_builder() {
    use lol::{builder::for_service, config::Services, params::Service};

    let cfg = Services::default();
    assert_eq!(for_service(Service::Ytotech, &cfg).unwrap().name(), "ytotech");
    assert_eq!(for_service(Service::Laton, &cfg).unwrap().name(), "laton");
}
