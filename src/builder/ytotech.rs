//! latex.ytotech.com (LaTeX-on-HTTP).
//!
//! The request is a single JSON document:
//!
//! ```json
//! {
//!   "compiler": "pdflatex",
//!   "options": { "bibliography": { "command": "biber" } },
//!   "resources": [
//!     { "main": true, "file": "...base64..." },
//!     { "path": "logo.png", "file": "...base64..." }
//!   ]
//! }
//! ```
//!
//! `options` is only present when a bibliography tool is requested.

use super::{read_response, BuildError, Builder, Request};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};

const SERVICE: &str = "ytotech";

pub struct Ytotech {
    client: Client,
    url: String,
}

impl Ytotech {
    pub fn new(client: Client, url: &str) -> Self {
        Self {
            client,
            url: url.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BuildBody<'a> {
    pub compiler: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<BuildOptions<'a>>,
    pub resources: Vec<Resource<'a>>,
}

#[derive(Debug, Serialize)]
pub struct BuildOptions<'a> {
    pub bibliography: BibliographyOption<'a>,
}

#[derive(Debug, Serialize)]
pub struct BibliographyOption<'a> {
    pub command: &'a str,
}

#[derive(Debug, Serialize)]
pub struct Resource<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<&'a str>,
    pub file: String,
}

/// Error document returned with a non-2xx status.
#[derive(Debug, Deserialize)]
pub struct CompilationError {
    #[serde(default)]
    pub error: String,
    #[serde(default)]
    pub logs: String,
}

pub fn build_body(req: &Request) -> BuildBody<'_> {
    let main = req.main_name();
    let resources = req
        .files
        .iter()
        .map(|(name, data)| {
            let is_main = name == main;
            Resource {
                main: is_main.then_some(true),
                path: (!is_main).then_some(name),
                file: STANDARD.encode(data),
            }
        })
        .collect();
    BuildBody {
        compiler: req.parameters.compiler.as_str(),
        options: req.parameters.biblio.map(|b| BuildOptions {
            bibliography: BibliographyOption { command: b.as_str() },
        }),
        resources,
    }
}

/// The `logs` field of an error answer, or the raw body when it isn't the
/// expected JSON.
pub fn error_log(body: &[u8]) -> String {
    match serde_json::from_slice::<CompilationError>(body) {
        Ok(err) if !err.logs.is_empty() => err.logs,
        Ok(err) if !err.error.is_empty() => err.error,
        _ => format!(
            "the answer is not a valid json:\n{}",
            String::from_utf8_lossy(body)
        ),
    }
}

impl Builder for Ytotech {
    fn name(&self) -> &'static str {
        SERVICE
    }

    fn build_pdf(&self, req: &Request) -> Result<Vec<u8>, BuildError> {
        let body = serde_json::to_vec(&build_body(req))?;

        let resp = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .map_err(|source| BuildError::Http {
                service: SERVICE,
                source,
            })?;

        read_response(SERVICE, resp, error_log)
    }
}
