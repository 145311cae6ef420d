//! Online LaTeX compilers.
//!
//! Every service implements [`Builder`]: it receives a [`Request`] (how to
//! build plus the source files) and answers with the PDF bytes or a
//! [`BuildError`] carrying the compilation log.

pub mod laton;
pub mod ytotech;

use crate::{
    config::Services,
    files::Files,
    params::{Parameters, Service},
    util::unix_name,
};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

pub use laton::Laton;
pub use ytotech::Ytotech;

/// Everything needed to build the PDF.
#[derive(Debug, Clone)]
pub struct Request {
    pub parameters: Parameters,
    pub files: Files,
}

impl Request {
    /// Key of the main file inside `files`.
    pub fn main_name(&self) -> String {
        unix_name(&self.parameters.main)
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.parameters, self.files)
    }
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("HTTP request to {service} failed: {source}")]
    Http {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("packing the sources failed: {0}")]
    Archive(#[from] std::io::Error),

    #[error("encoding the request failed: {0}")]
    Encode(#[from] serde_json::Error),

    /// The service answered with a non-2xx status. `log` is the LaTeX log
    /// (or the raw body when it could not be decoded).
    #[error("{service} compilation error (status code {status}):\n{log}")]
    Compilation {
        service: &'static str,
        status: u16,
        log: String,
    },
}

pub trait Builder {
    fn name(&self) -> &'static str;
    fn build_pdf(&self, req: &Request) -> Result<Vec<u8>, BuildError>;
}

/// The builder talking to `service`, with endpoints from `cfg`.
pub fn for_service(service: Service, cfg: &Services) -> Result<Box<dyn Builder>, BuildError> {
    let client = http_client(cfg).map_err(|source| BuildError::Http {
        service: service.as_str(),
        source,
    })?;
    let builder: Box<dyn Builder> = match service {
        Service::Laton => Box::new(Laton::new(client, &cfg.laton_url)),
        Service::Ytotech => Box::new(Ytotech::new(client, &cfg.ytotech_url)),
    };
    Ok(builder)
}

fn http_client(cfg: &Services) -> reqwest::Result<reqwest::blocking::Client> {
    let timeout = (cfg.timeout_seconds > 0).then(|| Duration::from_secs(cfg.timeout_seconds));
    reqwest::blocking::Client::builder()
        .user_agent(concat!("lol/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()
}

/// Reads the whole response; a non-2xx status is handed to `on_error` with
/// the body so each service can decode its own error format.
fn read_response(
    service: &'static str,
    resp: reqwest::blocking::Response,
    on_error: impl FnOnce(&[u8]) -> String,
) -> Result<Vec<u8>, BuildError> {
    let status = resp.status();
    let body = resp
        .bytes()
        .map_err(|source| BuildError::Http { service, source })?;
    if !status.is_success() {
        return Err(BuildError::Compilation {
            service,
            status: status.as_u16(),
            log: on_error(&body[..]),
        });
    }
    Ok(body.to_vec())
}
