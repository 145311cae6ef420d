//! latexonline.cc ("laton").
//!
//! The sources travel as one `.tar.gz` in a multipart body; the main file,
//! the compiler and the cache bypass go in the query string. A successful
//! answer is the PDF, a failed one is the plain-text LaTeX log.

use super::{read_response, BuildError, Builder, Request};
use crate::files::Files;
use flate2::{write::GzEncoder, Compression};
use reqwest::blocking::{multipart, Client};
use std::path::{Component, Path, PathBuf};
use tracing::debug;

const SERVICE: &str = "laton";
const ARCHIVE_NAME: &str = "laton.tar.gz";

pub struct Laton {
    client: Client,
    url: String,
}

impl Laton {
    pub fn new(client: Client, url: &str) -> Self {
        Self {
            client,
            url: url.to_string(),
        }
    }
}

/// Where the sources land inside the archive.
///
/// Tar entries must be relative and free of `..`, so every file is named
/// relative to the deepest directory containing all of them. Files keep
/// their positions relative to each other.
#[derive(Debug, Clone)]
pub struct Layout {
    cwd: PathBuf,
    root: PathBuf,
}

impl Layout {
    /// `cwd` anchors relative file names.
    pub fn new(files: &Files, cwd: &Path) -> Self {
        let mut root: Option<PathBuf> = None;
        for (name, _) in files.iter() {
            let path = absolute(name, cwd);
            let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
            root = Some(match root {
                None => dir,
                Some(mut r) => {
                    while !path.starts_with(&r) && r.pop() {}
                    r
                }
            });
        }
        Self {
            cwd: cwd.to_path_buf(),
            root: root.unwrap_or_else(|| absolute(".", cwd)),
        }
    }

    /// Entry name of `file` inside the archive, with forward slashes.
    pub fn name(&self, file: &str) -> String {
        let path = absolute(file, &self.cwd);
        let rel = match path.strip_prefix(&self.root) {
            Ok(rel) => rel.to_path_buf(),
            // different drive on windows
            Err(_) => path.file_name().map(PathBuf::from).unwrap_or_default(),
        };
        rel.to_string_lossy().replace('\\', "/")
    }
}

/// Lexically resolved absolute form of `name`.
fn absolute(name: &str, cwd: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in cwd.join(name).components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

/// Packs every file into a gzip-compressed tar, entries with mode 0600.
pub fn pack_sources(files: &Files, layout: &Layout) -> std::io::Result<Vec<u8>> {
    let gz = GzEncoder::new(Vec::new(), Compression::default());
    let mut tar = tar::Builder::new(gz);
    for (name, data) in files.iter() {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o600);
        tar.append_data(&mut header, layout.name(name), data)?;
    }
    tar.into_inner()?.finish()
}

/// Query parameters in the order the service documents them.
pub fn query_params(req: &Request, layout: &Layout) -> Vec<(&'static str, String)> {
    let mut q = vec![("target", layout.name(&req.main_name()))];
    if req.parameters.force {
        q.push(("force", "true".to_string()));
    }
    q.push(("command", req.parameters.compiler.as_str().to_string()));
    q
}

impl Builder for Laton {
    fn name(&self) -> &'static str {
        SERVICE
    }

    fn build_pdf(&self, req: &Request) -> Result<Vec<u8>, BuildError> {
        let layout = Layout::new(&req.files, &std::env::current_dir()?);
        let archive = pack_sources(&req.files, &layout)?;
        debug!("{ARCHIVE_NAME}: {} bytes", archive.len());

        let form = multipart::Form::new()
            .part("file", multipart::Part::bytes(archive).file_name(ARCHIVE_NAME));

        let resp = self
            .client
            .post(&self.url)
            .query(&query_params(req, &layout))
            .multipart(form)
            .send()
            .map_err(|source| BuildError::Http {
                service: SERVICE,
                source,
            })?;

        read_response(SERVICE, resp, |body| {
            String::from_utf8_lossy(body).into_owned()
        })
    }
}
