use crate::{params::Parameters, util::unix_name};
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

/// Source files keyed by their unix-style name, in name order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Files(BTreeMap<String, Vec<u8>>);

impl Files {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, data: Vec<u8>) {
        self.0.insert(name.into(), data);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.0.get(name).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn total_bytes(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }
}

impl fmt::Display for Files {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Files:")?;
        for (name, data) in self.iter() {
            writeln!(f, " » {} ({} bytes)", name, data.len())?;
        }
        Ok(())
    }
}

/// Reads the main file (from `stdin` when it is piped) and every readable file
/// matched by `params.patterns`.
pub fn collect(params: &Parameters, mut stdin: impl Read) -> Result<Files> {
    let mut files = Files::new();

    let main_data = if params.piped_main {
        debug!("read the main file from stdin");
        let mut buf = Vec::new();
        stdin
            .read_to_end(&mut buf)
            .with_context(|| "reading the main file from stdin")?;
        buf
    } else {
        debug!("read the main file from {}", params.main);
        std::fs::read(&params.main)
            .with_context(|| format!("reading the main file {}", params.main))?
    };
    files.insert(unix_name(&params.main), main_data);

    for pat in &params.patterns {
        let pattern = if Path::new(pat).is_dir() {
            format!("{}/*", pat.trim_end_matches(['/', '\\']))
        } else {
            pat.clone()
        };
        let paths = match glob::glob(&pattern) {
            Ok(paths) => paths,
            Err(err) => {
                warn!("skipping invalid pattern {pattern}: {err}");
                continue;
            }
        };
        for entry in paths {
            let path = match entry {
                Ok(path) => path,
                Err(err) => {
                    debug!("skipping unreadable entry: {err}");
                    continue;
                }
            };
            if path.is_dir() {
                continue;
            }
            let name = unix_name(&path.to_string_lossy());
            if files.contains(&name) {
                continue;
            }
            match std::fs::read(&path) {
                Ok(data) => {
                    debug!("file {} ({} bytes) added to the list", name, data.len());
                    files.insert(name, data);
                }
                Err(err) => debug!("problem reading support file {name} (skipped): {err}"),
            }
        }
    }

    Ok(files)
}
