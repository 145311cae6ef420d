use crate::{
    builder::{self, Request},
    config::Services,
    files,
    params::Parameters,
    util::write_output,
};
use anyhow::{Context, Result};
use std::io::{Read, Write};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// One compilation: read the sources, send them to the service and write the
/// PDF to `params.output`, or to `stdout` when no output is set.
pub fn compile(
    services: &Services,
    params: Parameters,
    stdin: impl Read,
    mut stdout: impl Write,
) -> Result<()> {
    let files = files::collect(&params, stdin)?;
    debug!("{} files, {} bytes", files.len(), files.total_bytes());
    let compiler = builder::for_service(params.service, services)?;

    let req = Request {
        parameters: params,
        files,
    };
    info!(
        "send request to {} with the following parameters:\n{}",
        compiler.name(),
        req
    );
    let sent = Instant::now();
    let result = compiler.build_pdf(&req);
    info!("answer received in {:.1} seconds", sent.elapsed().as_secs_f64());
    let pdf = result?;

    match &req.parameters.output {
        Some(output) => {
            info!("write {output}");
            write_output(Path::new(output), &pdf)?;
        }
        None => {
            info!("write to stdout");
            stdout
                .write_all(&pdf)
                .with_context(|| "writing the pdf to stdout")?;
            stdout.flush()?;
        }
    }
    Ok(())
}
