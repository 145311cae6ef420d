use crate::{
    config::{Config, Logging},
    params::{Parameters, Settings, Verbosity},
    run,
    util::{ensure_dir, stdin_is_piped},
};
use anyhow::{anyhow, Context, Result};
use clap::{builder::FalseyValueParser, Parser};
use std::path::{Path, PathBuf};
use tracing::debug;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const EXAMPLES: &str = "\
Examples:
  lol main.tex
  lol -s ytotech -c xelatex main.tex
  lol main.tex personal.sty images/img*.pdf
  cat main.tex | lol -c lualatex -o out.pdf";

#[derive(Parser, Debug, Default)]
#[command(name = "lol", version)]
#[command(about = "LaTeX online compiler: builds a PDF on latexonline.cc or latex.ytotech.com")]
#[command(after_help = EXAMPLES)]
pub struct Args {
    /// Main file first (unless --main is given), then support files, globs or folders.
    pub patterns: Vec<String>,

    /// Service can be laton or ytotech.
    #[arg(short, long, env = "LOL_SERVICE")]
    pub service: Option<String>,

    /// One of pdflatex, xelatex or lualatex. ytotech also has platex, uplatex and context.
    #[arg(short, long, env = "LOL_COMPILER")]
    pub compiler: Option<String>,

    /// Do not use the laton cache. Ignored by ytotech.
    #[arg(short, long, env = "LOL_FORCE", value_parser = FalseyValueParser::new())]
    pub force: bool,

    /// bibtex or biber. ytotech only.
    #[arg(short, long, env = "LOL_BIBLIO")]
    pub biblio: Option<String>,

    /// The pdf file name. Defaults to the main file with a .pdf extension.
    #[arg(short, long, env = "LOL_OUTPUT")]
    pub output: Option<String>,

    /// The main tex file to compile.
    #[arg(short, long, env = "LOL_MAIN")]
    pub main: Option<String>,

    /// Prevent any output.
    #[arg(short, long, env = "LOL_QUIET", value_parser = FalseyValueParser::new())]
    pub quiet: bool,

    /// Print info and errors.
    #[arg(short, long, env = "LOL_VERBOSE", value_parser = FalseyValueParser::new())]
    pub verbose: bool,

    /// Print everything, debug info included.
    #[arg(long, env = "LOL_DEBUG", value_parser = FalseyValueParser::new())]
    pub debug: bool,

    /// Path to config TOML. If omitted, uses ./lol.toml if present.
    #[arg(long, env = "LOL_CONFIG")]
    pub config: Option<PathBuf>,
}

impl Args {
    /// Layers the command line (and its environment variables) over `cfg`.
    pub fn settings(&self, cfg: &Config) -> Settings {
        let pick = |arg: &Option<String>, file: &str| -> String {
            arg.clone()
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| file.to_string())
        };
        let mut patterns = self.patterns.clone();
        patterns.extend(cfg.patterns.iter().cloned());
        Settings {
            service: pick(&self.service, &cfg.service),
            compiler: pick(&self.compiler, &cfg.compiler),
            force: self.force || cfg.force,
            biblio: pick(&self.biblio, &cfg.biblio),
            output: pick(&self.output, &cfg.output),
            main: pick(&self.main, &cfg.main),
            patterns,
        }
    }

    pub fn verbosity(&self, cfg: &Config) -> Verbosity {
        Verbosity::from_flags(
            self.quiet || cfg.quiet,
            self.verbose || cfg.verbose,
            self.debug || cfg.debug,
        )
    }
}

pub fn dispatch(args: Args) -> Result<()> {
    let cfg = Config::load_or_default(args.config.as_deref())?;
    let _guard = init_logging(args.verbosity(&cfg), &cfg.logging)?;

    let piped = stdin_is_piped();
    debug!("piped input: {piped}");

    let params = Parameters::resolve(args.settings(&cfg), piped)?;
    run::compile(
        &cfg.services,
        params,
        std::io::stdin().lock(),
        std::io::stdout().lock(),
    )
}

/// Console logs go to stderr: stdout may carry the PDF.
fn init_logging(verbosity: Verbosity, cfg: &Logging) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.filter_directive()));

    let stderr_layer = if cfg.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
            .boxed()
    };

    let (file_layer, guard) = if cfg.file_path.is_empty() {
        (None, None)
    } else {
        let path = Path::new(&cfg.file_path);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            ensure_dir(parent)?;
        }
        let file = std::fs::File::create(path)
            .with_context(|| format!("create log file: {}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}
