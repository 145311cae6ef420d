use anyhow::{bail, Result};
use std::fmt;

/// Name given to the main file when it is read from stdin.
pub const MAIN_NAME_IF_STDIN: &str = "main_from_stdin.tex";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Laton,
    Ytotech,
}

impl Service {
    pub fn as_str(&self) -> &'static str {
        match self {
            Service::Laton => "laton",
            Service::Ytotech => "ytotech",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compiler {
    Pdflatex,
    Xelatex,
    Lualatex,
    Platex,
    Uplatex,
    Context,
}

impl Compiler {
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "pdflatex" => Some(Compiler::Pdflatex),
            "xelatex" => Some(Compiler::Xelatex),
            "lualatex" => Some(Compiler::Lualatex),
            "platex" => Some(Compiler::Platex),
            "uplatex" => Some(Compiler::Uplatex),
            "context" => Some(Compiler::Context),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Compiler::Pdflatex => "pdflatex",
            Compiler::Xelatex => "xelatex",
            Compiler::Lualatex => "lualatex",
            Compiler::Platex => "platex",
            Compiler::Uplatex => "uplatex",
            Compiler::Context => "context",
        }
    }

    /// Only the three mainstream engines are available on laton.
    pub fn laton_supported(&self) -> bool {
        matches!(
            self,
            Compiler::Pdflatex | Compiler::Xelatex | Compiler::Lualatex
        )
    }
}

impl fmt::Display for Compiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bibliography {
    Bibtex,
    Biber,
}

impl Bibliography {
    pub fn as_str(&self) -> &'static str {
        match self {
            Bibliography::Bibtex => "bibtex",
            Bibliography::Biber => "biber",
        }
    }
}

impl fmt::Display for Bibliography {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Console verbosity, from most to least talkative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Debug,
    Info,
    Error,
    Quiet,
}

impl Verbosity {
    /// `debug` wins over `verbose`, which wins over `quiet`.
    pub fn from_flags(quiet: bool, verbose: bool, debug: bool) -> Self {
        if debug {
            Verbosity::Debug
        } else if verbose {
            Verbosity::Info
        } else if quiet {
            Verbosity::Quiet
        } else {
            Verbosity::Error
        }
    }

    /// Directive understood by `EnvFilter`.
    pub fn filter_directive(&self) -> &'static str {
        match self {
            Verbosity::Debug => "debug",
            Verbosity::Info => "info",
            Verbosity::Error => "error",
            Verbosity::Quiet => "off",
        }
    }
}

/// Raw option values after flags, environment and config file were layered.
/// Empty strings stand for "not set".
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub service: String,
    pub compiler: String,
    pub force: bool,
    pub biblio: String,
    pub output: String,
    pub main: String,
    /// Positional patterns first, then the ones from the config file.
    pub patterns: Vec<String>,
}

/// Validated parameters of one compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameters {
    pub service: Service,
    pub compiler: Compiler,
    pub force: bool,
    pub biblio: Option<Bibliography>,
    /// `None` means the PDF goes to stdout.
    pub output: Option<String>,
    pub main: String,
    pub piped_main: bool,
    pub patterns: Vec<String>,
}

impl Parameters {
    /// Normalizes `settings` and checks the service/compiler/bibliography
    /// combination. `piped_main` tells whether the main file arrives on stdin.
    pub fn resolve(settings: Settings, piped_main: bool) -> Result<Self> {
        let service_name = settings.service.trim().to_lowercase();
        let mut service = match service_name.as_str() {
            "" => None,
            "laton" => Some(Service::Laton),
            "ytotech" => Some(Service::Ytotech),
            other => bail!("unknown service {other}"),
        };

        let compiler_name = if settings.compiler.is_empty() {
            "pdflatex"
        } else {
            settings.compiler.as_str()
        };
        let Some(compiler) = Compiler::parse(compiler_name) else {
            bail!("unsupported compiler {compiler_name}");
        };
        if !compiler.laton_supported() {
            match service {
                Some(Service::Laton) => bail!("laton does not support the {compiler} compiler"),
                Some(Service::Ytotech) => {}
                None => service = Some(Service::Ytotech),
            }
        }

        let biblio = match settings.biblio.as_str() {
            "" => None,
            "bibtex" => Some(Bibliography::Bibtex),
            "biber" => Some(Bibliography::Biber),
            other => bail!("unsupported bibliography {other} (bibtex or biber)"),
        };
        if let Some(b) = biblio {
            match service {
                Some(Service::Laton) => bail!("laton does not support the {b} bibliography"),
                Some(Service::Ytotech) => {}
                None => service = Some(Service::Ytotech),
            }
        }

        let service = service.unwrap_or(Service::Laton);

        let mut patterns = settings.patterns;
        let mut main = settings.main;
        if patterns.is_empty() && main.is_empty() && !piped_main {
            bail!("missing file to compile");
        }
        if !main.is_empty() && piped_main {
            bail!("the main file can't be set when there is piped input");
        }
        if main.is_empty() {
            if !piped_main {
                main = patterns[0].clone();
            }
        } else {
            patterns.insert(0, main.clone());
        }

        let output = if !settings.output.is_empty() {
            Some(settings.output)
        } else if !main.is_empty() {
            Some(default_output(&main))
        } else {
            None
        };

        if piped_main {
            main = MAIN_NAME_IF_STDIN.to_string();
        }

        Ok(Self {
            service,
            compiler,
            force: settings.force,
            biblio,
            output,
            main,
            piped_main,
            patterns,
        })
    }
}

/// `main.tex` -> `main.pdf`; names without a `.tex` suffix just gain `.pdf`.
pub fn default_output(main: &str) -> String {
    format!("{}.pdf", main.strip_suffix(".tex").unwrap_or(main))
}

impl fmt::Display for Parameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Service:   {}", self.service)?;
        writeln!(f, "Compiler:  {}", self.compiler)?;
        if self.force {
            writeln!(f, "Force:     true")?;
        }
        if let Some(b) = self.biblio {
            writeln!(f, "Biblio:    {b}")?;
        }
        if let Some(out) = &self.output {
            writeln!(f, "Output:    {out}")?;
        }
        writeln!(f, "Main:      {}", self.main)?;
        if self.piped_main {
            writeln!(f, "PipedMain: true")?;
        }
        if !self.patterns.is_empty() {
            writeln!(f, "Patterns:  {}", self.patterns.join(", "))?;
        }
        Ok(())
    }
}
