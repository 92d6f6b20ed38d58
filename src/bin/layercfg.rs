// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resolves configuration the way an application would and prints the result.
//!
//! ```bash
//! # Bundled resources in ./resources, extra files from the command line
//! layercfg --resource-dir resources -P local.properties
//!
//! # Show the merged store before expressions are evaluated
//! layercfg --resource-dir resources --raw
//! ```

use clap::{Parser, ValueEnum};
use layercfg::domain::ConfigError;
use layercfg::service::{Loader, LoaderBuilder};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Properties,
    #[cfg(feature = "yaml")]
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "layercfg", version, about = "Resolve layered configuration and print it")]
struct Cli {
    /// Directory searched for bundled resources (repeatable, first wins)
    #[arg(long = "resource-dir", value_name = "DIR")]
    resource_dirs: Vec<PathBuf>,

    /// Directory relative file paths resolve against
    #[arg(long, value_name = "DIR")]
    working_dir: Option<PathBuf>,

    /// Skip every YAML document
    #[arg(long)]
    skip_yaml: bool,

    /// Directory holding developer overrides (default: ~/.localdev)
    #[arg(long, value_name = "DIR", conflicts_with = "no_local_dev")]
    local_dev_dir: Option<PathBuf>,

    /// Ignore developer overrides
    #[arg(long)]
    no_local_dev: bool,

    /// Override file used when PROPS_FILE is not set
    #[arg(long, value_name = "FILE")]
    props_file: Option<String>,

    /// Legacy basename also tried as <NAME>.properties
    #[arg(long, value_name = "NAME")]
    legacy_basename: Option<String>,

    /// Property files to load last (comma, semicolon or space separated)
    #[arg(short = 'P', visible_short_alias = 'p', value_name = "PATHS")]
    props: Vec<String>,

    /// Print the merged store without evaluating expressions
    #[arg(long)]
    raw: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "properties")]
    format: OutputFormat,
}

impl Cli {
    fn loader(&self) -> LoaderBuilder {
        let mut builder = Loader::builder().skip_yaml(self.skip_yaml);

        for dir in &self.resource_dirs {
            builder = builder.with_resource_dir(dir);
        }
        if let Some(dir) = &self.working_dir {
            builder = builder.with_working_dir(dir);
        }
        if let Some(path) = &self.props_file {
            builder = builder.with_props_file(path);
        }
        if let Some(name) = &self.legacy_basename {
            builder = builder.with_legacy_basename(name);
        }
        builder = match (&self.local_dev_dir, self.no_local_dev) {
            (_, true) => builder.without_local_dev(),
            (Some(dir), false) => builder.with_local_dev_dir(dir),
            (None, false) => builder,
        };

        let args: Vec<&str> = self
            .props
            .iter()
            .flat_map(|paths| ["-P", paths.as_str()])
            .collect();
        builder.with_args(args)
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Escapes a value for properties output so it parses back to the same text.
fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out
}

fn render<'a>(
    entries: impl Iterator<Item = (&'a str, &'a str)>,
    format: OutputFormat,
) -> Result<String, ConfigError> {
    match format {
        OutputFormat::Properties => Ok(entries
            .map(|(key, value)| format!("{}={}\n", key, escape(value)))
            .collect()),
        #[cfg(feature = "yaml")]
        OutputFormat::Yaml => {
            let mapping: serde_yaml::Mapping = entries
                .map(|(key, value)| (key.into(), value.into()))
                .collect();
            serde_yaml::to_string(&mapping).map_err(|e| ConfigError::ParseError {
                path: None,
                message: format!("Failed to render YAML: {}", e),
                source: Some(Box::new(e)),
            })
        }
    }
}

fn run(cli: &Cli) -> Result<(), ConfigError> {
    let loader = cli.loader().build()?;

    if cli.raw {
        let store = loader.load_raw()?;
        print!("{}", render(store.entries(), cli.format)?);
        return Ok(());
    }

    let config = loader.load()?;
    print!("{}", render(config.iter(), cli.format)?);
    for reference in config.unresolved() {
        eprintln!("warning: unresolved {}", reference);
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
