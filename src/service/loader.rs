// SPDX-License-Identifier: MIT OR Apache-2.0

//! The layered resolution engine.
//!
//! A [`Loader`] merges configuration from a fixed sequence of phases into a
//! fresh [`ConfigStore`] and then evaluates every value. Later phases override
//! earlier ones:
//!
//! 0. environment seed (`POD_*` variables)
//! 1. bundled `application.yaml`, `.yml`, `.properties` (and the legacy name)
//! 2. the same names as files in the working directory
//! 3. the override file (`PROPS_FILE` or [`LoaderBuilder::with_props_file`])
//! 4. files listed under `load.properties`
//! 5. the bundled test overlay; if it added keys to the store, loading stops here
//! 6. local developer overrides in `~/.localdev`
//! 7. files named by `-P`/`-p` on the command line
//!
//! Within a phase YAML loads before properties, so properties win on conflict.

use crate::adapters::local_dev::{default_local_dev_dir, local_dev_files};
use crate::adapters::{CommandLineArgs, FileSystemReader, ProcessEnvironment, PropertiesParser};
use crate::domain::store::{APP_NAME_KEY, INDIRECT_LOCATION_KEY};
use crate::domain::{ConfigError, ConfigStore, ResolvedConfig, Result, Source};
use crate::ports::{ConfigParser, Environment, SourceReader};
use std::io::Read;
use std::path::{Path, PathBuf};

/// Basename of the main configuration documents.
pub const MAIN_BASENAME: &str = "application";

/// Basename of the test overlay documents.
pub const TEST_BASENAME: &str = "application-test";

/// Environment variable naming a single override file.
pub const PROPS_FILE_VAR: &str = "PROPS_FILE";

/// Environment variables copied into the store before anything is loaded.
const ENV_SEED: [(&str, &str); 4] = [
    ("POD_NAMESPACE", "app.environment"),
    ("POD_VERSION", "app.version"),
    ("POD_ID", "app.instanceId"),
    ("POD_IP", "app.ipAddress"),
];

const POD_NAME_VAR: &str = "POD_NAME";

/// Recognised as YAML even when no YAML parser is configured.
const YAML_EXTENSIONS: [&str; 2] = ["yaml", "yml"];

/// Which of the loader's parsers handles a document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Format {
    Yaml,
    Properties,
}

/// How a missing document is reported.
#[derive(Clone, Copy, Debug)]
enum Absence {
    Silent,
    Debug,
    Warn,
}

/// A well-known document looked up by name.
struct Candidate {
    path: String,
    format: Format,
    deprecated: bool,
}

impl Candidate {
    fn new(path: impl Into<String>, format: Format) -> Self {
        Self {
            path: path.into(),
            format,
            deprecated: false,
        }
    }

    fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }
}

/// Resolves an application's effective configuration.
///
/// A loader holds only its collaborators; each call to [`Loader::load`] starts
/// from an empty store, so a loader can be reused and shared between threads.
///
/// # Examples
///
/// ```rust,no_run
/// use layercfg::service::Loader;
///
/// # fn main() -> layercfg::domain::Result<()> {
/// let config = Loader::builder()
///     .with_resource_dir("resources")
///     .with_props_file("/etc/myapp/override.properties")
///     .build()?
///     .load()?;
///
/// let port = config.get_u64("server.port")?;
/// # Ok(())
/// # }
/// ```
pub struct Loader {
    reader: Box<dyn SourceReader>,
    environment: Box<dyn Environment>,
    properties: PropertiesParser,
    yaml: Option<Box<dyn ConfigParser>>,
    args: CommandLineArgs,
    props_file: Option<String>,
    local_dev_dir: Option<PathBuf>,
    legacy_basename: Option<String>,
}

impl Loader {
    /// Creates a new loader builder.
    pub fn builder() -> LoaderBuilder {
        LoaderBuilder::new()
    }

    /// Runs every phase and evaluates the merged store.
    ///
    /// # Errors
    ///
    /// Fails on malformed documents, unsupported extensions of explicitly
    /// configured paths, reader failures, expression cycles and unterminated
    /// expressions. No partial configuration is returned.
    pub fn load(&self) -> Result<ResolvedConfig> {
        let store = self.load_raw()?;
        let resolved = store.eval(&*self.environment)?;
        tracing::info!(
            "Resolved {} configuration entries ({} unresolved references)",
            resolved.len(),
            resolved.unresolved().len()
        );
        Ok(resolved)
    }

    /// Runs every phase and returns the merged store without evaluating it.
    pub fn load_raw(&self) -> Result<ConfigStore> {
        let mut store = ConfigStore::new();

        self.seed_from_environment(&mut store);
        self.load_main(&mut store, Source::Resource)?;
        self.load_main(&mut store, Source::File)?;
        self.load_override_file(&mut store)?;
        self.load_indirect(&mut store)?;

        let before = store.size();
        self.load_test_overlay(&mut store)?;
        if store.size() > before {
            tracing::debug!("Test overlay added keys, skipping local dev and command line files");
            return Ok(store);
        }

        self.load_local_dev(&mut store)?;
        self.load_command_line(&mut store)?;
        Ok(store)
    }

    fn seed_from_environment(&self, store: &mut ConfigStore) {
        for (var, key) in ENV_SEED {
            if let Some(value) = self.environment.var(var).filter(|v| !v.is_empty()) {
                store.put(key, value);
            }
        }

        if let Some(pod_name) = self.environment.var(POD_NAME_VAR) {
            match service_name(&pod_name) {
                Some(name) => store.put(APP_NAME_KEY, name),
                None => tracing::debug!("Cannot derive a service name from pod '{}'", pod_name),
            }
        }
    }

    fn main_documents(&self) -> Vec<Candidate> {
        let mut documents = vec![
            Candidate::new(format!("{}.yaml", MAIN_BASENAME), Format::Yaml),
            Candidate::new(format!("{}.yml", MAIN_BASENAME), Format::Yaml).deprecated(),
            Candidate::new(format!("{}.properties", MAIN_BASENAME), Format::Properties),
        ];
        if let Some(legacy) = &self.legacy_basename {
            documents.push(
                Candidate::new(format!("{}.properties", legacy), Format::Properties).deprecated(),
            );
        }
        documents
    }

    fn test_documents(&self) -> Vec<Candidate> {
        let mut documents = vec![
            Candidate::new(format!("{}.properties", TEST_BASENAME), Format::Properties),
            Candidate::new(format!("{}.yaml", TEST_BASENAME), Format::Yaml),
            Candidate::new(format!("{}.yml", TEST_BASENAME), Format::Yaml).deprecated(),
        ];
        if let Some(legacy) = &self.legacy_basename {
            documents.push(
                Candidate::new(format!("test-{}.properties", legacy), Format::Properties)
                    .deprecated(),
            );
        }
        documents
    }

    fn load_main(&self, store: &mut ConfigStore, source: Source) -> Result<()> {
        for candidate in self.main_documents() {
            self.load_candidate(store, &candidate, source)?;
        }
        Ok(())
    }

    fn load_override_file(&self, store: &mut ConfigStore) -> Result<()> {
        let path = match self.environment.var(PROPS_FILE_VAR) {
            Some(path) if !path.trim().is_empty() => path,
            _ => match &self.props_file {
                Some(path) => path.clone(),
                None => return Ok(()),
            },
        };
        self.load_explicit(store, path.trim())?;
        Ok(())
    }

    fn load_indirect(&self, store: &mut ConfigStore) -> Result<()> {
        let Some(location) = store.indirect_location().map(str::to_string) else {
            return Ok(());
        };

        for raw in ConfigStore::split_paths(&location) {
            let path = store.expand(INDIRECT_LOCATION_KEY, raw, &*self.environment)?;
            self.load_explicit(store, &path)?;
        }
        Ok(())
    }

    fn load_test_overlay(&self, store: &mut ConfigStore) -> Result<()> {
        for candidate in self.test_documents() {
            self.load_candidate(store, &candidate, Source::Resource)?;
        }
        Ok(())
    }

    fn load_local_dev(&self, store: &mut ConfigStore) -> Result<()> {
        let Some(dir) = &self.local_dev_dir else {
            return Ok(());
        };
        let Some(app_name) = store.app_name().map(str::to_string) else {
            tracing::debug!("No application name, skipping local dev overrides");
            return Ok(());
        };

        for file in local_dev_files(dir, &app_name) {
            let path = file.to_string_lossy();
            if let Some(format) = self.format_of(&path) {
                self.load_document(store, &path, Source::File, format, Absence::Debug)?;
            }
        }
        Ok(())
    }

    fn load_command_line(&self, store: &mut ConfigStore) -> Result<()> {
        for list in self.args.path_lists() {
            for raw in ConfigStore::split_paths(list) {
                let path = store.expand("command line", raw, &*self.environment)?;
                self.load_explicit(store, &path)?;
            }
        }
        Ok(())
    }

    fn load_candidate(
        &self,
        store: &mut ConfigStore,
        candidate: &Candidate,
        source: Source,
    ) -> Result<()> {
        let loaded = self.load_document(
            store,
            &candidate.path,
            source,
            candidate.format,
            Absence::Silent,
        )?;
        if candidate.deprecated {
            if let Some(count) = loaded {
                tracing::warn!(
                    "Deprecated configuration {} '{}' loaded ({} entries); rename it",
                    source,
                    candidate.path,
                    count
                );
            }
        }
        Ok(())
    }

    /// Picks the parser for `path` by asking each one whether it supports the
    /// extension. YAML names are still recognised while YAML is disabled, so
    /// those documents are skipped instead of rejected.
    fn format_of(&self, path: &str) -> Option<Format> {
        let ext = Path::new(path).extension()?.to_str()?;
        if self.properties.supports(ext) {
            return Some(Format::Properties);
        }
        let yaml = match &self.yaml {
            Some(parser) => parser.supports(ext),
            None => YAML_EXTENSIONS.iter().any(|e| e.eq_ignore_ascii_case(ext)),
        };
        yaml.then_some(Format::Yaml)
    }

    /// Loads a path named by configuration, the environment or the command line.
    fn load_explicit(&self, store: &mut ConfigStore, path: &str) -> Result<usize> {
        let format = self.format_of(path).ok_or_else(|| ConfigError::UnsupportedExtension {
            path: path.to_string(),
        })?;
        let loaded = self.load_document(store, path, Source::File, format, Absence::Warn)?;
        Ok(loaded.unwrap_or(0))
    }

    /// Parses one document into the store. Returns `None` if it was not loaded.
    fn load_document(
        &self,
        store: &mut ConfigStore,
        path: &str,
        source: Source,
        format: Format,
        absence: Absence,
    ) -> Result<Option<usize>> {
        let parser: &dyn ConfigParser = match format {
            Format::Properties => &self.properties,
            Format::Yaml => match &self.yaml {
                Some(parser) => &**parser,
                None => {
                    tracing::debug!("YAML support disabled, skipping {} '{}'", source, path);
                    return Ok(None);
                }
            },
        };

        let Some(content) = self.read(path, source)? else {
            match absence {
                Absence::Silent => {}
                Absence::Debug => tracing::debug!("No {} at '{}'", source, path),
                Absence::Warn => tracing::warn!("Configured {} '{}' does not exist", source, path),
            }
            return Ok(None);
        };

        let entries = parser.parse(&content).map_err(|e| e.with_path(path))?;
        let count = entries.len();
        for (key, value) in entries {
            store.put(key, value);
        }
        tracing::debug!("Loaded {} entries from {} '{}'", count, source, path);
        Ok(Some(count))
    }

    /// Reads a whole document; the stream is dropped before returning.
    fn read(&self, path: &str, source: Source) -> Result<Option<String>> {
        let Some(mut stream) = self.reader.open(path, source)? else {
            return Ok(None);
        };

        let mut content = String::new();
        stream
            .read_to_string(&mut content)
            .map_err(|e| ConfigError::SourceError {
                source_name: self.reader.name().to_string(),
                message: format!("Failed to read {} '{}': {}", source, path, e),
                source: Some(Box::new(e)),
            })?;
        Ok(Some(content))
    }
}

/// Derives a service name from a pod name such as `orders-7d9f8c6b5-x2k9q`
/// by dropping the two generated trailing segments.
fn service_name(pod_name: &str) -> Option<&str> {
    let mut segments = pod_name.rsplitn(3, '-');
    segments.next()?;
    segments.next()?;
    segments.next().filter(|name| !name.is_empty())
}

/// Builder for creating a [`Loader`].
///
/// Every collaborator has a default: the filesystem reader, the process
/// environment, the process arguments, the YAML parser when the `yaml` feature
/// is enabled, and `~/.localdev` for developer overrides.
///
/// # Examples
///
/// ```rust
/// use layercfg::adapters::MapEnvironment;
/// use layercfg::service::LoaderBuilder;
///
/// # fn main() -> layercfg::domain::Result<()> {
/// let loader = LoaderBuilder::new()
///     .with_environment(MapEnvironment::new().with_var("PROPS_FILE", "override.properties"))
///     .with_command_line("-P extra.properties")
///     .without_local_dev()
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct LoaderBuilder {
    reader: Option<Box<dyn SourceReader>>,
    fs_reader: FileSystemReader,
    environment: Option<Box<dyn Environment>>,
    yaml: Option<Box<dyn ConfigParser>>,
    skip_yaml: bool,
    args: Option<CommandLineArgs>,
    props_file: Option<String>,
    local_dev_dir: Option<PathBuf>,
    local_dev_disabled: bool,
    legacy_basename: Option<String>,
}

impl LoaderBuilder {
    /// Creates a new builder with default collaborators.
    pub fn new() -> Self {
        Self {
            reader: None,
            fs_reader: FileSystemReader::new(),
            environment: None,
            yaml: None,
            skip_yaml: false,
            args: None,
            props_file: None,
            local_dev_dir: None,
            local_dev_disabled: false,
            legacy_basename: None,
        }
    }

    /// Replaces the filesystem reader.
    ///
    /// Resource and working directories set on this builder only apply to the
    /// default reader.
    pub fn with_reader(mut self, reader: impl SourceReader + 'static) -> Self {
        self.reader = Some(Box::new(reader));
        self
    }

    /// Adds a directory searched for bundled resources. Earlier directories win.
    pub fn with_resource_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.fs_reader = self.fs_reader.with_resource_dir(dir);
        self
    }

    /// Resolves relative file paths against `dir`.
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.fs_reader = self.fs_reader.with_working_dir(dir);
        self
    }

    /// Replaces the process environment.
    pub fn with_environment(mut self, environment: impl Environment + 'static) -> Self {
        self.environment = Some(Box::new(environment));
        self
    }

    /// Replaces the YAML parser.
    ///
    /// The parser also handles every explicitly named path whose extension it
    /// [supports](ConfigParser::supports), besides the well-known YAML documents.
    pub fn with_yaml_parser(mut self, parser: impl ConfigParser + 'static) -> Self {
        self.yaml = Some(Box::new(parser));
        self
    }

    /// Skips every YAML document while still loading properties.
    pub fn skip_yaml(mut self, skip: bool) -> Self {
        self.skip_yaml = skip;
        self
    }

    /// Scans `args` for `-P`/`-p` instead of the process arguments.
    pub fn with_args<S: AsRef<str>>(mut self, args: Vec<S>) -> Self {
        self.args = Some(CommandLineArgs::from_args(args));
        self
    }

    /// Scans a whitespace-separated invocation string for `-P`/`-p`.
    pub fn with_command_line(mut self, command_line: &str) -> Self {
        self.args = Some(CommandLineArgs::from_command_line(command_line));
        self
    }

    /// Names the override file used when `PROPS_FILE` is not set.
    pub fn with_props_file(mut self, path: impl Into<String>) -> Self {
        self.props_file = Some(path.into());
        self
    }

    /// Looks for developer overrides in `dir` instead of `~/.localdev`.
    pub fn with_local_dev_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.local_dev_dir = Some(dir.into());
        self.local_dev_disabled = false;
        self
    }

    /// Disables developer overrides.
    pub fn without_local_dev(mut self) -> Self {
        self.local_dev_disabled = true;
        self
    }

    /// Also tries `<basename>.properties` and `test-<basename>.properties`,
    /// both deprecated.
    pub fn with_legacy_basename(mut self, basename: impl Into<String>) -> Self {
        self.legacy_basename = Some(basename.into());
        self
    }

    /// Builds the loader.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnsupportedExtension`] if no parser handles the
    /// configured props file.
    pub fn build(self) -> Result<Loader> {
        let reader: Box<dyn SourceReader> = match self.reader {
            Some(reader) => reader,
            None => Box::new(self.fs_reader),
        };
        let environment: Box<dyn Environment> = match self.environment {
            Some(environment) => environment,
            None => Box::new(ProcessEnvironment::new()),
        };
        let yaml = if self.skip_yaml {
            None
        } else {
            self.yaml.or_else(default_yaml_parser)
        };
        let local_dev_dir = if self.local_dev_disabled {
            None
        } else {
            self.local_dev_dir.or_else(default_local_dev_dir)
        };

        let loader = Loader {
            reader,
            environment,
            properties: PropertiesParser::new(),
            yaml,
            args: self.args.unwrap_or_else(CommandLineArgs::from_env_args),
            props_file: self.props_file,
            local_dev_dir,
            legacy_basename: self.legacy_basename,
        };

        if let Some(path) = &loader.props_file {
            if loader.format_of(path.trim()).is_none() {
                return Err(ConfigError::UnsupportedExtension { path: path.clone() });
            }
        }
        Ok(loader)
    }
}

impl Default for LoaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "yaml")]
fn default_yaml_parser() -> Option<Box<dyn ConfigParser>> {
    Some(Box::new(crate::adapters::YamlParser::new()))
}

#[cfg(not(feature = "yaml"))]
fn default_yaml_parser() -> Option<Box<dyn ConfigParser>> {
    None
}
