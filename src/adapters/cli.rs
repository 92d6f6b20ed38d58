// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command-line scanning for property file paths.
//!
//! This module finds the values of the `-P`/`-p` flag in the process's own
//! arguments. Everything else on the command line belongs to the application
//! and is ignored.

/// Flag letters introducing a list of property files.
const PATH_FLAGS: [&str; 2] = ["-P", "-p"];

/// Property-file paths supplied on the command line.
///
/// Supported forms:
/// - `-P app.properties`: path list as the following token
/// - `-Papp.properties`: path list attached to the flag
///
/// A value may name several files separated by commas, semicolons or
/// whitespace; splitting happens in the loader.
///
/// # Examples
///
/// ```rust
/// use layercfg::adapters::CommandLineArgs;
///
/// let args = CommandLineArgs::from_args(vec!["serve", "-P", "a.yaml,b.properties", "-pc.yml"]);
/// assert_eq!(args.path_lists(), &["a.yaml,b.properties", "c.yml"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandLineArgs {
    path_lists: Vec<String>,
}

impl CommandLineArgs {
    /// Creates an empty set (no property files requested).
    pub fn new() -> Self {
        Self::default()
    }

    /// Scans a list of arguments.
    pub fn from_args<S: AsRef<str>>(args: Vec<S>) -> Self {
        let mut parsed = Self::new();
        parsed.parse_args(&args);
        parsed
    }

    /// Scans a raw invocation string, tokenized on whitespace.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use layercfg::adapters::CommandLineArgs;
    ///
    /// let args = CommandLineArgs::from_command_line("app.Main -P  local.properties --verbose");
    /// assert_eq!(args.path_lists(), &["local.properties"]);
    /// ```
    pub fn from_command_line(command_line: &str) -> Self {
        Self::from_args(command_line.split_whitespace().collect::<Vec<_>>())
    }

    /// Scans the process's arguments, skipping the program name.
    pub fn from_env_args() -> Self {
        let args: Vec<String> = std::env::args().skip(1).collect();
        Self::from_args(args)
    }

    /// Raw path lists in command-line order.
    pub fn path_lists(&self) -> &[String] {
        &self.path_lists
    }

    /// Returns `true` if no property files were requested.
    pub fn is_empty(&self) -> bool {
        self.path_lists.is_empty()
    }

    fn parse_args<S: AsRef<str>>(&mut self, args: &[S]) {
        let mut i = 0;
        while i < args.len() {
            let arg = args[i].as_ref();
            match PATH_FLAGS.iter().find_map(|flag| arg.strip_prefix(flag)) {
                // -P value
                Some("") => {
                    if let Some(next) = args.get(i + 1) {
                        self.path_lists.push(next.as_ref().to_string());
                        i += 1;
                    } else {
                        tracing::debug!("Ignoring trailing {} without a value", arg);
                    }
                }
                // -Pvalue
                Some(attached) => self.path_lists.push(attached.to_string()),
                None => {}
            }
            i += 1;
        }
    }
}
