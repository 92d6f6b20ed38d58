// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared fixtures for integration tests.
//!
//! A [`Fixture`] is a temporary tree with three directories: bundled resources,
//! the working directory, and a local developer override directory.

use layercfg::adapters::MapEnvironment;
use layercfg::service::{Loader, LoaderBuilder};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct Fixture {
    root: TempDir,
}

#[allow(dead_code)]
impl Fixture {
    pub fn new() -> Self {
        let root = TempDir::new().expect("create temp dir");
        for dir in ["resources", "work", "localdev"] {
            fs::create_dir(root.path().join(dir)).expect("create fixture dir");
        }
        Fixture { root }
    }

    pub fn resources(&self) -> PathBuf {
        self.root.path().join("resources")
    }

    pub fn work(&self) -> PathBuf {
        self.root.path().join("work")
    }

    pub fn local_dev(&self) -> PathBuf {
        self.root.path().join("localdev")
    }

    pub fn resource(self, name: &str, content: &str) -> Self {
        write(&self.resources(), name, content);
        self
    }

    pub fn file(self, name: &str, content: &str) -> Self {
        write(&self.work(), name, content);
        self
    }

    pub fn dev_override(self, name: &str, content: &str) -> Self {
        write(&self.local_dev(), name, content);
        self
    }

    /// A loader isolated from the process: empty environment, no arguments.
    pub fn loader(&self) -> LoaderBuilder {
        self.loader_with_env(MapEnvironment::new())
    }

    pub fn loader_with_env(&self, env: MapEnvironment) -> LoaderBuilder {
        Loader::builder()
            .with_resource_dir(self.resources())
            .with_working_dir(self.work())
            .with_local_dev_dir(self.local_dev())
            .with_environment(env)
            .with_args(Vec::<String>::new())
    }
}

fn write(dir: &Path, name: &str, content: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, content).expect("write fixture file");
}
