use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};

/// Address used when `LISTEN` is not set.
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";
/// Virtual-host file used when `VHOSTS_FILE` is not set.
pub const DEFAULT_VHOSTS_FILE: &str = "virtual_hosts.yaml";
/// Base directory for document roots when `DOCROOT_DIRS` is not set.
pub const DEFAULT_DOCROOT_DIRS: &str = "docroot_dirs";

#[derive(Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub virtual_hosts: VirtualHosts,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub listen_addr: String,
}

/// Hostname (as sent in the `Host` header) to absolute document root.
///
/// Built once at startup and only read afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VirtualHosts {
    roots: HashMap<String, PathBuf>,
}

impl Config {
    /// Loads configuration from the environment.
    ///
    /// `LISTEN` sets the listen address, `VHOSTS_FILE` the YAML virtual-host
    /// file and `DOCROOT_DIRS` the directory its entries are relative to.
    pub fn load() -> anyhow::Result<Self> {
        let server = ServerConfig::from_env();

        let vhosts_file =
            std::env::var("VHOSTS_FILE").unwrap_or_else(|_| DEFAULT_VHOSTS_FILE.to_string());
        let docroot_dirs =
            std::env::var("DOCROOT_DIRS").unwrap_or_else(|_| DEFAULT_DOCROOT_DIRS.to_string());

        let virtual_hosts = VirtualHosts::from_yaml_file(&vhosts_file, &docroot_dirs)?;

        Ok(Self {
            server,
            virtual_hosts,
        })
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.virtual_hosts.validate()
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let listen_addr =
            std::env::var("LISTEN")
                .unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.to_string());
        Self { listen_addr }
    }
}

impl VirtualHosts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a host, making its root absolute. A repeated host replaces the
    /// earlier root.
    pub fn insert(&mut self, host: impl Into<String>, root: impl AsRef<Path>) -> anyhow::Result<()> {
        let root = root.as_ref();
        let abs = std::path::absolute(root)
            .with_context(|| format!("cannot resolve document root {}", root.display()))?;
        self.roots.insert(host.into(), abs);
        Ok(())
    }

    /// Parses a YAML mapping of `hostname: directory` where each directory is
    /// relative to `docroot_base`.
    ///
    /// ```yaml
    /// website1: htdocs1
    /// website2: htdocs2
    /// ```
    pub fn from_yaml_str(yaml: &str, docroot_base: impl AsRef<Path>) -> anyhow::Result<Self> {
        let entries: HashMap<String, String> =
            serde_yaml::from_str(yaml).context("invalid virtual host mapping")?;

        let mut hosts = Self::new();
        for (host, dir) in entries {
            hosts.insert(host, docroot_base.as_ref().join(dir))?;
        }
        Ok(hosts)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>, docroot_base: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read virtual host file {}", path.display()))?;
        Self::from_yaml_str(&yaml, docroot_base)
    }

    /// Every document root must exist and be a directory.
    pub fn validate(&self) -> anyhow::Result<()> {
        for (host, root) in &self.roots {
            let meta = std::fs::metadata(root).with_context(|| {
                format!("document root {} for host {host} does not exist", root.display())
            })?;
            if !meta.is_dir() {
                bail!("document root {} for host {host} is not a directory", root.display());
            }
        }
        Ok(())
    }

    pub fn get(&self, host: &str) -> Option<&Path> {
        self.roots.get(host).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.roots.iter().map(|(h, r)| (h.as_str(), r.as_path()))
    }
}
