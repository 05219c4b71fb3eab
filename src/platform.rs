use std::sync::LazyLock;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::renderer::AnyRenderer;
use crate::{Error, Result};

/// A class of shells sharing quoting and path syntax.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Deserialize,
    Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ShellFamily {
    Posix,
    Windows,
}

const WINDOWS: &str = "windows";

/// OS family names that run a POSIX `sh`. Includes the values of
/// `std::env::consts::OS` for every Unix-like target.
static UNIX_FAMILIES: &[&str] = &[
    "aix",
    "android",
    "darwin",
    "dragonfly",
    "freebsd",
    "haiku",
    "hurd",
    "illumos",
    "ios",
    "linux",
    "macos",
    "nacl",
    "netbsd",
    "openbsd",
    "posix",
    "solaris",
    "unix",
    "zos",
];

/// Distribution and series names that also resolve to POSIX.
static UNIX_DISTRIBUTIONS: &[&str] = &[
    "alpine",
    "amazonlinux",
    "arch",
    "centos",
    "debian",
    "fedora",
    "genericlinux",
    "gentoo",
    "kubernetes",
    "opensuse",
    "opensuseleap",
    "rhel",
    "suse",
    "ubuntu",
];

static BUILTIN: LazyLock<Registry> = LazyLock::new(Registry::default);

/// Maps OS identifiers to shell families.
///
/// The default registry knows the built-in Unix names; extra aliases can be
/// added in code or loaded from TOML:
///
/// ```toml
/// [aliases]
/// raspbian = "posix"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Registry {
    aliases: IndexMap<String, ShellFamily>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RegistryFile {
    #[serde(default)]
    aliases: IndexMap<String, ShellFamily>,
}

impl Default for Registry {
    fn default() -> Self {
        let mut aliases = IndexMap::new();
        aliases.insert(WINDOWS.to_string(), ShellFamily::Windows);
        for name in UNIX_FAMILIES.iter().chain(UNIX_DISTRIBUTIONS) {
            aliases.insert(name.to_string(), ShellFamily::Posix);
        }
        Self { aliases }
    }
}

impl Registry {
    /// Built-in table plus the `[aliases]` of a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let file: RegistryFile = toml::from_str(s)?;
        let mut registry = Self::default();
        for (name, family) in file.aliases {
            registry.add_alias(&name, family);
        }
        Ok(registry)
    }

    /// The full alias table as a document [`Registry::from_toml_str`] reads
    /// back.
    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }

    pub fn with_alias(mut self, name: &str, family: ShellFamily) -> Self {
        self.add_alias(name, family);
        self
    }

    /// Adds or replaces an alias. `windows` itself can't be remapped.
    pub fn add_alias(&mut self, name: &str, family: ShellFamily) {
        let name = name.to_lowercase();
        if name == WINDOWS {
            if family != ShellFamily::Windows {
                warn!("ignoring alias for {WINDOWS:?}");
            }
            return;
        }
        trace!("alias {name} -> {family}");
        self.aliases.insert(name, family);
    }

    pub fn aliases(&self) -> impl Iterator<Item = (&str, ShellFamily)> {
        self.aliases.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Family for `os`, compared case-insensitively. An empty `os` means
    /// the host platform.
    pub fn family(&self, os: &str) -> Option<ShellFamily> {
        let os = host_or(os).to_lowercase();
        self.aliases.get(&os).copied()
    }

    pub fn renderer(&self, os: &str) -> Result<AnyRenderer> {
        let os = host_or(os);
        match self.family(os) {
            Some(family) => {
                trace!("renderer for {os}: {family}");
                Ok(AnyRenderer::from(family))
            }
            None => {
                debug!("no renderer for {os:?}");
                Err(Error::UnknownPlatform(os.to_string()))
            }
        }
    }
}

fn host_or(os: &str) -> &str {
    if os.is_empty() {
        std::env::consts::OS
    } else {
        os
    }
}

/// Renderer for the named OS, or for the host when `os` is empty.
///
/// ```
/// use shell_render::{PathRenderer, ShellFamily, new_renderer};
///
/// let r = new_renderer("Ubuntu").unwrap();
/// assert_eq!(r.family(), ShellFamily::Posix);
/// assert_eq!(r.sh_quote("it's"), r"'it'\''s'");
/// assert!(new_renderer("plan9").is_err());
/// ```
pub fn new_renderer(os: &str) -> Result<AnyRenderer> {
    BUILTIN.renderer(os)
}
