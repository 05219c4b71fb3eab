use std::fmt::{self, Debug, Display, Formatter};
use std::ops::Deref;

use chrono::{DateTime, Utc};

use crate::path::Flavor;
use crate::platform::ShellFamily;
use crate::posix::PosixRenderer;
use crate::windows::WindowsRenderer;

/// Ordered shell fragments making up one logical operation. The caller
/// joins them with the shell's statement separator.
pub type Command = Vec<String>;

/// POSIX permission bits (`rwx` for owner, group and other, plus the
/// setuid/setgid/sticky bits).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FileMode(u32);

impl FileMode {
    pub const fn new(bits: u32) -> Self {
        Self(bits & 0o7777)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    /// No write bit is set for anyone.
    pub const fn is_read_only(self) -> bool {
        self.0 & 0o222 == 0
    }
}

impl From<u32> for FileMode {
    fn from(bits: u32) -> Self {
        Self::new(bits)
    }
}

impl Display for FileMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:04o}", self.0)
    }
}

/// Generates paths and quoted literals for one shell environment.
///
/// The path-syntax methods are lexical and default to the renderer's
/// [`Flavor`]; only quoting and the executable suffix are per-variant.
pub trait PathRenderer {
    fn flavor(&self) -> Flavor;

    /// Wraps `s` so the shell reads it back as exactly one token equal to `s`.
    fn sh_quote(&self, s: &str) -> String;

    /// Filename suffix for executables.
    fn exe_suffix(&self) -> &'static str;

    fn separator(&self) -> char {
        self.flavor().separator()
    }

    fn join(&self, elems: &[&str]) -> String {
        self.flavor().join(elems)
    }

    fn split<'a>(&self, path: &'a str) -> (&'a str, &'a str) {
        self.flavor().split(path)
    }

    fn base(&self, path: &str) -> String {
        self.flavor().base(path)
    }

    fn dir(&self, path: &str) -> String {
        self.flavor().dir(path)
    }

    fn ext<'a>(&self, path: &'a str) -> &'a str {
        self.flavor().ext(path)
    }

    fn is_abs(&self, path: &str) -> bool {
        self.flavor().is_abs(path)
    }

    fn clean(&self, path: &str) -> String {
        self.flavor().clean(path)
    }

    fn volume_name<'a>(&self, path: &'a str) -> &'a str {
        self.flavor().volume_name(path)
    }

    fn split_list(&self, list: &str) -> Vec<String> {
        self.flavor().split_list(list)
    }

    fn to_slash(&self, path: &str) -> String {
        self.flavor().to_slash(path)
    }

    fn from_slash(&self, path: &str) -> String {
        self.flavor().from_slash(path)
    }

    fn norm_case(&self, path: &str) -> String {
        self.flavor().norm_case(path)
    }
}

/// Shell commands for filesystem operations. Every path or content
/// argument is quoted with [`PathRenderer::sh_quote`].
pub trait Commands {
    /// Creates one directory. The parent must exist.
    fn mkdir(&self, dirname: &str) -> Command;

    /// Creates a directory and any missing parents; an existing directory
    /// is not an error.
    fn mkdir_all(&self, dirname: &str) -> Command;

    /// Writes `data` byte-for-byte to `filename`, creating or truncating
    /// it. Permissions come from the target's umask.
    fn write_file(&self, filename: &str, data: &[u8]) -> Command;

    /// Sets permission bits the way `chmod(2)` would.
    fn chmod(&self, path: &str, mode: FileMode) -> Command;

    /// Changes ownership. An empty `group` leaves the group alone.
    fn chown(&self, path: &str, owner: &str, group: &str) -> Command;

    /// Creates `path` if missing and updates its modification time, to
    /// `timestamp` when given or to the current time otherwise.
    fn touch(&self, path: &str, timestamp: Option<DateTime<Utc>>) -> Command;
}

/// Redirection of a script's output streams from the current point on.
pub trait OutputRenderer {
    /// Sends file descriptor `src` wherever `dst` currently goes.
    fn redirect_fd(&self, dst: u32, src: u32) -> Command;

    /// Appends all further stdout to `filename`.
    fn redirect_output(&self, filename: &str) -> Command;

    /// Truncates `filename` and sends all further stdout to it.
    fn redirect_output_reset(&self, filename: &str) -> Command;
}

/// Naming and permissions for scripts written to the target.
pub trait ScriptRenderer {
    fn script_filename(&self, name: &str, dirname: &str) -> String;

    fn script_permissions(&self) -> FileMode;
}

/// Everything needed to generate shell paths and commands.
pub trait Renderer:
    PathRenderer + Commands + OutputRenderer + ScriptRenderer + Debug + Send + Sync
{
}

impl<T> Renderer for T where
    T: PathRenderer + Commands + OutputRenderer + ScriptRenderer + Debug + Send + Sync
{
}

/// The renderer picked for an OS name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnyRenderer {
    Posix(PosixRenderer),
    Windows(WindowsRenderer),
}

impl AnyRenderer {
    pub fn family(&self) -> ShellFamily {
        match self {
            AnyRenderer::Posix(_) => ShellFamily::Posix,
            AnyRenderer::Windows(_) => ShellFamily::Windows,
        }
    }
}

impl From<ShellFamily> for AnyRenderer {
    fn from(family: ShellFamily) -> Self {
        match family {
            ShellFamily::Posix => AnyRenderer::Posix(PosixRenderer),
            ShellFamily::Windows => AnyRenderer::Windows(WindowsRenderer),
        }
    }
}

impl Deref for AnyRenderer {
    type Target = dyn Renderer;

    fn deref(&self) -> &Self::Target {
        match self {
            AnyRenderer::Posix(r) => r,
            AnyRenderer::Windows(r) => r,
        }
    }
}
