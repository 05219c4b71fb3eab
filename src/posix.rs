//! POSIX `sh` rendering.
//!
//! Nothing here relies on bash or other shell extensions. Output is meant for
//! any `sh`, including dash and busybox ash.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use itertools::Itertools;

use crate::path::Flavor;
use crate::renderer::{Command, Commands, FileMode, OutputRenderer, PathRenderer, ScriptRenderer};

/// Width of the base64 lines embedded in `write_file` commands.
pub(crate) const BASE64_LINE_WIDTH: usize = 76;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PosixRenderer;

impl PathRenderer for PosixRenderer {
    fn flavor(&self) -> Flavor {
        Flavor::Posix
    }

    /// Single-quotes `s`. Inside single quotes nothing is special except the
    /// closing quote, so each `'` becomes `'\''`: close, an escaped quote,
    /// reopen.
    fn sh_quote(&self, s: &str) -> String {
        let mut out = String::with_capacity(s.len() + 2);
        out.push('\'');
        for c in s.chars() {
            if c == '\'' {
                out.push_str("'\\''");
            } else {
                out.push(c);
            }
        }
        out.push('\'');
        out
    }

    fn exe_suffix(&self) -> &'static str {
        ""
    }
}

/// Operands follow `--` so a name starting with `-` is never read as an
/// option.
impl Commands for PosixRenderer {
    fn mkdir(&self, dirname: &str) -> Command {
        vec![format!("mkdir -- {}", self.sh_quote(dirname))]
    }

    fn mkdir_all(&self, dirname: &str) -> Command {
        vec![format!("mkdir -p -- {}", self.sh_quote(dirname))]
    }

    /// The data travels as base64 so NULs and other bytes a shell word cannot
    /// hold survive intact.
    fn write_file(&self, filename: &str, data: &[u8]) -> Command {
        let filename = self.sh_quote(filename);
        if data.is_empty() {
            return vec![format!(": > {filename}")];
        }
        let lines = base64_lines(data)
            .iter()
            .map(|line| self.sh_quote(line))
            .join(" ");
        vec![format!("printf '%s\\n' {lines} | base64 -d > {filename}")]
    }

    fn chmod(&self, path: &str, mode: FileMode) -> Command {
        vec![format!("chmod -- {mode} {}", self.sh_quote(path))]
    }

    fn chown(&self, path: &str, owner: &str, group: &str) -> Command {
        let ownership = if group.is_empty() {
            owner.to_string()
        } else {
            format!("{owner}:{group}")
        };
        vec![format!(
            "chown -- {} {}",
            self.sh_quote(&ownership),
            self.sh_quote(path)
        )]
    }

    fn touch(&self, path: &str, timestamp: Option<DateTime<Utc>>) -> Command {
        let path = self.sh_quote(path);
        match timestamp {
            // -t reads local time, so pin TZ
            Some(ts) => vec![format!(
                "TZ=UTC0 touch -t {} -- {path}",
                ts.format("%Y%m%d%H%M.%S")
            )],
            None => vec![format!("touch -- {path}")],
        }
    }
}

impl OutputRenderer for PosixRenderer {
    fn redirect_fd(&self, dst: u32, src: u32) -> Command {
        vec![format!("exec {src}>&{dst}")]
    }

    fn redirect_output(&self, filename: &str) -> Command {
        vec![format!("exec >> {}", self.sh_quote(filename))]
    }

    fn redirect_output_reset(&self, filename: &str) -> Command {
        vec![format!("exec > {}", self.sh_quote(filename))]
    }
}

impl ScriptRenderer for PosixRenderer {
    fn script_filename(&self, name: &str, dirname: &str) -> String {
        self.join(&[dirname, &format!("{name}.sh")])
    }

    fn script_permissions(&self) -> FileMode {
        FileMode::new(0o755)
    }
}

/// Standard base64 of `data`, wrapped to [`BASE64_LINE_WIDTH`].
pub(crate) fn base64_lines(data: &[u8]) -> Vec<String> {
    STANDARD
        .encode(data)
        .chars()
        .chunks(BASE64_LINE_WIDTH)
        .into_iter()
        .map(|chunk| chunk.collect())
        .collect()
}
