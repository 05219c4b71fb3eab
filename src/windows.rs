//! Windows `cmd.exe` rendering.
//!
//! Commands are written for batch scripts (`.cmd`), where `%` has to be
//! doubled. Delayed expansion is assumed off, so `!` is left alone.
//!
//! Known limitations:
//! - POSIX permission bits have no cmd equivalent. `chmod` only toggles the
//!   read-only attribute, and `chown` sets the owner but ignores the group.
//! - `touch` can't set an explicit timestamp. It always uses the current time.
//! - cmd drops carriage returns while parsing, so a CR in a quoted value
//!   does not survive.
//! - redirections only apply per command, so the persistent
//!   [`OutputRenderer`] redirects render to nothing.

use chrono::{DateTime, Utc};
use std::iter;

use crate::path::Flavor;
use crate::posix::base64_lines;
use crate::renderer::{Command, Commands, FileMode, OutputRenderer, PathRenderer, ScriptRenderer};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowsRenderer;

impl PathRenderer for WindowsRenderer {
    fn flavor(&self) -> Flavor {
        Flavor::Windows
    }

    /// Double-quotes `s`. `&|<>^()` are literal inside quotes. Embedded
    /// quotes are doubled so cmd's quote state never flips off. `%` is
    /// doubled. Backslashes before any emitted quote are doubled for the
    /// argv parser. A line feed can only be written outside quotes, as a
    /// caret, the line break, and a second line break which becomes the
    /// literal.
    fn sh_quote(&self, s: &str) -> String {
        let mut out = String::with_capacity(s.len() + 2);
        for (i, line) in s.split('\n').enumerate() {
            if i > 0 {
                out.push_str("^\n\n");
            }
            quote_line(&mut out, line);
        }
        out
    }

    fn exe_suffix(&self) -> &'static str {
        ".exe"
    }
}

fn quote_line(out: &mut String, line: &str) {
    out.push('"');
    let mut backslashes = 0;
    for c in line.chars() {
        match c {
            '\\' => {
                backslashes += 1;
                out.push('\\');
                continue;
            }
            '"' => {
                out.extend(iter::repeat_n('\\', backslashes));
                out.push_str("\"\"");
            }
            '%' => out.push_str("%%"),
            _ => out.push(c),
        }
        backslashes = 0;
    }
    out.extend(iter::repeat_n('\\', backslashes));
    out.push('"');
}

impl Commands for WindowsRenderer {
    fn mkdir(&self, dirname: &str) -> Command {
        vec![format!("mkdir {}", self.sh_quote(dirname))]
    }

    /// cmd's `mkdir` creates missing parents but fails on an existing
    /// directory, hence the guard. The trailing separator makes `exist`
    /// only match directories.
    fn mkdir_all(&self, dirname: &str) -> Command {
        vec![format!(
            "if not exist {} mkdir {}",
            self.sh_quote(&format!("{dirname}\\")),
            self.sh_quote(dirname)
        )]
    }

    /// Echoes the data as base64 into a scratch file next to the target and
    /// decodes it with `certutil`.
    fn write_file(&self, filename: &str, data: &[u8]) -> Command {
        let target = self.sh_quote(filename);
        if data.is_empty() {
            return vec![format!("type nul > {target}")];
        }
        let scratch = self.sh_quote(&format!("{filename}.b64"));
        let mut cmd: Command = base64_lines(data)
            .into_iter()
            .enumerate()
            .map(|(i, line)| {
                let redirect = if i == 0 { ">" } else { ">>" };
                format!("{redirect}{scratch} echo {line}")
            })
            .collect();
        cmd.push(format!("certutil -f -decode {scratch} {target} >nul"));
        cmd.push(format!("del {scratch}"));
        cmd
    }

    fn chmod(&self, path: &str, mode: FileMode) -> Command {
        let flag = if mode.is_read_only() { "+R" } else { "-R" };
        vec![format!("attrib {flag} {}", self.sh_quote(path))]
    }

    fn chown(&self, path: &str, owner: &str, _group: &str) -> Command {
        vec![format!(
            "icacls {} /setowner {} >nul",
            self.sh_quote(path),
            self.sh_quote(owner)
        )]
    }

    fn touch(&self, path: &str, _timestamp: Option<DateTime<Utc>>) -> Command {
        let path = self.sh_quote(path);
        vec![
            format!("type nul >> {path}"),
            format!("copy /b {path}+,, {path} >nul"),
        ]
    }
}

impl OutputRenderer for WindowsRenderer {
    fn redirect_fd(&self, _dst: u32, _src: u32) -> Command {
        vec![]
    }

    fn redirect_output(&self, _filename: &str) -> Command {
        vec![]
    }

    fn redirect_output_reset(&self, _filename: &str) -> Command {
        vec![]
    }
}

impl ScriptRenderer for WindowsRenderer {
    fn script_filename(&self, name: &str, dirname: &str) -> String {
        self.join(&[dirname, &format!("{name}.cmd")])
    }

    fn script_permissions(&self) -> FileMode {
        FileMode::new(0o644)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::iter::Peekable;
    use std::str::Chars;

    /// Reads one token the way a batch file line reaches a program: `%%`
    /// collapses, carets escape outside quotes (caret + LF + LF is an LF),
    /// `""` inside quotes is a literal quote, and 2n backslashes before a
    /// quote are n backslashes.
    fn cmd_unquote(token: &str) -> String {
        let mut out = String::new();
        let mut chars = token.chars().peekable();
        let mut quoted = false;
        while let Some(c) = chars.next() {
            match c {
                '%' => {
                    assert_eq!(chars.next(), Some('%'), "lone % in {token:?}");
                    out.push('%');
                }
                '"' if quoted && chars.peek() == Some(&'"') => {
                    chars.next();
                    out.push('"');
                }
                '"' => quoted = !quoted,
                '^' if !quoted => match chars.next() {
                    Some('\n') => out.extend(chars.next()),
                    Some(c) => out.push(c),
                    None => {}
                },
                '\\' => backslashes(&mut chars, &mut out),
                '\n' => panic!("unescaped line feed in {token:?}"),
                _ if !quoted && " \t&|<>()".contains(c) => {
                    panic!("unquoted {c:?} splits {token:?}")
                }
                _ => out.push(c),
            }
        }
        assert!(!quoted, "unterminated quote in {token:?}");
        out
    }

    fn backslashes(chars: &mut Peekable<Chars<'_>>, out: &mut String) {
        let mut n = 1;
        while chars.next_if_eq(&'\\').is_some() {
            n += 1;
        }
        if chars.peek() == Some(&'"') {
            assert_eq!(n % 2, 0, "escaped quote");
            n /= 2;
        }
        out.extend(iter::repeat_n('\\', n));
    }

    #[test]
    fn test_sh_quote() {
        let r = WindowsRenderer;
        assert_eq!(r.sh_quote(""), "\"\"");
        assert_eq!(r.sh_quote("C:\\Program Files"), "\"C:\\Program Files\"");
        assert_eq!(r.sh_quote("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(r.sh_quote("100%"), "\"100%%\"");
        assert_eq!(r.sh_quote("a & b | c"), "\"a & b | c\"");
        assert_eq!(r.sh_quote("C:\\dir\\"), "\"C:\\dir\\\\\"");
        assert_eq!(r.sh_quote("a\nb"), "\"a\"^\n\n\"b\"");
    }

    #[test]
    fn test_sh_quote_round_trip() {
        let r = WindowsRenderer;
        let corpus = [
            "",
            " ",
            "\t",
            "say \"hi\"",
            "\"\"",
            "it's a test",
            "back\\slash\\",
            "\\\"",
            "%PATH% %%",
            "$HOME `id`",
            "a; b & c | d < e > f ^ (g)",
            "line one\nline two\n",
            "\n",
            "trailing\\\nnext",
            "ünïcødé ✓",
        ];
        for s in corpus {
            assert_eq!(cmd_unquote(&r.sh_quote(s)), s, "{s:?}");
        }
    }

    #[test]
    fn test_exe_suffix() {
        assert_eq!(WindowsRenderer.exe_suffix(), ".exe");
    }

    #[test]
    fn test_mkdir() {
        let r = WindowsRenderer;
        assert_eq!(r.mkdir("C:\\a b"), vec!["mkdir \"C:\\a b\""]);
        assert_eq!(
            r.mkdir_all("C:\\a\\b\\c"),
            vec!["if not exist \"C:\\a\\b\\c\\\\\" mkdir \"C:\\a\\b\\c\""]
        );
    }

    #[test]
    fn test_write_file() {
        let r = WindowsRenderer;
        assert_eq!(
            r.write_file("C:\\f", b"hello\0world"),
            vec![
                ">\"C:\\f.b64\" echo aGVsbG8Ad29ybGQ=",
                "certutil -f -decode \"C:\\f.b64\" \"C:\\f\" >nul",
                "del \"C:\\f.b64\"",
            ]
        );
        assert_eq!(r.write_file("f", b""), vec!["type nul > \"f\""]);
    }

    #[test]
    fn test_write_file_appends_each_line() {
        let cmd = WindowsRenderer.write_file("f", &[7u8; 120]);
        // 160 base64 chars: 76 + 76 + 8
        assert_eq!(cmd.len(), 5);
        assert!(cmd[0].starts_with(">\"f.b64\" echo "));
        assert!(cmd[1].starts_with(">>\"f.b64\" echo "));
        assert!(cmd[2].starts_with(">>\"f.b64\" echo "));
    }

    #[test]
    fn test_chmod_degrades_to_read_only_attribute() {
        let r = WindowsRenderer;
        assert_eq!(r.chmod("f", FileMode::new(0o444)), vec!["attrib +R \"f\""]);
        assert_eq!(r.chmod("f", FileMode::new(0o755)), vec!["attrib -R \"f\""]);
        assert_eq!(r.chmod("f", FileMode::new(0o000)), vec!["attrib +R \"f\""]);
    }

    #[test]
    fn test_chown_ignores_group() {
        assert_eq!(
            WindowsRenderer.chown("f", "Administrators", "wheel"),
            vec!["icacls \"f\" /setowner \"Administrators\" >nul"]
        );
    }

    #[test]
    fn test_touch_ignores_timestamp() {
        let r = WindowsRenderer;
        let want = vec!["type nul >> \"f\"", "copy /b \"f\"+,, \"f\" >nul"];
        assert_eq!(r.touch("f", None), want);
        assert_eq!(r.touch("f", Some(Utc::now())), want);
    }

    #[test]
    fn test_redirects_are_empty() {
        let r = WindowsRenderer;
        assert!(r.redirect_fd(1, 2).is_empty());
        assert!(r.redirect_output("log").is_empty());
        assert!(r.redirect_output_reset("log").is_empty());
    }

    #[test]
    fn test_script() {
        let r = WindowsRenderer;
        assert_eq!(r.script_filename("setup", "C:\\Provision"), "C:\\Provision\\setup.cmd");
        assert_eq!(r.script_permissions(), FileMode::new(0o644));
    }
}
