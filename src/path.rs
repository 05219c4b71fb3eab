//! Lexical path syntax for the shell families we render for.
//!
//! None of these functions touch the filesystem. They follow the lexical
//! rules of the target OS, so a Windows path can be rendered correctly
//! from a Linux host and vice versa.

/// How a target OS writes paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flavor {
    /// `/` separated, case-sensitive, no volume names.
    Posix,
    /// `\` separated (`/` accepted on input), drive letters and UNC shares.
    Windows,
}

impl Flavor {
    pub fn separator(self) -> char {
        match self {
            Flavor::Posix => '/',
            Flavor::Windows => '\\',
        }
    }

    /// Separator used in `PATH`-like lists.
    pub fn list_separator(self) -> char {
        match self {
            Flavor::Posix => ':',
            Flavor::Windows => ';',
        }
    }

    pub fn is_separator(self, c: char) -> bool {
        match self {
            Flavor::Posix => c == '/',
            Flavor::Windows => c == '\\' || c == '/',
        }
    }

    fn is_separator_byte(self, b: u8) -> bool {
        self.is_separator(b as char)
    }

    /// Length of the leading volume name: `C:` or `\\host\share`.
    fn volume_name_len(self, path: &str) -> usize {
        if self == Flavor::Posix {
            return 0;
        }
        let b = path.as_bytes();
        let l = b.len();
        if l < 2 {
            return 0;
        }
        if b[1] == b':' && b[0].is_ascii_alphabetic() {
            return 2;
        }
        let sep = |i: usize| self.is_separator_byte(b[i]);
        // \\host\share
        if l >= 5 && sep(0) && sep(1) && !sep(2) && b[2] != b'.' {
            let mut n = 3;
            while n < l - 1 {
                if sep(n) {
                    n += 1;
                    if sep(n) || b[n] == b'.' {
                        break;
                    }
                    while n < l && !sep(n) {
                        n += 1;
                    }
                    return n;
                }
                n += 1;
            }
        }
        0
    }

    /// Leading volume name of `path`; always empty for POSIX.
    pub fn volume_name(self, path: &str) -> &str {
        &path[..self.volume_name_len(path)]
    }

    pub fn is_abs(self, path: &str) -> bool {
        match self {
            Flavor::Posix => path.starts_with('/'),
            Flavor::Windows => {
                let l = self.volume_name_len(path);
                if l == 0 {
                    return false;
                }
                if l > 2 {
                    // UNC share
                    return true;
                }
                path[l..].chars().next().is_some_and(|c: char| self.is_separator(c))
            }
        }
    }

    /// Shortest lexically equivalent path: repeated separators collapse,
    /// `.` elements vanish, and `..` consumes the preceding element.
    /// Returns `.` for an empty path.
    pub fn clean(self, path: &str) -> String {
        let vol_len = self.volume_name_len(path);
        let (vol, rest) = path.split_at(vol_len);
        if rest.is_empty() {
            if vol_len > 2 {
                return self.from_slash(path);
            }
            return format!("{path}.");
        }
        let rooted = rest.starts_with(|c: char| self.is_separator(c));

        let mut elems: Vec<&str> = Vec::new();
        for elem in rest.split(|c: char| self.is_separator(c)) {
            match elem {
                "" | "." => {}
                ".." => match elems.last() {
                    Some(&last) if last != ".." => {
                        elems.pop();
                    }
                    _ if rooted => {}
                    _ => elems.push(".."),
                },
                _ => elems.push(elem),
            }
        }

        let sep = self.separator();
        let mut out = String::with_capacity(path.len());
        out.push_str(vol);
        if rooted {
            out.push(sep);
        } else if self == Flavor::Windows
            && vol.is_empty()
            && elems.first().is_some_and(|e| e.contains(':'))
        {
            // keep "a/../c:" from turning into the drive "c:"
            out.push('.');
            out.push(sep);
        }
        for (i, elem) in elems.iter().enumerate() {
            if i > 0 {
                out.push(sep);
            }
            out.push_str(elem);
        }
        if !rooted && elems.is_empty() {
            out.push('.');
        }
        self.from_slash(&out)
    }

    /// Joins the non-empty elements with the separator and cleans the
    /// result. Returns an empty string when every element is empty.
    pub fn join(self, elems: &[&str]) -> String {
        let Some(first) = elems.iter().position(|e| !e.is_empty()) else {
            return String::new();
        };
        let elems = &elems[first..];
        let sep = self.separator().to_string();
        if self == Flavor::Posix {
            let parts: Vec<&str> = elems.iter().copied().filter(|e| !e.is_empty()).collect();
            return self.clean(&parts.join(&sep));
        }

        let head = elems[0];
        if head.len() == 2 && head.as_bytes()[1] == b':' {
            // bare drive letter: "C:" + "a" is drive-relative, not "C:\a"
            let tail: Vec<&str> = elems[1..].iter().copied().skip_while(|e| e.is_empty()).collect();
            return self.clean(&format!("{head}{}", tail.join(&sep)));
        }
        let joined = self.clean(&elems.join(&sep));
        if !self.is_unc(&joined) {
            return joined;
        }
        let head = self.clean(head);
        if self.is_unc(&head) {
            return joined;
        }
        // don't let "\" + "\host\share" fuse into a UNC path
        let tail = self.clean(&elems[1..].join(&sep));
        if head.ends_with(self.separator()) {
            format!("{head}{tail}")
        } else {
            format!("{head}{sep}{tail}")
        }
    }

    fn is_unc(self, path: &str) -> bool {
        self.volume_name_len(path) > 2
    }

    fn last_separator(self, path: &str) -> Option<usize> {
        let vol = self.volume_name_len(path);
        path[vol..].rfind(|c: char| self.is_separator(c)).map(|i| i + vol)
    }

    /// Splits after the final separator. `dir + file == path`.
    pub fn split(self, path: &str) -> (&str, &str) {
        let at = self
            .last_separator(path)
            .map_or_else(|| self.volume_name_len(path), |i| i + 1);
        path.split_at(at)
    }

    /// Last element, trailing separators ignored. `.` for an empty path and
    /// the separator for a path made only of separators.
    pub fn base(self, path: &str) -> String {
        if path.is_empty() {
            return ".".to_string();
        }
        let trimmed = path.trim_end_matches(|c: char| self.is_separator(c));
        let trimmed = &trimmed[self.volume_name_len(trimmed)..];
        let base = match trimmed.rfind(|c: char| self.is_separator(c)) {
            Some(i) => &trimmed[i + 1..],
            None => trimmed,
        };
        if base.is_empty() {
            return self.separator().to_string();
        }
        base.to_string()
    }

    /// Everything but the last element, cleaned. The volume name is kept as
    /// written.
    pub fn dir(self, path: &str) -> String {
        let vol_len = self.volume_name_len(path);
        let vol = &path[..vol_len];
        let end = self.last_separator(path).map_or(vol_len, |i| i + 1);
        let dir = self.clean(&path[vol_len..end]);
        if dir == "." && vol_len > 2 {
            return vol.to_string();
        }
        format!("{vol}{dir}")
    }

    /// Extension of the final element including the dot, or empty.
    pub fn ext(self, path: &str) -> &str {
        for (i, c) in path.char_indices().rev() {
            if self.is_separator(c) {
                break;
            }
            if c == '.' {
                return &path[i..];
            }
        }
        ""
    }

    /// Splits a `PATH`-style list. On Windows a quoted element may contain
    /// the list separator; the quotes are removed.
    pub fn split_list(self, list: &str) -> Vec<String> {
        if list.is_empty() {
            return vec![];
        }
        let ls = self.list_separator();
        if self == Flavor::Posix {
            return list.split(ls).map(str::to_string).collect();
        }
        let mut out = vec![];
        let mut start = 0;
        let mut quoted = false;
        for (i, c) in list.char_indices() {
            if c == '"' {
                quoted = !quoted;
            } else if c == ls && !quoted {
                out.push(&list[start..i]);
                start = i + 1;
            }
        }
        out.push(&list[start..]);
        out.into_iter().map(|s| s.replace('"', "")).collect()
    }

    pub fn to_slash(self, path: &str) -> String {
        match self {
            Flavor::Posix => path.to_string(),
            Flavor::Windows => path.replace('\\', "/"),
        }
    }

    pub fn from_slash(self, path: &str) -> String {
        match self {
            Flavor::Posix => path.to_string(),
            Flavor::Windows => path.replace('/', "\\"),
        }
    }

    /// Case used when comparing paths: as-is on POSIX, folded on Windows.
    pub fn norm_case(self, path: &str) -> String {
        match self {
            Flavor::Posix => path.to_string(),
            Flavor::Windows => path.to_lowercase(),
        }
    }
}
