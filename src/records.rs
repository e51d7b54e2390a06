//! Flat reader for the `"key" "value"` line format.
//!
//! Steam's `.acf` manifests and `libraryfolders.vdf` are nested KeyValues documents and Epic's
//! `.item` files are JSON, but every field the finders need sits on its own line as a quoted key
//! followed by a quoted value (optionally separated by a colon). Lines are unescaped and matched
//! one by one; block structure is ignored.

use regex::Regex;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::LazyLock;

static RECORD_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]*)"\s*:?\s*"([^"]*)""#).expect("record regex is valid"));

/// Every key/value pair in `reader`, in file order, duplicates included.
pub fn records<R: BufRead>(reader: R) -> impl Iterator<Item = (String, String)> {
    reader
        .lines()
        .map_while(Result::ok)
        .filter_map(|line| parse_line(&line))
}

/// Parses a single line. Returns `None` when it holds no quoted pair.
pub fn parse_line(line: &str) -> Option<(String, String)> {
    let line = unescape(line.trim_matches([' ', '\t']));
    let caps = RECORD_LINE.captures(&line)?;
    Some((caps[1].to_string(), caps[2].to_string()))
}

/// Collects pairs into a map keyed by the lowercased key. The first occurrence of a key wins.
///
/// When `keys` is non-empty only those keys (compared case-insensitively) are kept, and reading
/// stops once each of them has been seen.
pub fn extract<R: BufRead>(reader: R, keys: &[&str]) -> HashMap<String, String> {
    let mut found = HashMap::new();
    for (key, value) in records(reader) {
        let key = key.to_lowercase();
        if !keys.is_empty() && !keys.iter().any(|k| k.eq_ignore_ascii_case(&key)) {
            continue;
        }
        found.entry(key).or_insert(value);

        if !keys.is_empty() && found.len() == keys.len() {
            break;
        }
    }
    found
}

/// [`extract`] on a file. A file that cannot be opened yields an empty map.
pub fn extract_file(path: &Path, keys: &[&str]) -> HashMap<String, String> {
    match File::open(path) {
        Ok(file) => extract(BufReader::new(file), keys),
        Err(_) => HashMap::new(),
    }
}

/// Resolves backslash escapes. Unknown escapes yield the escaped character itself.
pub fn unescape(line: &str) -> Cow<'_, str> {
    if !line.contains('\\') {
        return Cow::Borrowed(line);
    }

    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            None => out.push('\\'),
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{c}'),
            Some(kind @ ('u' | 'x')) => {
                let len = if kind == 'u' { 4 } else { 2 };
                let mut digits = String::with_capacity(len);
                while digits.len() < len {
                    match chars.peek() {
                        Some(d) if d.is_ascii_hexdigit() => {
                            digits.push(*d);
                            chars.next();
                        }
                        _ => break,
                    }
                }
                match u32::from_str_radix(&digits, 16).ok().and_then(char::from_u32) {
                    Some(decoded) if digits.len() == len => out.push(decoded),
                    _ => {
                        out.push(kind);
                        out.push_str(&digits);
                    }
                }
            }
            Some(other) => out.push(other),
        }
    }
    Cow::Owned(out)
}
