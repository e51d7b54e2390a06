use std::fs::File;
use std::io::Read;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Characters that are not allowed in file names on at least one of the supported hosts.
const INVALID_FILENAME_CHARS: &[char] = &['"', '<', '>', '|', ':', '*', '?', '\\', '/'];

const MACHO_MAGIC_32: u32 = 0xFEED_FACE;
const MACHO_MAGIC_64: u32 = 0xFEED_FACF;

/// Number of parent steps from `path` up to `root`, or `None` when `path` is not inside `root`.
///
/// Names compare case-insensitively on Windows and case-sensitively elsewhere.
pub fn path_depth(path: &Path, root: &Path) -> Option<usize> {
    let mut parts = path.components().filter(|c| !matches!(c, Component::CurDir));
    for root_part in root.components().filter(|c| !matches!(c, Component::CurDir)) {
        let part = parts.next()?;
        if !same_component(part, root_part) {
            return None;
        }
    }
    Some(parts.count())
}

fn same_component(a: Component, b: Component) -> bool {
    if cfg!(windows) {
        a.as_os_str().to_string_lossy().to_lowercase() == b.as_os_str().to_string_lossy().to_lowercase()
    } else {
        a == b
    }
}

/// Checks the leading bytes of a file for an executable signature this host can run.
///
/// "MZ" is accepted on Windows, and on any host when the file carries an `.exe` extension so
/// that games running under an emulation layer are still found. ELF is accepted on Linux and
/// Mach-O on macOS. Unreadable files are never executables.
pub fn is_executable_file(path: &Path) -> bool {
    let Ok(file) = File::open(path) else {
        return false;
    };
    let mut header = Vec::with_capacity(4);
    if file.take(4).read_to_end(&mut header).is_err() {
        return false;
    }

    if header.starts_with(b"MZ") {
        return cfg!(windows) || has_extension(path, "exe");
    }
    if header.starts_with(b"\x7fELF") {
        return cfg!(target_os = "linux");
    }
    if let Ok(magic) = <[u8; 4]>::try_from(header.as_slice()) {
        let magic = u32::from_le_bytes(magic);
        if magic == MACHO_MAGIC_32 || magic == MACHO_MAGIC_64 {
            return cfg!(target_os = "macos");
        }
    }
    false
}

/// Case-insensitive extension check, `ext` without the leading dot.
pub fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .is_some_and(|e| e.to_string_lossy().eq_ignore_ascii_case(ext))
}

fn is_invalid_filename_char(c: char) -> bool {
    c.is_control() || INVALID_FILENAME_CHARS.contains(&c)
}

/// Replaces every character that is invalid in a portable file name with `replacement`.
/// Pass `""` to remove them. Invalid characters inside `replacement` itself are dropped,
/// so sanitizing an already sanitized name changes nothing.
pub fn sanitize_filename(name: &str, replacement: &str) -> String {
    let replacement: String = replacement
        .chars()
        .filter(|c| !is_invalid_filename_char(*c))
        .collect();

    let mut sanitized = String::with_capacity(name.len());
    for c in name.chars() {
        if is_invalid_filename_char(c) {
            sanitized.push_str(&replacement);
        } else {
            sanitized.push(c);
        }
    }
    sanitized
}

/// True if `dir` directly contains an executable file. Errors count as "no".
pub fn dir_has_executable(dir: &Path) -> bool {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(Result::ok)
        .any(|entry| entry.file_type().is_file() && is_executable_file(entry.path()))
}

/// Absolute, canonical form of `path` for showing to users and writing to caches.
pub fn prettify_path(path: &Path) -> PathBuf {
    match std::fs::canonicalize(path) {
        Ok(canonical) => strip_verbatim_prefix(canonical),
        Err(_) => std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf()),
    }
}

// canonicalize on Windows yields `\\?\C:\...`, which many tools refuse.
fn strip_verbatim_prefix(path: PathBuf) -> PathBuf {
    let stripped = path
        .to_str()
        .and_then(|p| p.strip_prefix(r"\\?\"))
        .filter(|p| p.as_bytes().get(1) == Some(&b':'))
        .map(PathBuf::from);
    stripped.unwrap_or(path)
}
