//! Read-only access to the Windows registry, with an empty stand-in on other hosts.

use std::str::FromStr;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hive {
    CurrentUser,
    LocalMachine,
}

/// The two registry queries the finders need. Missing keys, missing values and values of an
/// unexpected type are all reported as absent.
pub trait Registry {
    /// Reads a string value from `key` (backslash separated, relative to `hive`).
    fn read_string(&self, hive: Hive, key: &str, value: &str) -> Option<String>;

    /// Names of the direct subkeys of `key`.
    fn subkey_names(&self, hive: Hive, key: &str) -> Vec<String>;
}

impl dyn Registry + Send + Sync {
    /// Reads a value and converts it, falling back to `default` when it is absent or unparsable.
    pub fn read_or<T: FromStr>(&self, hive: Hive, key: &str, value: &str, default: T) -> T {
        self.read_string(hive, key, value)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }
}

pub type SharedRegistry = Arc<dyn Registry + Send + Sync>;

/// The registry of the current host.
pub fn system() -> SharedRegistry {
    #[cfg(windows)]
    return Arc::new(WindowsRegistry);
    #[cfg(not(windows))]
    return Arc::new(NoRegistry);
}

/// A registry with nothing in it.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRegistry;

impl Registry for NoRegistry {
    fn read_string(&self, _hive: Hive, _key: &str, _value: &str) -> Option<String> {
        None
    }

    fn subkey_names(&self, _hive: Hive, _key: &str) -> Vec<String> {
        Vec::new()
    }
}

#[cfg(windows)]
pub use windows::WindowsRegistry;

#[cfg(windows)]
mod windows {
    use super::{Hive, Registry};
    use winreg::RegKey;
    use winreg::enums::*;

    #[derive(Debug, Clone, Copy, Default)]
    pub struct WindowsRegistry;

    fn open(hive: Hive, key: &str) -> Option<RegKey> {
        let predef = match hive {
            Hive::CurrentUser => HKEY_CURRENT_USER,
            Hive::LocalMachine => HKEY_LOCAL_MACHINE,
        };
        RegKey::predef(predef).open_subkey(key).ok()
    }

    impl Registry for WindowsRegistry {
        fn read_string(&self, hive: Hive, key: &str, value: &str) -> Option<String> {
            open(hive, key)?.get_value::<String, _>(value).ok()
        }

        fn subkey_names(&self, hive: Hive, key: &str) -> Vec<String> {
            let Some(key) = open(hive, key) else {
                return Vec::new();
            };
            key.enum_keys().filter_map(Result::ok).collect()
        }
    }
}

#[cfg(test)]
pub(crate) use fake::FakeRegistry;
