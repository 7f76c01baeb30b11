//! Platform selection
//!
//! Maps (operating system family, CPU architecture) to the native client
//! library and daemon binary shipped for it.

use std::fmt;
use std::path::PathBuf;

use crate::constants::DAEMON_NAME_DEFAULT;

/// Operating system family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OsFamily {
    /// Linux
    Linux,
    /// macOS
    MacOs,
    /// Windows
    Windows,
    /// FreeBSD
    FreeBsd,
}

impl OsFamily {
    /// Parse a `std::env::consts::OS` value.
    #[must_use]
    pub fn from_consts(os: &str) -> Option<Self> {
        match os {
            "linux" => Some(Self::Linux),
            "macos" => Some(Self::MacOs),
            "windows" => Some(Self::Windows),
            "freebsd" => Some(Self::FreeBsd),
            _ => None,
        }
    }

    /// Directory name used in the library layout.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::MacOs => "darwin",
            Self::Windows => "windows",
            Self::FreeBsd => "freebsd",
        }
    }
}

/// CPU architecture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    /// 32-bit x86
    X86,
    /// x86-64
    Amd64,
    /// 64-bit ARM
    Aarch64,
}

impl Arch {
    /// Parse a `std::env::consts::ARCH` value.
    #[must_use]
    pub fn from_consts(arch: &str) -> Option<Self> {
        match arch {
            "x86" => Some(Self::X86),
            "x86_64" => Some(Self::Amd64),
            "aarch64" => Some(Self::Aarch64),
            _ => None,
        }
    }

    /// Directory name used in the library layout.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::X86 => "i386",
            Self::Amd64 => "amd64",
            Self::Aarch64 => "arm64",
        }
    }
}

/// A supported (OS, architecture) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Platform {
    /// Operating system family
    pub os: OsFamily,
    /// CPU architecture
    pub arch: Arch,
}

/// Combinations a native client library is built for.
const SUPPORTED: &[(OsFamily, Arch)] = &[
    (OsFamily::Linux, Arch::Amd64),
    (OsFamily::Linux, Arch::Aarch64),
    (OsFamily::MacOs, Arch::Amd64),
    (OsFamily::MacOs, Arch::Aarch64),
    (OsFamily::Windows, Arch::X86),
    (OsFamily::Windows, Arch::Amd64),
    (OsFamily::FreeBsd, Arch::Amd64),
];

impl Platform {
    /// Look up a platform in the support table.
    #[must_use]
    pub fn new(os: OsFamily, arch: Arch) -> Option<Self> {
        SUPPORTED
            .contains(&(os, arch))
            .then_some(Self { os, arch })
    }

    /// Resolve from raw `std::env::consts` strings.
    #[must_use]
    pub fn from_consts(os: &str, arch: &str) -> Option<Self> {
        Self::new(OsFamily::from_consts(os)?, Arch::from_consts(arch)?)
    }

    /// The platform this binary runs on, if supported.
    #[must_use]
    pub fn current() -> Option<Self> {
        Self::from_consts(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// File name of the native client library.
    #[must_use]
    pub fn library_file_name(&self) -> &'static str {
        match self.os {
            OsFamily::Linux | OsFamily::FreeBsd => "libqdb_api.so",
            OsFamily::MacOs => "libqdb_api.dylib",
            OsFamily::Windows => "qdb_api.dll",
        }
    }

    /// Relative path of the native library: `<os>/<arch>/<file>`.
    #[must_use]
    pub fn library_path(&self) -> PathBuf {
        [self.os.as_str(), self.arch.as_str(), self.library_file_name()]
            .iter()
            .collect()
    }

    /// Name of the daemon executable.
    #[must_use]
    pub fn daemon_executable_name(&self) -> String {
        match self.os {
            OsFamily::Windows => format!("{DAEMON_NAME_DEFAULT}.exe"),
            _ => DAEMON_NAME_DEFAULT.to_string(),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os.as_str(), self.arch.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_path() {
        let linux = Platform::from_consts("linux", "x86_64").unwrap();
        assert_eq!(
            linux.library_path(),
            PathBuf::from("linux").join("amd64").join("libqdb_api.so")
        );

        let mac = Platform::from_consts("macos", "aarch64").unwrap();
        assert_eq!(mac.library_file_name(), "libqdb_api.dylib");
        assert_eq!(mac.to_string(), "darwin/arm64");

        let windows = Platform::from_consts("windows", "x86").unwrap();
        assert_eq!(windows.library_file_name(), "qdb_api.dll");
        assert_eq!(windows.daemon_executable_name(), "qdbd.exe");
    }

    #[test]
    fn test_unsupported_combinations() {
        assert!(Platform::from_consts("linux", "x86").is_none());
        assert!(Platform::from_consts("freebsd", "aarch64").is_none());
        assert!(Platform::from_consts("haiku", "x86_64").is_none());
        assert!(Platform::from_consts("linux", "riscv64").is_none());
    }
}
