use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OsFamily {
    Linux,
    MacOs,
    Windows,
    FreeBsd,
    Unknown,
}

impl OsFamily {
    pub const fn as_str(self) -> &'static str {
        match self {
            OsFamily::Linux => "linux",
            OsFamily::MacOs => "macos",
            OsFamily::Windows => "windows",
            OsFamily::FreeBsd => "freebsd",
            OsFamily::Unknown => "unknown",
        }
    }

    /// Maps a kernel/OS name (`uname -s`, `$OS`, `std::env::consts::OS`).
    pub fn from_kernel_name(name: &str) -> Self {
        let name = name.trim().to_ascii_lowercase();
        match name.as_str() {
            "linux" => OsFamily::Linux,
            "darwin" | "macos" => OsFamily::MacOs,
            "freebsd" => OsFamily::FreeBsd,
            n if n.starts_with("windows")
                || n.starts_with("mingw")
                || n.starts_with("msys")
                || n.starts_with("cygwin") =>
            {
                OsFamily::Windows
            }
            _ => OsFamily::Unknown,
        }
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw identification markers read from the host.
#[derive(Debug, Clone, Default)]
pub struct OsMarkers {
    pub kernel: Option<String>,
    pub os_release: Option<String>,
    pub lsb_release: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Platform {
    pub family: OsFamily,
    pub variant: Option<String>,
}

impl Platform {
    pub fn new(family: OsFamily) -> Self {
        Self {
            family,
            variant: None,
        }
    }

    pub fn unknown() -> Self {
        Self::new(OsFamily::Unknown)
    }

    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = Some(variant.into());
        self
    }

    pub fn from_markers(markers: &OsMarkers) -> Self {
        let family = markers
            .kernel
            .as_deref()
            .map(OsFamily::from_kernel_name)
            .unwrap_or(OsFamily::Unknown);

        let variant = match family {
            OsFamily::Linux => markers
                .os_release
                .as_deref()
                .and_then(|s| key_value(s, "ID"))
                .or_else(|| {
                    markers
                        .lsb_release
                        .as_deref()
                        .and_then(|s| key_value(s, "DISTRIB_ID"))
                })
                .map(|v| v.to_ascii_lowercase()),
            _ => None,
        };

        Self { family, variant }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.variant {
            Some(variant) => write!(f, "{} ({variant})", self.family),
            None => write!(f, "{}", self.family),
        }
    }
}

/// Reads `KEY=value` from os-release style text, unquoting the value.
fn key_value(text: &str, key: &str) -> Option<String> {
    text.lines().find_map(|line| {
        let (k, v) = line.trim().split_once('=')?;
        if k.trim() != key {
            return None;
        }
        let v = v.trim().trim_matches(|c| c == '"' || c == '\'').trim();
        (!v.is_empty()).then(|| v.to_string())
    })
}
