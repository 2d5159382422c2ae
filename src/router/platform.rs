//! Lending platform names

/// A lending platform the router can dispatch to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Platform {
    /// RouteOne dealer portal
    RouteOne,
    /// CUDL credit union lending portal
    Cudl,
}

impl Platform {
    /// Every supported platform
    pub const ALL: [Platform; 2] = [Platform::RouteOne, Platform::Cudl];

    /// Map free-form platform text to a known platform
    ///
    /// Comparison ignores case and surrounding whitespace, and accepts
    /// "route one" for RouteOne. Unrecognized text yields `None`; callers keep
    /// the caller's text for their error message.
    pub fn normalize(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "routeone" | "route one" => Some(Platform::RouteOne),
            "cudl" => Some(Platform::Cudl),
            _ => None,
        }
    }

    /// Canonical display name
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::RouteOne => "RouteOne",
            Platform::Cudl => "CUDL",
        }
    }

    /// Lowercase key used in config files
    pub fn config_key(&self) -> &'static str {
        match self {
            Platform::RouteOne => "routeone",
            Platform::Cudl => "cudl",
        }
    }

    /// Prefix of the credential environment variables (`RO_USER_LR1`, `CU_PASS_TEST`, ...)
    pub fn env_prefix(&self) -> &'static str {
        match self {
            Platform::RouteOne => "RO",
            Platform::Cudl => "CU",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
