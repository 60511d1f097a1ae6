//! Device selection with a single fallback to the system default

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::StreamError;

/// Which capture or playback device to open
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceSelector {
    /// System default device
    #[default]
    Default,
    /// Device matched by name
    Named(String),
}

impl DeviceSelector {
    /// Select a device by name
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Whether this is the system default
    #[must_use]
    pub fn is_default(&self) -> bool {
        matches!(self, Self::Default)
    }
}

impl fmt::Display for DeviceSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "default"),
            Self::Named(name) => write!(f, "{name}"),
        }
    }
}

/// Open a device, falling back once to the default device on failure
///
/// `open` is called with the requested selector first. If that fails and the
/// selector named a specific device, it is called once more with
/// [`DeviceSelector::Default`].
///
/// # Errors
///
/// Returns `StreamError::DeviceUnavailable` if no attempt succeeded.
pub fn open_with_fallback<T, E, F>(selector: &DeviceSelector, mut open: F) -> Result<T, StreamError>
where
    F: FnMut(&DeviceSelector) -> Result<T, E>,
    E: fmt::Display,
{
    match open(selector) {
        Ok(device) => Ok(device),
        Err(e) if selector.is_default() => Err(StreamError::DeviceUnavailable {
            device: selector.to_string(),
            message: e.to_string(),
        }),
        Err(e) => {
            tracing::warn!(
                "Failed to open device '{}': {}. Falling back to default device",
                selector,
                e
            );
            open(&DeviceSelector::Default).map_err(|fallback| StreamError::DeviceUnavailable {
                device: selector.to_string(),
                message: format!("{e}; default device: {fallback}"),
            })
        }
    }
}
