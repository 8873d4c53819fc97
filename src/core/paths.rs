use crate::error::{Error, Result};
use std::env;
use std::path::PathBuf;

/// Base refswap config directory (~/.config/refswap/, %APPDATA%\refswap on Windows)
pub fn refswap() -> Result<PathBuf> {
    #[cfg(windows)]
    {
        let appdata = env::var("APPDATA").map_err(|_| {
            Error::internal_unexpected(
                "APPDATA environment variable not set on Windows".to_string(),
            )
        })?;
        Ok(PathBuf::from(appdata).join("refswap"))
    }

    #[cfg(not(windows))]
    {
        let home = env::var("HOME").map_err(|_| {
            Error::internal_unexpected(
                "HOME environment variable not set on Unix-like system".to_string(),
            )
        })?;
        Ok(PathBuf::from(home).join(".config").join("refswap"))
    }
}

/// Global refswap.json config file path
pub fn refswap_json() -> Result<PathBuf> {
    Ok(refswap()?.join("refswap.json"))
}
