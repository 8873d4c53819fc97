//! Object identity: the `(fileID, guid)` pair a reference token points at.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Composite key naming a reference target.
///
/// `local_id` is the object's id inside its container file (the `fileID` field) and may be
/// zero or negative. `container_id` is the container's opaque token (the `guid` field),
/// compared byte-wise.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectIdentity {
    pub local_id: i64,
    pub container_id: String,
}

impl ObjectIdentity {
    pub fn new(local_id: i64, container_id: impl Into<String>) -> Self {
        Self {
            local_id,
            container_id: container_id.into(),
        }
    }

    /// Check that both fields can be written as literal token fields.
    pub fn validate(&self) -> Result<()> {
        if self.container_id.is_empty() {
            return Err(Error::identity_malformed(
                self.local_id,
                &self.container_id,
                "container id is empty",
            ));
        }
        if let Some(bad) = self
            .container_id
            .chars()
            .find(|c| !is_container_char(*c))
        {
            return Err(Error::identity_malformed(
                self.local_id,
                &self.container_id,
                format!("container id contains '{}'", bad),
            ));
        }
        Ok(())
    }
}

/// Alphabet of the container id field.
pub fn is_container_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
}

/// Renders as `<container_id>:<local_id>`.
impl fmt::Display for ObjectIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.container_id, self.local_id)
    }
}

impl FromStr for ObjectIdentity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (container_id, local_id) = s.trim().rsplit_once(':').ok_or_else(|| {
            Error::validation_invalid_argument(
                "identity",
                format!("Expected GUID:FILE_ID, got '{}'", s),
                None,
                None,
            )
        })?;

        let local_id = local_id.parse::<i64>().map_err(|e| {
            Error::validation_invalid_argument(
                "identity",
                format!("Invalid file id '{}': {}", local_id, e),
                None,
                None,
            )
        })?;

        let identity = ObjectIdentity::new(local_id, container_id);
        identity.validate()?;
        Ok(identity)
    }
}
