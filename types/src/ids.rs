use std::fmt;

use thiserror::Error;

#[derive(Debug, Error)]
#[error("identifier must not be empty")]
pub struct EmptyIdError;

/// Identifier of a browsing tab (regular or custom).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TabId(String);

impl TabId {
    pub fn new(id: impl Into<String>) -> Result<Self, EmptyIdError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(EmptyIdError);
        }
        Ok(Self(id))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TabId {
    type Error = EmptyIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TabId> for String {
    fn from(value: TabId) -> Self {
        value.0
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier of a prompt request within its tab's pending queue.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PromptUid(String);

impl PromptUid {
    pub fn new(uid: impl Into<String>) -> Result<Self, EmptyIdError> {
        let uid = uid.into();
        if uid.trim().is_empty() {
            return Err(EmptyIdError);
        }
        Ok(Self(uid))
    }

    /// Fresh random uid (UUID v4).
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for PromptUid {
    fn default() -> Self {
        Self::generate()
    }
}

impl TryFrom<String> for PromptUid {
    type Error = EmptyIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PromptUid> for String {
    fn from(value: PromptUid) -> Self {
        value.0
    }
}

impl fmt::Display for PromptUid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
