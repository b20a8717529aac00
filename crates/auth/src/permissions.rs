use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::grants::{self, GrantDefinition};

/// Permission grant name (e.g. `"read-account"`).
///
/// Grant names are opaque strings at this layer. Only names present in the
/// grant table produce rules; anything else is carried along but ignored by
/// the compiler. There is deliberately no catch-all name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The table entry for this grant, if the name is known.
    pub fn definition(&self) -> Option<&'static GrantDefinition> {
        grants::lookup(self.as_str())
    }

    pub fn is_known(&self) -> bool {
        self.definition().is_some()
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for Permission {
    fn from(value: &'static str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Permission {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}
