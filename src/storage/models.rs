use serde::{Deserialize, Serialize};

/// A generated short code mapped to its original URL.
///
/// The serde field names double as the snapshot record format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shortlink {
    pub uid: String,
    pub owner_id: String,
    pub short: String,
    pub long: String,

    #[serde(default)]
    pub deleted: bool,

    #[serde(default)]
    pub correlation_id: Option<String>,
}

impl Shortlink {
    pub fn new(
        uid: impl Into<String>,
        owner_id: impl Into<String>,
        short: impl Into<String>,
        long: impl Into<String>,
    ) -> Self {
        Self {
            uid: uid.into(),
            owner_id: owner_id.into(),
            short: short.into(),
            long: long.into(),
            deleted: false,
            correlation_id: None,
        }
    }

    pub fn with_correlation_id(mut self, correlation_id: Option<String>) -> Self {
        self.correlation_id = correlation_id.filter(|c| !c.is_empty());
        self
    }
}

/// Result of persisting a single link.
///
/// A link whose long URL was already shortened is not an error: the
/// pre-existing mapping is handed back as `UrlConflict`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Inserted(Shortlink),
    UrlConflict(Shortlink),
}

impl SaveOutcome {
    pub fn link(&self) -> &Shortlink {
        match self {
            SaveOutcome::Inserted(link) | SaveOutcome::UrlConflict(link) => link,
        }
    }

    pub fn into_link(self) -> Shortlink {
        match self {
            SaveOutcome::Inserted(link) | SaveOutcome::UrlConflict(link) => link,
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, SaveOutcome::UrlConflict(_))
    }
}
