use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct WalletAddress(pub String);

impl WalletAddress {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }
}

/// One submitted link record in the displayed list. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GifEntry {
    pub link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitter: Option<WalletAddress>,
}

impl GifEntry {
    pub fn new(link: impl Into<String>) -> Self {
        Self {
            link: link.into(),
            submitter: None,
        }
    }

    pub fn submitted_by(link: impl Into<String>, submitter: WalletAddress) -> Self {
        Self {
            link: link.into(),
            submitter: Some(submitter),
        }
    }
}

/// The persisted list as the portal sees it.
///
/// `Uninitialized` means the backing account does not exist yet and the user
/// must be routed to the initialize action. `Empty` means the account exists
/// with no entries. A `Populated` value always holds at least one entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ListState {
    Uninitialized,
    Empty,
    Populated { entries: Vec<GifEntry> },
}

impl ListState {
    /// Normalizes a fetched entry vector: an empty account is `Empty`, never
    /// `Populated` with zero entries.
    pub fn from_entries(entries: Vec<GifEntry>) -> Self {
        if entries.is_empty() {
            Self::Empty
        } else {
            Self::Populated { entries }
        }
    }

    pub fn is_uninitialized(&self) -> bool {
        matches!(self, Self::Uninitialized)
    }

    pub fn entries(&self) -> &[GifEntry] {
        match self {
            Self::Populated { entries } => entries,
            _ => &[],
        }
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

impl Default for ListState {
    fn default() -> Self {
        Self::Uninitialized
    }
}

// ── Devnet gif-program wire types ──

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GifAccountResponse {
    pub owner: String,
    #[serde(rename = "gifList")]
    pub gif_list: Vec<GifEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InitializeRequest {
    pub owner: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppendGifRequest {
    pub owner: String,
    pub link: String,
    pub signature: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgramErrorResponse {
    pub error: String,
}
