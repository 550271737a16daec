use async_trait::async_trait;
use gp_api_types::{GifEntry, ListState, WalletAddress};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ProgramError {
    #[error("gif account for {owner} does not exist")]
    AccountNotFound { owner: String },
    #[error("gif account for {owner} is already initialized")]
    AlreadyInitialized { owner: String },
    #[error("gif program rejected the request: {0}")]
    Rejected(String),
    #[error("gif program transport failure: {0}")]
    Transport(String),
}

pub type ProgramResult<T> = Result<T, ProgramError>;

/// On-chain gif program boundary. The program itself is an opaque external
/// collaborator; this trait is the whole of what the portal relies on.
#[async_trait]
pub trait GifProgram: Send + Sync {
    /// `Ok(None)` means the account was never initialized. An initialized
    /// account with no entries is `Ok(Some(vec![]))` — the two are never
    /// conflated.
    async fn fetch_account(&self, owner: &WalletAddress) -> ProgramResult<Option<Vec<GifEntry>>>;

    /// One-time creation of the backing account. A second call fails with
    /// `AlreadyInitialized`; it never silently double-allocates.
    async fn initialize(&self, owner: &WalletAddress) -> ProgramResult<()>;

    /// Appends one entry and returns the updated list. The signature is the
    /// wallet's approval artifact and is treated as opaque.
    async fn append_gif(
        &self,
        owner: &WalletAddress,
        entry: GifEntry,
        signature: &[u8],
    ) -> ProgramResult<Vec<GifEntry>>;
}

#[async_trait]
impl<P: GifProgram + ?Sized> GifProgram for Box<P> {
    async fn fetch_account(&self, owner: &WalletAddress) -> ProgramResult<Option<Vec<GifEntry>>> {
        (**self).fetch_account(owner).await
    }

    async fn initialize(&self, owner: &WalletAddress) -> ProgramResult<()> {
        (**self).initialize(owner).await
    }

    async fn append_gif(
        &self,
        owner: &WalletAddress,
        entry: GifEntry,
        signature: &[u8],
    ) -> ProgramResult<Vec<GifEntry>> {
        (**self).append_gif(owner, entry, signature).await
    }
}

/// Wraps a program with the portal's account policies: the uninitialized /
/// empty / populated mapping and idempotent user-facing initialization.
pub struct AccountGateway<P> {
    program: P,
}

impl<P: GifProgram> AccountGateway<P> {
    pub fn new(program: P) -> Self {
        Self { program }
    }

    pub fn program(&self) -> &P {
        &self.program
    }

    pub async fn fetch_list(&self, owner: &WalletAddress) -> ProgramResult<ListState> {
        match self.program.fetch_account(owner).await? {
            Some(entries) => Ok(ListState::from_entries(entries)),
            None => {
                debug!("no gif account for {}", owner.0);
                Ok(ListState::Uninitialized)
            }
        }
    }

    /// Creates the account and returns its fresh state. A repeat call is a
    /// no-op refresh: the program-level conflict stays explicit, the
    /// user-facing operation stays idempotent.
    pub async fn initialize_account(&self, owner: &WalletAddress) -> ProgramResult<ListState> {
        match self.program.initialize(owner).await {
            Ok(()) => debug!("initialized gif account for {}", owner.0),
            Err(ProgramError::AlreadyInitialized { .. }) => {
                warn!("gif account for {} already initialized; refreshing", owner.0);
            }
            Err(err) => return Err(err),
        }

        self.fetch_list(owner).await
    }

    pub async fn append_entry(
        &self,
        owner: &WalletAddress,
        entry: GifEntry,
        signature: &[u8],
    ) -> ProgramResult<ListState> {
        let entries = self.program.append_gif(owner, entry, signature).await?;
        Ok(ListState::from_entries(entries))
    }
}

/// Starter list served before an account-backed deployment is wired up.
pub const FIXTURE_GIFS: [&str; 4] = [
    "https://media.giphy.com/media/VIPdgcooFJHtC/giphy.gif",
    "https://media.giphy.com/media/xTiIzJSKB4l7xTouE8/giphy.gif",
    "https://media.giphy.com/media/26BRuo6sLetdllPAQ/giphy.gif",
    "https://media.giphy.com/media/l0MYt5jPR6QX5pnqM/giphy.gif",
];

/// Single-process stand-in for the chain program. The write lock serializes
/// account mutations.
#[derive(Default)]
pub struct InMemoryGifProgram {
    accounts: RwLock<HashMap<String, Vec<GifEntry>>>,
}

impl InMemoryGifProgram {
    pub fn new() -> Self {
        Self::default()
    }

    /// An already-initialized account holding the starter list.
    pub fn with_fixture(owner: &WalletAddress) -> Self {
        let entries = FIXTURE_GIFS.iter().map(|link| GifEntry::new(*link)).collect();
        let mut accounts = HashMap::new();
        accounts.insert(owner.0.clone(), entries);
        Self {
            accounts: RwLock::new(accounts),
        }
    }
}

#[async_trait]
impl GifProgram for InMemoryGifProgram {
    async fn fetch_account(&self, owner: &WalletAddress) -> ProgramResult<Option<Vec<GifEntry>>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.get(&owner.0).cloned())
    }

    async fn initialize(&self, owner: &WalletAddress) -> ProgramResult<()> {
        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&owner.0) {
            return Err(ProgramError::AlreadyInitialized {
                owner: owner.0.clone(),
            });
        }

        accounts.insert(owner.0.clone(), Vec::new());
        Ok(())
    }

    async fn append_gif(
        &self,
        owner: &WalletAddress,
        entry: GifEntry,
        _signature: &[u8],
    ) -> ProgramResult<Vec<GifEntry>> {
        let mut accounts = self.accounts.write().await;
        let Some(entries) = accounts.get_mut(&owner.0) else {
            return Err(ProgramError::AccountNotFound {
                owner: owner.0.clone(),
            });
        };

        entries.push(entry);
        Ok(entries.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> WalletAddress {
        WalletAddress::new("wallet-1")
    }

    #[tokio::test]
    async fn missing_account_maps_to_uninitialized() {
        let gateway = AccountGateway::new(InMemoryGifProgram::new());

        let state = gateway.fetch_list(&owner()).await.expect("fetch");

        assert_eq!(state, ListState::Uninitialized);
    }

    #[tokio::test]
    async fn initialized_account_is_empty_not_uninitialized() {
        let gateway = AccountGateway::new(InMemoryGifProgram::new());

        let state = gateway.initialize_account(&owner()).await.expect("init");

        assert_eq!(state, ListState::Empty);
    }

    #[tokio::test]
    async fn appends_preserve_input_order_and_permit_duplicates() {
        let gateway = AccountGateway::new(InMemoryGifProgram::new());
        gateway.initialize_account(&owner()).await.expect("init");

        gateway
            .append_entry(&owner(), GifEntry::new("https://x/y.gif"), b"sig")
            .await
            .expect("first append");
        let state = gateway
            .append_entry(&owner(), GifEntry::new("https://x/y.gif"), b"sig")
            .await
            .expect("second append");

        let links: Vec<&str> = state.entries().iter().map(|e| e.link.as_str()).collect();
        assert_eq!(links, vec!["https://x/y.gif", "https://x/y.gif"]);
    }

    #[tokio::test]
    async fn program_rejects_a_second_initialize() {
        let program = InMemoryGifProgram::new();
        program.initialize(&owner()).await.expect("first init");

        let err = program.initialize(&owner()).await.expect_err("conflict");

        assert!(matches!(err, ProgramError::AlreadyInitialized { .. }));
    }

    #[tokio::test]
    async fn gateway_treats_repeat_initialize_as_refresh() {
        let gateway = AccountGateway::new(InMemoryGifProgram::new());
        gateway.initialize_account(&owner()).await.expect("init");
        gateway
            .append_entry(&owner(), GifEntry::new("https://x/y.gif"), b"sig")
            .await
            .expect("append");

        let state = gateway
            .initialize_account(&owner())
            .await
            .expect("repeat init is a refresh");

        assert_eq!(state.len(), 1);
    }

    #[tokio::test]
    async fn append_to_missing_account_is_not_found() {
        let program = InMemoryGifProgram::new();

        let err = program
            .append_gif(&owner(), GifEntry::new("https://x/y.gif"), b"sig")
            .await
            .expect_err("no account");

        assert!(matches!(err, ProgramError::AccountNotFound { .. }));
    }

    #[tokio::test]
    async fn fixture_account_starts_populated() {
        let gateway = AccountGateway::new(InMemoryGifProgram::with_fixture(&owner()));

        let state = gateway.fetch_list(&owner()).await.expect("fetch");

        assert_eq!(state.len(), FIXTURE_GIFS.len());
        assert!(!state.is_uninitialized());
    }
}
