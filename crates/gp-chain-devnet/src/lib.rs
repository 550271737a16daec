use async_trait::async_trait;
use gp_api_types::{
    AppendGifRequest, GifAccountResponse, GifEntry, InitializeRequest, ProgramErrorResponse,
    WalletAddress,
};
use gp_chain_client::{GifProgram, ProgramError, ProgramResult};
use tracing::debug;

pub const GIF_PROGRAM_URL_ENV: &str = "GIF_PROGRAM_URL";

/// HTTP adapter for a devnet gif-program endpoint.
///
/// Reads `GIF_PROGRAM_URL` from the environment at construction time
/// (default: `http://localhost:8899`).
pub struct HttpGifProgram {
    endpoint: String,
    http: reqwest::Client,
}

impl Default for HttpGifProgram {
    fn default() -> Self {
        Self::new(None)
    }
}

impl HttpGifProgram {
    pub fn new(endpoint: Option<String>) -> Self {
        let endpoint = endpoint
            .or_else(|| std::env::var(GIF_PROGRAM_URL_ENV).ok())
            .unwrap_or_else(|| "http://localhost:8899".to_string());
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl GifProgram for HttpGifProgram {
    async fn fetch_account(&self, owner: &WalletAddress) -> ProgramResult<Option<Vec<GifEntry>>> {
        let url = format!("{}/account/{}", self.endpoint, owner.0);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|err| ProgramError::Transport(format!("fetch account: {err}")))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            debug!("no gif account for {} at {}", owner.0, self.endpoint);
            return Ok(None);
        }

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(rejection(status, &text, "fetch account"));
        }

        let body: GifAccountResponse = response
            .json()
            .await
            .map_err(|err| ProgramError::Transport(format!("fetch account parse: {err}")))?;

        Ok(Some(body.gif_list))
    }

    async fn initialize(&self, owner: &WalletAddress) -> ProgramResult<()> {
        let url = format!("{}/account", self.endpoint);
        let body = InitializeRequest {
            owner: owner.0.clone(),
        };

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|err| ProgramError::Transport(format!("initialize: {err}")))?;

        let status = response.status();
        if status == reqwest::StatusCode::CONFLICT {
            return Err(ProgramError::AlreadyInitialized {
                owner: owner.0.clone(),
            });
        }

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(rejection(status, &text, "initialize"));
        }

        Ok(())
    }

    async fn append_gif(
        &self,
        owner: &WalletAddress,
        entry: GifEntry,
        signature: &[u8],
    ) -> ProgramResult<Vec<GifEntry>> {
        let url = format!("{}/account/{}/gifs", self.endpoint, owner.0);
        let body = AppendGifRequest {
            owner: owner.0.clone(),
            link: entry.link,
            signature: to_hex(signature),
        };

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|err| ProgramError::Transport(format!("append gif: {err}")))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ProgramError::AccountNotFound {
                owner: owner.0.clone(),
            });
        }

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(rejection(status, &text, "append gif"));
        }

        let body: GifAccountResponse = response
            .json()
            .await
            .map_err(|err| ProgramError::Transport(format!("append gif parse: {err}")))?;

        Ok(body.gif_list)
    }
}

fn rejection(status: reqwest::StatusCode, text: &str, op: &str) -> ProgramError {
    if let Ok(err) = serde_json::from_str::<ProgramErrorResponse>(text) {
        return ProgramError::Rejected(err.error);
    }

    ProgramError::Transport(format!("{op} HTTP {status}: {text}"))
}

fn to_hex(input: &[u8]) -> String {
    let mut output = String::with_capacity(input.len() * 2);
    for byte in input {
        output.push_str(&format!("{byte:02x}"));
    }
    output
}
