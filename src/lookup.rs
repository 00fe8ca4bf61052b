//! Company registry lookup. Queries the public registry by tax id with a
//! bounded retry loop; a lookup that never succeeds degrades to a
//! `Failed` outcome instead of an error, so entity creation flows are
//! never blocked by the registry being down.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};
use utoipa::ToSchema;

pub const DEFAULT_BASE_URL: &str = "https://brasilapi.com.br/api/cnpj/v1";
const ATTEMPT_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_ATTEMPTS: u32 = 20;
const RETRY_DELAY: Duration = Duration::from_secs(1);

/// Normalizes a tax id to its 14 digits, rejecting anything else.
pub fn normalize_tax_id(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    let has_no_garbage = raw
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '/' | '-' | ' '));
    (digits.len() == 14 && has_no_garbage).then_some(digits)
}

/// Company data returned by the registry.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CompanyRecord {
    #[serde(rename(deserialize = "cnpj"))]
    pub tax_id: String,
    #[serde(rename(deserialize = "razao_social"))]
    pub legal_name: String,
    #[serde(rename(deserialize = "nome_fantasia"))]
    pub trade_name: Option<String>,
    #[serde(rename(deserialize = "logradouro"))]
    pub street: Option<String>,
    #[serde(rename(deserialize = "numero"))]
    pub number: Option<String>,
    #[serde(rename(deserialize = "municipio"))]
    pub city: Option<String>,
    #[serde(rename(deserialize = "uf"))]
    pub state: Option<String>,
    #[serde(rename(deserialize = "cep"))]
    pub postal_code: Option<String>,
    #[serde(rename(deserialize = "ddd_telefone_1"))]
    pub phone: Option<String>,
}

/// Outcome of a lookup. `Failed` means the registry could not be reached
/// within the retry budget, not that the company does not exist.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LookupOutcome {
    Found { company: CompanyRecord },
    NotFound,
    Failed { attempts: u32 },
}

#[derive(Clone, Debug)]
pub struct RegistryClient {
    http: reqwest::Client,
    base_url: String,
    max_attempts: u32,
    retry_delay: Duration,
}

impl RegistryClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_policy(base_url, MAX_ATTEMPTS, RETRY_DELAY)
    }

    /// Custom retry budget, used by tests to keep the loop short.
    pub fn with_policy(
        base_url: impl Into<String>,
        max_attempts: u32,
        retry_delay: Duration,
    ) -> Self {
        let http = reqwest::Client::builder()
            .timeout(ATTEMPT_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            http,
            base_url: base_url.into(),
            max_attempts: max_attempts.max(1),
            retry_delay,
        }
    }

    /// Looks up a normalized 14-digit tax id. Retries transient failures
    /// up to the attempt budget with a fixed delay between attempts; a
    /// definitive 404 from the registry short-circuits to `NotFound`.
    #[instrument(skip(self))]
    pub async fn lookup(&self, tax_id: &str) -> LookupOutcome {
        let url = format!("{}/{}", self.base_url, tax_id);
        for attempt in 1..=self.max_attempts {
            match self.http.get(&url).send().await {
                Ok(response) if response.status() == reqwest::StatusCode::NOT_FOUND => {
                    debug!(tax_id, "registry has no record");
                    return LookupOutcome::NotFound;
                }
                Ok(response) if response.status().is_success() => {
                    match response.json::<CompanyRecord>().await {
                        Ok(company) => {
                            debug!(tax_id, attempt, "registry lookup succeeded");
                            return LookupOutcome::Found { company };
                        }
                        Err(err) => {
                            warn!(tax_id, attempt, "registry returned unparseable body: {err}");
                        }
                    }
                }
                Ok(response) => {
                    warn!(
                        tax_id,
                        attempt,
                        status = %response.status(),
                        "registry returned an error status"
                    );
                }
                Err(err) => {
                    warn!(tax_id, attempt, "registry request failed: {err}");
                }
            }
            if attempt < self.max_attempts {
                tokio::time::sleep(self.retry_delay).await;
            }
        }
        warn!(tax_id, attempts = self.max_attempts, "registry lookup exhausted retries");
        LookupOutcome::Failed {
            attempts: self.max_attempts,
        }
    }
}
