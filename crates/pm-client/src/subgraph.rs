//! Paginated GraphQL client for the condition subgraphs

use pm_core::{Error, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// A condition as indexed by the Activity subgraph
#[derive(Debug, Clone, Deserialize)]
pub struct ActivityCondition {
    pub id: String,
    #[serde(rename = "arweaveHash")]
    pub arweave_hash: Option<String>,
    pub creator: Option<String>,
    #[serde(rename = "creationTimestamp", default, deserialize_with = "de_opt_i64")]
    pub creation_timestamp: Option<i64>,
}

/// A condition as indexed by the PnL subgraph
#[derive(Debug, Clone, Deserialize)]
pub struct PnlCondition {
    pub id: String,
    pub oracle: Option<String>,
    #[serde(rename = "questionId")]
    pub question_id: Option<String>,
    #[serde(default)]
    pub resolved: bool,
    #[serde(rename = "creationTimestamp", default, deserialize_with = "de_opt_i64")]
    pub creation_timestamp: Option<i64>,
}

/// Subgraph BigInt values arrive as JSON strings; tolerate plain numbers too.
fn de_opt_i64<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Num(i64),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Str(s)) => s.parse::<i64>().map(Some).map_err(serde::de::Error::custom),
        Some(Raw::Num(n)) => Ok(Some(n)),
        None => Ok(None),
    }
}

trait ConditionRow {
    fn creation_timestamp(&self) -> Option<i64>;
}

impl ConditionRow for ActivityCondition {
    fn creation_timestamp(&self) -> Option<i64> {
        self.creation_timestamp
    }
}

impl ConditionRow for PnlCondition {
    fn creation_timestamp(&self) -> Option<i64> {
        self.creation_timestamp
    }
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<ConditionsData<T>>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct ConditionsData<T> {
    conditions: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

/// GraphQL client for one subgraph endpoint
pub struct SubgraphClient {
    client: Client,
    url: String,
    page_size: u32,
}

impl SubgraphClient {
    /// Create a new subgraph client
    pub fn new(url: impl Into<String>, timeout: Duration, page_size: u32) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("pm-client/0.1.0")
            .build()
            .map_err(|e| Error::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client, url: url.into(), page_size })
    }

    /// Fetch Activity-subgraph conditions created after `after`, until the
    /// last page or the deadline.
    #[instrument(skip(self, deadline))]
    pub async fn fetch_activity_conditions(
        &self,
        after: Option<i64>,
        deadline: Instant,
    ) -> Result<Vec<ActivityCondition>> {
        self.paginate("id arweaveHash creator creationTimestamp", after, deadline)
            .await
    }

    /// Fetch PnL-subgraph conditions created after `after`, until the last
    /// page or the deadline.
    #[instrument(skip(self, deadline))]
    pub async fn fetch_pnl_conditions(
        &self,
        after: Option<i64>,
        deadline: Instant,
    ) -> Result<Vec<PnlCondition>> {
        self.paginate("id oracle questionId resolved creationTimestamp", after, deadline)
            .await
    }

    /// Page through the `conditions` collection ascending by creation
    /// timestamp. Stops on an empty page, a short page, or the deadline; a
    /// deadline stop returns the pages collected so far (the caller resumes
    /// from durably committed state on the next invocation).
    async fn paginate<T>(
        &self,
        fields: &str,
        after: Option<i64>,
        deadline: Instant,
    ) -> Result<Vec<T>>
    where
        T: DeserializeOwned + ConditionRow,
    {
        let mut all = Vec::new();
        let mut cursor = after;

        loop {
            if Instant::now() >= deadline {
                info!(
                    "Deadline reached after {} conditions; returning partial results",
                    all.len()
                );
                break;
            }

            let query = build_conditions_query(fields, self.page_size, cursor);
            let page: Vec<T> = self.post_page(&query).await?;
            let page_len = page.len();
            debug!("Fetched page of {} conditions from {}", page_len, self.url);

            if page_len == 0 {
                break;
            }

            let next_cursor = page.last().and_then(|c| c.creation_timestamp());
            all.extend(page);

            if page_len < self.page_size as usize {
                break;
            }

            // A full page whose last timestamp equals the cursor (or is
            // missing) would repeat the same query forever.
            match next_cursor {
                Some(ts) if Some(ts) != cursor => cursor = Some(ts),
                _ => {
                    warn!(
                        "Cursor did not advance past {:?} on a full page from {}; stopping",
                        cursor, self.url
                    );
                    break;
                }
            }
        }

        Ok(all)
    }

    /// Issue one GraphQL POST. Any non-2xx status or GraphQL `errors` array
    /// aborts the whole fetch for this source.
    async fn post_page<T>(&self, query: &str) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(&self.url)
            .json(&serde_json::json!({ "query": query }))
            .send()
            .await
            .map_err(|e| Error::Http(format!("Subgraph request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Http(format!("Subgraph returned HTTP {}", status)));
        }

        let body: GraphQlResponse<T> = response
            .json()
            .await
            .map_err(|e| Error::InvalidResponse(format!("Failed to parse subgraph response: {}", e)))?;

        if let Some(errors) = body.errors {
            let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
            warn!("Subgraph {} returned GraphQL errors: {:?}", self.url, messages);
            return Err(Error::InvalidResponse(format!(
                "GraphQL errors: {}",
                messages.join("; ")
            )));
        }

        match body.data {
            Some(data) => Ok(data.conditions),
            None => Err(Error::InvalidResponse(
                "Subgraph response missing data.conditions".to_string(),
            )),
        }
    }
}

fn build_conditions_query(fields: &str, page_size: u32, after: Option<i64>) -> String {
    let filter = match after {
        Some(ts) => format!(", where: {{ creationTimestamp_gt: \"{}\" }}", ts),
        None => String::new(),
    };
    format!(
        "{{ conditions(first: {}, orderBy: creationTimestamp, orderDirection: asc{}) {{ {} }} }}",
        page_size, filter, fields
    )
}
