//! Group-sequenced, bounded-concurrency fetch orchestration.
//!
//! Groups run strictly in order (docs, then data, then geometry). Inside a
//! group, up to `parallel` requests are in flight at once and results are
//! reassembled by request index, never by completion order. The first
//! failing request aborts the group; outstanding requests are dropped.

use std::time::Duration;

use bytes::Bytes;
use futures::stream::{self, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::error::{FetchError, FetchResult};
use super::plan::{
    data_requests, doc_requests, geometry_requests, parse_listing, DocLink, FetchRequest,
    FetchedResource, ResourceGroup,
};
use crate::manifest::Selection;
use crate::provider::AsyncHttpClient;

/// Default maximum number of concurrent requests per group.
pub const DEFAULT_PARALLEL: usize = 8;

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default delay before the first retry; later retries wait proportionally longer.
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// Callback receiving human-readable status after each group.
pub type StatusCallback<'a> = &'a (dyn Fn(String) + Send + Sync);

/// Tuning for the fetch orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchConfig {
    /// Maximum concurrent requests within a group (minimum 1).
    pub parallel: usize,
    /// Deadline for each individual request, retries included separately.
    pub timeout: Duration,
    /// Additional attempts after a retryable failure.
    pub max_retries: u32,
    /// Base delay between attempts.
    pub retry_backoff: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            parallel: DEFAULT_PARALLEL,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: 0,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
        }
    }
}

impl FetchConfig {
    pub fn with_parallel(mut self, parallel: usize) -> Self {
        self.parallel = parallel.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }
}

/// Where the remote resources live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSource {
    /// Prefix for dataset CSVs and geometry parts.
    pub base_url: String,
    /// Directory-listing endpoint for documentation files.
    pub docs_listing_url: String,
}

/// Everything retrieved for one session, grouped by archive folder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchedBundle {
    pub docs: Vec<FetchedResource>,
    pub data: Vec<FetchedResource>,
    pub geometry: Vec<FetchedResource>,
}

impl FetchedBundle {
    /// Total payload size across all groups.
    pub fn total_bytes(&self) -> u64 {
        [&self.docs, &self.data, &self.geometry]
            .iter()
            .flat_map(|group| group.iter())
            .map(|r| r.data.len() as u64)
            .sum()
    }

    pub fn file_count(&self) -> usize {
        self.docs.len() + self.data.len() + self.geometry.len()
    }
}

/// Status line shown once documentation is in.
pub fn docs_done_message(docs: usize, datasets: usize) -> String {
    format!(
        "Downloaded {} documentation files. Downloading {} CSV files...",
        docs, datasets
    )
}

/// Status line shown once CSV tables are in.
pub fn data_done_message(datasets: usize, geometries: usize) -> String {
    let noun = if geometries > 1 { "geometries" } else { "geometry" };
    format!(
        "Downloaded {} CSV files. Downloading {} {}...",
        datasets, geometries, noun
    )
}

/// Retrieves resources through an [`AsyncHttpClient`].
pub struct FetchOrchestrator<C: AsyncHttpClient> {
    client: C,
    config: FetchConfig,
}

impl<C: AsyncHttpClient> FetchOrchestrator<C> {
    pub fn new(client: C, config: FetchConfig) -> Self {
        let config = FetchConfig {
            parallel: config.parallel.max(1),
            ..config
        };
        Self { client, config }
    }

    /// Fetch and parse the documentation listing.
    pub async fn list_docs(
        &self,
        listing_url: &str,
        token: &CancellationToken,
    ) -> FetchResult<Vec<DocLink>> {
        let body = self.fetch_one(listing_url, token).await?;
        let links = parse_listing(listing_url, &body)?;
        if links.is_empty() {
            warn!(url = listing_url, "Documentation listing has no downloadable entries");
        }
        Ok(links)
    }

    /// Run docs, data and geometry groups in order.
    ///
    /// `on_status` is called after each group with the count retrieved and
    /// the count about to start.
    pub async fn fetch_all(
        &self,
        source: &RemoteSource,
        selection: &Selection,
        token: &CancellationToken,
        on_status: StatusCallback<'_>,
    ) -> FetchResult<FetchedBundle> {
        let links = self.list_docs(&source.docs_listing_url, token).await?;
        let docs = self
            .fetch_group(ResourceGroup::Docs, &doc_requests(&links), token)
            .await?;
        on_status(docs_done_message(docs.len(), selection.datasets.len()));

        let data = self
            .fetch_group(
                ResourceGroup::Data,
                &data_requests(&source.base_url, selection),
                token,
            )
            .await?;
        on_status(data_done_message(data.len(), selection.geometries.len()));

        let geometry = self
            .fetch_group(
                ResourceGroup::Geometry,
                &geometry_requests(&source.base_url, selection),
                token,
            )
            .await?;

        let bundle = FetchedBundle {
            docs,
            data,
            geometry,
        };
        info!(
            files = bundle.file_count(),
            bytes = bundle.total_bytes(),
            "All resource groups fetched"
        );
        Ok(bundle)
    }

    /// Fetch every request of one group; results follow request order.
    pub async fn fetch_group(
        &self,
        group: ResourceGroup,
        requests: &[FetchRequest],
        token: &CancellationToken,
    ) -> FetchResult<Vec<FetchedResource>> {
        debug!(%group, count = requests.len(), "Fetching group");

        let mut completed: Vec<(usize, Bytes)> = Vec::with_capacity(requests.len());
        let mut in_flight = stream::iter(requests.iter().enumerate())
            .map(|(index, request)| async move {
                (index, self.fetch_one(&request.url, token).await)
            })
            .buffer_unordered(self.config.parallel);

        while let Some((index, result)) = in_flight.next().await {
            match result {
                Ok(bytes) => completed.push((index, bytes)),
                Err(e) => {
                    warn!(%group, url = %requests[index].url, error = %e, "Fetch failed, aborting group");
                    return Err(e);
                }
            }
        }

        completed.sort_unstable_by_key(|(index, _)| *index);
        let resources = completed
            .into_iter()
            .map(|(index, data)| FetchedResource {
                name: requests[index].name.clone(),
                data,
            })
            .collect::<Vec<_>>();

        debug!(%group, count = resources.len(), "Group complete");
        Ok(resources)
    }

    /// Fetch a single URL outside of any group.
    pub async fn fetch_url(&self, url: &str, token: &CancellationToken) -> FetchResult<Bytes> {
        self.fetch_one(url, token).await
    }

    /// Fetch one URL with timeout, retries and cancellation.
    async fn fetch_one(&self, url: &str, token: &CancellationToken) -> FetchResult<Bytes> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;

            let outcome = tokio::select! {
                biased;
                _ = token.cancelled() => return Err(FetchError::Cancelled),
                r = tokio::time::timeout(self.config.timeout, self.client.get(url)) => r,
            };

            let error = match outcome {
                Ok(Ok(bytes)) => return Ok(bytes),
                Ok(Err(e)) => FetchError::Provider(e),
                Err(_) => FetchError::Timeout {
                    url: url.to_string(),
                    timeout_secs: self.config.timeout.as_secs(),
                },
            };

            if attempt > self.config.max_retries || !error.is_retryable() {
                return Err(error);
            }

            let backoff = self.config.retry_backoff * attempt;
            warn!(url, attempt, error = %error, ?backoff, "Retrying request");
            tokio::select! {
                biased;
                _ = token.cancelled() => return Err(FetchError::Cancelled),
                _ = tokio::time::sleep(backoff) => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facet::{FilterState, Scale, Year};
    use crate::manifest::{resolve, Manifest};
    use crate::provider::{MockAsyncHttpClient, ProviderError};
    use std::sync::Mutex;

    const BASE: &str = "https://host/data_final/";
    const LISTING: &str = "https://api/metadata";

    fn source() -> RemoteSource {
        RemoteSource {
            base_url: BASE.to_string(),
            docs_listing_url: LISTING.to_string(),
        }
    }

    fn state_latest() -> Selection {
        let mut filters = FilterState::new();
        filters.toggle_scale(Scale::State);
        filters.toggle_year(Year::Latest);
        resolve(&Manifest::builtin().unwrap(), &filters)
    }

    fn listing() -> &'static str {
        r#"[
            {"name": "README.md", "download_url": "https://host/README.md"},
            {"name": "sub", "download_url": null}
        ]"#
    }

    fn mock_for(selection: &Selection) -> MockAsyncHttpClient {
        let mut mock = MockAsyncHttpClient::new()
            .with_response(LISTING, listing())
            .with_response("https://host/README.md", "# docs");
        for r in data_requests(BASE, selection)
            .into_iter()
            .chain(geometry_requests(BASE, selection))
        {
            mock = mock.with_response(&r.url, r.name.clone());
        }
        mock
    }

    #[tokio::test]
    async fn test_fetch_all_groups_and_messages() {
        let selection = state_latest();
        let orchestrator = FetchOrchestrator::new(mock_for(&selection), FetchConfig::default());
        let messages = Mutex::new(Vec::new());
        let on_status = |m: String| messages.lock().unwrap().push(m);

        let bundle = orchestrator
            .fetch_all(&source(), &selection, &CancellationToken::new(), &on_status)
            .await
            .unwrap();

        assert_eq!(bundle.docs.len(), 1);
        assert_eq!(bundle.docs[0].name, "README.md");
        assert_eq!(bundle.data.len(), 1);
        assert_eq!(bundle.data[0].name, "S_Latest.csv");
        assert_eq!(bundle.geometry.len(), 5);
        assert_eq!(
            *messages.lock().unwrap(),
            vec![
                "Downloaded 1 documentation files. Downloading 1 CSV files...".to_string(),
                "Downloaded 1 CSV files. Downloading 1 geometry...".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_groups_are_sequenced() {
        let selection = state_latest();
        let mock = mock_for(&selection);
        let orchestrator = FetchOrchestrator::new(mock.clone(), FetchConfig::default());

        orchestrator
            .fetch_all(&source(), &selection, &CancellationToken::new(), &|_: String| {})
            .await
            .unwrap();

        let requests = mock.requests();
        let last_doc = requests.iter().rposition(|u| u.ends_with(".md")).unwrap();
        let first_csv = requests.iter().position(|u| u.ends_with(".csv")).unwrap();
        let last_csv = requests.iter().rposition(|u| u.ends_with(".csv")).unwrap();
        let first_geom = requests
            .iter()
            .position(|u| u.contains("geometryFiles"))
            .unwrap();
        assert_eq!(requests[0], LISTING);
        assert!(last_doc < first_csv);
        assert!(last_csv < first_geom);
    }

    #[tokio::test(start_paused = true)]
    async fn test_results_follow_request_order_not_completion_order() {
        let requests = vec![
            FetchRequest::new("slow.csv", "https://host/slow.csv"),
            FetchRequest::new("fast.csv", "https://host/fast.csv"),
        ];
        let mock = MockAsyncHttpClient::new()
            .with_response("https://host/slow.csv", "slow")
            .with_delay("https://host/slow.csv", Duration::from_millis(200))
            .with_response("https://host/fast.csv", "fast");
        let orchestrator = FetchOrchestrator::new(mock, FetchConfig::default());

        let fetched = orchestrator
            .fetch_group(ResourceGroup::Data, &requests, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(fetched[0].name, "slow.csv");
        assert_eq!(fetched[0].data, Bytes::from("slow"));
        assert_eq!(fetched[1].name, "fast.csv");
    }

    #[tokio::test(start_paused = true)]
    async fn test_parallelism_is_bounded() {
        let mut mock = MockAsyncHttpClient::new();
        let mut requests = Vec::new();
        for i in 0..20 {
            let url = format!("https://host/{}.csv", i);
            mock = mock
                .with_response(&url, "x")
                .with_delay(&url, Duration::from_millis(10));
            requests.push(FetchRequest::new(format!("{}.csv", i), url));
        }
        let orchestrator =
            FetchOrchestrator::new(mock.clone(), FetchConfig::default().with_parallel(3));

        let fetched = orchestrator
            .fetch_group(ResourceGroup::Data, &requests, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(fetched.len(), 20);
        assert!(mock.max_in_flight() <= 3);
    }

    #[tokio::test]
    async fn test_single_failure_aborts_group() {
        let requests = vec![
            FetchRequest::new("a.csv", "https://host/a.csv"),
            FetchRequest::new("b.csv", "https://host/b.csv"),
        ];
        let mock = MockAsyncHttpClient::new().with_response("https://host/a.csv", "a");
        let orchestrator = FetchOrchestrator::new(mock, FetchConfig::default());

        let err = orchestrator
            .fetch_group(ResourceGroup::Data, &requests, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            FetchError::Provider(ProviderError::Status { status: 404, .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_is_reported() {
        let requests = vec![FetchRequest::new("hung.csv", "https://host/hung.csv")];
        let mock = MockAsyncHttpClient::new()
            .with_response("https://host/hung.csv", "late")
            .with_delay("https://host/hung.csv", Duration::from_secs(3600));
        let config = FetchConfig::default().with_timeout(Duration::from_secs(5));
        let orchestrator = FetchOrchestrator::new(mock, config);

        let err = orchestrator
            .fetch_group(ResourceGroup::Data, &requests, &CancellationToken::new())
            .await
            .unwrap_err();

        match err {
            FetchError::Timeout { url, timeout_secs } => {
                assert_eq!(url, "https://host/hung.csv");
                assert_eq!(timeout_secs, 5);
            }
            other => panic!("Expected Timeout, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_stops_outstanding_requests() {
        let requests = vec![FetchRequest::new("hung.csv", "https://host/hung.csv")];
        let mock = MockAsyncHttpClient::new()
            .with_response("https://host/hung.csv", "late")
            .with_delay("https://host/hung.csv", Duration::from_secs(30));
        let orchestrator = FetchOrchestrator::new(mock, FetchConfig::default());
        let token = CancellationToken::new();

        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            canceller.cancel();
        });

        let err = orchestrator
            .fetch_group(ResourceGroup::Data, &requests, &token)
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Cancelled));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_transient_failures() {
        let requests = vec![FetchRequest::new("a.csv", "https://host/a.csv")];
        let mock = MockAsyncHttpClient::new()
            .with_response("https://host/a.csv", "a")
            .with_transient_failures("https://host/a.csv", 2);
        let orchestrator =
            FetchOrchestrator::new(mock.clone(), FetchConfig::default().with_max_retries(2));

        let fetched = orchestrator
            .fetch_group(ResourceGroup::Data, &requests, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(fetched[0].data, Bytes::from("a"));
        assert_eq!(mock.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_no_retry_by_default() {
        let requests = vec![FetchRequest::new("a.csv", "https://host/a.csv")];
        let mock = MockAsyncHttpClient::new()
            .with_response("https://host/a.csv", "a")
            .with_transient_failures("https://host/a.csv", 1);
        let orchestrator = FetchOrchestrator::new(mock.clone(), FetchConfig::default());

        assert!(orchestrator
            .fetch_group(ResourceGroup::Data, &requests, &CancellationToken::new())
            .await
            .is_err());
        assert_eq!(mock.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_selection_fetches_docs_only() {
        let mock = MockAsyncHttpClient::new()
            .with_response(LISTING, listing())
            .with_response("https://host/README.md", "# docs");
        let orchestrator = FetchOrchestrator::new(mock, FetchConfig::default());

        let bundle = orchestrator
            .fetch_all(
                &source(),
                &Selection::default(),
                &CancellationToken::new(),
                &|_: String| {},
            )
            .await
            .unwrap();

        assert_eq!(bundle.docs.len(), 1);
        assert!(bundle.data.is_empty());
        assert!(bundle.geometry.is_empty());
    }

    #[test]
    fn test_message_pluralisation() {
        assert_eq!(
            data_done_message(4, 3),
            "Downloaded 4 CSV files. Downloading 3 geometries..."
        );
        assert_eq!(
            data_done_message(0, 0),
            "Downloaded 0 CSV files. Downloading 0 geometry..."
        );
    }

    #[test]
    fn test_config_min_parallel() {
        let config = FetchConfig::default().with_parallel(0);
        assert_eq!(config.parallel, 1);
    }
}
