//! Single documentation page retrieval for the docs viewer.

use tokio_util::sync::CancellationToken;

use super::error::FetchResult;
use super::orchestrator::FetchOrchestrator;
use super::plan::join_url;
use crate::provider::AsyncHttpClient;

/// The metadata pages point at the raw data folder; on the portal that
/// content lives behind the download page instead.
const DATA_FOLDER_LINK: &str = "[here](/data_final).";
const DOWNLOAD_PAGE_LINK: &str = "[here](/download).";

/// Rewrite portal-relative links in a metadata page.
pub fn rewrite_doc_links(markdown: &str) -> String {
    markdown.replacen(DATA_FOLDER_LINK, DOWNLOAD_PAGE_LINK, 1)
}

/// URL of the markdown page for a documentation name such as `Access_Health`.
///
/// A trailing `.md` on `name` is accepted.
pub fn markdown_doc_url(docs_base_url: &str, name: &str) -> String {
    let stem = name.strip_suffix(".md").unwrap_or(name);
    join_url(docs_base_url, &format!("{}.md", stem))
}

impl<C: AsyncHttpClient> FetchOrchestrator<C> {
    /// Fetch one metadata page as text, with portal links rewritten.
    pub async fn fetch_markdown_doc(
        &self,
        docs_base_url: &str,
        name: &str,
        token: &CancellationToken,
    ) -> FetchResult<String> {
        let url = markdown_doc_url(docs_base_url, name);
        let body = self.fetch_url(&url, token).await?;
        Ok(rewrite_doc_links(&String::from_utf8_lossy(&body)))
    }
}
