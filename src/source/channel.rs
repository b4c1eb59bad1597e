//! Chat channel source
//!
//! Reads channel history from a Slack-compatible `conversations.history`
//! endpoint, asking only for messages after the watermark.

use super::types::{CandidateSource, ChannelMessage, SourceKind};
use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::types::Watermark;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

/// Default API root
pub const DEFAULT_API_BASE_URL: &str = "https://slack.com/api";

/// Default messages requested per page
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Default page limit per evaluation
pub const DEFAULT_MAX_PAGES: u32 = 5;

const HISTORY_PATH: &str = "conversations.history";

/// One page of channel history
#[derive(Debug, Deserialize)]
struct HistoryPage {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    messages: Vec<RawMessage>,
    #[serde(default)]
    has_more: bool,
    #[serde(default)]
    response_metadata: Option<ResponseMetadata>,
}

#[derive(Debug, Deserialize)]
struct ResponseMetadata {
    #[serde(default)]
    next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    #[serde(default)]
    ts: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    user: Option<String>,
    #[serde(default)]
    thread_ts: Option<String>,
}

impl HistoryPage {
    fn next_cursor(&self) -> Option<&str> {
        self.response_metadata
            .as_ref()?
            .next_cursor
            .as_deref()
            .filter(|c| !c.is_empty())
    }
}

/// A watched chat channel
#[derive(Debug)]
pub struct ChannelSource {
    client: HttpClient,
    channel: String,
    page_size: u32,
    max_pages: u32,
}

impl ChannelSource {
    /// Watch `channel` through an authenticated client
    pub fn new(client: HttpClient, channel: impl Into<String>) -> Self {
        Self {
            client,
            channel: channel.into(),
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    /// Messages requested per page
    #[must_use]
    pub fn page_size(mut self, size: u32) -> Self {
        self.page_size = size.max(1);
        self
    }

    /// Pages fetched per evaluation; a longer backlog skips the evaluation
    #[must_use]
    pub fn max_pages(mut self, pages: u32) -> Self {
        self.max_pages = pages.max(1);
        self
    }

    /// The watched channel id
    pub fn channel(&self) -> &str {
        &self.channel
    }

    async fn fetch_page(&self, after: Watermark, cursor: Option<&str>) -> Result<HistoryPage> {
        let mut query = vec![
            ("channel", self.channel.clone()),
            ("oldest", after.to_cursor()),
            ("limit", self.page_size.to_string()),
        ];
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor.to_string()));
        }

        let page: HistoryPage = self.client.get_json(HISTORY_PATH, &query).await?;

        if !page.ok {
            let error = page.error.as_deref().unwrap_or("unknown_error");
            return Err(Error::remote_api(format!(
                "{HISTORY_PATH} failed for channel {}: {error}",
                self.channel
            )));
        }
        Ok(page)
    }

    fn convert(&self, raw: RawMessage) -> Option<ChannelMessage> {
        let Some(ts) = raw.ts else {
            warn!("Skipping message without ts in channel {}", self.channel);
            return None;
        };
        let Some(timestamp) = ts.parse::<f64>().ok().and_then(Watermark::new) else {
            warn!("Skipping message with malformed ts '{ts}' in channel {}", self.channel);
            return None;
        };

        Some(ChannelMessage {
            ts,
            timestamp,
            text: raw.text.unwrap_or_default(),
            user: raw.user,
            channel: self.channel.clone(),
            thread_ts: raw.thread_ts,
        })
    }
}

#[async_trait]
impl CandidateSource for ChannelSource {
    type Item = ChannelMessage;

    fn kind(&self) -> SourceKind {
        SourceKind::Channel
    }

    fn location(&self) -> String {
        self.channel.clone()
    }

    async fn fetch(&self, after: Watermark) -> Result<Vec<ChannelMessage>> {
        let mut messages = Vec::new();
        let mut cursor: Option<String> = None;

        for page_number in 1..=self.max_pages {
            let page = self.fetch_page(after, cursor.as_deref()).await?;
            debug!(
                "Channel {} page {page_number}: {} messages",
                self.channel,
                page.messages.len()
            );

            let next = page.next_cursor().map(ToString::to_string);
            let has_more = page.has_more;
            messages.extend(page.messages.into_iter().filter_map(|m| self.convert(m)));

            match next {
                Some(next) if has_more => cursor = Some(next),
                _ => return Ok(messages),
            }
        }

        // History is newest-first, so a partial read must not advance the cursor
        Err(Error::remote_api(format!(
            "Channel {} backlog exceeds {} pages of {} messages",
            self.channel, self.max_pages, self.page_size
        )))
    }
}
