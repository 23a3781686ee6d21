use super::{DEFAULT_SEARCH_LIMIT, DeezerGw};
use crate::error::Result;
use crate::models::{ListData, SearchKind, SearchResults};
use serde_json::{Value, json};

/// Version of the page layout requested from `page.get`
const PAGE_VERSION: &str = "2.3";

/// Options of [`DeezerGw::search`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchOptions {
    pub index: u32,
    pub limit: u32,
    pub suggest: bool,
    pub artist_suggest: bool,
    pub top_tracks: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            index: 0,
            limit: DEFAULT_SEARCH_LIMIT,
            suggest: true,
            artist_suggest: true,
            top_tracks: true,
        }
    }
}

impl DeezerGw {
    /// Editorial page (`home`, `channels/explore`...); the page name travels
    /// in the `gateway_input` query parameter
    pub async fn get_page(&self, page: &str) -> Result<Value> {
        let input = json!({
            "PAGE": page,
            "VERSION": PAGE_VERSION,
            "SUPPORT": {
                "grid": ["channel", "album"],
                "horizontal-grid": ["album"],
            },
            "LANG": self.config().lang,
        })
        .to_string();
        self.api_call("page.get", json!({}), &[("gateway_input", input.as_str())])
            .await
    }

    /// Mixed search over every entity type
    pub async fn search(&self, query: &str, options: SearchOptions) -> Result<SearchResults> {
        let args = json!({
            "query": query,
            "start": options.index,
            "nb": options.limit,
            "suggest": options.suggest,
            "artist_suggest": options.artist_suggest,
            "top_tracks": options.top_tracks,
        });
        self.call_as("deezer.pageSearch", args, &[]).await
    }

    /// Search restricted to one entity type
    pub async fn search_music(
        &self,
        query: &str,
        kind: SearchKind,
        index: u32,
        limit: u32,
    ) -> Result<ListData<Value>> {
        let args = json!({
            "query": query,
            "filter": "ALL",
            "output": kind.as_str(),
            "start": index,
            "nb": limit,
        });
        self.call_as("search.music", args, &[]).await
    }
}
