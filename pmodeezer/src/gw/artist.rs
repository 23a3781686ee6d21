//! Artist lookups and the discography crawl.

use super::DeezerGw;
use super::track::with_positions;
use crate::error::Result;
use crate::mapping::{ArtistAlbum, RecordType, map_artist_album};
use crate::models::{ArtistPage, GwAlbum, GwArtist, GwTrack, ListData};
use serde::Serialize;
use serde_json::json;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

/// Role of the crawled artist on a release they lead
const ROLE_MAIN: u64 = 0;
/// Role of the crawled artist on a release they only appear on
const ROLE_FEATURED: u64 = 5;

/// An artist's releases grouped by role and record type.
///
/// `all` holds the official releases and the "more" releases, in crawl
/// order. Official releases are also filed under their record type, which
/// serializes as a top-level key (`album`, `single`, `ep`...).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DiscographyTabs {
    pub all: Vec<ArtistAlbum>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub featured: Vec<ArtistAlbum>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub more: Vec<ArtistAlbum>,
    #[serde(flatten)]
    pub by_type: BTreeMap<RecordType, Vec<ArtistAlbum>>,
}

impl DiscographyTabs {
    /// Official releases of one record type
    pub fn of_type(&self, record_type: RecordType) -> &[ArtistAlbum] {
        self.by_type
            .get(&record_type)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Buckets `releases` for `art_id`, keeping the first occurrence of each album
    pub(crate) fn classify(art_id: u64, releases: impl IntoIterator<Item = GwAlbum>) -> Self {
        let mut tabs = Self::default();
        let mut seen = HashSet::new();

        for release in releases {
            if !seen.insert(release.alb_id) {
                continue;
            }
            let album = map_artist_album(&release);
            let leads = release.art_id == art_id || release.role_id == Some(ROLE_MAIN);

            if leads && release.artists_albums_is_official {
                tabs.by_type
                    .entry(album.record_type)
                    .or_default()
                    .push(album.clone());
                tabs.all.push(album);
            } else if release.role_id == Some(ROLE_FEATURED) {
                tabs.featured.push(album);
            } else if release.role_id == Some(ROLE_MAIN) {
                tabs.more.push(album.clone());
                tabs.all.push(album);
            }
        }

        tabs
    }
}

impl DeezerGw {
    pub async fn get_artist(&self, art_id: u64) -> Result<GwArtist> {
        self.call_as("artist.getData", json!({ "ART_ID": art_id }), &[])
            .await
    }

    pub async fn get_artist_page(&self, art_id: u64) -> Result<ArtistPage> {
        let args = json!({
            "ART_ID": art_id,
            "lang": self.config().lang,
            "header": true,
            "tab": 0,
        });
        self.call_as("deezer.pageArtist", args, &[]).await
    }

    pub async fn get_artist_top_tracks(&self, art_id: u64, limit: u32) -> Result<Vec<GwTrack>> {
        let body: ListData<GwTrack> = self
            .call_as("artist.getTopTrack", json!({ "ART_ID": art_id, "nb": limit }), &[])
            .await?;
        Ok(with_positions(body.data))
    }

    /// One page of an artist's discography
    pub async fn get_artist_discography(
        &self,
        art_id: u64,
        index: u32,
        limit: u32,
    ) -> Result<ListData<GwAlbum>> {
        let args = json!({
            "ART_ID": art_id,
            "discography_mode": "all",
            "nb": limit,
            "nb_songs": 0,
            "start": index,
        });
        self.call_as("album.getDiscography", args, &[]).await
    }

    /// Crawls the whole discography in pages of `page_size` and buckets it.
    ///
    /// Issues `ceil(total / page_size)` requests (at least one), stopping
    /// once the reported total is covered.
    pub async fn get_artist_discography_tabs(
        &self,
        art_id: u64,
        page_size: u32,
    ) -> Result<DiscographyTabs> {
        let page_size = page_size.max(1);
        let mut releases = Vec::new();
        let mut index = 0u32;

        loop {
            let page = self
                .get_artist_discography(art_id, index, page_size)
                .await?;
            let total = page.total.unwrap_or(0);
            releases.extend(page.data);
            index = index.saturating_add(page_size);
            if u64::from(index) >= total {
                break;
            }
        }

        debug!("Crawled {} releases for artist {}", releases.len(), art_id);
        Ok(DiscographyTabs::classify(art_id, releases))
    }
}
