//! Track lookups: single, page, lyrics and batch.

use super::DeezerGw;
use crate::error::Result;
use crate::models::{GwTrack, ListData, TrackPage};
use serde_json::{Value, json};
use tracing::debug;

/// Lines batch results up with the requested ids.
///
/// A `0` id gets the empty placeholder without consuming a result; every
/// other id takes the next result in order. Missing results also become
/// placeholders, so the output always has one entry per id.
pub(crate) fn place_batch(ids: &[i64], batch: Vec<GwTrack>) -> Vec<GwTrack> {
    let mut batch = batch.into_iter();
    ids.iter()
        .map(|&id| {
            if id == 0 {
                return GwTrack::empty();
            }
            batch.next().unwrap_or_else(|| {
                debug!("No batch result left for track {}", id);
                GwTrack::empty()
            })
        })
        .collect()
}

/// Numbers tracks by their index in the list they came from
pub(crate) fn with_positions(tracks: Vec<GwTrack>) -> Vec<GwTrack> {
    tracks
        .into_iter()
        .enumerate()
        .map(|(position, mut track)| {
            track.position = Some(position);
            track
        })
        .collect()
}

impl DeezerGw {
    pub async fn get_track(&self, sng_id: i64) -> Result<GwTrack> {
        self.call_as("song.getData", json!({ "SNG_ID": sng_id }), &[])
            .await
    }

    pub async fn get_track_page(&self, sng_id: i64) -> Result<TrackPage> {
        self.call_as("deezer.pageTrack", json!({ "SNG_ID": sng_id }), &[])
            .await
    }

    pub async fn get_track_lyrics(&self, sng_id: i64) -> Result<Value> {
        self.api_call("song.getLyrics", json!({ "SNG_ID": sng_id }), &[])
            .await
    }

    /// Batch lookup through `song.getListData`.
    ///
    /// The output has exactly one entry per id, in the same order; `0` ids
    /// map to [`GwTrack::empty`].
    pub async fn get_tracks(&self, sng_ids: &[i64]) -> Result<Vec<GwTrack>> {
        if sng_ids.is_empty() {
            return Ok(Vec::new());
        }
        let body: ListData<GwTrack> = self
            .call_as("song.getListData", json!({ "SNG_IDS": sng_ids }), &[])
            .await?;
        Ok(place_batch(sng_ids, body.data))
    }

    /// Track data from the track page (with lyrics and ISRC folded in),
    /// or from `song.getData` when the page is unavailable.
    pub async fn get_track_with_fallback(&self, sng_id: i64) -> Result<GwTrack> {
        if sng_id > 0 {
            match self.get_track_page(sng_id).await {
                Ok(page) => return Ok(page.into_track()),
                Err(e) => debug!("Track page {} unavailable ({}), using song.getData", sng_id, e),
            }
        }
        self.get_track(sng_id).await
    }
}
