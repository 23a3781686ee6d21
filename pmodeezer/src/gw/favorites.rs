//! Adding and removing favorites.
//!
//! The gateway answers these with a bare `true` or an id; the raw payload
//! is passed through.

use super::DeezerGw;
use crate::error::Result;
use serde_json::{Value, json};

impl DeezerGw {
    pub async fn add_song_to_favorites(&self, sng_id: i64) -> Result<Value> {
        self.api_call("favorite_song.add", json!({ "SNG_ID": sng_id }), &[])
            .await
    }

    pub async fn remove_song_from_favorites(&self, sng_id: i64) -> Result<Value> {
        self.api_call("favorite_song.remove", json!({ "SNG_ID": sng_id }), &[])
            .await
    }

    pub async fn add_album_to_favorites(&self, alb_id: u64) -> Result<Value> {
        self.api_call("album.addFavorite", json!({ "ALB_ID": alb_id }), &[])
            .await
    }

    pub async fn remove_album_from_favorites(&self, alb_id: u64) -> Result<Value> {
        self.api_call("album.deleteFavorite", json!({ "ALB_ID": alb_id }), &[])
            .await
    }

    pub async fn add_artist_to_favorites(&self, art_id: u64) -> Result<Value> {
        self.api_call("artist.addFavorite", json!({ "ART_ID": art_id }), &[])
            .await
    }

    pub async fn remove_artist_from_favorites(&self, art_id: u64) -> Result<Value> {
        self.api_call("artist.deleteFavorite", json!({ "ART_ID": art_id }), &[])
            .await
    }

    /// Follows someone else's playlist
    pub async fn add_playlist_to_favorites(&self, playlist_id: u64) -> Result<Value> {
        self.api_call(
            "playlist.addFavorite",
            json!({ "PARENT_PLAYLIST_ID": playlist_id }),
            &[],
        )
        .await
    }

    pub async fn remove_playlist_from_favorites(&self, playlist_id: u64) -> Result<Value> {
        self.api_call(
            "playlist.deleteFavorite",
            json!({ "PLAYLIST_ID": playlist_id }),
            &[],
        )
        .await
    }
}
