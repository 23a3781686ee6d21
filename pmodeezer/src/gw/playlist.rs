use super::DeezerGw;
use super::track::with_positions;
use crate::error::Result;
use crate::models::{GwTrack, ListData, PlaylistPage, PlaylistStatus};
use serde_json::{Value, json};

/// Offset that appends songs at the end of a playlist
pub const APPEND_OFFSET: i32 = -1;

/// Song list in the `[[id, 0], ...]` form the playlist methods expect
fn song_pairs(songs: &[i64]) -> Value {
    songs.iter().map(|&id| json!([id, 0])).collect()
}

impl DeezerGw {
    pub async fn get_playlist(&self, playlist_id: u64) -> Result<PlaylistPage> {
        self.get_playlist_page(playlist_id).await
    }

    pub async fn get_playlist_page(&self, playlist_id: u64) -> Result<PlaylistPage> {
        let args = json!({
            "PLAYLIST_ID": playlist_id,
            "lang": self.config().lang,
            "header": true,
            "tab": 0,
        });
        self.call_as("deezer.pagePlaylist", args, &[]).await
    }

    /// Every song of a playlist, numbered through `POSITION`
    pub async fn get_playlist_tracks(&self, playlist_id: u64) -> Result<Vec<GwTrack>> {
        let body: ListData<GwTrack> = self
            .call_as(
                "playlist.getSongs",
                json!({ "PLAYLIST_ID": playlist_id, "nb": -1 }),
                &[],
            )
            .await?;
        Ok(with_positions(body.data))
    }

    /// Returns the id of the new playlist
    pub async fn create_playlist(
        &self,
        title: &str,
        status: PlaylistStatus,
        description: &str,
        songs: &[i64],
    ) -> Result<Value> {
        let args = json!({
            "title": title,
            "status": status.code(),
            "description": description,
            "songs": song_pairs(songs),
        });
        self.api_call("playlist.create", args, &[]).await
    }

    pub async fn edit_playlist(
        &self,
        playlist_id: u64,
        title: &str,
        status: PlaylistStatus,
        description: &str,
        songs: &[i64],
    ) -> Result<Value> {
        let args = json!({
            "PLAYLIST_ID": playlist_id,
            "title": title,
            "status": status.code(),
            "description": description,
            "songs": song_pairs(songs),
        });
        self.api_call("playlist.update", args, &[]).await
    }

    /// Inserts `songs` at `offset` ([`APPEND_OFFSET`] to add them at the end)
    pub async fn add_songs_to_playlist(
        &self,
        playlist_id: u64,
        songs: &[i64],
        offset: i32,
    ) -> Result<Value> {
        let args = json!({
            "PLAYLIST_ID": playlist_id,
            "songs": song_pairs(songs),
            "offset": offset,
        });
        self.api_call("playlist.addSongs", args, &[]).await
    }

    pub async fn add_song_to_playlist(
        &self,
        playlist_id: u64,
        sng_id: i64,
        offset: i32,
    ) -> Result<Value> {
        self.add_songs_to_playlist(playlist_id, &[sng_id], offset)
            .await
    }

    pub async fn remove_songs_from_playlist(
        &self,
        playlist_id: u64,
        songs: &[i64],
    ) -> Result<Value> {
        let args = json!({
            "PLAYLIST_ID": playlist_id,
            "songs": song_pairs(songs),
        });
        self.api_call("playlist.deleteSongs", args, &[]).await
    }

    pub async fn remove_song_from_playlist(&self, playlist_id: u64, sng_id: i64) -> Result<Value> {
        self.remove_songs_from_playlist(playlist_id, &[sng_id])
            .await
    }

    pub async fn delete_playlist(&self, playlist_id: u64) -> Result<Value> {
        self.api_call("playlist.delete", json!({ "PLAYLIST_ID": playlist_id }), &[])
            .await
    }
}
