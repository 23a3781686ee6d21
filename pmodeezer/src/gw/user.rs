//! Account, profile tabs and loved tracks.

use super::{BOOTSTRAP_METHOD, DeezerGw};
use crate::error::Result;
use crate::mapping::{
    UserAlbum, UserArtist, UserPlaylist, UserTrack, map_user_album, map_user_artist,
    map_user_playlist, map_user_track,
};
use crate::models::{FavoriteEntry, FavoriteIds, GwTrack, ProfilePage, UserData};
use serde_json::{Value, json};
use tracing::{debug, warn};

const UNKNOWN_CREATOR: &str = "Unknown";

/// Overlays favorite metadata onto the batch-fetched tracks.
///
/// Tracks are expected in favorite order; empty slots are skipped and each
/// track is matched against the favorites that follow the previous match.
pub(crate) fn merge_favorites(favorites: &[FavoriteEntry], tracks: Vec<GwTrack>) -> Vec<GwTrack> {
    let mut merged = Vec::with_capacity(tracks.len());
    let mut cursor = 0;

    for mut track in tracks {
        if track.is_empty() {
            continue;
        }
        let Some(offset) = favorites[cursor..]
            .iter()
            .position(|favorite| favorite.sng_id == track.sng_id)
        else {
            warn!("Track {} is not among the favorites, skipping", track.sng_id);
            continue;
        };
        let favorite = &favorites[cursor + offset];
        if favorite.date_add.is_some() {
            track.date_add = favorite.date_add;
        }
        track
            .extra
            .extend(favorite.extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged.push(track);
        cursor += offset + 1;
    }

    merged
}

impl DeezerGw {
    /// Account of the session owner; also hands out the API token
    pub async fn get_user_data(&self) -> Result<UserData> {
        self.call_as(BOOTSTRAP_METHOD, json!({}), &[]).await
    }

    /// One tab (`playlists`, `albums`, `artists`, `loved`...) of a profile page
    pub async fn get_user_profile_page(
        &self,
        user_id: u64,
        tab: &str,
        limit: u32,
    ) -> Result<ProfilePage> {
        self.call_as(
            "deezer.pageProfile",
            json!({ "USER_ID": user_id, "tab": tab, "nb": limit }),
            &[],
        )
        .await
    }

    /// Favorite track ids of the session owner.
    ///
    /// Passing the checksum of a previous answer only returns what changed.
    pub async fn get_user_favorite_ids(
        &self,
        checksum: Option<&str>,
        limit: u32,
        start: u32,
    ) -> Result<FavoriteIds> {
        self.call_as(
            "song.getFavoriteIds",
            json!({ "nb": limit, "start": start, "checksum": checksum }),
            &[],
        )
        .await
    }

    pub async fn get_child_accounts(&self) -> Result<Value> {
        self.api_call("deezer.getChildAccounts", json!({}), &[])
            .await
    }

    pub async fn get_user_playlists(&self, user_id: u64, limit: u32) -> Result<Vec<UserPlaylist>> {
        let page = self
            .get_user_profile_page(user_id, "playlists", limit)
            .await?;
        let creator = page
            .data
            .user
            .blog_name
            .as_deref()
            .unwrap_or(UNKNOWN_CREATOR);
        Ok(page
            .tab
            .playlists
            .map(|list| {
                list.data
                    .iter()
                    .map(|playlist| map_user_playlist(playlist, creator))
                    .collect()
            })
            .unwrap_or_default())
    }

    pub async fn get_user_albums(&self, user_id: u64, limit: u32) -> Result<Vec<UserAlbum>> {
        let page = self.get_user_profile_page(user_id, "albums", limit).await?;
        Ok(page
            .tab
            .albums
            .map(|list| list.data.iter().map(map_user_album).collect())
            .unwrap_or_default())
    }

    pub async fn get_user_artists(&self, user_id: u64, limit: u32) -> Result<Vec<UserArtist>> {
        let page = self.get_user_profile_page(user_id, "artists", limit).await?;
        Ok(page
            .tab
            .artists
            .map(|list| list.data.iter().map(map_user_artist).collect())
            .unwrap_or_default())
    }

    /// Loved tracks of a user; the session owner's come from the favorites list
    pub async fn get_user_tracks(&self, user_id: u64, limit: u32) -> Result<Vec<UserTrack>> {
        let me = self.get_user_data().await?;
        if me.user.user_id == user_id {
            return self.get_my_favorite_tracks(limit).await;
        }
        let page = self.get_user_profile_page(user_id, "loved", limit).await?;
        Ok(page
            .tab
            .loved
            .map(|list| list.data.iter().map(map_user_track).collect())
            .unwrap_or_default())
    }

    /// Favorite tracks of the session owner, with their favorite metadata
    pub async fn get_my_favorite_tracks(&self, limit: u32) -> Result<Vec<UserTrack>> {
        let favorites = self.get_user_favorite_ids(None, limit, 0).await?;
        if favorites.data.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i64> = favorites.data.iter().map(|f| f.sng_id).collect();
        let tracks = self.get_tracks(&ids).await?;
        let merged = merge_favorites(&favorites.data, tracks);
        debug!("{} of {} favorite tracks resolved", merged.len(), ids.len());
        Ok(merged.iter().map(map_user_track).collect())
    }
}
