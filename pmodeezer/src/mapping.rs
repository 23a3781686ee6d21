//! Remapping of gateway records into the shapes of Deezer's public API.
//!
//! Gateway records use `SNG_ID`/`ALB_TITLE` style keys and bare picture
//! hashes; the records below use plain field names, links and full image
//! URLs.

use crate::models::{GwAlbum, GwArtist, GwPlaylist, GwTrack, value_i64};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

const SITE_URL: &str = "https://www.deezer.com";
const API_URL: &str = "https://api.deezer.com";
const IMAGE_URL: &str = "https://e-cdns-images.dzcdn.net/images";

/// Cover or picture URLs in the four standard sizes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artwork {
    pub small: String,
    pub medium: String,
    pub big: String,
    pub xl: String,
}

impl Artwork {
    /// `kind` is `cover`, `artist`, `playlist` or `user`; `None` for an empty hash
    pub fn new(kind: &str, md5: &str) -> Option<Self> {
        if md5.is_empty() {
            return None;
        }
        let url = |size: u32| format!("{IMAGE_URL}/{kind}/{md5}/{size}x{size}-000000-80-0-0.jpg");
        Some(Self {
            small: url(56),
            medium: url(250),
            big: url(500),
            xl: url(1000),
        })
    }
}

/// Release type of an album, from the gateway `TYPE` code
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordType {
    Single,
    Album,
    Compile,
    Ep,
    Bundle,
}

impl RecordType {
    /// Unknown codes are treated as albums
    pub fn from_code(code: u64) -> Self {
        match code {
            0 => Self::Single,
            2 => Self::Compile,
            3 => Self::Ep,
            4 => Self::Bundle,
            _ => Self::Album,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlbumRef {
    pub id: u64,
    pub title: String,
    pub link: String,
    pub cover: Option<Artwork>,
    pub md5_image: String,
    pub tracklist: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtistRef {
    pub id: u64,
    pub name: String,
    pub link: String,
    pub picture: Option<Artwork>,
    pub md5_image: String,
    pub tracklist: String,
}

impl ArtistRef {
    fn new(id: u64, name: &str, md5: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            link: format!("{SITE_URL}/artist/{id}"),
            picture: Artwork::new("artist", md5),
            md5_image: md5.to_string(),
            tracklist: format!("{API_URL}/artist/{id}/top?limit=50"),
        }
    }
}

/// A track in a user's collection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserTrack {
    pub id: i64,
    pub title: String,
    pub link: String,
    pub duration: u64,
    pub rank: Option<i64>,
    pub explicit_lyrics: bool,
    /// Unix timestamp the track was added
    pub time_add: Option<i64>,
    pub album: AlbumRef,
    pub artist: ArtistRef,
}

impl UserTrack {
    pub fn added_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.time_add?, 0)
    }
}

/// An album in a user's collection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserAlbum {
    pub id: u64,
    pub title: String,
    pub link: String,
    pub cover: Option<Artwork>,
    pub md5_image: String,
    pub tracklist: String,
    pub explicit_lyrics: bool,
    pub time_add: Option<i64>,
    pub artist: ArtistRef,
}

/// An artist followed by a user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserArtist {
    pub id: u64,
    pub name: String,
    pub link: String,
    pub picture: Option<Artwork>,
    pub md5_image: String,
    pub nb_fan: Option<u64>,
    pub tracklist: String,
    pub time_add: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Creator {
    pub id: u64,
    pub name: String,
}

/// A playlist owned or followed by a user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserPlaylist {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub nb_tracks: u64,
    pub link: String,
    pub picture: Option<Artwork>,
    pub md5_image: String,
    pub picture_type: String,
    pub tracklist: String,
    pub creation_date: Option<String>,
    pub creator: Creator,
}

/// A release in an artist's discography
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtistAlbum {
    pub id: u64,
    pub title: String,
    pub link: String,
    pub cover: Option<Artwork>,
    pub md5_image: String,
    pub genre_id: Option<i64>,
    pub release_date: Option<String>,
    pub digital_release_date: Option<String>,
    pub original_release_date: Option<String>,
    pub record_type: RecordType,
    pub tracklist: String,
    pub explicit_lyrics: bool,
    pub nb_tracks: Option<u64>,
    pub artist_role: Option<u64>,
    pub is_official: bool,
    pub artist: ArtistRef,
}

fn extra_str<'a>(extra: &'a Map<String, Value>, key: &str) -> &'a str {
    extra.get(key).and_then(Value::as_str).unwrap_or_default()
}

fn album_ref(id: u64, title: &str, md5: &str) -> AlbumRef {
    AlbumRef {
        id,
        title: title.to_string(),
        link: format!("{SITE_URL}/album/{id}"),
        cover: Artwork::new("cover", md5),
        md5_image: md5.to_string(),
        tracklist: format!("{API_URL}/album/{id}/tracks"),
    }
}

pub fn map_user_track(track: &GwTrack) -> UserTrack {
    UserTrack {
        id: track.sng_id,
        title: track.sng_title.clone(),
        link: format!("{SITE_URL}/track/{}", track.sng_id),
        duration: track.duration,
        rank: value_i64(track.extra.get("RANK_SNG")),
        explicit_lyrics: value_i64(track.extra.get("EXPLICIT_LYRICS")).unwrap_or(0) > 0,
        time_add: track.date_add,
        album: album_ref(track.alb_id, &track.alb_title, &track.alb_picture),
        artist: ArtistRef::new(
            track.art_id,
            &track.art_name,
            extra_str(&track.extra, "ART_PICTURE"),
        ),
    }
}

pub fn map_user_album(album: &GwAlbum) -> UserAlbum {
    let explicit = album
        .extra
        .get("EXPLICIT_ALBUM_CONTENT")
        .and_then(|content| value_i64(content.get("EXPLICIT_LYRICS_STATUS")))
        .unwrap_or(0);
    let album_ref = album_ref(album.alb_id, &album.alb_title, &album.alb_picture);
    UserAlbum {
        id: album.alb_id,
        title: album_ref.title,
        link: album_ref.link,
        cover: album_ref.cover,
        md5_image: album_ref.md5_image,
        tracklist: album_ref.tracklist,
        explicit_lyrics: explicit > 0,
        time_add: album.date_favorite,
        artist: ArtistRef::new(
            album.art_id,
            &album.art_name,
            extra_str(&album.extra, "ART_PICTURE"),
        ),
    }
}

pub fn map_user_artist(artist: &GwArtist) -> UserArtist {
    let artist_ref = ArtistRef::new(artist.art_id, &artist.art_name, &artist.art_picture);
    UserArtist {
        id: artist.art_id,
        name: artist_ref.name,
        link: artist_ref.link,
        picture: artist_ref.picture,
        md5_image: artist_ref.md5_image,
        nb_fan: artist.nb_fan,
        tracklist: artist_ref.tracklist,
        time_add: artist.date_favorite,
    }
}

/// `default_creator` names the owner when the record does not carry one
pub fn map_user_playlist(playlist: &GwPlaylist, default_creator: &str) -> UserPlaylist {
    let id = playlist.playlist_id;
    UserPlaylist {
        id,
        title: playlist.title.clone(),
        description: playlist.description.clone(),
        nb_tracks: playlist.nb_song,
        link: format!("{SITE_URL}/playlist/{id}"),
        picture: Artwork::new(
            if playlist.picture_type.is_empty() {
                "playlist"
            } else {
                playlist.picture_type.as_str()
            },
            &playlist.playlist_picture,
        ),
        md5_image: playlist.playlist_picture.clone(),
        picture_type: playlist.picture_type.clone(),
        tracklist: format!("{API_URL}/playlist/{id}/tracks"),
        creation_date: playlist.date_add.clone(),
        creator: Creator {
            id: playlist.parent_user_id,
            name: playlist
                .parent_username
                .clone()
                .unwrap_or_else(|| default_creator.to_string()),
        },
    }
}

pub fn map_artist_album(album: &GwAlbum) -> ArtistAlbum {
    let album_ref = album_ref(album.alb_id, &album.alb_title, &album.alb_picture);
    ArtistAlbum {
        id: album.alb_id,
        title: album_ref.title,
        link: album_ref.link,
        cover: album_ref.cover,
        md5_image: album_ref.md5_image,
        genre_id: value_i64(album.extra.get("GENRE_ID")),
        release_date: album.physical_release_date.clone(),
        digital_release_date: album.digital_release_date.clone(),
        original_release_date: album.original_release_date.clone(),
        record_type: RecordType::from_code(album.r#type),
        tracklist: album_ref.tracklist,
        explicit_lyrics: value_i64(album.extra.get("EXPLICIT_LYRICS")).unwrap_or(0) > 0,
        nb_tracks: album.number_track,
        artist_role: album.role_id,
        is_official: album.artists_albums_is_official,
        artist: ArtistRef::new(
            album.art_id,
            &album.art_name,
            extra_str(&album.extra, "ART_PICTURE"),
        ),
    }
}
