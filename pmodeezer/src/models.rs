//! Typed records for gateway payloads.
//!
//! The gateway speaks in `SCREAMING_SNAKE_CASE` keys and sends most numbers
//! as strings. The records below type the fields the crate relies on and keep
//! everything else in a flattened `extra` map, so serializing a record gives
//! back the full payload.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Flexible deserializers: the gateway sends ids and counters as strings or numbers.
pub(crate) mod de {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    fn to_i64<E: Error>(value: &Value) -> Result<Option<i64>, E> {
        match value {
            Value::Null => Ok(None),
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f as i64))
                .map(Some)
                .ok_or_else(|| E::custom(format!("number out of range: {n}"))),
            Value::String(s) if s.is_empty() => Ok(None),
            Value::String(s) => s
                .parse::<i64>()
                .map(Some)
                .map_err(|_| E::custom(format!("not an integer: {s:?}"))),
            Value::Bool(b) => Ok(Some(i64::from(*b))),
            other => Err(E::custom(format!("expected an integer, got {other}"))),
        }
    }

    pub fn i64<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
        let value = Value::deserialize(d)?;
        Ok(to_i64(&value)?.unwrap_or(0))
    }

    pub fn opt_i64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
        let value = Value::deserialize(d)?;
        to_i64(&value)
    }

    pub fn u64<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
        let value = Value::deserialize(d)?;
        let n = to_i64(&value)?.unwrap_or(0);
        u64::try_from(n).map_err(|_| D::Error::custom(format!("negative value: {n}")))
    }

    pub fn opt_u64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u64>, D::Error> {
        let value = Value::deserialize(d)?;
        match to_i64(&value)? {
            Some(n) => u64::try_from(n)
                .map(Some)
                .map_err(|_| D::Error::custom(format!("negative value: {n}"))),
            None => Ok(None),
        }
    }

    pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        match Value::deserialize(d)? {
            Value::Null => Ok(String::new()),
            Value::String(s) => Ok(s),
            Value::Number(n) => Ok(n.to_string()),
            Value::Bool(b) => Ok(b.to_string()),
            other => Err(D::Error::custom(format!("expected a string, got {other}"))),
        }
    }

    pub fn opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        let s = string(d)?;
        Ok(if s.is_empty() { None } else { Some(s) })
    }

    pub fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        match Value::deserialize(d)? {
            Value::Bool(b) => Ok(b),
            other => Ok(to_i64::<D::Error>(&other)?.unwrap_or(0) != 0),
        }
    }
}

/// Reads an integer out of a loosely typed value (`"12"`, `12`, `null`)
pub(crate) fn value_i64(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

/// A track as returned by `song.getData`, `song.getListData` and the list endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct GwTrack {
    #[serde(default, deserialize_with = "de::i64")]
    pub sng_id: i64,
    #[serde(default, deserialize_with = "de::string")]
    pub sng_title: String,
    #[serde(default, deserialize_with = "de::u64")]
    pub duration: u64,
    #[serde(default, deserialize_with = "de::string")]
    pub md5_origin: String,
    #[serde(default, deserialize_with = "de::u64")]
    pub media_version: u64,
    #[serde(default, deserialize_with = "de::u64")]
    pub filesize: u64,
    #[serde(default, deserialize_with = "de::u64")]
    pub alb_id: u64,
    #[serde(default, deserialize_with = "de::string")]
    pub alb_title: String,
    #[serde(default, deserialize_with = "de::string")]
    pub alb_picture: String,
    #[serde(default, deserialize_with = "de::u64")]
    pub art_id: u64,
    #[serde(default, deserialize_with = "de::string")]
    pub art_name: String,
    /// Unix timestamp the track was added to a collection (favorites, playlist)
    #[serde(
        default,
        deserialize_with = "de::opt_i64",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_add: Option<i64>,
    /// Index of the track inside the list it was fetched from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lyrics: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album_fallback: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GwTrack {
    /// Placeholder standing in for an unknown (`0`) track id in batch lookups
    pub fn empty() -> Self {
        Self {
            sng_id: 0,
            sng_title: String::new(),
            duration: 0,
            md5_origin: String::new(),
            media_version: 0,
            filesize: 0,
            alb_id: 0,
            alb_title: String::new(),
            alb_picture: String::new(),
            art_id: 0,
            art_name: String::new(),
            date_add: None,
            position: None,
            lyrics: None,
            album_fallback: None,
            extra: Map::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sng_id == 0
    }
}

/// An album record (`album.getData`, discography entries, profile tabs)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct GwAlbum {
    #[serde(default, deserialize_with = "de::u64")]
    pub alb_id: u64,
    #[serde(default, deserialize_with = "de::string")]
    pub alb_title: String,
    #[serde(default, deserialize_with = "de::string")]
    pub alb_picture: String,
    #[serde(default, deserialize_with = "de::u64")]
    pub art_id: u64,
    #[serde(default, deserialize_with = "de::string")]
    pub art_name: String,
    /// Release type code (0 single, 1 album, 2 compile, 3 ep, 4 bundle)
    #[serde(default, deserialize_with = "de::u64")]
    pub r#type: u64,
    /// Role of the crawled artist on this release (0 main, 5 featured)
    #[serde(
        default,
        deserialize_with = "de::opt_u64",
        skip_serializing_if = "Option::is_none"
    )]
    pub role_id: Option<u64>,
    #[serde(default, deserialize_with = "de::flag")]
    pub artists_albums_is_official: bool,
    #[serde(
        default,
        deserialize_with = "de::opt_u64",
        skip_serializing_if = "Option::is_none"
    )]
    pub number_track: Option<u64>,
    #[serde(
        default,
        deserialize_with = "de::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub physical_release_date: Option<String>,
    #[serde(
        default,
        deserialize_with = "de::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub digital_release_date: Option<String>,
    #[serde(
        default,
        deserialize_with = "de::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub original_release_date: Option<String>,
    #[serde(
        default,
        deserialize_with = "de::opt_i64",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_favorite: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An artist record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct GwArtist {
    #[serde(default, deserialize_with = "de::u64")]
    pub art_id: u64,
    #[serde(default, deserialize_with = "de::string")]
    pub art_name: String,
    #[serde(default, deserialize_with = "de::string")]
    pub art_picture: String,
    #[serde(
        default,
        deserialize_with = "de::opt_u64",
        skip_serializing_if = "Option::is_none"
    )]
    pub nb_fan: Option<u64>,
    #[serde(
        default,
        deserialize_with = "de::opt_i64",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_favorite: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A playlist record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct GwPlaylist {
    #[serde(default, deserialize_with = "de::u64")]
    pub playlist_id: u64,
    #[serde(default, deserialize_with = "de::string")]
    pub title: String,
    #[serde(default, deserialize_with = "de::string")]
    pub description: String,
    #[serde(default, deserialize_with = "de::u64")]
    pub nb_song: u64,
    #[serde(default, deserialize_with = "de::string")]
    pub playlist_picture: String,
    #[serde(default, deserialize_with = "de::string")]
    pub picture_type: String,
    #[serde(default, deserialize_with = "de::u64")]
    pub parent_user_id: u64,
    #[serde(
        default,
        deserialize_with = "de::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub parent_username: Option<String>,
    #[serde(
        default,
        deserialize_with = "de::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_add: Option<String>,
    #[serde(
        default,
        deserialize_with = "de::opt_u64",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Paginated list wrapper (`{"data": [...], "count": .., "total": ..}`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListData<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(
        default,
        deserialize_with = "de::opt_u64",
        skip_serializing_if = "Option::is_none"
    )]
    pub count: Option<u64>,
    #[serde(
        default,
        deserialize_with = "de::opt_u64",
        skip_serializing_if = "Option::is_none"
    )]
    pub total: Option<u64>,
    #[serde(
        default,
        deserialize_with = "de::opt_u64",
        skip_serializing_if = "Option::is_none"
    )]
    pub filtered_count: Option<u64>,
}

/// Account information embedded in `deezer.getUserData` and profile pages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct GwUser {
    #[serde(default, deserialize_with = "de::u64")]
    pub user_id: u64,
    #[serde(
        default,
        deserialize_with = "de::opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub blog_name: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payload of the bootstrap call `deezer.getUserData`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserData {
    #[serde(rename = "USER")]
    pub user: GwUser,
    /// The API token handed out to this session
    #[serde(rename = "checkForm", default, skip_serializing_if = "Option::is_none")]
    pub check_form: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One entry of `song.getFavoriteIds`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct FavoriteEntry {
    #[serde(default, deserialize_with = "de::i64")]
    pub sng_id: i64,
    #[serde(
        default,
        deserialize_with = "de::opt_i64",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_add: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payload of `song.getFavoriteIds`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteIds {
    #[serde(default = "Vec::new")]
    pub data: Vec<FavoriteEntry>,
    #[serde(
        default,
        deserialize_with = "de::opt_u64",
        skip_serializing_if = "Option::is_none"
    )]
    pub total: Option<u64>,
    /// Pass back to `get_user_favorite_ids` to only fetch what changed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
}

/// Payload of `deezer.pageTrack`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct TrackPage {
    pub data: GwTrack,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lyrics: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isrc: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TrackPage {
    /// Folds the lyrics and ISRC sub-objects into the track record
    pub fn into_track(self) -> GwTrack {
        let mut track = self.data;
        if let Some(lyrics) = self.lyrics {
            track.lyrics = Some(lyrics);
        }
        if let Some(isrc) = self.isrc {
            track.album_fallback = Some(isrc);
        }
        track
    }
}

/// Payload of `deezer.pageAlbum` / `deezer.pagePlaylist`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct EntityPage<T> {
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub songs: Option<ListData<GwTrack>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

pub type AlbumPage = EntityPage<GwAlbum>;
pub type PlaylistPage = EntityPage<GwPlaylist>;

/// Payload of `deezer.pageArtist`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ArtistPage {
    pub data: GwArtist,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<ListData<GwTrack>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub albums: Option<ListData<GwAlbum>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `DATA` block of `deezer.pageProfile`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ProfileData {
    pub user: GwUser,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `TAB` block of `deezer.pageProfile`; only the requested tab is present
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileTabs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playlists: Option<ListData<GwPlaylist>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub albums: Option<ListData<GwAlbum>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artists: Option<ListData<GwArtist>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loved: Option<ListData<GwTrack>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payload of `deezer.pageProfile`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ProfilePage {
    pub data: ProfileData,
    #[serde(default)]
    pub tab: ProfileTabs,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payload of `deezer.pageSearch`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct SearchResults {
    #[serde(default, deserialize_with = "de::string")]
    pub query: String,
    #[serde(default)]
    pub top_result: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track: Option<ListData<GwTrack>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub album: Option<ListData<GwAlbum>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artist: Option<ListData<GwArtist>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playlist: Option<ListData<GwPlaylist>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Visibility of a playlist
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PlaylistStatus {
    #[default]
    Public,
    Private,
    Collaborative,
}

impl PlaylistStatus {
    /// Value sent in the `status` field
    pub fn code(self) -> u8 {
        match self {
            Self::Public => 0,
            Self::Private => 1,
            Self::Collaborative => 2,
        }
    }
}

/// Result type requested from `search.music` (`output` field)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    Track,
    Album,
    Artist,
    Playlist,
    Radio,
    Show,
    User,
    Livestream,
    Channel,
}

impl SearchKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Track => "TRACK",
            Self::Album => "ALBUM",
            Self::Artist => "ARTIST",
            Self::Playlist => "PLAYLIST",
            Self::Radio => "RADIO",
            Self::Show => "SHOW",
            Self::User => "USER",
            Self::Livestream => "LIVESTREAM",
            Self::Channel => "CHANNEL",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_track_accepts_string_numbers_and_keeps_extra_fields() {
        let track: GwTrack = serde_json::from_value(json!({
            "SNG_ID": "3135556",
            "SNG_TITLE": "Harder, Better, Faster, Stronger",
            "DURATION": "224",
            "ALB_ID": 302127,
            "ART_ID": "27",
            "ART_NAME": "Daft Punk",
            "ALB_PICTURE": null,
            "RANK_SNG": "910128",
            "__TYPE__": "song"
        }))
        .unwrap();

        assert_eq!(track.sng_id, 3135556);
        assert_eq!(track.duration, 224);
        assert_eq!(track.alb_id, 302127);
        assert_eq!(track.art_id, 27);
        assert_eq!(track.alb_picture, "");
        assert_eq!(track.extra.get("RANK_SNG"), Some(&json!("910128")));
        assert_eq!(track.extra.get("__TYPE__"), Some(&json!("song")));
        assert!(!track.is_empty());
    }

    #[test]
    fn test_user_uploaded_tracks_have_negative_ids() {
        let track: GwTrack = serde_json::from_value(json!({"SNG_ID": "-12345"})).unwrap();
        assert_eq!(track.sng_id, -12345);
    }

    #[test]
    fn test_empty_track_serializes_with_gateway_keys() {
        let value = serde_json::to_value(GwTrack::empty()).unwrap();
        assert_eq!(value["SNG_ID"], json!(0));
        assert_eq!(value["SNG_TITLE"], json!(""));
        assert_eq!(value["ART_NAME"], json!(""));
        assert!(value.get("POSITION").is_none());
        assert!(GwTrack::empty().is_empty());
    }

    #[test]
    fn test_album_official_flag_and_role() {
        let album: GwAlbum = serde_json::from_value(json!({
            "ALB_ID": "302127",
            "ALB_TITLE": "Discovery",
            "ART_ID": "27",
            "TYPE": "1",
            "ROLE_ID": 0,
            "ARTISTS_ALBUMS_IS_OFFICIAL": true
        }))
        .unwrap();
        assert_eq!(album.r#type, 1);
        assert_eq!(album.role_id, Some(0));
        assert!(album.artists_albums_is_official);

        let album: GwAlbum =
            serde_json::from_value(json!({"ALB_ID": 1, "ARTISTS_ALBUMS_IS_OFFICIAL": "0"}))
                .unwrap();
        assert!(!album.artists_albums_is_official);
        assert_eq!(album.role_id, None);
    }

    #[test]
    fn test_user_data_check_form() {
        let data: UserData = serde_json::from_value(json!({
            "USER": {"USER_ID": 0, "BLOG_NAME": ""},
            "checkForm": "abcdefghijklmnop",
            "COUNTRY": "FR"
        }))
        .unwrap();
        assert_eq!(data.check_form.as_deref(), Some("abcdefghijklmnop"));
        assert_eq!(data.user.user_id, 0);
        assert_eq!(data.user.blog_name, None);
        assert_eq!(data.extra.get("COUNTRY"), Some(&json!("FR")));
    }

    #[test]
    fn test_track_page_folds_lyrics_and_isrc() {
        let page: TrackPage = serde_json::from_value(json!({
            "DATA": {"SNG_ID": "42", "SNG_TITLE": "Track"},
            "LYRICS": {"LYRICS_TEXT": "la la"},
            "ISRC": {"data": []}
        }))
        .unwrap();
        let track = page.into_track();
        assert_eq!(track.sng_id, 42);
        assert_eq!(track.lyrics, Some(json!({"LYRICS_TEXT": "la la"})));
        assert_eq!(track.album_fallback, Some(json!({"data": []})));
    }

    #[test]
    fn test_list_data_defaults() {
        let list: ListData<GwTrack> = serde_json::from_value(json!({"total": "3"})).unwrap();
        assert!(list.data.is_empty());
        assert_eq!(list.total, Some(3));
        assert_eq!(list.count, None);
    }

    #[test]
    fn test_value_i64() {
        assert_eq!(value_i64(Some(&json!("17"))), Some(17));
        assert_eq!(value_i64(Some(&json!(17))), Some(17));
        assert_eq!(value_i64(Some(&json!(null))), None);
        assert_eq!(value_i64(None), None);
    }

    #[test]
    fn test_playlist_status_codes() {
        assert_eq!(PlaylistStatus::default().code(), 0);
        assert_eq!(PlaylistStatus::Private.code(), 1);
        assert_eq!(PlaylistStatus::Collaborative.code(), 2);
        assert_eq!(SearchKind::Album.as_str(), "ALBUM");
    }
}
