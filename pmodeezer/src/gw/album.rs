use super::DeezerGw;
use super::track::with_positions;
use crate::error::Result;
use crate::models::{AlbumPage, GwAlbum, GwTrack, ListData};
use serde_json::json;

impl DeezerGw {
    pub async fn get_album(&self, alb_id: u64) -> Result<GwAlbum> {
        self.call_as("album.getData", json!({ "ALB_ID": alb_id }), &[])
            .await
    }

    pub async fn get_album_page(&self, alb_id: u64) -> Result<AlbumPage> {
        let args = json!({
            "ALB_ID": alb_id,
            "lang": self.config().lang,
            "header": true,
            "tab": 0,
        });
        self.call_as("deezer.pageAlbum", args, &[]).await
    }

    /// Album tracks in disc order, numbered through `POSITION`
    pub async fn get_album_tracks(&self, alb_id: u64) -> Result<Vec<GwTrack>> {
        let body: ListData<GwTrack> = self
            .call_as("song.getListByAlbum", json!({ "ALB_ID": alb_id, "nb": -1 }), &[])
            .await?;
        Ok(with_positions(body.data))
    }
}
