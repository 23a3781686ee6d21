//! Example: Crawl an artist's discography through the Deezer gateway
//!
//! Run with: DEEZER_ARL=... cargo run -p pmodeezer --example discography
//! Or with a specific artist: cargo run -p pmodeezer --example discography -- 27
//!
//! Settings are read from `deezer.yaml` in the working directory when present.

use pmodeezer::{DEFAULT_DISCOGRAPHY_LIMIT, DeezerGw, GwConfig, RecordType, Session};
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let art_id: u64 = env::args()
        .nth(1)
        .map(|arg| arg.parse())
        .transpose()?
        .unwrap_or(27);

    let session = Session::default();
    if let Ok(arl) = env::var("DEEZER_ARL") {
        let url = "https://www.deezer.com".parse()?;
        session
            .cookies()
            .add_cookie_str(&format!("arl={arl}; Domain=.deezer.com"), &url);
    }

    let gw = DeezerGw::builder()
        .session(session)
        .config(GwConfig::load("deezer.yaml")?)
        .build()?;

    let me = gw.get_user_data().await?;
    println!("Logged in as user {}", me.user.user_id);

    let artist = gw.get_artist(art_id).await?;
    println!("Discography of {}\n", artist.art_name);

    let tabs = gw
        .get_artist_discography_tabs(art_id, DEFAULT_DISCOGRAPHY_LIMIT)
        .await?;

    for record_type in [
        RecordType::Album,
        RecordType::Ep,
        RecordType::Single,
        RecordType::Compile,
        RecordType::Bundle,
    ] {
        let albums = tabs.of_type(record_type);
        if albums.is_empty() {
            continue;
        }
        println!("{:?} ({})", record_type, albums.len());
        for album in albums {
            println!(
                "  {} [{}]",
                album.title,
                album.release_date.as_deref().unwrap_or("unknown date")
            );
        }
    }

    println!("\nFeatured on {} releases", tabs.featured.len());
    println!("{} more releases", tabs.more.len());

    Ok(())
}
