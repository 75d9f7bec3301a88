use anyhow::Context;
use std::sync::{Arc, Mutex};
use tonearm::{
    converter::FfmpegConverter,
    engines::{EngineRegistry, YoutubeEngine},
    player::{Player, RodioBackend},
    server, Database, MusicCache, PlaylistStore, Settings,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let settings = Settings::load();

    let log_path = settings.log_path();
    if let Some(dir) = log_path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let appender = tracing_appender::rolling::never(
        log_path.parent().unwrap_or_else(|| std::path::Path::new(".")),
        log_path
            .file_name()
            .unwrap_or_else(|| std::ffi::OsStr::new("tonearm.log")),
    );
    let (writer, _guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tonearm=info")),
        )
        .with_writer(writer)
        .with_ansi(false)
        .init();

    let db = Database::open(&settings.db_path())
        .with_context(|| format!("opening database at {}", settings.db_path().display()))?;
    let db = Arc::new(Mutex::new(db));
    let cache = MusicCache::new(Arc::clone(&db));
    let playlists = PlaylistStore::new(Arc::clone(&db));

    let converter = FfmpegConverter::new(&settings.ffmpeg_path, &settings.ffprobe_path)
        .context("ffmpeg/ffprobe are required")?;

    let mut engines = EngineRegistry::new();
    match YoutubeEngine::new(&settings.ytdlp_path) {
        Ok(engine) => engines.register(Arc::new(engine)),
        // The daemon is still useful for local files and the cache
        Err(e) => warn!("youtube engine disabled: {e}"),
    }

    let backend = RodioBackend::new().context("opening audio output")?;
    let player = Player::new(
        Box::new(backend),
        cache,
        playlists,
        engines,
        Arc::new(converter),
        settings.search_timeout(),
    );

    info!("tonearm daemon starting");
    server::serve(player, settings.server_port)?;

    Ok(())
}
