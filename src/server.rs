use crate::{
    domain::SearchResult,
    error::Result,
    player::{Player, Status},
};
use serde::{Deserialize, Serialize};
use std::{
    io::{BufRead, BufReader, Write},
    net::{TcpListener, TcpStream},
    thread,
};
use tracing::{debug, info, warn};

/// One control request, a JSON object per line. The surface mirrors
/// the player exactly; no request carries playback state of its own.
#[derive(Debug, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Request {
    Play,
    Pause,
    Resume,
    Stop,
    Next,
    Prev,
    Seek { delta_secs: i64 },
    Volume { percent: u8 },
    Remove { target: String },
    DetectAndPlay { token: String },
    DetectAndAddToPlaylist { playlist: String, token: String },
    Status,
    CreatePlaylist { name: String },
    RemovePlaylist { name: String },
    PlaylistNames,
    PlaylistTracks { name: String },
    PlaylistPlayTrack { playlist: String, target: String },
    PlaylistPlayAll { name: String },
    RemoveTrackFromPlaylist { playlist: String, target: String },
    CleanCache,
}

#[derive(Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Response {
    Ok,
    Status(Status),
    Candidates { results: Vec<SearchResult> },
    Names { names: Vec<String> },
    Cleaned { removed: usize },
    Error { message: String },
}

impl Response {
    fn from_unit(outcome: Result<()>) -> Self {
        match outcome {
            Ok(()) => Response::Ok,
            Err(e) => Response::Error {
                message: e.to_string(),
            },
        }
    }

    fn from_names(outcome: Result<Vec<String>>) -> Self {
        match outcome {
            Ok(names) => Response::Names { names },
            Err(e) => Response::Error {
                message: e.to_string(),
            },
        }
    }

    fn from_candidates(outcome: Result<Vec<SearchResult>>) -> Self {
        match outcome {
            Ok(results) => Response::Candidates { results },
            Err(e) => Response::Error {
                message: e.to_string(),
            },
        }
    }
}

/// Serve the player on a localhost port until the process dies. Every
/// connection gets its own thread; a broken client costs nothing but
/// that thread.
pub fn serve(player: Player, port: u16) -> Result<()> {
    let listener = TcpListener::bind(("127.0.0.1", port))?;
    info!("control server listening on 127.0.0.1:{port}");
    serve_on(listener, player)
}

pub(crate) fn serve_on(listener: TcpListener, player: Player) -> Result<()> {
    for stream in listener.incoming() {
        match stream {
            Ok(stream) => {
                let player = player.clone();
                thread::spawn(move || {
                    if let Err(e) = handle_client(stream, player) {
                        debug!("client connection ended: {e}");
                    }
                });
            }
            Err(e) => warn!("failed to accept connection: {e}"),
        }
    }
    Ok(())
}

fn handle_client(stream: TcpStream, player: Player) -> std::io::Result<()> {
    let reader = BufReader::new(stream.try_clone()?);
    let mut writer = stream;

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Request>(&line) {
            Ok(request) => dispatch(&player, request),
            Err(e) => Response::Error {
                message: format!("bad request: {e}"),
            },
        };

        let mut payload = serde_json::to_string(&response).expect("responses always serialize");
        payload.push('\n');
        writer.write_all(payload.as_bytes())?;
    }

    Ok(())
}

fn dispatch(player: &Player, request: Request) -> Response {
    match request {
        Request::Play => Response::from_unit(player.play()),
        Request::Pause => {
            player.pause();
            Response::Ok
        }
        Request::Resume => {
            player.resume();
            Response::Ok
        }
        Request::Stop => {
            player.stop();
            Response::Ok
        }
        Request::Next => {
            player.next();
            Response::Ok
        }
        Request::Prev => {
            player.prev();
            Response::Ok
        }
        Request::Seek { delta_secs } => Response::from_unit(player.seek(delta_secs)),
        Request::Volume { percent } => Response::from_unit(player.set_volume(percent)),
        Request::Remove { target } => Response::from_unit(player.remove(&target)),
        Request::DetectAndPlay { token } => {
            Response::from_candidates(player.detect_and_play(&token))
        }
        Request::DetectAndAddToPlaylist { playlist, token } => {
            Response::from_candidates(player.detect_and_add_to_playlist(&playlist, &token))
        }
        Request::Status => Response::Status(player.status()),
        Request::CreatePlaylist { name } => Response::from_unit(player.create_playlist(&name)),
        Request::RemovePlaylist { name } => Response::from_unit(player.remove_playlist(&name)),
        Request::PlaylistNames => Response::from_names(player.playlist_names()),
        Request::PlaylistTracks { name } => Response::from_names(player.playlist_track_names(&name)),
        Request::PlaylistPlayTrack { playlist, target } => {
            Response::from_unit(player.playlist_play_track(&playlist, &target))
        }
        Request::PlaylistPlayAll { name } => Response::from_unit(player.playlist_play_all(&name)),
        Request::RemoveTrackFromPlaylist { playlist, target } => {
            Response::from_unit(player.remove_track_from_playlist(&playlist, &target))
        }
        Request::CleanCache => match player.clean_cache() {
            Ok(removed) => Response::Cleaned { removed },
            Err(e) => Response::Error {
                message: e.to_string(),
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::testing::test_player;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpStream;

    #[test]
    fn requests_parse_from_json_lines() {
        let req: Request = serde_json::from_str(r#"{"cmd": "seek", "delta_secs": -10}"#).unwrap();
        assert!(matches!(req, Request::Seek { delta_secs: -10 }));

        let req: Request =
            serde_json::from_str(r#"{"cmd": "detect_and_play", "token": "some song"}"#).unwrap();
        assert!(matches!(req, Request::DetectAndPlay { .. }));

        assert!(serde_json::from_str::<Request>(r#"{"cmd": "no_such"}"#).is_err());
    }

    #[test]
    fn round_trip_over_a_socket() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let player = test_player();
        let _server = thread::spawn(move || serve_on(listener, player));

        let stream = TcpStream::connect(addr).unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut writer = stream;

        writer.write_all(b"{\"cmd\": \"status\"}\n").unwrap();
        let mut line = String::new();
        reader.read_line(&mut line).unwrap();

        let response: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(response["result"], "status");
        assert_eq!(response["state"], "stopped");
        assert_eq!(response["volume"], 100);

        // Unknown commands answer an error without dropping the
        // connection
        writer.write_all(b"{\"cmd\": \"bogus\"}\n").unwrap();
        line.clear();
        reader.read_line(&mut line).unwrap();
        let response: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(response["result"], "error");

        writer
            .write_all(b"{\"cmd\": \"create_playlist\", \"name\": \"mix\"}\n")
            .unwrap();
        line.clear();
        reader.read_line(&mut line).unwrap();
        let response: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(response["result"], "ok");
    }
}
