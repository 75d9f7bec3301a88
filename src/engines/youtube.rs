use crate::{
    domain::SearchResult,
    engines::SourceEngine,
    error::{Error, Result},
    parse_clock_duration,
};
use std::{
    fs,
    process::{Command, Stdio},
    time::Duration,
};
use tracing::{debug, info};

const ENGINE_NAME: &str = "youtube";
const WATCH_URL: &str = "https://www.youtube.com/watch?v=";

/// Catalog adapter over yt-dlp. Chosen over a web API client because
/// yt-dlp needs no API key for searching.
pub struct YoutubeEngine {
    ytdlp: String,
}

impl YoutubeEngine {
    pub fn new(ytdlp: &str) -> Result<Self> {
        Command::new(ytdlp)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| Error::engine(ENGINE_NAME, format!("{ytdlp} not found: {e}")))?;

        Ok(YoutubeEngine {
            ytdlp: ytdlp.to_string(),
        })
    }

    fn run(&self, args: &[&str]) -> Result<String> {
        debug!("running {} {}", self.ytdlp, args.join(" "));
        let output = Command::new(&self.ytdlp)
            .args(args)
            .output()
            .map_err(|e| Error::engine(ENGINE_NAME, e))?;

        if !output.status.success() {
            return Err(Error::engine(
                ENGINE_NAME,
                String::from_utf8_lossy(&output.stderr).trim(),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl SourceEngine for YoutubeEngine {
    fn name(&self) -> &str {
        ENGINE_NAME
    }

    fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        let target = format!("ytsearch{max_results}:{query}");
        let out = self.run(&[
            "--get-id",
            "--get-title",
            "--get-duration",
            "--skip-download",
            "--flat-playlist",
            &target,
        ])?;

        Ok(parse_search_output(&out))
    }

    fn download(&self, id: &str) -> Result<(Vec<u8>, String)> {
        let title = self.run(&["--get-title", id])?.trim().to_string();
        info!("downloading {title} from {id}");

        // yt-dlp refuses to overwrite, so hand it a path that does not
        // exist yet inside a directory we throw away afterwards.
        let scratch = tempfile::tempdir()?;
        let outfile = scratch.path().join("download.mp3");
        let outfile_str = outfile.to_string_lossy().into_owned();

        self.run(&[
            "--extract-audio",
            "--audio-format",
            "mp3",
            "--no-warning",
            "--output",
            &outfile_str,
            id,
        ])?;

        let data = fs::read(&outfile)?;
        info!("downloaded {title} ({} bytes)", data.len());

        Ok((data, title))
    }

    fn exists(&self, id: &str) -> Result<bool> {
        // --ies all,-generic rejects tokens only the generic extractor
        // would accept, i.e. things that are not really catalog ids
        let probe = Command::new(&self.ytdlp)
            .args(["--ies", "all,-generic", id, "--skip-download"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| Error::engine(ENGINE_NAME, e))?;

        Ok(probe.success())
    }
}

/// yt-dlp prints each hit as a title line, an id line, and a duration
/// line. Incomplete trailing groups are dropped.
fn parse_search_output(out: &str) -> Vec<SearchResult> {
    let lines: Vec<&str> = out.lines().collect();

    lines
        .chunks_exact(3)
        .filter_map(|entry| {
            let (title, id, clock) = (entry[0], entry[1], entry[2]);
            let duration = parse_clock_duration(clock).unwrap_or(Duration::ZERO);
            match title.is_empty() || id.is_empty() {
                true => None,
                false => Some(SearchResult::new(
                    title,
                    format!("{WATCH_URL}{id}"),
                    ENGINE_NAME,
                    duration,
                )),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_title_id_duration_triplets() {
        let out = "First Song\nabc123\n3:25\nSecond: With Colon\ndef456\n1:02:03\n";
        let results = parse_search_output(out);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "First Song");
        assert_eq!(results[0].destination, format!("{WATCH_URL}abc123"));
        assert_eq!(results[0].duration_secs, 205);
        assert_eq!(results[1].title, "Second: With Colon");
        assert_eq!(results[1].duration_secs, 3723);
    }

    #[test]
    fn tolerates_truncated_output() {
        assert!(parse_search_output("").is_empty());
        assert!(parse_search_output("only a title\nand an id\n").is_empty());
    }
}
