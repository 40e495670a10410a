//! Audio/video capture.
//!
//! Uploads are written verbatim under the recordings directory with names
//! derived from the local time at one-second resolution; two uploads within
//! the same second overwrite each other. Audio messages additionally go
//! through two optional external tools (ffmpeg, a speech-to-text command)
//! whose failures only degrade the stored metadata.

use chrono::NaiveDateTime;
use log::{info, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::process::Command;

use crate::audio;
use crate::config::MediaConfig;
use crate::outcome::Outcome;

pub const VIDEO_SUBDIR: &str = "videos";
pub const AUDIO_SUBDIR: &str = "audio";

/// `<prefix>_YYYYmmddHHMMSS.webm`
pub fn timestamped_name(prefix: &str, now: NaiveDateTime) -> String {
    format!("{}_{}.webm", prefix, now.format("%Y%m%d%H%M%S"))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoEntry {
    pub url: String,
    pub name: String,
}

/// Write a video blob and return its file name
pub async fn store_video(recordings_dir: &Path, data: &[u8], now: NaiveDateTime) -> std::io::Result<String> {
    let dir = recordings_dir.join(VIDEO_SUBDIR);
    tokio::fs::create_dir_all(&dir).await?;
    let filename = timestamped_name("video", now);
    tokio::fs::write(dir.join(&filename), data).await?;
    info!("Stored video {} ({} bytes)", filename, data.len());
    Ok(filename)
}

/// Recorded videos, newest first
///
/// Names embed the timestamp, so reverse lexicographic order is reverse
/// chronological order. A missing directory lists as empty.
pub async fn list_videos(recordings_dir: &Path) -> std::io::Result<Vec<VideoEntry>> {
    let dir = recordings_dir.join(VIDEO_SUBDIR);
    let mut entries = match tokio::fs::read_dir(&dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().to_string();
        if name.ends_with(".webm") {
            names.push(name);
        }
    }
    names.sort_unstable_by(|a, b| b.cmp(a));

    Ok(names
        .into_iter()
        .map(|name| VideoEntry {
            url: format!("/recordings/{}/{}", VIDEO_SUBDIR, name),
            name,
        })
        .collect())
}

/// Convert an uploaded container to WAV with ffmpeg
pub async fn transcode_to_wav(command: Option<&[String]>, input: &Path) -> Outcome<PathBuf> {
    let Some((program, args)) = command.and_then(|c| c.split_first()) else {
        return Outcome::Degraded("transcoding disabled".to_string());
    };
    let output = input.with_extension("wav");

    let result = Command::new(program)
        .args(args)
        .arg("-y")
        .arg("-loglevel")
        .arg("error")
        .arg("-i")
        .arg(input)
        .arg(&output)
        .output()
        .await;

    match result {
        Ok(out) if out.status.success() && output.exists() => Outcome::Ok(output),
        Ok(out) => Outcome::Degraded(format!(
            "{} exited with {}: {}",
            program,
            out.status,
            String::from_utf8_lossy(&out.stderr).trim()
        )),
        Err(e) => Outcome::Degraded(format!("failed to run {}: {}", program, e)),
    }
}

/// Run the configured speech-to-text command over a WAV file
///
/// The WAV path is appended as the last argument; trimmed stdout is the text.
pub async fn transcribe(command: Option<&[String]>, wav: &Path) -> Outcome<String> {
    let Some((program, args)) = command.and_then(|c| c.split_first()) else {
        return Outcome::Degraded("transcription disabled".to_string());
    };

    let result = Command::new(program).args(args).arg(wav).output().await;

    match result {
        Ok(out) if out.status.success() => {
            Outcome::Ok(String::from_utf8_lossy(&out.stdout).trim().to_string())
        }
        Ok(out) => Outcome::Degraded(format!("{} exited with {}", program, out.status)),
        Err(e) => Outcome::Degraded(format!("failed to run {}: {}", program, e)),
    }
}

/// Metadata of a stored audio message
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapturedMessage {
    pub filename: String,
    pub length: f64,
    pub transcription: String,
}

/// Store an audio message and derive its length and transcription
///
/// Only the file write can fail the request; transcoding, duration and
/// transcription fall back to `0` / `""`.
pub async fn capture_message(
    media: &MediaConfig,
    recordings_dir: &Path,
    data: &[u8],
    now: NaiveDateTime,
) -> std::io::Result<CapturedMessage> {
    let dir = recordings_dir.join(AUDIO_SUBDIR);
    tokio::fs::create_dir_all(&dir).await?;
    let filename = timestamped_name("recording", now);
    let path = dir.join(&filename);
    tokio::fs::write(&path, data).await?;

    let wav = match transcode_to_wav(media.transcoder.as_deref(), &path).await {
        Outcome::Ok(wav) => Some(wav),
        Outcome::Degraded(reason) => {
            warn!("Transcoding {} skipped: {}", filename, reason);
            None
        }
    };

    let length = match &wav {
        Some(wav) => audio::wav_duration_seconds(wav).unwrap_or_else(|e| {
            warn!("Could not read duration of {}: {}", wav.display(), e);
            0.0
        }),
        None => 0.0,
    };

    let transcription = match &wav {
        Some(wav) => match transcribe(media.transcriber.as_deref(), wav).await {
            Outcome::Ok(text) => text,
            Outcome::Degraded(reason) => {
                warn!("Transcription of {} skipped: {}", filename, reason);
                String::new()
            }
        },
        None => String::new(),
    };

    info!("Stored audio message {} ({:.2}s)", filename, length);
    Ok(CapturedMessage {
        filename,
        length,
        transcription,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_timestamped_name() {
        assert_eq!(timestamped_name("video", at(7, 5, 3)), "video_20240309070503.webm");
    }

    #[tokio::test]
    async fn test_list_videos_newest_first_and_filters_extension() {
        let dir = tempfile::tempdir().unwrap();
        store_video(dir.path(), b"a", at(10, 0, 0)).await.unwrap();
        store_video(dir.path(), b"b", at(12, 0, 0)).await.unwrap();
        store_video(dir.path(), b"c", at(11, 0, 0)).await.unwrap();
        std::fs::write(dir.path().join(VIDEO_SUBDIR).join("notes.txt"), b"x").unwrap();

        let videos = list_videos(dir.path()).await.unwrap();
        let names: Vec<_> = videos.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "video_20240309120000.webm",
                "video_20240309110000.webm",
                "video_20240309100000.webm"
            ]
        );
        assert_eq!(videos[0].url, "/recordings/videos/video_20240309120000.webm");
    }

    #[tokio::test]
    async fn test_list_videos_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(list_videos(&dir.path().join("nowhere")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_same_second_uploads_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        store_video(dir.path(), b"first", at(9, 0, 0)).await.unwrap();
        let name = store_video(dir.path(), b"second", at(9, 0, 0)).await.unwrap();

        let content = std::fs::read(dir.path().join(VIDEO_SUBDIR).join(name)).unwrap();
        assert_eq!(content, b"second");
        assert_eq!(list_videos(dir.path()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_tools_degrade() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.webm");
        std::fs::write(&input, b"data").unwrap();

        assert!(transcode_to_wav(None, &input).await.is_degraded());
        let cmd = vec!["/nonexistent/ffmpeg".to_string()];
        assert!(transcode_to_wav(Some(cmd.as_slice()), &input)
            .await
            .is_degraded());
        assert!(transcribe(None, &input).await.is_degraded());
        let cmd = vec!["/nonexistent/whisper".to_string()];
        assert!(transcribe(Some(cmd.as_slice()), &input).await.is_degraded());
    }

    #[tokio::test]
    async fn test_capture_without_tools_still_succeeds() {
        let dir = tempfile::tempdir().unwrap();
        let media = MediaConfig {
            transcoder: None,
            transcriber: None,
        };

        let msg = capture_message(&media, dir.path(), b"opus", at(8, 30, 0))
            .await
            .unwrap();
        assert_eq!(msg.filename, "recording_20240309083000.webm");
        assert_eq!(msg.length, 0.0);
        assert_eq!(msg.transcription, "");
        assert!(dir.path().join(AUDIO_SUBDIR).join(&msg.filename).exists());
    }
}
