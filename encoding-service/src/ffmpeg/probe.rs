//sondes ffprobe sur les fichiers sources
use std::path::Path;

use anyhow::{bail, Context, Result};
use tokio::process::Command;

//dimensions du premier flux vidéo, au format "LxH"
pub async fn video_dimensions(ffprobe_path: &str, input: &Path) -> Result<(u32, u32)> {
    let output = Command::new(ffprobe_path)
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height",
            "-of",
            "csv=s=x:p=0",
        ])
        .arg(input)
        .output()
        .await
        .with_context(|| format!("failed to run {ffprobe_path}"))?;

    if !output.status.success() {
        bail!(
            "ffprobe exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    let text = String::from_utf8_lossy(&output.stdout);
    parse_dimensions(text.trim())
}

//analyse de la sortie "largeur x hauteur"
fn parse_dimensions(text: &str) -> Result<(u32, u32)> {
    let mut parts = text.split('x');
    let (Some(width), Some(height), None) = (parts.next(), parts.next(), parts.next()) else {
        bail!("unexpected ffprobe output format: {text}");
    };
    let width: u32 = width.trim().parse().context("invalid width value")?;
    let height: u32 = height.trim().parse().context("invalid height value")?;
    Ok((width, height))
}

//présence d'un flux audio dans la source
pub async fn has_audio_stream(ffprobe_path: &str, input: &Path) -> Result<bool> {
    let output = Command::new(ffprobe_path)
        .args([
            "-v",
            "error",
            "-select_streams",
            "a:0",
            "-show_entries",
            "stream=codec_type",
            "-of",
            "csv=p=0",
        ])
        .arg(input)
        .output()
        .await
        .with_context(|| format!("failed to run {ffprobe_path}"))?;

    if !output.status.success() {
        bail!(
            "ffprobe exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    Ok(String::from_utf8_lossy(&output.stdout).contains("audio"))
}

//durée de la source en secondes, 0.0 en cas d'échec
pub async fn video_duration(ffprobe_path: &str, input: &Path) -> f64 {
    let output = Command::new(ffprobe_path)
        .args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(input)
        .output()
        .await;

    let output = match output {
        Ok(out) if out.status.success() => out,
        Ok(out) => {
            tracing::warn!(
                input = %input.display(),
                stderr = %String::from_utf8_lossy(&out.stderr).trim(),
                "duration probe failed"
            );
            return 0.0;
        }
        Err(err) => {
            tracing::warn!(input = %input.display(), %err, "duration probe failed");
            return 0.0;
        }
    };

    let text = String::from_utf8_lossy(&output.stdout);
    match text.trim().parse::<f64>() {
        Ok(duration) => duration,
        Err(err) => {
            tracing::warn!(input = %input.display(), %err, "invalid duration value");
            0.0
        }
    }
}
