//pilote de transcodage: sondes, vignette, variantes DASH puis HLS
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::process::Command;

use crate::config::EncodingConfig;
use crate::engine::registry::JobRegistry;
use crate::ffmpeg::{
    bandwidth_for_height, compute_ladder, dash_variant_args, hls_variant_args, thumbnail_args,
    Resolution,
};
use crate::ffmpeg::probe;
use crate::jobs::Job;

//échec fatal d'une étape du pipeline
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to probe video dimensions: {0}")]
    Probe(String),
    #[error("ffmpeg DASH encoding error for {height}p: {output}")]
    DashVariant { height: u32, output: String },
    #[error("ffmpeg HLS encoding error for {height}p: {output}")]
    HlsVariant { height: u32, output: String },
    #[error("failed to write {path}: {source}")]
    WriteOutput {
        path: PathBuf,
        source: std::io::Error,
    },
}

//résultat d'un encodage complet
#[derive(Clone, Debug)]
pub struct EncodeOutput {
    pub dash_manifest: String,
    pub hls_manifest: String,
    pub duration: i64,
}

//production de l'arborescence complète pour un job
pub async fn process_video(
    config: &EncodingConfig,
    registry: &JobRegistry,
    job: &Job,
) -> Result<EncodeOutput, EncodeError> {
    let source = config.media_dir.join(&job.source_file);
    let base_dir = config.encoded_dir.join(&job.id);
    let dash_dir = config.dash_dir().join(&job.id);
    let hls_dir = config.hls_dir().join(&job.id);

    for dir in [&base_dir, &dash_dir, &hls_dir] {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|source| EncodeError::CreateDir {
                path: dir.clone(),
                source,
            })?;
    }

    //sonde des dimensions, fatale pour le job
    let (width, height) = probe::video_dimensions(&config.ffprobe_path, &source)
        .await
        .map_err(|err| EncodeError::Probe(err.to_string()))?;

    //sonde audio permissive: en cas de doute on mappe l'audio en optionnel
    let has_audio = match probe::has_audio_stream(&config.ffprobe_path, &source).await {
        Ok(found) => found,
        Err(err) => {
            tracing::warn!(job = %job.id, %err, "could not determine audio presence");
            true
        }
    };

    let duration = probe::video_duration(&config.ffprobe_path, &source).await;

    //vignette, non fatale
    if let Err(output) = create_thumbnail(config, &source, &base_dir.join("thumbnail.jpg")).await {
        tracing::warn!(job = %job.id, error = %output, "thumbnail extraction failed");
    }

    let ladder = compute_ladder(width, height, &config.ladder_heights);
    let total_steps = ladder.len() * 2;
    let mut done_steps = 0usize;

    //variantes DASH puis manifeste maître
    for resolution in &ladder {
        let variant_dir = dash_dir.join(format!("{}p", resolution.height));
        tokio::fs::create_dir_all(&variant_dir)
            .await
            .map_err(|source| EncodeError::CreateDir {
                path: variant_dir.clone(),
                source,
            })?;
        let args = dash_variant_args(&source, &variant_dir.join("stream.mp4"), *resolution, has_audio);
        run_ffmpeg(&config.ffmpeg_path, &args)
            .await
            .map_err(|output| EncodeError::DashVariant {
                height: resolution.height,
                output,
            })?;
        done_steps += 1;
        registry.progress(&job.id, step_progress(done_steps, total_steps)).await;
    }

    let manifest_path = dash_dir.join("manifest.mpd");
    let manifest = render_dash_manifest(&ladder, width, height, has_audio, duration);
    tokio::fs::write(&manifest_path, manifest)
        .await
        .map_err(|source| EncodeError::WriteOutput {
            path: manifest_path,
            source,
        })?;

    //variantes HLS puis playlist maître, écrite en une seule fois
    for resolution in &ladder {
        let variant_dir = hls_dir.join(format!("{}p", resolution.height));
        tokio::fs::create_dir_all(&variant_dir)
            .await
            .map_err(|source| EncodeError::CreateDir {
                path: variant_dir.clone(),
                source,
            })?;
        let args = hls_variant_args(
            &source,
            &variant_dir.join("segment_%03d.ts"),
            &variant_dir.join("playlist.m3u8"),
            *resolution,
            has_audio,
        );
        run_ffmpeg(&config.ffmpeg_path, &args)
            .await
            .map_err(|output| EncodeError::HlsVariant {
                height: resolution.height,
                output,
            })?;
        done_steps += 1;
        registry.progress(&job.id, step_progress(done_steps, total_steps)).await;
    }

    let master_path = hls_dir.join("master.m3u8");
    let master = render_master_playlist(&ladder);
    tokio::fs::write(&master_path, master)
        .await
        .map_err(|source| EncodeError::WriteOutput {
            path: master_path,
            source,
        })?;

    Ok(EncodeOutput {
        dash_manifest: format!("/dash/{}/manifest.mpd", job.id),
        hls_manifest: format!("/hls/{}/master.m3u8", job.id),
        duration: duration.round() as i64,
    })
}

//progression par étape de variante, plafonnée avant la transition finale
fn step_progress(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((done * 100 / total) as u8).min(99)
}

//exécution de ffmpeg, sortie combinée retournée en cas d'échec
async fn run_ffmpeg(ffmpeg_path: &str, args: &[String]) -> Result<(), String> {
    let output = Command::new(ffmpeg_path)
        .args(args)
        .output()
        .await
        .map_err(|err| format!("failed to run {ffmpeg_path}: {err}"))?;
    if output.status.success() {
        return Ok(());
    }
    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    Err(format!("{}: {}", output.status, combined.trim()))
}

//extraction d'une image à 3 s, largeur 640, hauteur dérivée
async fn create_thumbnail(
    config: &EncodingConfig,
    input: &Path,
    output: &Path,
) -> Result<(), String> {
    run_ffmpeg(&config.ffmpeg_path, &thumbnail_args(input, output)).await
}

//durée au format xsd:duration du MPD
fn format_mpd_duration(seconds: f64) -> String {
    let total = seconds.max(0.0);
    let hours = (total / 3600.0).floor() as u64;
    let minutes = ((total % 3600.0) / 60.0).floor() as u64;
    let secs = total - (hours * 3600 + minutes * 60) as f64;
    format!("PT{hours}H{minutes}M{secs:.1}S")
}

//synthèse du manifeste DASH maître
fn render_dash_manifest(
    ladder: &[Resolution],
    src_width: u32,
    src_height: u32,
    has_audio: bool,
    duration_seconds: f64,
) -> String {
    let duration = format_mpd_duration(duration_seconds);
    let mut manifest = String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    let _ = write!(
        manifest,
        "<MPD xmlns=\"urn:mpeg:dash:schema:mpd:2011\" minBufferTime=\"PT1.5S\" type=\"static\" \
         mediaPresentationDuration=\"{duration}\" profiles=\"urn:mpeg:dash:profile:isoff-on-demand:2011\">\n  \
         <Period duration=\"{duration}\">"
    );

    let _ = write!(
        manifest,
        "\n    <AdaptationSet segmentAlignment=\"true\" group=\"1\" maxWidth=\"{src_width}\" \
         maxHeight=\"{src_height}\" maxFrameRate=\"30\" par=\"16:9\">"
    );
    for resolution in ladder {
        let _ = write!(
            manifest,
            "\n      <Representation id=\"{h}p\" mimeType=\"video/mp4\" codecs=\"avc1.64001F\" \
             width=\"{w}\" height=\"{h}\" frameRate=\"30\" sar=\"1:1\" bandwidth=\"{bw}\">\n        \
             <BaseURL>{h}p/stream.mp4</BaseURL>\n      </Representation>",
            w = resolution.width,
            h = resolution.height,
            bw = bandwidth_for_height(resolution.height),
        );
    }
    manifest.push_str("\n    </AdaptationSet>");

    //l'audio référence la variante la plus basse de l'échelle
    if has_audio {
        if let Some(lowest) = ladder.first() {
            let _ = write!(
                manifest,
                "\n    <AdaptationSet segmentAlignment=\"true\" group=\"2\">\n      \
                 <Representation id=\"audio\" mimeType=\"audio/mp4\" codecs=\"mp4a.40.2\" bandwidth=\"128000\">\n        \
                 <BaseURL>{}p/stream.mp4</BaseURL>\n      </Representation>\n    </AdaptationSet>",
                lowest.height,
            );
        }
    }

    manifest.push_str("\n  </Period>\n</MPD>");
    manifest
}

//assemblage de la playlist HLS maître, entrées dans l'ordre de l'échelle
fn render_master_playlist(ladder: &[Resolution]) -> String {
    let mut playlist = String::from("#EXTM3U\n#EXT-X-VERSION:3\n");
    for resolution in ladder {
        let _ = write!(
            playlist,
            "#EXT-X-STREAM-INF:BANDWIDTH={bw},RESOLUTION={w}x{h},NAME={h}p\n{h}p/playlist.m3u8\n",
            bw = bandwidth_for_height(resolution.height),
            w = resolution.width,
            h = resolution.height,
        );
    }
    playlist
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ladder_720() -> Vec<Resolution> {
        vec![
            Resolution { width: 426, height: 240 },
            Resolution { width: 640, height: 360 },
            Resolution { width: 854, height: 480 },
            Resolution { width: 1280, height: 720 },
        ]
    }

    #[test]
    fn mpd_duration_uses_probed_seconds() {
        assert_eq!(format_mpd_duration(180.0), "PT0H3M0.0S");
        assert_eq!(format_mpd_duration(3725.5), "PT1H2M5.5S");
        assert_eq!(format_mpd_duration(0.0), "PT0H0M0.0S");
        assert_eq!(format_mpd_duration(-5.0), "PT0H0M0.0S");
    }

    #[test]
    fn dash_manifest_lists_one_representation_per_variant() {
        let manifest = render_dash_manifest(&ladder_720(), 1280, 720, false, 63.2);
        assert_eq!(manifest.matches("<Representation").count(), 4);
        assert!(manifest.contains("mediaPresentationDuration=\"PT0H1M3.2S\""));
        assert!(manifest.contains("width=\"854\" height=\"480\""));
        assert!(manifest.contains("bandwidth=\"2628000\""));
        assert!(manifest.contains("<BaseURL>720p/stream.mp4</BaseURL>"));
        assert!(!manifest.contains("mp4a.40.2"));
    }

    #[test]
    fn dash_manifest_audio_set_references_lowest_variant() {
        let manifest = render_dash_manifest(&ladder_720(), 1280, 720, true, 120.0);
        assert!(manifest.contains("codecs=\"mp4a.40.2\" bandwidth=\"128000\""));
        assert!(manifest.contains("<BaseURL>240p/stream.mp4</BaseURL>"));
    }

    #[test]
    fn master_playlist_is_assembled_in_ladder_order() {
        let ladder = vec![
            Resolution { width: 426, height: 240 },
            Resolution { width: 640, height: 360 },
        ];
        let expected = "#EXTM3U\n#EXT-X-VERSION:3\n\
            #EXT-X-STREAM-INF:BANDWIDTH=528000,RESOLUTION=426x240,NAME=240p\n240p/playlist.m3u8\n\
            #EXT-X-STREAM-INF:BANDWIDTH=928000,RESOLUTION=640x360,NAME=360p\n360p/playlist.m3u8\n";
        assert_eq!(render_master_playlist(&ladder), expected);
    }

    #[test]
    fn step_progress_is_capped_below_completion() {
        assert_eq!(step_progress(0, 8), 0);
        assert_eq!(step_progress(4, 8), 50);
        assert_eq!(step_progress(8, 8), 99);
        assert_eq!(step_progress(0, 0), 0);
    }
}
