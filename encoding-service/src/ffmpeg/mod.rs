//outils FFmpeg: échelle de résolutions et construction des arguments
pub mod pipeline;
pub mod probe;

use std::path::Path;

//variante de sortie, dimensions paires
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

//dérivation de l'échelle de résolutions à partir des dimensions sources
pub fn compute_ladder(src_width: u32, src_height: u32, target_heights: &[u32]) -> Vec<Resolution> {
    let aspect = src_width as f64 / src_height as f64;
    let mut ladder = Vec::new();

    for &height in target_heights {
        //les paliers plus hauts que la source sont exclus
        if height > src_height {
            continue;
        }
        //largeur tronquée puis relevée à la valeur paire, exigée par les codecs
        let mut width = (height as f64 * aspect).floor() as u32;
        if width % 2 != 0 {
            width += 1;
        }
        ladder.push(Resolution { width, height });
    }

    //source plus petite que le premier palier: variante unique aux dimensions d'origine
    if ladder.is_empty() {
        let width = src_width + src_width % 2;
        let height = src_height + src_height % 2;
        ladder.push(Resolution { width, height });
    }

    ladder
}

//débit vidéo par hauteur de variante
pub fn bitrate_for_height(height: u32) -> &'static str {
    match height {
        0..=240 => "400k",
        241..=360 => "800k",
        361..=480 => "1200k",
        481..=720 => "2500k",
        721..=1080 => "5000k",
        _ => "1500k",
    }
}

//bande passante déclarée dans les manifestes (vidéo + 128k audio)
pub fn bandwidth_for_height(height: u32) -> &'static str {
    match height {
        0..=240 => "528000",
        241..=360 => "928000",
        361..=480 => "1328000",
        481..=720 => "2628000",
        721..=1080 => "5128000",
        _ => "1628000",
    }
}

//mapping des flux: l'audio est optionnel quand la source en possède
fn push_stream_mapping(args: &mut Vec<String>, has_audio: bool) {
    if has_audio {
        args.extend([
            "-map".into(),
            "0:v:0".into(),
            "-map".into(),
            "0:a:0?".into(),
            "-c:a".into(),
            "aac".into(),
            "-b:a".into(),
            "128k".into(),
        ]);
    } else {
        args.extend(["-map".into(), "0:v:0".into()]);
    }
}

//arguments d'encodage d'une variante DASH (MP4 fragmenté)
pub fn dash_variant_args(
    input: &Path,
    output: &Path,
    resolution: Resolution,
    has_audio: bool,
) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "-i".into(),
        input.to_string_lossy().into_owned(),
        "-c:v".into(),
        "libx264".into(),
        "-preset".into(),
        "medium".into(),
        "-keyint_min".into(),
        "60".into(),
        "-g".into(),
        "60".into(),
        "-sc_threshold".into(),
        "0".into(),
        "-profile:v".into(),
        "high".into(),
        "-vf".into(),
        format!("scale={}:{}", resolution.width, resolution.height),
        "-b:v".into(),
        bitrate_for_height(resolution.height).into(),
    ];
    push_stream_mapping(&mut args, has_audio);
    args.extend([
        "-f".into(),
        "mp4".into(),
        output.to_string_lossy().into_owned(),
    ]);
    args
}

//arguments d'encodage d'une variante HLS (playlist + segments TS)
pub fn hls_variant_args(
    input: &Path,
    segment_template: &Path,
    playlist: &Path,
    resolution: Resolution,
    has_audio: bool,
) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "-i".into(),
        input.to_string_lossy().into_owned(),
        "-c:v".into(),
        "libx264".into(),
        "-preset".into(),
        "medium".into(),
        "-profile:v".into(),
        "main".into(),
        "-crf".into(),
        "23".into(),
        "-sc_threshold".into(),
        "0".into(),
        "-g".into(),
        "60".into(),
        "-keyint_min".into(),
        "60".into(),
        "-hls_time".into(),
        "6".into(),
        "-hls_list_size".into(),
        "0".into(),
        "-hls_segment_filename".into(),
        segment_template.to_string_lossy().into_owned(),
        "-vf".into(),
        format!("scale={}:{}", resolution.width, resolution.height),
        "-b:v".into(),
        bitrate_for_height(resolution.height).into(),
    ];
    push_stream_mapping(&mut args, has_audio);
    args.push(playlist.to_string_lossy().into_owned());
    args
}

//arguments d'extraction de vignette (une image à 3 s, largeur 640)
pub fn thumbnail_args(input: &Path, output: &Path) -> Vec<String> {
    vec![
        "-i".into(),
        input.to_string_lossy().into_owned(),
        "-ss".into(),
        "00:00:03".into(),
        "-frames:v".into(),
        "1".into(),
        "-vf".into(),
        "scale=640:-1".into(),
        output.to_string_lossy().into_owned(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEIGHTS: [u32; 5] = [240, 360, 480, 720, 1080];

    #[test]
    fn ladder_for_1080p_source_has_five_rungs() {
        let ladder = compute_ladder(1920, 1080, &HEIGHTS);
        let expected = [(426, 240), (640, 360), (854, 480), (1280, 720), (1920, 1080)];
        assert_eq!(ladder.len(), expected.len());
        for (rung, (w, h)) in ladder.iter().zip(expected) {
            assert_eq!((rung.width, rung.height), (w, h));
        }
    }

    #[test]
    fn ladder_excludes_rungs_above_source_height() {
        let ladder = compute_ladder(1280, 720, &HEIGHTS);
        let expected = [(426, 240), (640, 360), (854, 480), (1280, 720)];
        assert_eq!(ladder.len(), expected.len());
        for (rung, (w, h)) in ladder.iter().zip(expected) {
            assert_eq!((rung.width, rung.height), (w, h));
        }
    }

    #[test]
    fn tiny_source_falls_back_to_single_variant() {
        let ladder = compute_ladder(100, 100, &HEIGHTS);
        assert_eq!(ladder, vec![Resolution { width: 100, height: 100 }]);
    }

    #[test]
    fn fallback_variant_rounds_odd_dimensions_up() {
        let ladder = compute_ladder(99, 101, &HEIGHTS);
        assert_eq!(ladder, vec![Resolution { width: 100, height: 102 }]);
    }

    #[test]
    fn ladder_widths_are_even_and_preserve_aspect() {
        let ladder = compute_ladder(1440, 1080, &HEIGHTS);
        let aspect = 1440.0 / 1080.0;
        for rung in &ladder {
            assert_eq!(rung.width % 2, 0);
            let ideal = rung.height as f64 * aspect;
            assert!((rung.width as f64 - ideal).abs() <= 0.5 + 1.0);
        }
    }

    #[test]
    fn bitrate_bands_match_documented_table() {
        assert_eq!(bitrate_for_height(240), "400k");
        assert_eq!(bitrate_for_height(360), "800k");
        assert_eq!(bitrate_for_height(480), "1200k");
        assert_eq!(bitrate_for_height(720), "2500k");
        assert_eq!(bitrate_for_height(1080), "5000k");
        assert_eq!(bitrate_for_height(1440), "1500k");
    }

    #[test]
    fn bandwidth_bands_match_documented_table() {
        assert_eq!(bandwidth_for_height(240), "528000");
        assert_eq!(bandwidth_for_height(360), "928000");
        assert_eq!(bandwidth_for_height(480), "1328000");
        assert_eq!(bandwidth_for_height(720), "2628000");
        assert_eq!(bandwidth_for_height(1080), "5128000");
        assert_eq!(bandwidth_for_height(2160), "1628000");
    }

    #[test]
    fn bitrates_are_non_decreasing_across_ladder_bands() {
        let parse = |s: &str| s.trim_end_matches('k').parse::<u32>().unwrap();
        let rates: Vec<u32> = HEIGHTS.iter().map(|&h| parse(bitrate_for_height(h))).collect();
        assert!(rates.windows(2).all(|pair| pair[0] <= pair[1]));
        let bands: Vec<u64> = HEIGHTS
            .iter()
            .map(|&h| bandwidth_for_height(h).parse::<u64>().unwrap())
            .collect();
        assert!(bands.windows(2).all(|pair| pair[0] <= pair[1]));
    }

    #[test]
    fn dash_args_map_video_only_without_audio() {
        let res = Resolution { width: 640, height: 360 };
        let args = dash_variant_args(Path::new("in.mp4"), Path::new("out/stream.mp4"), res, false);
        assert!(args.contains(&"0:v:0".to_string()));
        assert!(!args.contains(&"0:a:0?".to_string()));
        assert!(args.contains(&"scale=640:360".to_string()));
        assert!(args.contains(&"800k".to_string()));
        assert_eq!(args.last().unwrap(), "out/stream.mp4");
    }

    #[test]
    fn hls_args_carry_segment_template_and_optional_audio() {
        let res = Resolution { width: 1280, height: 720 };
        let args = hls_variant_args(
            Path::new("in.mp4"),
            Path::new("720p/segment_%03d.ts"),
            Path::new("720p/playlist.m3u8"),
            res,
            true,
        );
        assert!(args.contains(&"720p/segment_%03d.ts".to_string()));
        assert!(args.contains(&"0:a:0?".to_string()));
        assert!(args.contains(&"128k".to_string()));
        assert_eq!(args.last().unwrap(), "720p/playlist.m3u8");
    }
}
