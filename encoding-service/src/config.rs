//configuration du service d'encodage
use std::path::PathBuf;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct EncodingConfig {
    pub host: String,
    pub port: u16,
    pub media_dir: PathBuf,   //sources partagées avec le service d'upload
    pub encoded_dir: PathBuf, //racine des sorties encodées
    pub workers: usize,
    pub queue_depth: usize,
    pub ladder_heights: Vec<u32>,
    pub scan_interval: Duration,
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    pub allowed_origins: Vec<String>,
}

//valeurs par défaut
impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8082,
            media_dir: PathBuf::from("./media"),
            encoded_dir: PathBuf::from("./encoded"),
            workers: 2,
            queue_depth: 100,
            ladder_heights: vec![240, 360, 480, 720, 1080],
            scan_interval: Duration::from_secs(10),
            ffmpeg_path: "ffmpeg".to_string(),
            ffprobe_path: "ffprobe".to_string(),
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://192.168.1.11:3000".to_string(),
            ],
        }
    }
}

impl EncodingConfig {
    //racine des sorties DASH
    pub fn dash_dir(&self) -> PathBuf {
        self.encoded_dir.join("dash")
    }

    //racine des sorties HLS
    pub fn hls_dir(&self) -> PathBuf {
        self.encoded_dir.join("hls")
    }
}
