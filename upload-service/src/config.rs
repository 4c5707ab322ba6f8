//configuration du service d'upload
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct UploadConfig {
    pub host: String,
    pub port: u16,
    pub media_dir: PathBuf, //dossier partagé avec les services catalogue et encodage
    pub max_upload_size: usize,
    pub allowed_origins: Vec<String>,
}

//valeurs par défaut
impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            media_dir: PathBuf::from("./media"),
            max_upload_size: 1024 * 1024 * 1024, //1 GiB
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://192.168.1.11:3000".to_string(),
            ],
        }
    }
}
