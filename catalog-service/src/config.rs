//configuration du service catalogue
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct CatalogConfig {
    pub host: String,
    pub port: u16,
    pub media_dir: PathBuf, //même dossier que le service d'upload
    pub allowed_origins: Vec<String>,
}

//valeurs par défaut
impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8081,
            media_dir: PathBuf::from("./media"),
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://192.168.1.11:3000".to_string(),
            ],
        }
    }
}
