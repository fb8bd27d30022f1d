use std::env;
use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "http://localhost:8080";
pub const DEFAULT_DATA_DIR: &str = ".livraria";

pub struct Config {
    pub api_base_url: String,
    pub data_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok(); // Load .env file

        let api_base_url =
            env::var("LIVRARIA_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());

        let data_dir = env::var("LIVRARIA_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR));

        Config {
            api_base_url,
            data_dir,
        }
    }
}
