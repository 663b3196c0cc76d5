use std::env;
use std::path::PathBuf;
use thiserror::Error;

/// Default chunk budget in characters, matching the remote API's input cap.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the readaloud server.
///
/// Constructed once in `main` from the process environment and handed to the
/// components that need it; nothing reads configuration ambiently.
#[derive(Debug, Clone)]
pub struct Config {
    /// API key presented to the speech-synthesis provider.
    pub api_key: String,
    /// Base URL of the speech-synthesis API.
    pub speech_api_url: String,
    /// Model identifier passed with every synthesis request.
    pub tts_model: String,
    /// Maximum number of characters per synthesized chunk.
    pub chunk_size: usize,
    /// Single origin allowed by the CORS policy.
    pub allowed_origin: String,
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
    /// Path of the ffmpeg binary used to concatenate audio segments.
    pub ffmpeg_path: String,
    /// Path of the tesseract binary used for OCR on scanned pages.
    pub tesseract_path: String,
    /// Directory that holds request-scoped segment and output files.
    pub work_dir: PathBuf,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: load_env("OPENAI_API_KEY")?,
            speech_api_url: load_env_optional("SPEECH_API_URL")
                .unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
            tts_model: load_env_optional("TTS_MODEL").unwrap_or_else(|| "tts-1".to_string()),
            chunk_size: load_env_optional("TTS_CHUNK_SIZE")
                .map(|value| {
                    value
                        .parse()
                        .ok()
                        .filter(|size| *size > 0)
                        .ok_or_else(|| ConfigError::InvalidValue("TTS_CHUNK_SIZE".to_string()))
                })
                .transpose()?
                .unwrap_or(DEFAULT_CHUNK_SIZE),
            allowed_origin: load_env_optional("ALLOWED_ORIGIN")
                .unwrap_or_else(|| "http://localhost:4200".to_string()),
            server_port: load_env_optional("SERVER_PORT")
                .map(|value| {
                    value
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("SERVER_PORT".into()))
                })
                .transpose()?,
            ffmpeg_path: load_env_optional("FFMPEG_PATH").unwrap_or_else(|| "ffmpeg".to_string()),
            tesseract_path: load_env_optional("TESSERACT_PATH")
                .unwrap_or_else(|| "tesseract".to_string()),
            work_dir: load_env_optional("WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(env::temp_dir),
        })
    }
}

fn load_env(key: &str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingVariable(key.to_string()))
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
pub(crate) fn test_config(work_dir: PathBuf) -> Config {
    Config {
        api_key: "test-key".into(),
        speech_api_url: "http://127.0.0.1:0".into(),
        tts_model: "tts-1".into(),
        chunk_size: DEFAULT_CHUNK_SIZE,
        allowed_origin: "http://localhost:4200".into(),
        server_port: None,
        ffmpeg_path: "ffmpeg".into(),
        tesseract_path: "tesseract".into(),
        work_dir,
    }
}
