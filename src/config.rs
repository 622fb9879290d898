use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub downloads_dir: PathBuf,
    pub ytdlp_bin: String,
    pub tool_timeout: Duration,
    pub artifact_ttl: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            downloads_dir: PathBuf::from("downloads"),
            ytdlp_bin: "yt-dlp".to_string(),
            tool_timeout: Duration::from_secs(180),
            artifact_ttl: Duration::from_secs(10 * 60),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(host) = std::env::var("FETCHY_HOST") {
            config.host = host;
        }

        if let Ok(port) = std::env::var("PORT") {
            if let Ok(p) = port.parse() {
                config.port = p;
            }
        }

        if let Ok(dir) = std::env::var("FETCHY_DOWNLOADS_DIR") {
            config.downloads_dir = PathBuf::from(dir);
        }

        if let Ok(bin) = std::env::var("FETCHY_YTDLP_BIN") {
            config.ytdlp_bin = bin;
        }

        if let Ok(secs) = std::env::var("FETCHY_TOOL_TIMEOUT_SECS") {
            if let Ok(s) = secs.parse() {
                config.tool_timeout = Duration::from_secs(s);
            }
        }

        if let Ok(secs) = std::env::var("FETCHY_ARTIFACT_TTL_SECS") {
            if let Ok(s) = secs.parse() {
                config.artifact_ttl = Duration::from_secs(s);
            }
        }

        config
    }
}
