use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Formato di output richiesto dal client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Mp3,
    Mp4,
}

impl OutputFormat {
    /// Parsing permissivo: qualsiasi valore fuori da {mp3, mp4} e' rifiutato
    /// a livello di validazione, non di deserializzazione del body.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "mp3" => Some(OutputFormat::Mp3),
            "mp4" => Some(OutputFormat::Mp4),
            _ => None,
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Mp3 => write!(f, "mp3"),
            OutputFormat::Mp4 => write!(f, "mp4"),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ConvertRequest {
    /// URL del video da convertire (solo domini YouTube)
    #[serde(default)]
    pub url: String,
    /// Formato di output: mp3 o mp4
    #[serde(default)]
    pub format: String,
}
