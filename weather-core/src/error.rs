use reqwest::StatusCode;
use thiserror::Error;

/// Failures that can happen while talking to an upstream service.
///
/// None of these ever reach an end user as-is: the services in
/// [`crate::service`] log them and substitute a synthetic default.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("request to upstream failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("upstream responded with status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("unexpected upstream payload: {0}")]
    Payload(String),

    #[error("no forecast for location '{0}' in upstream payload")]
    LocationNotFound(String),

    #[error("no CWA API key configured (set CWA_API_KEY or run `pixel-weather configure`)")]
    MissingApiKey,

    #[error("IP geolocation failed: {0}")]
    GeoLookup(String),
}

impl WeatherError {
    /// Short message placed in the `error` field of fallback responses.
    pub fn user_message(&self) -> String {
        match self {
            WeatherError::MissingApiKey => "未設定中央氣象署 API 金鑰".to_string(),
            WeatherError::LocationNotFound(name) => format!("找不到該地區的天氣資料：{name}"),
            WeatherError::GeoLookup(_) => "無法解析 IP 位置".to_string(),
            WeatherError::Transport(_) | WeatherError::Status { .. } | WeatherError::Payload(_) => {
                "無法獲取天氣資料".to_string()
            }
        }
    }
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
