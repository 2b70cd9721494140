//! Whisper speech-to-text for voice messages.

use pomni_core::error::PomniError;
use serde::Deserialize;

/// Whisper API response.
#[derive(Deserialize)]
struct WhisperResponse {
    text: String,
}

/// Transcribe OGG/Opus audio bytes via the OpenAI Whisper API.
pub async fn transcribe_whisper(
    client: &reqwest::Client,
    api_key: &str,
    audio_bytes: &[u8],
) -> Result<String, PomniError> {
    let part = reqwest::multipart::Part::bytes(audio_bytes.to_vec())
        .file_name("voice.ogg")
        .mime_str("audio/ogg")
        .map_err(|e| PomniError::Transport(format!("whisper mime error: {e}")))?;

    let form = reqwest::multipart::Form::new()
        .text("model", "whisper-1")
        .part("file", part);

    let resp = client
        .post("https://api.openai.com/v1/audio/transcriptions")
        .bearer_auth(api_key)
        .multipart(form)
        .send()
        .await
        .map_err(|e| PomniError::Transport(format!("whisper request failed: {e}")))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(PomniError::Transport(format!(
            "whisper API error {status}: {body}"
        )));
    }

    let result: WhisperResponse = resp
        .json()
        .await
        .map_err(|e| PomniError::Transport(format!("whisper response parse failed: {e}")))?;

    Ok(result.text.trim().to_string())
}
