//! The `{status_code, status_txt, data}` wrapper around every API response.

use serde::Deserialize;
use serde_json::Value;

use crate::error::BitlyError;
use crate::http::HttpResponse;

/// Status code the service uses for success inside the envelope.
pub const STATUS_OK: u16 = 200;

#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    pub status_code: u16,
    #[serde(default)]
    pub status_txt: String,
    #[serde(default)]
    pub data: Value,
}

/// Strip the envelope from `response` and return its `data` payload.
///
/// A non-2xx HTTP status and a non-200 `status_code` both become
/// `BitlyError::Api`; the service reports most failures through the latter
/// while still answering with HTTP 200.
pub fn unwrap_envelope(response: HttpResponse) -> Result<Value, BitlyError> {
    if !response.is_success() {
        return Err(match serde_json::from_str::<Envelope>(&response.body) {
            Ok(envelope) => BitlyError::Api {
                status_code: envelope.status_code,
                status_txt: envelope.status_txt,
            },
            Err(_) => BitlyError::Api {
                status_code: response.status,
                status_txt: response.body,
            },
        });
    }

    let envelope: Envelope = serde_json::from_str(&response.body).map_err(BitlyError::decode)?;
    if envelope.status_code != STATUS_OK {
        return Err(BitlyError::Api {
            status_code: envelope.status_code,
            status_txt: envelope.status_txt,
        });
    }
    Ok(envelope.data)
}
