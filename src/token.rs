use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use rand::RngCore;
use serde::Serialize;

use crate::error::Error;

/// Number of random bytes behind every access and refresh token.
pub const TOKEN_BYTES: usize = 1500;

/// Generates an opaque bearer token.
///
/// Returns the URL-safe base64 encoding of [`TOKEN_BYTES`] random bytes
/// (2000 characters). The bytes come from the thread-local CSPRNG.
#[must_use]
pub fn generate_token() -> String {
    let mut bytes = vec![0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE.encode(bytes)
}

#[derive(Serialize)]
struct CampaignCategory {
    sid: &'static str,
    sy: u8,
    ut: u8,
}

/// Builds the `CampaignCategoryCode` returned in the user profile.
///
/// Clients only check that it decodes, so the payload is fixed.
///
/// # Errors
///
/// Returns [`Error::Json`] if the payload cannot be serialized.
pub fn campaign_category_code() -> Result<String, Error> {
    let payload = serde_json::to_vec(&CampaignCategory {
        sid: "1234",
        sy: 1,
        ut: 69,
    })?;
    Ok(URL_SAFE.encode(payload))
}
