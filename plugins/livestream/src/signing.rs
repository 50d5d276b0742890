//! Playback URL signing.
//!
//! Livestream playlists are only served to requests carrying a client id, a millisecond
//! timestamp, and an HMAC-MD5 token keyed with the account's API key over
//! `{api_key}:playback:{timestamp}`.

use crate::livestream_api::Credentials;
use hmac::digest::InvalidLength;
use hmac::{Hmac, Mac};
use jiff::Timestamp;
use md5::Md5;
use std::fmt::Write;

type HmacMd5 = Hmac<Md5>;

/// Hex-encoded HMAC-MD5 of `message` under `key`.
pub fn hmac_md5_hex(key: &[u8], message: &[u8]) -> Result<String, InvalidLength> {
    let mut mac = HmacMd5::new_from_slice(key)?;
    mac.update(message);
    Ok(mac
        .finalize()
        .into_bytes()
        .iter()
        .fold(String::with_capacity(32), |mut hex, byte| {
            let _ = write!(hex, "{byte:02x}");
            hex
        }))
}

/// The playback token for `secret` at `timestamp_ms`.
pub fn playback_token(secret: &str, timestamp_ms: i64) -> Result<String, InvalidLength> {
    hmac_md5_hex(
        secret.as_bytes(),
        format!("{secret}:playback:{timestamp_ms}").as_bytes(),
    )
}

/// Appends `clientId`, `timestamp` and `token` query parameters to `url`.
///
/// The client id is left out if the credentials have none.
pub fn sign_playback_url(
    url: &str,
    credentials: &Credentials,
    signed_at: Timestamp,
) -> Result<String, InvalidLength> {
    let timestamp_ms = signed_at.as_millisecond();
    let token = playback_token(&credentials.api_key, timestamp_ms)?;

    let mut query = form_urlencoded::Serializer::new(String::new());
    if let Some(client_id) = &credentials.client_id {
        query.append_pair("clientId", client_id);
    }
    query
        .append_pair("timestamp", &timestamp_ms.to_string())
        .append_pair("token", &token);

    let separator = if url.contains('?') { '&' } else { '?' };
    Ok(format!("{url}{separator}{}", query.finish()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn credentials() -> Credentials {
        Credentials::new("foo", "bar", Some("client".to_owned()))
    }

    #[test]
    fn test_hmac_md5_known_vector() {
        assert_eq!(
            hmac_md5_hex(b"key", b"The quick brown fox jumps over the lazy dog").unwrap(),
            "80070713463e7749b90c2dc24911e275"
        );
    }

    #[test]
    fn test_signing_is_deterministic() {
        let at = Timestamp::from_millisecond(1_500_000_000_000).unwrap();
        let url = "https://livestreamapis.com/v3/accounts/bar/events/1/master.m3u8";

        let once = sign_playback_url(url, &credentials(), at).unwrap();
        let twice = sign_playback_url(url, &credentials(), at).unwrap();
        assert_eq!(once, twice);
        assert_eq!(
            once,
            format!(
                "{url}?clientId=client&timestamp=1500000000000&token={}",
                playback_token("foo", 1_500_000_000_000).unwrap()
            )
        );
    }

    #[test]
    fn test_timestamp_changes_token() {
        assert_ne!(
            playback_token("foo", 1_500_000_000_000).unwrap(),
            playback_token("foo", 1_500_000_000_001).unwrap()
        );
        assert_eq!(playback_token("foo", 1).unwrap().len(), 32);
    }

    #[test]
    fn test_existing_query_is_extended() {
        let at = Timestamp::from_millisecond(1).unwrap();
        let signed = sign_playback_url("https://x/y.m3u8?a=b", &credentials(), at).unwrap();
        assert!(signed.starts_with("https://x/y.m3u8?a=b&clientId=client&timestamp=1&token="), "{signed}");
    }

    #[test]
    fn test_without_client_id() {
        let at = Timestamp::from_millisecond(1).unwrap();
        let signed =
            sign_playback_url("https://x/y.m3u8", &Credentials::new("foo", "bar", None), at).unwrap();
        assert!(signed.starts_with("https://x/y.m3u8?timestamp=1&token="), "{signed}");
    }

    #[test]
    fn test_empty_key_still_signs() {
        let at = Timestamp::from_millisecond(1).unwrap();
        let signed = sign_playback_url("https://x/y.m3u8", &Credentials::new("", "bar", None), at)
            .unwrap();
        assert!(signed.starts_with("https://x/y.m3u8?timestamp=1&token="), "{signed}");
        assert_eq!(playback_token("", 1).unwrap().len(), 32);
    }
}
