//! Outgoing request negotiation headers

use neuron_core::MEDIA_TYPE;
use reqwest::header::{
    HeaderMap, HeaderValue, ACCEPT, ACCEPT_ENCODING, CACHE_CONTROL, CONNECTION, PRAGMA, USER_AGENT,
};

/// Client identification sent with every request
pub const CLIENT_USER_AGENT: &str = concat!(
    "neuron-client/",
    env!("CARGO_PKG_VERSION"),
    " (Rust JSON:API client)"
);

/// Response encodings the client can decode
pub const ACCEPTED_ENCODINGS: &str = "gzip,deflate";

/// Append the negotiation headers; headers already present are kept
pub(crate) fn format_request(headers: &mut HeaderMap) {
    headers.append(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));
    headers.append(ACCEPT, HeaderValue::from_static(MEDIA_TYPE));
    headers.append(ACCEPT_ENCODING, HeaderValue::from_static(ACCEPTED_ENCODINGS));
    headers.append(CONNECTION, HeaderValue::from_static("keep-alive"));
    headers.append(CACHE_CONTROL, HeaderValue::from_static("max-age=0, no-cache"));
    headers.append(PRAGMA, HeaderValue::from_static("no-cache"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negotiation_headers() {
        let mut headers = HeaderMap::new();
        format_request(&mut headers);

        assert_eq!(headers[ACCEPT], "application/vnd.api+json");
        assert_eq!(headers[ACCEPT_ENCODING], "gzip,deflate");
        assert_eq!(headers[CONNECTION], "keep-alive");
        assert_eq!(headers[CACHE_CONTROL], "max-age=0, no-cache");
        assert_eq!(headers[PRAGMA], "no-cache");
        assert!(headers[USER_AGENT]
            .to_str()
            .unwrap()
            .starts_with("neuron-client/"));
    }

    #[test]
    fn test_keeps_existing_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert("x-trace", HeaderValue::from_static("abc"));
        format_request(&mut headers);

        let accepts: Vec<_> = headers.get_all(ACCEPT).iter().collect();
        assert_eq!(accepts, vec!["application/json", "application/vnd.api+json"]);
        assert_eq!(headers["x-trace"], "abc");
    }
}
