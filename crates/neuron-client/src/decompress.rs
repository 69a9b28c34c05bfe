//! Response body decompression selected by `Content-Encoding`

use std::io::{self, Cursor, Read};

use bytes::Bytes;
use flate2::read::{DeflateDecoder, GzDecoder};
use reqwest::header::{HeaderMap, CONTENT_ENCODING};
use tracing::error;

use crate::error::{ClientError, Result};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Readable response body, decoded on the fly when compressed
///
/// Decoder state is owned here and released when the body is dropped.
pub struct ResponseBody {
    inner: BodyReader,
}

enum BodyReader {
    Plain(Cursor<Bytes>),
    Gzip(GzDecoder<Cursor<Bytes>>),
    Deflate(DeflateDecoder<Cursor<Bytes>>),
}

impl ResponseBody {
    /// Body passed through unchanged
    pub fn plain(raw: Bytes) -> Self {
        Self {
            inner: BodyReader::Plain(Cursor::new(raw)),
        }
    }

    /// Whether a decompression stream is engaged
    pub fn is_compressed(&self) -> bool {
        !matches!(self.inner, BodyReader::Plain(_))
    }
}

impl Read for ResponseBody {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match &mut self.inner {
            BodyReader::Plain(r) => r.read(buf),
            BodyReader::Gzip(r) => r.read(buf),
            BodyReader::Deflate(r) => r.read(buf),
        }
    }
}

/// Wrap `raw` in the decoder its `Content-Encoding` calls for
///
/// When the transport already decoded the body, `raw` is used as-is.
/// Unknown encodings fail before any of the body is read.
pub fn decompress(headers: &HeaderMap, already_decoded: bool, raw: Bytes) -> Result<ResponseBody> {
    if already_decoded {
        return Ok(ResponseBody::plain(raw));
    }

    let encoding = headers
        .get(CONTENT_ENCODING)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).trim().to_ascii_lowercase())
        .unwrap_or_default();

    let inner = match encoding.as_str() {
        "" | "identity" => BodyReader::Plain(Cursor::new(raw)),
        // Nothing to decode; error statuses often come with an empty body.
        _ if raw.is_empty() && (encoding == "gzip" || encoding == "deflate") => {
            BodyReader::Plain(Cursor::new(raw))
        }
        "gzip" => {
            if !raw.starts_with(&GZIP_MAGIC) {
                return Err(ClientError::Decompression(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "invalid gzip header",
                )));
            }
            BodyReader::Gzip(GzDecoder::new(Cursor::new(raw)))
        }
        "deflate" => BodyReader::Deflate(DeflateDecoder::new(Cursor::new(raw))),
        _ => {
            error!(encoding = %encoding, "Unsupported Content-Encoding");
            return Err(ClientError::UnsupportedContentEncoding(encoding));
        }
    };

    Ok(ResponseBody { inner })
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::{DeflateEncoder, GzEncoder};
    use flate2::Compression;
    use reqwest::header::HeaderValue;
    use std::io::Write;

    fn headers(encoding: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_ENCODING, HeaderValue::from_static(encoding));
        headers
    }

    fn read_all(mut body: ResponseBody) -> Vec<u8> {
        let mut out = Vec::new();
        body.read_to_end(&mut out).unwrap();
        out
    }

    #[test]
    fn test_gzip() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"{\"data\":null}").unwrap();
        let compressed = encoder.finish().unwrap();

        let body = decompress(&headers("gzip"), false, Bytes::from(compressed)).unwrap();
        assert!(body.is_compressed());
        assert_eq!(read_all(body), b"{\"data\":null}");
    }

    #[test]
    fn test_deflate() {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"hello deflate").unwrap();
        let compressed = encoder.finish().unwrap();

        let body = decompress(&headers("deflate"), false, Bytes::from(compressed)).unwrap();
        assert_eq!(read_all(body), b"hello deflate");
    }

    #[test]
    fn test_identity_passthrough() {
        let body = decompress(&HeaderMap::new(), false, Bytes::from_static(b"raw")).unwrap();
        assert!(!body.is_compressed());
        assert_eq!(read_all(body), b"raw");
    }

    #[test]
    fn test_already_decoded_ignores_header() {
        let body = decompress(&headers("gzip"), true, Bytes::from_static(b"plain")).unwrap();
        assert_eq!(read_all(body), b"plain");
    }

    #[test]
    fn test_unsupported_encoding() {
        let result = decompress(&headers("br"), false, Bytes::from_static(b"xx"));
        assert!(matches!(result, Err(ClientError::UnsupportedContentEncoding(e)) if e == "br"));
    }

    #[test]
    fn test_invalid_gzip_header() {
        let result = decompress(&headers("gzip"), false, Bytes::from_static(b"not gzip"));
        assert!(matches!(result, Err(ClientError::Decompression(_))));
    }

    #[test]
    fn test_empty_gzip_body() {
        let body = decompress(&headers("gzip"), false, Bytes::new()).unwrap();
        assert!(read_all(body).is_empty());
    }
}
