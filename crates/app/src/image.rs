//! Saving generated images.

use std::path::Path;

use anyhow::Context;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

/// Decodes a base64 image, tolerating a `data:` URL prefix.
///
/// # Errors
///
/// Returns an error if the payload is not valid base64.
pub fn decode(image: &str) -> anyhow::Result<Vec<u8>> {
    let payload = image
        .split_once(";base64,")
        .map_or(image, |(_, data)| data)
        .trim();
    STANDARD.decode(payload).context("image is not valid base64")
}

/// Decodes `image` and writes it to `path`.
///
/// # Errors
///
/// Returns an error if decoding or writing fails.
pub async fn save(image: &str, path: &Path) -> anyhow::Result<usize> {
    let bytes = decode(image)?;
    tokio::fs::write(path, &bytes)
        .await
        .with_context(|| format!("could not write {}", path.display()))?;
    Ok(bytes.len())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn decodes_plain_and_data_url() {
        assert_eq!(decode("aGVsbG8=").unwrap(), b"hello");
        assert_eq!(decode("data:image/png;base64,aGVsbG8=").unwrap(), b"hello");
    }

    #[test]
    fn rejects_garbage() {
        assert!(decode("not base64!").is_err());
    }

    #[tokio::test]
    async fn writes_decoded_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.png");

        let written = save("aGVsbG8=", &path).await.unwrap();

        assert_eq!(written, 5);
        assert_eq!(std::fs::read(&path).unwrap(), b"hello");
    }
}
