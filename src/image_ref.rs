use base64::Engine;
use base64::engine::general_purpose::STANDARD;

const DATA_IMAGE_PREFIX: &str = "data:image";
const JPEG_DATA_PREFIX: &str = "data:image/jpeg;base64,";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Missing,
    Remote(String),
    /// Decoded payload size, `None` when the payload is not valid base64.
    Embedded { bytes: Option<usize> },
}

/// Turns a server image value into something displayable: URLs and data
/// references pass through, anything else is raw base64 JPEG.
pub fn resolve_image_source(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }
    if raw.starts_with("http") || raw.starts_with(DATA_IMAGE_PREFIX) {
        return raw.to_string();
    }
    format!("{JPEG_DATA_PREFIX}{raw}")
}

pub fn classify_image(raw: &str) -> ImageSource {
    let resolved = resolve_image_source(raw);
    if resolved.is_empty() {
        return ImageSource::Missing;
    }
    if resolved.starts_with("http") {
        return ImageSource::Remote(resolved);
    }
    let payload = resolved
        .split_once(',')
        .map(|(_, data)| data)
        .unwrap_or_default();
    ImageSource::Embedded {
        bytes: STANDARD.decode(payload.trim()).ok().map(|b| b.len()),
    }
}

pub fn describe_image(raw: &str) -> String {
    match classify_image(raw) {
        ImageSource::Missing => "No image".to_string(),
        ImageSource::Remote(url) => format!("Photo: {url}"),
        ImageSource::Embedded { bytes: Some(len) } => {
            format!("Embedded JPEG ({:.1} KB)", len as f64 / 1024.0)
        }
        ImageSource::Embedded { bytes: None } => "Embedded image (unreadable)".to_string(),
    }
}
