//! Image list composition from Livestream image URLs.

use crate::livestream_api::Logo;
use crate::resource::Image;
use regex::Regex;
use std::sync::LazyLock;

static SIZE_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"_\d+x\d+\.").expect("size suffix pattern is valid")
});

pub const THUMBNAIL_SIZE: (u32, u32) = (320, 180);

/// Builds a `thumbnail` + `original` image pair from one Livestream image URL.
///
/// Livestream serves resized variants by inserting `_{width}x{height}` before the extension, so
/// `http://img.new.livestream.com/events/00625bc1/ae58.png` yields a 320x180 thumbnail at
/// `https://img.new.livestream.com/events/00625bc1/ae58_320x180.png`. Any size suffix already on
/// the URL is removed first, and the scheme is upgraded to https.
pub fn compose_images(url: &str) -> Vec<Image> {
    let original = match url.strip_prefix("http:") {
        Some(rest) => format!("https:{rest}"),
        None => url.to_owned(),
    };
    let original = SIZE_SUFFIX.replacen(&original, 1, ".").into_owned();

    let (width, height) = THUMBNAIL_SIZE;
    let suffix = format!("_{width}x{height}");
    let file_start = original.rfind('/').map_or(0, |slash| slash + 1);
    let thumbnail = match original[file_start..].rfind('.') {
        Some(dot) => {
            let dot = file_start + dot;
            format!("{}{suffix}{}", &original[..dot], &original[dot..])
        }
        None => format!("{original}{suffix}"),
    };

    vec![
        Image {
            url: thumbnail,
            width: Some(width),
            height: Some(height),
            label: "thumbnail".to_owned(),
        },
        Image {
            url: original,
            width: None,
            height: None,
            label: "original".to_owned(),
        },
    ]
}

/// `thumbnail` and `thumbnail-small` images for a logo.
///
/// Poster artwork is portrait; everything else is treated as a wide banner.
pub fn logo_images(logo: &Logo) -> Vec<Image> {
    let mut images = Vec::with_capacity(2);
    if let Some(url) = &logo.url {
        let (width, height) = if is_poster(url) { (170, 255) } else { (1589, 886) };
        images.push(Image {
            url: url.clone(),
            width: Some(width),
            height: Some(height),
            label: "thumbnail".to_owned(),
        });
    }
    if let Some(url) = &logo.small_url {
        let (width, height) = if is_poster(url) { (170, 95) } else { (1589, 170) };
        images.push(Image {
            url: url.clone(),
            width: Some(width),
            height: Some(height),
            label: "thumbnail-small".to_owned(),
        });
    }
    images
}

fn is_poster(url: &str) -> bool {
    url.contains("poster")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn urls(images: &[Image]) -> Vec<&str> {
        images.iter().map(|i| i.url.as_str()).collect()
    }

    #[test]
    fn test_compose_images() {
        let images =
            compose_images("http://img.new.livestream.com/events/00625bc1/ae58-27e0a8312512.png");
        assert_eq!(
            urls(&images),
            vec![
                "https://img.new.livestream.com/events/00625bc1/ae58-27e0a8312512_320x180.png",
                "https://img.new.livestream.com/events/00625bc1/ae58-27e0a8312512.png",
            ]
        );
        assert_eq!(images[0].width, Some(320));
        assert_eq!(images[0].height, Some(180));
        assert_eq!(images[1].label, "original");
    }

    #[test]
    fn test_compose_images_replaces_existing_size() {
        let images = compose_images("https://img.new.livestream.com/events/1/abc_640x360.jpg");
        assert_eq!(
            urls(&images),
            vec![
                "https://img.new.livestream.com/events/1/abc_320x180.jpg",
                "https://img.new.livestream.com/events/1/abc.jpg",
            ]
        );
    }

    #[test]
    fn test_compose_images_without_extension() {
        let images = compose_images("https://img.new.livestream.com/events/1/abc");
        assert_eq!(images[0].url, "https://img.new.livestream.com/events/1/abc_320x180");
    }

    #[test]
    fn test_logo_images() {
        let images = logo_images(&Logo {
            url: Some("https://x/banner.png".to_owned()),
            small_url: Some("https://x/poster_small.png".to_owned()),
            thumbnail_url: None,
        });
        assert_eq!(images.len(), 2);
        assert_eq!((images[0].width, images[0].height), (Some(1589), Some(886)));
        assert_eq!(images[1].label, "thumbnail-small");
        assert_eq!((images[1].width, images[1].height), (Some(170), Some(95)));

        assert!(logo_images(&Logo::default()).is_empty());
    }
}
