//! Picks the attachment worth downloading from a case manifest.

use crate::domain::entities::{AttachmentManifest, SelectedAttachment};

const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];
const MAP_SUFFIXES: [&str; 4] = ["_map", "-map", "_m", "-m"];

/// Chooses the most recent non-map image in the manifest.
///
/// Falls back to the most recent filename of any kind when no strict
/// candidate exists; returns `None` only for an empty manifest.
#[must_use]
pub fn select_attachment(manifest: &AttachmentManifest) -> Option<SelectedAttachment> {
    manifest
        .most_recent_first()
        .find(|name| is_image_filename(name) && !is_map_thumbnail(name))
        .or_else(|| manifest.latest())
        .map(SelectedAttachment::new)
}

/// Returns true for auto-generated location-map thumbnails.
#[must_use]
pub fn is_map_thumbnail(filename: &str) -> bool {
    let stem = split_extension(filename).0.to_lowercase();
    stem == "map" || MAP_SUFFIXES.iter().any(|suffix| stem.ends_with(suffix))
}

/// Returns true for filenames with a displayable raster extension.
#[must_use]
pub fn is_image_filename(filename: &str) -> bool {
    split_extension(filename)
        .1
        .is_some_and(|ext| IMAGE_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}

fn split_extension(filename: &str) -> (&str, Option<&str>) {
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (filename, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn manifest(names: &[&str]) -> AttachmentManifest {
        AttachmentManifest::new(names.iter().map(|n| (*n).to_string()).collect())
    }

    fn selected(names: &[&str]) -> Option<String> {
        select_attachment(&manifest(names)).map(|s| s.filename)
    }

    #[test]
    fn test_most_recent_non_map() {
        assert_eq!(
            selected(&["a_map.jpg", "b.jpg", "c_M.jpg"]),
            Some("b.jpg".to_string())
        );
    }

    #[test]
    fn test_falls_back_to_latest_map() {
        assert_eq!(selected(&["only_map.jpg"]), Some("only_map.jpg".to_string()));
    }

    #[test]
    fn test_empty_manifest() {
        assert_eq!(selected(&[]), None);
    }

    #[test]
    fn test_prefers_later_entries() {
        assert_eq!(
            selected(&["loc_map.jpg", "photo1.jpg", "photo2.png"]),
            Some("photo2.png".to_string())
        );
    }

    #[test]
    fn test_fallback_ignores_type() {
        assert_eq!(
            selected(&["notes.pdf", "scan.tiff"]),
            Some("scan.tiff".to_string())
        );
    }

    #[test]
    fn test_skips_non_image_before_fallback() {
        assert_eq!(
            selected(&["photo.JPEG", "notes.pdf"]),
            Some("photo.JPEG".to_string())
        );
    }

    #[test_case("loc_map.jpg", true ; "underscore_map")]
    #[test_case("LOC_MAP.PNG", true ; "uppercase_map")]
    #[test_case("c_M.jpg", true ; "bare_m")]
    #[test_case("site-m.jpeg", true ; "dash_m")]
    #[test_case("map.jpg", true ; "map_only")]
    #[test_case("photo1.jpg", false ; "photo")]
    #[test_case("item.jpg", false ; "ends_in_m_without_separator")]
    #[test_case("roadmap.jpg", false ; "map_inside_word")]
    fn test_is_map_thumbnail(name: &str, expected: bool) {
        assert_eq!(is_map_thumbnail(name), expected);
    }

    #[test_case("a.jpg", true ; "jpg")]
    #[test_case("a.JPEG", true ; "jpeg_upper")]
    #[test_case("a.png", true ; "png")]
    #[test_case("a.gif", false ; "gif")]
    #[test_case("jpg", false ; "no_dot")]
    #[test_case(".png", false ; "dotfile")]
    fn test_is_image_filename(name: &str, expected: bool) {
        assert_eq!(is_image_filename(name), expected);
    }
}
