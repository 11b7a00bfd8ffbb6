//! Direction resolution
//!
//! An explicit, valid `direction` attribute always wins. Without one the
//! marquee scrolls `right` in right-to-left documents and `left` otherwise.

use serde::{Deserialize, Serialize};

use crate::models::Direction;

/// Languages written right to left, matched on the primary subtag
pub const RTL_LANGUAGES: &[&str] = &["ar", "he", "fa", "ur", "yi", "ps", "dv", "ug", "syr"];

/// Language and text direction declared on the document root
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentDirection {
    /// `lang` attribute, e.g. `"ar"` or `"en-US"`
    pub lang: Option<String>,
    /// `dir` attribute, e.g. `"rtl"`
    pub dir: Option<String>,
}

impl DocumentDirection {
    pub fn new(lang: Option<String>, dir: Option<String>) -> Self {
        Self { lang, dir }
    }

    pub fn from_lang(lang: &str) -> Self {
        Self::new(Some(lang.to_string()), None)
    }

    /// Whether the document reads right to left
    ///
    /// An explicit `dir="rtl"` or `dir="ltr"` decides; otherwise the primary
    /// language subtag is looked up in [`RTL_LANGUAGES`].
    pub fn is_rtl(&self) -> bool {
        match self.dir.as_deref().map(str::trim) {
            Some(dir) if dir.eq_ignore_ascii_case("rtl") => return true,
            Some(dir) if dir.eq_ignore_ascii_case("ltr") => return false,
            _ => {}
        }

        self.lang
            .as_deref()
            .and_then(|lang| lang.trim().split(['-', '_']).next())
            .map(|primary| {
                let primary = primary.to_ascii_lowercase();
                RTL_LANGUAGES.contains(&primary.as_str())
            })
            .unwrap_or(false)
    }
}

/// Resolve the effective direction from a raw attribute value
pub fn resolve_direction(explicit: Option<&str>, document: &DocumentDirection) -> Direction {
    resolve(explicit.and_then(|d| d.parse().ok()), document)
}

/// Resolve the effective direction from an already parsed explicit value
pub fn resolve(explicit: Option<Direction>, document: &DocumentDirection) -> Direction {
    match explicit {
        Some(direction) => direction,
        None if document.is_rtl() => Direction::Right,
        None => Direction::Left,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_direction_wins() {
        let arabic = DocumentDirection::from_lang("ar");
        for direction in Direction::ALL {
            assert_eq!(resolve_direction(Some(direction.as_str()), &arabic), direction);
        }
    }

    #[test]
    fn test_rtl_language_defaults_right() {
        assert_eq!(resolve_direction(None, &DocumentDirection::from_lang("ar")), Direction::Right);
        assert_eq!(resolve_direction(None, &DocumentDirection::from_lang("he-IL")), Direction::Right);
        assert_eq!(resolve_direction(None, &DocumentDirection::from_lang("FA")), Direction::Right);
        assert_eq!(resolve_direction(None, &DocumentDirection::from_lang("syr")), Direction::Right);
    }

    #[test]
    fn test_invalid_explicit_value_is_ignored() {
        let hebrew = DocumentDirection::from_lang("he");
        assert_eq!(resolve_direction(Some("diagonal"), &hebrew), Direction::Right);
        assert_eq!(resolve_direction(Some(""), &DocumentDirection::default()), Direction::Left);
    }

    #[test]
    fn test_ltr_and_unknown_default_left() {
        assert_eq!(resolve_direction(None, &DocumentDirection::from_lang("en")), Direction::Left);
        assert_eq!(resolve_direction(None, &DocumentDirection::from_lang("")), Direction::Left);
        assert_eq!(resolve_direction(None, &DocumentDirection::from_lang("xx-unknown")), Direction::Left);
        assert_eq!(resolve_direction(None, &DocumentDirection::default()), Direction::Left);
    }

    #[test]
    fn test_dir_attribute_overrides_language() {
        let doc = DocumentDirection::new(Some("en".into()), Some("rtl".into()));
        assert!(doc.is_rtl());
        let doc = DocumentDirection::new(Some("ar".into()), Some("LTR".into()));
        assert!(!doc.is_rtl());
        let doc = DocumentDirection::new(Some("ar".into()), Some("auto".into()));
        assert!(doc.is_rtl());
    }

    #[test]
    fn test_language_prefix_must_be_whole_subtag() {
        // "arn" (Mapudungun) is not Arabic
        assert!(!DocumentDirection::from_lang("arn").is_rtl());
        assert!(DocumentDirection::from_lang("ur_PK").is_rtl());
    }
}
