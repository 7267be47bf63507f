//! Menu item records supplied by the host.

use serde::{Deserialize, Serialize};

/// Image shown when the host supplies no items at all.
pub const PLACEHOLDER_IMAGE: &str = "https://picsum.photos/900/900?grayscale";
/// Link paired with [`PLACEHOLDER_IMAGE`].
pub const PLACEHOLDER_LINK: &str = "https://google.com/";

/// One entry on the sphere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    /// `http(s)://` URL or filesystem path of the thumbnail.
    pub image: String,
    /// Destination opened by the host when the active item is clicked.
    pub link: String,
    /// Title drawn on fallback tiles and shown by the host.
    #[serde(default)]
    pub title: String,
    /// Free-form description shown by the host.
    #[serde(default)]
    pub description: String,
}

impl MenuItem {
    /// The single item substituted for an empty list.
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            image: PLACEHOLDER_IMAGE.to_owned(),
            link: PLACEHOLDER_LINK.to_owned(),
            title: String::new(),
            description: String::new(),
        }
    }

    /// Whether [`link`](Self::link) leaves the host (opens externally).
    #[must_use]
    pub fn is_external_link(&self) -> bool {
        self.link.starts_with("http")
    }
}

/// Replace an empty list with one placeholder so the sphere always has an
/// addressable slot.
#[must_use]
pub fn with_placeholder(items: Vec<MenuItem>) -> Vec<MenuItem> {
    if items.is_empty() {
        vec![MenuItem::placeholder()]
    } else {
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_list_gets_one_placeholder() {
        let items = with_placeholder(Vec::new());
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].image, PLACEHOLDER_IMAGE);
    }

    #[test]
    fn non_empty_list_is_untouched() {
        let item = MenuItem {
            image: "a.png".into(),
            link: "/work".into(),
            title: "A".into(),
            description: String::new(),
        };
        let items = with_placeholder(vec![item.clone()]);
        assert_eq!(items, vec![item.clone()]);
        assert!(!item.is_external_link());
    }
}
