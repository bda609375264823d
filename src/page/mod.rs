//! Headless state for the page chrome around the contact form.

use gpui::SharedString;
use log::{debug, warn};

pub const HEADER_SCROLL_THRESHOLD_PX: f32 = 100.0;
pub const SCROLL_MARGIN_PX: f32 = 20.0;
pub const REVEAL_THRESHOLD: f32 = 0.1;
pub const REVEAL_OFFSET_PX: f32 = 20.0;

pub const SOCIAL_URLS: [&str; 5] = [
    "https://facebook.com/markmixstudios",
    "https://twitter.com/markmixstudios",
    "https://linkedin.com/company/markmixstudios",
    "https://instagram.com/markmixstudios",
    "https://github.com/markmixstudios",
];

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct HeaderState {
    scrolled: bool,
}

impl HeaderState {
    pub fn from_scroll(scroll_y: f32) -> Self {
        Self {
            scrolled: scroll_y > HEADER_SCROLL_THRESHOLD_PX,
        }
    }

    /// Returns true when the scrolled styling flipped.
    pub fn on_scroll(&mut self, scroll_y: f32) -> bool {
        let next = Self::from_scroll(scroll_y);
        let changed = next != *self;
        *self = next;
        changed
    }

    pub fn is_scrolled(&self) -> bool {
        self.scrolled
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NavIcon {
    Bars,
    Times,
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct NavMenu {
    opened: bool,
}

impl NavMenu {
    pub fn is_open(&self) -> bool {
        self.opened
    }

    pub fn icon(&self) -> NavIcon {
        if self.opened {
            NavIcon::Times
        } else {
            NavIcon::Bars
        }
    }

    pub fn toggle(&mut self) -> bool {
        self.opened = !self.opened;
        debug!("mobile navigation opened: {}", self.opened);
        self.opened
    }

    /// Following any navigation link closes the menu and returns where the
    /// page should scroll to, if anywhere.
    pub fn on_link_click(
        &mut self,
        href: &str,
        target_offset_top: Option<f32>,
        header_height: f32,
    ) -> Option<f32> {
        self.opened = false;
        if href == "#" {
            return None;
        }
        target_offset_top.map(|offset| scroll_target(offset, header_height))
    }
}

/// Scroll position that places a section just below the fixed header.
pub fn scroll_target(target_offset_top: f32, header_height: f32) -> f32 {
    (target_offset_top - header_height - SCROLL_MARGIN_PX).max(0.0)
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct LinkSlot {
    pub href: Option<SharedString>,
    pub target: Option<SharedString>,
    pub rel: Option<SharedString>,
}

pub struct SocialLinks;

impl SocialLinks {
    /// Points the first slots at the studio profiles. Slots past the known
    /// profiles are left as they are.
    pub fn apply(slots: &mut [LinkSlot]) {
        for (slot, url) in slots.iter_mut().zip(SOCIAL_URLS) {
            slot.href = Some(url.into());
            slot.target = Some("_blank".into());
            slot.rel = Some("noopener noreferrer".into());
        }
    }
}

/// Fade-in state for cards that animate into view once.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Reveal {
    revealed: bool,
}

impl Reveal {
    pub fn observe(&mut self, visible_ratio: f32) -> bool {
        if !self.revealed && visible_ratio >= REVEAL_THRESHOLD {
            self.revealed = true;
            return true;
        }
        false
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub fn opacity(&self) -> f32 {
        if self.revealed { 1.0 } else { 0.0 }
    }

    pub fn offset_y(&self) -> f32 {
        if self.revealed { 0.0 } else { REVEAL_OFFSET_PX }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ImageLoad {
    /// Still carries the `lazy` marker; `src` is unset.
    Deferred,
    Loading,
    Loaded,
    /// Failed images are hidden.
    Failed,
}

/// Image whose source is only assigned once it scrolls into view.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LazyImage {
    data_src: SharedString,
    load: ImageLoad,
}

impl LazyImage {
    pub fn new(data_src: impl Into<SharedString>) -> Self {
        Self {
            data_src: data_src.into(),
            load: ImageLoad::Deferred,
        }
    }

    /// Returns the source to start loading the first time the image
    /// intersects the viewport. Later observations are ignored.
    pub fn observe(&mut self, intersecting: bool) -> Option<SharedString> {
        if !intersecting || self.load != ImageLoad::Deferred {
            return None;
        }
        self.load = ImageLoad::Loading;
        Some(self.data_src.clone())
    }

    pub fn on_load(&mut self) {
        if self.load == ImageLoad::Loading {
            self.load = ImageLoad::Loaded;
        }
    }

    pub fn on_error(&mut self) {
        if self.load != ImageLoad::Deferred {
            warn!("image failed to load: {}", self.data_src);
            self.load = ImageLoad::Failed;
        }
    }

    pub fn load(&self) -> ImageLoad {
        self.load
    }

    pub fn src(&self) -> Option<&SharedString> {
        match self.load {
            ImageLoad::Deferred => None,
            ImageLoad::Loading | ImageLoad::Loaded | ImageLoad::Failed => Some(&self.data_src),
        }
    }

    pub fn is_lazy(&self) -> bool {
        self.load == ImageLoad::Deferred
    }

    pub fn is_hidden(&self) -> bool {
        self.load == ImageLoad::Failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_is_scrolled_only_past_threshold() {
        assert!(!HeaderState::from_scroll(0.0).is_scrolled());
        assert!(!HeaderState::from_scroll(100.0).is_scrolled());
        assert!(HeaderState::from_scroll(100.5).is_scrolled());

        let mut header = HeaderState::default();
        assert!(header.on_scroll(240.0));
        assert!(!header.on_scroll(300.0));
        assert!(header.on_scroll(10.0));
        assert!(!header.is_scrolled());
    }

    #[test]
    fn nav_menu_toggles_icon_and_closes_on_link() {
        let mut menu = NavMenu::default();
        assert_eq!(menu.icon(), NavIcon::Bars);
        assert!(menu.toggle());
        assert_eq!(menu.icon(), NavIcon::Times);

        assert_eq!(menu.on_link_click("#services", Some(900.0), 80.0), Some(800.0));
        assert!(!menu.is_open());
        assert_eq!(menu.icon(), NavIcon::Bars);
    }

    #[test]
    fn bare_hash_links_do_not_scroll() {
        let mut menu = NavMenu::default();
        menu.toggle();
        assert_eq!(menu.on_link_click("#", Some(500.0), 80.0), None);
        assert!(!menu.is_open());
        assert_eq!(menu.on_link_click("#missing", None, 80.0), None);
    }

    #[test]
    fn scroll_target_clamps_at_top() {
        assert_eq!(scroll_target(600.0, 80.0), 500.0);
        assert_eq!(scroll_target(50.0, 80.0), 0.0);
    }

    #[test]
    fn social_links_fill_known_slots_only() {
        let mut slots = vec![LinkSlot::default(); 6];
        slots[5].href = Some("https://example.com".into());
        SocialLinks::apply(&mut slots);

        for (slot, url) in slots.iter().zip(SOCIAL_URLS) {
            assert_eq!(slot.href.as_ref().map(|href| href.to_string()), Some(url.to_string()));
            assert_eq!(slot.target.as_ref().map(|t| t.to_string()).as_deref(), Some("_blank"));
            assert_eq!(
                slot.rel.as_ref().map(|rel| rel.to_string()).as_deref(),
                Some("noopener noreferrer")
            );
        }
        assert_eq!(
            slots[5].href.as_ref().map(|href| href.to_string()).as_deref(),
            Some("https://example.com")
        );
        assert_eq!(slots[5].target, None);

        let mut short = vec![LinkSlot::default(); 2];
        SocialLinks::apply(&mut short);
        assert!(short.iter().all(|slot| slot.href.is_some()));
    }

    #[test]
    fn reveal_happens_once() {
        let mut reveal = Reveal::default();
        assert_eq!(reveal.opacity(), 0.0);
        assert_eq!(reveal.offset_y(), REVEAL_OFFSET_PX);
        assert!(!reveal.observe(0.05));
        assert!(reveal.observe(0.2));
        assert!(!reveal.observe(0.0));
        assert!(reveal.is_revealed());
        assert_eq!(reveal.opacity(), 1.0);
    }

    #[test]
    fn lazy_image_loads_once_when_visible() {
        let mut image = LazyImage::new("img/portfolio-1.jpg");
        assert!(image.is_lazy());
        assert_eq!(image.src(), None);
        assert_eq!(image.observe(false), None);

        let src = image.observe(true).map(|src| src.to_string());
        assert_eq!(src.as_deref(), Some("img/portfolio-1.jpg"));
        assert!(!image.is_lazy());
        assert_eq!(image.observe(true), None);

        image.on_load();
        assert_eq!(image.load(), ImageLoad::Loaded);
        assert!(!image.is_hidden());
    }

    #[test]
    fn failed_image_is_hidden() {
        let mut image = LazyImage::new("img/missing.jpg");
        image.on_error();
        assert_eq!(image.load(), ImageLoad::Deferred);

        image.observe(true);
        image.on_error();
        assert!(image.is_hidden());
        image.on_load();
        assert_eq!(image.load(), ImageLoad::Failed);
    }
}
