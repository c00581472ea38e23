//! The environment capability the scroll spy runs against.
//!
//! A host owns the document: it answers selector queries, reports geometry,
//! and performs the handful of writes the spy needs. The browser binding
//! implements it over `web-sys`; [`crate::dom::StaticPage`] implements it over
//! parsed HTML for native use.

use std::fmt;

/// An axis-aligned rectangle in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub top: f64,
    pub bottom: f64,
    pub left: f64,
    pub right: f64,
}

impl Rect {
    pub fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        Self {
            top,
            bottom: top + height,
            left,
            right: left + width,
        }
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }
}

/// Document loading phase, as reported by `document.readyState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Loading,
    Interactive,
    Complete,
}

impl ReadyState {
    /// Parse a `readyState` string. Unknown values are treated as loaded.
    pub fn parse(state: &str) -> Self {
        match state {
            "loading" => Self::Loading,
            "interactive" => Self::Interactive,
            _ => Self::Complete,
        }
    }

    /// Whether activation must wait for the content-loaded signal.
    pub fn must_defer(self) -> bool {
        self == Self::Loading
    }
}

/// DOM lookup, geometry and scrolling for one document.
///
/// Selectors passed to the query methods come from a validated
/// [`crate::SpyConfig`]; hosts may treat a selector they cannot evaluate as
/// matching nothing.
pub trait Host {
    /// Element handle. Equality must be element identity.
    type Element: Clone + PartialEq + fmt::Debug;

    /// First element matching `selector`, searching descendants of `scope`
    /// or the whole document.
    fn query_one(&self, scope: Option<&Self::Element>, selector: &str) -> Option<Self::Element>;

    /// All elements matching `selector` in document order.
    fn query_all(&self, scope: Option<&Self::Element>, selector: &str) -> Vec<Self::Element>;

    /// Document-wide lookup by `id` attribute.
    fn element_by_id(&self, id: &str) -> Option<Self::Element>;

    fn attribute(&self, element: &Self::Element, name: &str) -> Option<String>;

    /// Force a collapsible wrapper into its expanded state.
    fn expand(&mut self, element: &Self::Element);

    /// Add or remove `class` on `element`.
    fn set_class(&mut self, element: &Self::Element, class: &str, on: bool);

    /// Vertical offset of `element` from the top of the page.
    fn offset_top(&self, element: &Self::Element) -> f64;

    fn bounding_rect(&self, element: &Self::Element) -> Rect;

    /// Current vertical scroll offset of the window.
    fn scroll_y(&self) -> f64;

    fn viewport_width(&self) -> f64;

    /// Smoothly scroll `element`'s scroll container so it is visible at the
    /// nearest edge, without centering.
    fn scroll_into_view(&mut self, element: &Self::Element);

    /// Smoothly scroll the window to vertical offset `top`.
    fn scroll_window_to(&mut self, top: f64);
}

impl<H: Host + ?Sized> Host for &mut H {
    type Element = H::Element;

    fn query_one(&self, scope: Option<&Self::Element>, selector: &str) -> Option<Self::Element> {
        (**self).query_one(scope, selector)
    }

    fn query_all(&self, scope: Option<&Self::Element>, selector: &str) -> Vec<Self::Element> {
        (**self).query_all(scope, selector)
    }

    fn element_by_id(&self, id: &str) -> Option<Self::Element> {
        (**self).element_by_id(id)
    }

    fn attribute(&self, element: &Self::Element, name: &str) -> Option<String> {
        (**self).attribute(element, name)
    }

    fn expand(&mut self, element: &Self::Element) {
        (**self).expand(element)
    }

    fn set_class(&mut self, element: &Self::Element, class: &str, on: bool) {
        (**self).set_class(element, class, on)
    }

    fn offset_top(&self, element: &Self::Element) -> f64 {
        (**self).offset_top(element)
    }

    fn bounding_rect(&self, element: &Self::Element) -> Rect {
        (**self).bounding_rect(element)
    }

    fn scroll_y(&self) -> f64 {
        (**self).scroll_y()
    }

    fn viewport_width(&self) -> f64 {
        (**self).viewport_width()
    }

    fn scroll_into_view(&mut self, element: &Self::Element) {
        (**self).scroll_into_view(element)
    }

    fn scroll_window_to(&mut self, top: f64) {
        (**self).scroll_window_to(top)
    }
}
