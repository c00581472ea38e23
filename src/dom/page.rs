//! A parsed HTML page acting as a scroll spy [`Host`].

use std::path::Path;

use log::warn;

use super::arena::{NodeId, PageDom};
use super::layout::PageLayout;
use super::select;
use super::parse_html;
use crate::error::Result;
use crate::host::{Host, Rect};

/// Height of one link row in the TOC panel.
pub const TOC_ROW_HEIGHT: f64 = 28.0;
/// Width reported for the TOC panel.
pub const TOC_WIDTH: f64 = 280.0;
/// Distance from the viewport top to the sticky TOC panel.
pub const DEFAULT_TOC_TOP: f64 = 80.0;

/// Browser window dimensions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1440.0, 900.0)
    }
}

/// A DOM write observed on a [`StaticPage`].
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    ClassAdded { node: NodeId, class: String },
    ClassRemoved { node: NodeId, class: String },
    Opened { node: NodeId },
    TocScrolled { top: f64 },
    WindowScrolled { top: f64 },
}

/// Parsed page with estimated geometry and a log of every write.
///
/// The element matching the panel selector is treated as a sticky sidebar
/// pinned `toc_top` pixels below the viewport top; its anchors stack in
/// fixed-height rows and scroll inside it. Everything else flows as page
/// content (see [`PageLayout`]).
#[derive(Debug)]
pub struct StaticPage {
    dom: PageDom,
    layout: PageLayout,
    viewport: Viewport,
    panel: Option<NodeId>,
    rows: Vec<NodeId>,
    toc_top: f64,
    toc_scroll: f64,
    scroll_y: f64,
    mutations: Vec<Mutation>,
}

impl StaticPage {
    /// Parse `html`, treating the first match of `panel_selector` as the TOC panel.
    pub fn parse(html: &str, viewport: Viewport, panel_selector: &str) -> Result<Self> {
        let dom = parse_html(html);
        let panel = select::select_first(&dom, dom.document(), &select::compile(panel_selector)?);
        let rows = match panel {
            Some(panel) => select::select_all(&dom, panel, &select::compile("a")?),
            None => Vec::new(),
        };
        let layout = PageLayout::compute(&dom, panel);

        Ok(Self {
            dom,
            layout,
            viewport,
            panel,
            rows,
            toc_top: DEFAULT_TOC_TOP,
            toc_scroll: 0.0,
            scroll_y: 0.0,
            mutations: Vec::new(),
        })
    }

    pub fn from_file(path: impl AsRef<Path>, viewport: Viewport, panel_selector: &str) -> Result<Self> {
        let html = std::fs::read_to_string(path)?;
        Self::parse(&html, viewport, panel_selector)
    }

    pub fn with_toc_top(mut self, toc_top: f64) -> Self {
        self.toc_top = toc_top;
        self
    }

    pub fn dom(&self) -> &PageDom {
        &self.dom
    }

    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Resize the window. Content geometry is width-independent.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.scroll_y = self.scroll_y.min(self.max_scroll());
    }

    /// Reader-initiated scroll; not recorded as a mutation.
    pub fn scroll_to(&mut self, top: f64) {
        self.scroll_y = top.clamp(0.0, self.max_scroll());
    }

    pub fn max_scroll(&self) -> f64 {
        (self.layout.document_height() - self.viewport.height).max(0.0)
    }

    /// Internal scroll offset of the TOC panel.
    pub fn toc_scroll(&self) -> f64 {
        self.toc_scroll
    }

    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }

    pub fn take_mutations(&mut self) -> Vec<Mutation> {
        std::mem::take(&mut self.mutations)
    }

    /// Elements currently carrying `class`, in document order.
    pub fn with_class(&self, class: &str) -> Vec<NodeId> {
        self.dom
            .descendants(self.dom.document())
            .filter(|&node| self.dom.has_class(node, class))
            .collect()
    }

    fn panel_rect(&self) -> Rect {
        Rect::new(
            self.toc_top,
            0.0,
            TOC_WIDTH,
            (self.viewport.height - self.toc_top).max(0.0),
        )
    }

    fn max_toc_scroll(&self) -> f64 {
        (self.rows.len() as f64 * TOC_ROW_HEIGHT - self.panel_rect().height()).max(0.0)
    }

    fn compile(&self, selector: &str) -> Option<select::Selectors> {
        select::compile(selector)
            .inspect_err(|e| warn!("{e}"))
            .ok()
    }
}

impl Host for StaticPage {
    type Element = NodeId;

    fn query_one(&self, scope: Option<&NodeId>, selector: &str) -> Option<NodeId> {
        let list = self.compile(selector)?;
        let scope = scope.copied().unwrap_or(self.dom.document());
        select::select_first(&self.dom, scope, &list)
    }

    fn query_all(&self, scope: Option<&NodeId>, selector: &str) -> Vec<NodeId> {
        let Some(list) = self.compile(selector) else {
            return Vec::new();
        };
        let scope = scope.copied().unwrap_or(self.dom.document());
        select::select_all(&self.dom, scope, &list)
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.dom.get_by_id(id)
    }

    fn attribute(&self, element: &NodeId, name: &str) -> Option<String> {
        self.dom.attr(*element, name)
    }

    fn expand(&mut self, element: &NodeId) {
        if self.dom.set_attr(*element, "open", "") {
            self.mutations.push(Mutation::Opened { node: *element });
        }
    }

    fn set_class(&mut self, element: &NodeId, class: &str, on: bool) {
        if !self.dom.set_class(*element, class, on) {
            return;
        }
        let node = *element;
        let class = class.to_string();
        self.mutations.push(if on {
            Mutation::ClassAdded { node, class }
        } else {
            Mutation::ClassRemoved { node, class }
        });
    }

    fn offset_top(&self, element: &NodeId) -> f64 {
        self.layout.offset(*element).unwrap_or(0.0)
    }

    fn bounding_rect(&self, element: &NodeId) -> Rect {
        let panel = self.panel_rect();
        if Some(*element) == self.panel {
            return panel;
        }
        if let Some(row) = self.rows.iter().position(|r| r == element) {
            let top = panel.top + row as f64 * TOC_ROW_HEIGHT - self.toc_scroll;
            return Rect::new(top, panel.left, panel.width(), TOC_ROW_HEIGHT);
        }
        let top = self.offset_top(element) - self.scroll_y;
        let height = self.layout.height_of(*element).unwrap_or(0.0);
        Rect::new(top, TOC_WIDTH, self.viewport.width - TOC_WIDTH, height)
    }

    fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    fn viewport_width(&self) -> f64 {
        self.viewport.width
    }

    fn scroll_into_view(&mut self, element: &NodeId) {
        let rect = self.bounding_rect(element);
        if self.rows.contains(element) {
            let panel = self.panel_rect();
            let delta = if rect.top < panel.top {
                rect.top - panel.top
            } else if rect.bottom > panel.bottom {
                rect.bottom - panel.bottom
            } else {
                return;
            };
            let top = (self.toc_scroll + delta).clamp(0.0, self.max_toc_scroll());
            if top != self.toc_scroll {
                self.toc_scroll = top;
                self.mutations.push(Mutation::TocScrolled { top });
            }
            return;
        }

        let delta = if rect.top < 0.0 {
            rect.top
        } else if rect.bottom > self.viewport.height {
            rect.bottom - self.viewport.height
        } else {
            return;
        };
        self.scroll_window_to(self.scroll_y + delta);
    }

    fn scroll_window_to(&mut self, top: f64) {
        self.scroll_to(top);
        self.mutations.push(Mutation::WindowScrolled { top: self.scroll_y });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long_toc(count: usize) -> String {
        let links: String = (0..count)
            .map(|i| format!(r##"<li><a href="#s{i}">Section {i}</a></li>"##))
            .collect();
        let sections: String = (0..count)
            .map(|i| format!(r#"<h2 id="s{i}">Section {i}</h2><div style="height: 600px"></div>"#))
            .collect();
        format!(r#"<nav class="toc"><ul>{links}</ul></nav><article class="post-content">{sections}</article>"#)
    }

    #[test]
    fn test_toc_rows_and_panel_geometry() {
        let page = StaticPage::parse(&long_toc(3), Viewport::new(1440.0, 900.0), ".toc").unwrap();
        let links = page.query_all(None, ".toc a");
        assert_eq!(links.len(), 3);

        let second = page.bounding_rect(&links[1]);
        assert_eq!(second.top, DEFAULT_TOC_TOP + TOC_ROW_HEIGHT);
        assert_eq!(second.height(), TOC_ROW_HEIGHT);

        let panel = page.query_one(None, ".toc").unwrap();
        assert_eq!(page.bounding_rect(&panel).bottom, 900.0);
    }

    #[test]
    fn test_content_offsets_skip_panel() {
        let page = StaticPage::parse(&long_toc(3), Viewport::default(), ".toc").unwrap();
        let s1 = page.element_by_id("s1").unwrap();
        assert_eq!(page.offset_top(&s1), 640.0);
    }

    #[test]
    fn test_scroll_into_view_moves_panel_to_nearest_edge() {
        // 40 rows of 28px in a 120px panel.
        let mut page = StaticPage::parse(&long_toc(40), Viewport::new(1440.0, 200.0), ".toc").unwrap();
        let links = page.query_all(None, ".toc a");

        page.scroll_into_view(&links[10]);
        let rect = page.bounding_rect(&links[10]);
        assert_eq!(rect.bottom, 200.0);
        assert_eq!(
            page.mutations(),
            &[Mutation::TocScrolled {
                top: 11.0 * TOC_ROW_HEIGHT - 120.0
            }]
        );

        page.scroll_into_view(&links[0]);
        assert_eq!(page.toc_scroll(), 0.0);
    }

    #[test]
    fn test_toc_top_moves_panel_and_rows() {
        let page = StaticPage::parse(&long_toc(3), Viewport::new(1440.0, 900.0), ".toc")
            .unwrap()
            .with_toc_top(120.0);
        let panel = page.query_one(None, ".toc").unwrap();
        let links = page.query_all(None, ".toc a");

        assert_eq!(page.bounding_rect(&panel).top, 120.0);
        assert_eq!(page.bounding_rect(&links[0]).top, 120.0);
        assert_eq!(page.bounding_rect(&links[2]).top, 120.0 + 2.0 * TOC_ROW_HEIGHT);
    }

    #[test]
    fn test_set_viewport_clamps_scroll() {
        // Two sections of 640px each: 1280px tall document.
        let mut page = StaticPage::parse(&long_toc(2), Viewport::new(1440.0, 400.0), ".toc").unwrap();
        page.scroll_to(880.0);
        assert_eq!(page.scroll_y(), 880.0);

        page.set_viewport(Viewport::new(1024.0, 900.0));
        assert_eq!(page.scroll_y(), 380.0);
        assert_eq!(page.viewport_width(), 1024.0);
        assert!(page.mutations().is_empty());
    }

    #[test]
    fn test_window_scroll_is_clamped() {
        let mut page = StaticPage::parse(&long_toc(2), Viewport::new(1440.0, 900.0), ".toc").unwrap();
        // Two sections of 640px each: 1280px tall document.
        page.scroll_window_to(5000.0);
        assert_eq!(page.scroll_y(), 380.0);
        page.scroll_window_to(-50.0);
        assert_eq!(page.scroll_y(), 0.0);
        assert_eq!(
            page.take_mutations(),
            vec![
                Mutation::WindowScrolled { top: 380.0 },
                Mutation::WindowScrolled { top: 0.0 }
            ]
        );
    }

    #[test]
    fn test_invalid_query_matches_nothing() {
        let page = StaticPage::parse(&long_toc(1), Viewport::default(), ".toc").unwrap();
        assert!(page.query_all(None, "a >").is_empty());
        assert_eq!(page.query_one(None, "a >"), None);
    }

    #[test]
    fn test_parse_rejects_bad_panel_selector() {
        assert!(StaticPage::parse("<p></p>", Viewport::default(), "..toc").is_err());
    }
}
