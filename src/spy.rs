//! Active-link tracking for a table of contents.
//!
//! [`ScrollSpy`] snapshots the TOC links and the headings they point to,
//! then on every [`ScrollSpy::update`] decides which heading the reader is
//! in and moves the active class to the matching link.

use std::fmt;

use log::{debug, trace};

use crate::config::SpyConfig;
use crate::host::Host;

/// An anchor inside the TOC container.
#[derive(Debug, Clone)]
pub struct TocLink<E> {
    pub element: E,
    /// Raw `href` attribute, compared verbatim against `#id`.
    pub href: Option<String>,
}

impl<E> TocLink<E> {
    fn targets(&self, fragment: &str) -> bool {
        self.href.as_deref() == Some(fragment)
    }
}

/// A content heading referenced by at least one TOC link.
#[derive(Debug, Clone)]
pub struct Heading<E> {
    pub element: E,
    pub id: String,
}

/// Why a page did not activate the scroll spy.
///
/// Not an error: the page just keeps its default behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inactive {
    /// No element matches the TOC selector.
    MissingToc,
    /// The TOC contains no links.
    NoLinks,
    /// No content heading is referenced by a TOC link.
    NoHeadings,
}

impl fmt::Display for Inactive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingToc => f.write_str("no table of contents on the page"),
            Self::NoLinks => f.write_str("table of contents has no links"),
            Self::NoHeadings => f.write_str("no content heading is linked from the table of contents"),
        }
    }
}

/// Result of one active-link computation.
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    /// The resolved link was already active; nothing was written.
    Unchanged,
    /// No heading or no matching link could be resolved; nothing was written.
    NoTarget,
    /// The active class moved to a new link.
    Activated {
        /// Id of the heading now current.
        heading: String,
        /// Index of the newly active link.
        link: usize,
        /// Whether the TOC panel was scrolled to keep the link visible.
        revealed: bool,
    },
}

/// What a click on a TOC link should do.
#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    /// Suppress default navigation and scroll the window to `top`.
    Navigate { target: String, top: f64 },
    /// Let the browser follow the link.
    Default,
}

/// Index of the heading the reader is currently in.
///
/// `offsets` are heading page offsets in document order and `reference` is
/// the scroll offset plus lookahead. The answer is the last heading at or
/// above the reference point; when the reference point is above the first
/// heading, the first heading is used.
///
/// ```
/// use tocspy::current_heading;
///
/// let offsets = [100.0, 500.0, 900.0];
/// assert_eq!(current_heading(&offsets, 550.0), Some(1));
/// assert_eq!(current_heading(&offsets, 50.0), Some(0));
/// assert_eq!(current_heading(&offsets, 1000.0), Some(2));
/// ```
pub fn current_heading(offsets: &[f64], reference: f64) -> Option<usize> {
    if let Some(index) = offsets.iter().rposition(|&offset| offset <= reference) {
        return Some(index);
    }
    match offsets.first() {
        Some(&first) if reference < first => Some(0),
        _ => None,
    }
}

/// Scroll-synchronized TOC state for one page.
#[derive(Debug)]
pub struct ScrollSpy<E> {
    config: SpyConfig,
    toc: E,
    links: Vec<TocLink<E>>,
    headings: Vec<Heading<E>>,
    active: Option<usize>,
}

impl<E: Clone + PartialEq + fmt::Debug> ScrollSpy<E> {
    /// Locate the TOC and the headings it links to.
    ///
    /// Opens the TOC's collapsible wrapper as a side effect. Does not run
    /// the first [`update`](Self::update); callers do that once listeners
    /// are about to be attached.
    pub fn init<H>(host: &mut H, config: SpyConfig) -> Result<Self, Inactive>
    where
        H: Host<Element = E> + ?Sized,
    {
        let toc = host
            .query_one(None, &config.toc_selector)
            .ok_or(Inactive::MissingToc)?;

        if let Some(wrapper) = host.query_one(Some(&toc), &config.expandable_selector) {
            host.expand(&wrapper);
        }

        let links: Vec<_> = host
            .query_all(Some(&toc), &config.link_selector)
            .into_iter()
            .map(|element| {
                let href = host.attribute(&element, "href");
                TocLink { element, href }
            })
            .collect();
        if links.is_empty() {
            return Err(Inactive::NoLinks);
        }

        let headings: Vec<_> = host
            .query_all(None, &config.heading_selector())
            .into_iter()
            .filter_map(|element| {
                let id = host.attribute(&element, "id")?;
                let fragment = format!("#{id}");
                links
                    .iter()
                    .any(|link| link.targets(&fragment))
                    .then_some(Heading { element, id })
            })
            .collect();
        if headings.is_empty() {
            return Err(Inactive::NoHeadings);
        }

        debug!(
            "scroll spy tracking {} headings across {} TOC links",
            headings.len(),
            links.len()
        );

        Ok(Self {
            config,
            toc,
            links,
            headings,
            active: None,
        })
    }

    /// Recompute the current heading and move the active class if needed.
    pub fn update<H>(&mut self, host: &mut H) -> Update
    where
        H: Host<Element = E> + ?Sized,
    {
        let reference = host.scroll_y() + self.config.lookahead;
        let offsets: Vec<f64> = self
            .headings
            .iter()
            .map(|heading| host.offset_top(&heading.element))
            .collect();

        let Some(index) = current_heading(&offsets, reference) else {
            return Update::NoTarget;
        };
        let heading = self.headings[index].id.clone();
        let fragment = format!("#{heading}");
        let Some(link) = self.links.iter().position(|l| l.targets(&fragment)) else {
            return Update::NoTarget;
        };
        if self.active == Some(link) {
            return Update::Unchanged;
        }

        for other in &self.links {
            host.set_class(&other.element, &self.config.active_class, false);
        }
        host.set_class(&self.links[link].element, &self.config.active_class, true);
        self.active = Some(link);

        let revealed = self.follow(host, link);
        trace!("active heading #{heading} (link {link}, revealed: {revealed})");

        Update::Activated {
            heading,
            link,
            revealed,
        }
    }

    /// Keep the active link inside the TOC panel on desktop-width viewports.
    fn follow<H>(&self, host: &mut H, link: usize) -> bool
    where
        H: Host<Element = E> + ?Sized,
    {
        if host.viewport_width() < self.config.desktop_min_width {
            return false;
        }

        let element = &self.links[link].element;
        let panel = host.bounding_rect(&self.toc);
        let rect = host.bounding_rect(element);
        let margin = self.config.edge_margin;
        if rect.bottom > panel.bottom - margin || rect.top < panel.top + margin {
            host.scroll_into_view(element);
            return true;
        }
        false
    }

    /// Resolve a click on the link at `link` to a navigation target.
    pub fn click_target<H>(&self, host: &H, link: usize) -> ClickOutcome
    where
        H: Host<Element = E> + ?Sized,
    {
        let Some(href) = self.links.get(link).and_then(|l| l.href.as_deref()) else {
            return ClickOutcome::Default;
        };
        // Drop the leading `#` (or whatever the first character is).
        let target = href.char_indices().nth(1).map_or("", |(i, _)| &href[i..]);
        let Some(element) = host.element_by_id(target) else {
            return ClickOutcome::Default;
        };

        ClickOutcome::Navigate {
            target: target.to_string(),
            top: host.offset_top(&element) - self.config.click_offset,
        }
    }

    pub fn config(&self) -> &SpyConfig {
        &self.config
    }

    pub fn toc(&self) -> &E {
        &self.toc
    }

    pub fn links(&self) -> &[TocLink<E>] {
        &self.links
    }

    pub fn headings(&self) -> &[Heading<E>] {
        &self.headings
    }

    /// Index of the active link, if any.
    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn active_link(&self) -> Option<&TocLink<E>> {
        self.active.map(|i| &self.links[i])
    }
}
