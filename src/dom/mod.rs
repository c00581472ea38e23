//! Static HTML pages as scroll spy hosts.
//!
//! Parses a page with html5ever into an arena DOM, answers selector queries
//! through the `selectors` crate and estimates geometry with a simple block
//! flow. This lets the scroll spy run natively: in the CLI, in tests and in
//! benchmarks.
//!
//! ```
//! use tocspy::dom::{StaticPage, Viewport};
//! use tocspy::{Controller, SpyConfig};
//!
//! let html = r##"
//!     <nav class="toc"><a href="#intro">Intro</a><a href="#usage">Usage</a></nav>
//!     <article class="post-content">
//!         <h2 id="intro">Intro</h2><div style="height: 800px"></div>
//!         <h2 id="usage">Usage</h2><div style="height: 800px"></div>
//!     </article>
//! "##;
//! let page = StaticPage::parse(html, Viewport::default(), ".toc").unwrap();
//! let mut spy = Controller::install(page, SpyConfig::default()).unwrap();
//!
//! spy.host_mut().scroll_to(760.0);
//! if spy.on_scroll() {
//!     spy.on_animation_frame();
//! }
//! let active = spy.spy().active_link().unwrap();
//! assert_eq!(active.href.as_deref(), Some("#usage"));
//! ```

mod arena;
mod layout;
mod page;
pub mod select;
mod tree_sink;

pub use arena::{Attribute, NodeData, NodeId, PageDom};
pub use layout::PageLayout;
pub use page::{DEFAULT_TOC_TOP, Mutation, StaticPage, TOC_ROW_HEIGHT, Viewport};

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;

use tree_sink::PageSink;

/// Parse an HTML document into a [`PageDom`].
pub fn parse_html(html: &str) -> PageDom {
    parse_document(PageSink::new(), ParseOpts::default())
        .from_utf8()
        .one(html.as_bytes())
        .into_dom()
}
