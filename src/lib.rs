//! # tocspy
//!
//! Keeps a documentation page's table of contents in step with the reader:
//! the TOC link for the section currently on screen gets an `active` class,
//! and on desktop-width windows the TOC panel scrolls to keep it visible.
//!
//! ## Features
//!
//! - Lookahead-biased heading tracking that tolerates sticky headers
//! - One recomputation per animation frame while scrolling
//! - Smooth in-page navigation from TOC clicks
//! - Runs in the browser (`wasm` feature) or natively over parsed HTML
//!
//! ## Quick Start
//!
//! The core is written against the [`Host`] trait. Natively, a
//! [`dom::StaticPage`] provides one:
//!
//! ```
//! use tocspy::dom::{StaticPage, Viewport};
//! use tocspy::{Controller, SpyConfig, Update};
//!
//! let html = r##"
//!     <aside class="toc"><details><a href="#setup">Setup</a></details></aside>
//!     <main class="post-content"><h2 id="setup">Setup</h2></main>
//! "##;
//! let page = StaticPage::parse(html, Viewport::default(), ".toc").unwrap();
//! let mut spy = Controller::install(page, SpyConfig::default()).unwrap();
//!
//! // The initial position was highlighted during install.
//! assert_eq!(spy.on_resize(), Update::Unchanged);
//! ```
//!
//! In the browser, build with `--features wasm` and call
//! `installScrollSpy()` from JavaScript (or enable `autostart`).

pub mod config;
pub mod controller;
pub mod dom;
pub mod error;
pub mod host;
pub mod spy;
pub mod throttle;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use config::SpyConfig;
pub use controller::Controller;
pub use error::{Error, Result};
pub use host::{Host, ReadyState, Rect};
pub use spy::{ClickOutcome, Heading, Inactive, ScrollSpy, TocLink, Update, current_heading};
pub use throttle::FrameThrottle;
