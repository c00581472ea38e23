//! Scroll spy behavior against static pages.
//!
//! Pages pin heading positions with inline `height` styles so offsets are
//! exact: a 100px spacer, then three 400px-tall headings at 100, 500 and 900.

use proptest::prelude::*;

use tocspy::dom::{Mutation, StaticPage, Viewport};
use tocspy::{ClickOutcome, Controller, Host, Inactive, ScrollSpy, SpyConfig, Update};

const ARTICLE: &str = r##"
<html><body>
<nav class="toc">
  <details>
    <summary>Contents</summary>
    <ul>
      <li><a href="#h1">One</a></li>
      <li><a href="#h2">Two</a></li>
      <li><a href="#h3">Three</a></li>
      <li><a href="#missing">Missing</a></li>
      <li><a href="#footer">Footer</a></li>
    </ul>
  </details>
</nav>
<article class="post-content">
  <div style="height: 100px"></div>
  <h2 id="h1" style="height: 400px">One</h2>
  <h2 id="h2" style="height: 400px">Two</h2>
  <h2 id="h3" style="height: 400px">Three</h2>
  <h2 id="untracked">Not in the TOC</h2>
  <div style="height: 2000px"></div>
</article>
<footer id="footer"><h2 id="h-outside">Outside content</h2></footer>
</body></html>
"##;

fn article(viewport: Viewport) -> StaticPage {
    StaticPage::parse(ARTICLE, viewport, ".toc").expect("valid page")
}

fn install(page: StaticPage, config: SpyConfig) -> Controller<StaticPage> {
    Controller::install(page, config).expect("spy should activate")
}

fn active_href(controller: &Controller<StaticPage>) -> Option<&str> {
    controller.spy().active_link().and_then(|link| link.href.as_deref())
}

/// Scroll so that `reference` is the lookahead-adjusted position and deliver the frame.
fn scroll_reference(controller: &mut Controller<StaticPage>, reference: f64) -> Update {
    let lookahead = controller.spy().config().lookahead;
    controller.host_mut().scroll_to(reference - lookahead);
    assert!(controller.on_scroll(), "first scroll of a frame must schedule");
    controller.on_animation_frame()
}

/// Page with `count` sections of 640px each and a matching TOC.
fn long_page(count: usize, viewport: Viewport) -> StaticPage {
    let links: String = (0..count)
        .map(|i| format!(r##"<li><a href="#s{i}">Section {i}</a></li>"##))
        .collect();
    let sections: String = (0..count)
        .map(|i| format!(r#"<h2 id="s{i}">Section {i}</h2><div style="height: 600px"></div>"#))
        .collect();
    let html = format!(
        r#"<nav class="toc"><ul>{links}</ul></nav><article class="post-content">{sections}</article>"#
    );
    StaticPage::parse(&html, viewport, ".toc").expect("valid page")
}

#[test]
fn test_tracks_only_linked_content_headings() {
    let controller = install(article(Viewport::default()), SpyConfig::default());
    let ids: Vec<_> = controller
        .spy()
        .headings()
        .iter()
        .map(|h| h.id.as_str())
        .collect();
    assert_eq!(ids, vec!["h1", "h2", "h3"]);
    assert_eq!(controller.spy().links().len(), 5);
}

#[test]
fn test_heading_offsets() {
    let page = article(Viewport::default());
    let offsets: Vec<_> = ["h1", "h2", "h3"]
        .iter()
        .map(|id| page.offset_top(&page.element_by_id(id).unwrap()))
        .collect();
    assert_eq!(offsets, vec![100.0, 500.0, 900.0]);
}

#[test]
fn test_initial_position_is_highlighted() {
    let controller = install(article(Viewport::default()), SpyConfig::default());
    // scroll 0 + lookahead 120 is past the first heading at 100
    assert_eq!(active_href(&controller), Some("#h1"));
    assert_eq!(controller.host().with_class("active").len(), 1);
}

#[test]
fn test_reference_points() {
    let mut controller = install(article(Viewport::default()), SpyConfig::default());

    let update = scroll_reference(&mut controller, 550.0);
    assert!(matches!(update, Update::Activated { ref heading, .. } if heading == "h2"));
    assert_eq!(active_href(&controller), Some("#h2"));

    scroll_reference(&mut controller, 1000.0);
    assert_eq!(active_href(&controller), Some("#h3"));

    // Far past the last heading still resolves to it.
    scroll_reference(&mut controller, 2400.0);
    assert_eq!(active_href(&controller), Some("#h3"));
}

#[test]
fn test_falls_back_to_first_heading_above_content() {
    let config = SpyConfig {
        lookahead: 50.0,
        ..SpyConfig::default()
    };
    let controller = install(article(Viewport::default()), config);
    // Reference point 50 is above the first heading at 100.
    assert_eq!(active_href(&controller), Some("#h1"));
}

#[test]
fn test_recompute_without_scroll_writes_nothing() {
    let mut controller = install(article(Viewport::default()), SpyConfig::default());
    scroll_reference(&mut controller, 550.0);
    controller.host_mut().take_mutations();

    assert_eq!(controller.on_resize(), Update::Unchanged);
    assert!(controller.on_scroll());
    assert_eq!(controller.on_animation_frame(), Update::Unchanged);
    assert!(controller.host().mutations().is_empty());
}

#[test]
fn test_resize_recomputes_while_frame_pending() {
    let mut controller = install(article(Viewport::default()), SpyConfig::default());

    controller.host_mut().scroll_to(430.0);
    assert!(controller.on_scroll());
    assert!(matches!(
        controller.on_resize(),
        Update::Activated { ref heading, .. } if heading == "h2"
    ));
    assert_eq!(active_href(&controller), Some("#h2"));

    // The pending frame finds nothing left to do and releases the throttle.
    assert_eq!(controller.on_animation_frame(), Update::Unchanged);
    assert!(controller.on_scroll());
}

#[test]
fn test_resize_to_desktop_reveals_new_active_link() {
    // 40 sections of 640px: 25600px tall document.
    let mut controller = install(long_page(40, Viewport::new(1024.0, 400.0)), SpyConfig::default());
    controller.host_mut().scroll_to(25_200.0);
    assert!(controller.on_scroll());
    assert!(matches!(
        controller.on_animation_frame(),
        Update::Activated { link: 39, revealed: false, .. }
    ));
    controller.host_mut().take_mutations();

    // Widening alone keeps the same heading, so nothing is written.
    controller.host_mut().set_viewport(Viewport::new(1440.0, 400.0));
    assert_eq!(controller.on_resize(), Update::Unchanged);
    assert!(controller.host().mutations().is_empty());

    // A taller window clamps the scroll offset back into section 38.
    controller.host_mut().set_viewport(Viewport::new(1440.0, 900.0));
    assert_eq!(controller.host().scroll_y(), 24_700.0);
    assert!(matches!(
        controller.on_resize(),
        Update::Activated { link: 38, revealed: true, .. }
    ));
    assert!(
        controller
            .host()
            .mutations()
            .iter()
            .any(|m| matches!(m, Mutation::TocScrolled { .. }))
    );
    let link = controller.spy().active_link().unwrap().element;
    assert_eq!(controller.host().bounding_rect(&link).bottom, 900.0);
}

#[test]
fn test_template_headings_are_not_tracked() {
    let html = r##"
        <nav class="toc"><a href="#a">A</a><a href="#t">T</a></nav>
        <article class="post-content">
          <h2 id="a" style="height: 500px">A</h2>
          <template><h2 id="t">T</h2></template>
        </article>
    "##;
    let page = StaticPage::parse(html, Viewport::default(), ".toc").unwrap();
    let mut controller = install(page, SpyConfig::default());

    let ids: Vec<_> = controller.spy().headings().iter().map(|h| h.id.as_str()).collect();
    assert_eq!(ids, vec!["a"]);
    assert_eq!(active_href(&controller), Some("#a"));
    assert_eq!(controller.on_click(1), ClickOutcome::Default);
}

#[test]
fn test_table_misnesting_keeps_heading_order() {
    let html = r##"
        <nav class="toc"><a href="#a">A</a><a href="#b">B</a></nav>
        <div class="post-content">
          <table><h2 id="a">A</h2><tr><td><h2 id="b">B</h2></td></tr></table>
        </div>
    "##;
    let page = StaticPage::parse(html, Viewport::default(), ".toc").unwrap();
    let controller = install(page, SpyConfig::default());

    let headings = controller.spy().headings();
    let ids: Vec<_> = headings.iter().map(|h| h.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
    let offsets: Vec<_> = headings
        .iter()
        .map(|h| controller.host().offset_top(&h.element))
        .collect();
    assert!(offsets[0] < offsets[1], "offsets out of order: {offsets:?}");
}

#[test]
fn test_empty_fragment_uses_default_navigation() {
    let html = r##"
        <nav class="toc"><a href="#">Top</a><a href="#a">A</a></nav>
        <article class="post-content"><div id=""></div><h2 id="a">A</h2></article>
    "##;
    let page = StaticPage::parse(html, Viewport::default(), ".toc").unwrap();
    let mut controller = install(page, SpyConfig::default());
    assert_eq!(controller.on_click(0), ClickOutcome::Default);
    assert!(controller.host().mutations().iter().all(|m| !matches!(m, Mutation::WindowScrolled { .. })));
}

#[test]
fn test_activation_moves_class() {
    let mut controller = install(article(Viewport::default()), SpyConfig::default());
    controller.host_mut().take_mutations();
    scroll_reference(&mut controller, 550.0);

    let links: Vec<_> = controller
        .spy()
        .links()
        .iter()
        .map(|l| l.element)
        .collect();
    let mutations = controller.host().mutations();
    assert!(mutations.contains(&Mutation::ClassRemoved {
        node: links[0],
        class: "active".to_string()
    }));
    assert!(mutations.contains(&Mutation::ClassAdded {
        node: links[1],
        class: "active".to_string()
    }));
    assert_eq!(controller.host().with_class("active"), vec![links[1]]);
}

#[test]
fn test_unmatched_link_never_activates() {
    let mut controller = install(article(Viewport::default()), SpyConfig::default());
    let missing = controller.spy().links()[3].element;
    let footer = controller.spy().links()[4].element;

    for reference in (0..3000).step_by(50) {
        scroll_reference(&mut controller, reference as f64 + 120.0);
        let active = controller.spy().active_link().map(|l| l.element);
        assert_ne!(active, Some(missing));
        assert_ne!(active, Some(footer));
    }
}

#[test]
fn test_click_scrolls_with_header_clearance() {
    let mut controller = install(article(Viewport::default()), SpyConfig::default());
    controller.host_mut().take_mutations();

    let outcome = controller.on_click(1);
    assert_eq!(
        outcome,
        ClickOutcome::Navigate {
            target: "h2".to_string(),
            top: 400.0
        }
    );
    assert_eq!(
        controller.host().mutations(),
        &[Mutation::WindowScrolled { top: 400.0 }]
    );
    assert_eq!(controller.host().scroll_y(), 400.0);
}

#[test]
fn test_click_on_unknown_target_uses_default_navigation() {
    let mut controller = install(article(Viewport::default()), SpyConfig::default());
    controller.host_mut().take_mutations();

    assert_eq!(controller.on_click(3), ClickOutcome::Default);
    assert_eq!(controller.on_click(99), ClickOutcome::Default);
    assert!(controller.host().mutations().is_empty());
}

#[test]
fn test_click_resolves_any_element_id() {
    // The footer is not a tracked heading, but it exists in the document.
    let mut controller = install(article(Viewport::default()), SpyConfig::default());
    assert!(matches!(
        controller.on_click(4),
        ClickOutcome::Navigate { ref target, .. } if target == "footer"
    ));
}

#[test]
fn test_details_forced_open() {
    let mut page = article(Viewport::default());
    let spy = ScrollSpy::init(&mut page, SpyConfig::default()).expect("active");
    let details = page.query_one(Some(spy.toc()), "details").unwrap();

    assert_eq!(page.mutations(), &[Mutation::Opened { node: details }]);
    assert_eq!(page.attribute(&details, "open").as_deref(), Some(""));
}

#[test]
fn test_already_open_details_not_rewritten() {
    let html = ARTICLE.replace("<details>", "<details open>");
    let mut page = StaticPage::parse(&html, Viewport::default(), ".toc").unwrap();
    ScrollSpy::init(&mut page, SpyConfig::default()).expect("active");
    assert!(page.mutations().is_empty());
}

#[test]
fn test_missing_toc_is_silent() {
    let html = ARTICLE.replace(r#"class="toc""#, r#"class="sidebar""#);
    let mut page = StaticPage::parse(&html, Viewport::default(), ".toc").unwrap();

    let result = Controller::install(&mut page, SpyConfig::default());
    assert!(matches!(result, Err(Inactive::MissingToc)));
    assert!(page.mutations().is_empty());
    assert!(page.with_class("active").is_empty());
}

#[test]
fn test_toc_without_links() {
    let html = r#"<nav class="toc"><p>Nothing here</p></nav><article class="post-content"><h2 id="a">A</h2></article>"#;
    let mut page = StaticPage::parse(html, Viewport::default(), ".toc").unwrap();
    assert!(matches!(
        ScrollSpy::init(&mut page, SpyConfig::default()),
        Err(Inactive::NoLinks)
    ));
}

#[test]
fn test_no_linked_headings() {
    let html = r##"<nav class="toc"><a href="#b">B</a></nav><article class="post-content"><h2 id="a">A</h2></article>"##;
    let mut page = StaticPage::parse(html, Viewport::default(), ".toc").unwrap();
    assert!(matches!(
        ScrollSpy::init(&mut page, SpyConfig::default()),
        Err(Inactive::NoHeadings)
    ));
}

#[test]
fn test_duplicate_links_activate_first() {
    let html = ARTICLE.replace(
        r##"<li><a href="#missing">Missing</a></li>"##,
        r##"<li><a href="#h2">Two again</a></li>"##,
    );
    let page = StaticPage::parse(&html, Viewport::default(), ".toc").unwrap();
    let mut controller = install(page, SpyConfig::default());
    scroll_reference(&mut controller, 550.0);

    assert_eq!(controller.spy().active_index(), Some(1));
    assert_eq!(controller.host().with_class("active").len(), 1);
}

#[test]
fn test_scroll_throttled_to_one_frame() {
    let mut controller = install(article(Viewport::default()), SpyConfig::default());

    controller.host_mut().scroll_to(300.0);
    assert!(controller.on_scroll());
    controller.host_mut().scroll_to(430.0);
    assert!(!controller.on_scroll());
    assert!(!controller.on_scroll());

    // The single frame sees the latest position.
    assert!(matches!(
        controller.on_animation_frame(),
        Update::Activated { ref heading, .. } if heading == "h2"
    ));
    assert!(controller.on_scroll());
}

#[test]
fn test_desktop_keeps_active_link_in_panel() {
    let mut controller = install(long_page(40, Viewport::new(1440.0, 400.0)), SpyConfig::default());
    controller.host_mut().take_mutations();

    let update = scroll_reference(&mut controller, 20.0 * 640.0);
    assert!(matches!(update, Update::Activated { link: 20, revealed: true, .. }));
    assert!(
        controller
            .host()
            .mutations()
            .iter()
            .any(|m| matches!(m, Mutation::TocScrolled { .. }))
    );

    let link = controller.spy().active_link().unwrap().element;
    let rect = controller.host().bounding_rect(&link);
    assert_eq!(rect.bottom, 400.0);
}

#[test]
fn test_desktop_leaves_visible_link_alone() {
    let mut controller = install(long_page(40, Viewport::new(1440.0, 900.0)), SpyConfig::default());
    controller.host_mut().take_mutations();

    let update = scroll_reference(&mut controller, 2.0 * 640.0);
    assert!(matches!(update, Update::Activated { link: 2, revealed: false, .. }));
    assert_eq!(controller.host().toc_scroll(), 0.0);
}

#[test]
fn test_narrow_viewport_never_scrolls_panel() {
    let mut controller = install(long_page(40, Viewport::new(1024.0, 400.0)), SpyConfig::default());
    controller.host_mut().take_mutations();

    let update = scroll_reference(&mut controller, 20.0 * 640.0);
    assert!(matches!(update, Update::Activated { link: 20, revealed: false, .. }));
    assert_eq!(controller.host().toc_scroll(), 0.0);
    assert!(
        !controller
            .host()
            .mutations()
            .iter()
            .any(|m| matches!(m, Mutation::TocScrolled { .. }))
    );
    assert_eq!(controller.host().with_class("active").len(), 1);
}

#[test]
fn test_custom_selectors_and_class() {
    let html = r##"
        <aside id="contents"><a href="#one">One</a><a href="#two">Two</a></aside>
        <main><h3 id="one" style="height: 1000px">One</h3><h3 id="two">Two</h3><div style="height: 1000px"></div></main>
    "##;
    let config = SpyConfig {
        toc_selector: "#contents".to_string(),
        content_selector: "main".to_string(),
        active_class: "current".to_string(),
        ..SpyConfig::default()
    };
    let page = StaticPage::parse(html, Viewport::default(), &config.toc_selector).unwrap();
    let mut controller = install(page, config);

    scroll_reference(&mut controller, 1000.0);
    assert_eq!(active_href(&controller), Some("#two"));
    assert_eq!(controller.host().with_class("current").len(), 1);
    assert!(controller.host().with_class("active").is_empty());
}

proptest! {
    #[test]
    fn prop_at_most_one_active_link(positions in prop::collection::vec(0.0f64..3000.0, 1..40)) {
        let mut controller = install(article(Viewport::default()), SpyConfig::default());
        for y in positions {
            controller.host_mut().scroll_to(y);
            if controller.on_scroll() {
                controller.on_animation_frame();
            }
            prop_assert!(controller.host().with_class("active").len() <= 1);
            prop_assert!(controller.spy().active_index().is_some());
        }
    }
}
