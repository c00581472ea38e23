//! Event surface for an installed scroll spy.
//!
//! The browser binding forwards `scroll`, `resize`, animation-frame and
//! link `click` callbacks here; the CLI drives the same methods to simulate
//! a reading session.

use log::debug;

use crate::config::SpyConfig;
use crate::host::Host;
use crate::spy::{ClickOutcome, Inactive, ScrollSpy, Update};
use crate::throttle::FrameThrottle;

/// A host with an active scroll spy attached.
#[derive(Debug)]
pub struct Controller<H: Host> {
    host: H,
    spy: ScrollSpy<H::Element>,
    throttle: FrameThrottle,
}

impl<H: Host> Controller<H> {
    /// Initialize the spy and highlight the initial position.
    ///
    /// On `Err` the page keeps its default behavior and no listener should
    /// be attached.
    pub fn install(mut host: H, config: SpyConfig) -> Result<Self, Inactive> {
        let mut spy = match ScrollSpy::init(&mut host, config) {
            Ok(spy) => spy,
            Err(reason) => {
                debug!("scroll spy inactive: {reason}");
                return Err(reason);
            }
        };
        spy.update(&mut host);

        Ok(Self {
            host,
            spy,
            throttle: FrameThrottle::new(),
        })
    }

    /// Handle a scroll event. Returns `true` when the caller must request an
    /// animation frame and call [`on_animation_frame`](Self::on_animation_frame).
    pub fn on_scroll(&mut self) -> bool {
        self.throttle.try_schedule()
    }

    pub fn on_animation_frame(&mut self) -> Update {
        let update = self.spy.update(&mut self.host);
        self.throttle.complete();
        update
    }

    pub fn on_resize(&mut self) -> Update {
        self.spy.update(&mut self.host)
    }

    /// Handle a click on the TOC link at `link`.
    ///
    /// On [`ClickOutcome::Navigate`] the window scroll has already been
    /// requested and the caller must prevent the default navigation.
    pub fn on_click(&mut self, link: usize) -> ClickOutcome {
        let outcome = self.spy.click_target(&self.host, link);
        if let ClickOutcome::Navigate { top, .. } = &outcome {
            self.host.scroll_window_to(*top);
        }
        outcome
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn spy(&self) -> &ScrollSpy<H::Element> {
        &self.spy
    }
}
