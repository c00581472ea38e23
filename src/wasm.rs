//! WASM bindings for running the scroll spy in the browser.
//!
//! [`BrowserHost`] implements [`Host`] over `web-sys`, and
//! `installScrollSpy` wires the window's `scroll` and `resize` events and
//! each TOC link's `click` event to a [`Controller`]. Listeners live for the
//! lifetime of the page.

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{
    AddEventListenerOptions, Document, Element, Event, EventTarget, HtmlDetailsElement,
    HtmlElement, ScrollBehavior, ScrollIntoViewOptions, ScrollLogicalPosition, ScrollToOptions,
    Window,
};

use crate::config::SpyConfig;
use crate::controller::Controller;
use crate::error::{Error, Result};
use crate::host::{Host, ReadyState, Rect};
use crate::spy::ClickOutcome;

type Shared = Rc<RefCell<Controller<BrowserHost>>>;

/// Initialize panic hook (and console logging) when the module loads.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();

    #[cfg(feature = "console-logging")]
    console_log::init_with_level(log::Level::Debug).ok();

    #[cfg(feature = "autostart")]
    if let Err(e) = install(SpyConfig::default()) {
        warn!("scroll spy not installed: {e}");
    }
}

/// Install the scroll spy on the current page.
///
/// `config` is an optional object with any [`SpyConfig`] field. Activation
/// happens now if the document has finished loading, otherwise on
/// `DOMContentLoaded`. A page without a usable TOC is left untouched.
#[wasm_bindgen(js_name = installScrollSpy)]
pub fn install_scroll_spy(config: JsValue) -> std::result::Result<(), JsValue> {
    let config = if config.is_undefined() || config.is_null() {
        SpyConfig::default()
    } else {
        serde_wasm_bindgen::from_value(config).map_err(|e| JsValue::from_str(&e.to_string()))?
    };
    config.validate().map_err(|e| JsValue::from_str(&e.to_string()))?;
    install(config).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn install(config: SpyConfig) -> Result<()> {
    let window = web_sys::window().ok_or_else(|| Error::Js("no window".to_string()))?;
    let document = window
        .document()
        .ok_or_else(|| Error::Js("no document".to_string()))?;

    if ReadyState::parse(&document.ready_state()).must_defer() {
        let deferred = BrowserHost::new(window, document.clone());
        let on_ready = Closure::once_into_js(move || {
            if let Err(e) = activate(deferred, config) {
                warn!("scroll spy not installed: {e}");
            }
        });
        document
            .add_event_listener_with_callback("DOMContentLoaded", on_ready.unchecked_ref())
            .map_err(js_error)?;
        return Ok(());
    }

    activate(BrowserHost::new(window, document), config)
}

fn activate(host: BrowserHost, config: SpyConfig) -> Result<()> {
    let window = host.window.clone();
    let Ok(controller) = Controller::install(host, config) else {
        return Ok(());
    };
    let links: Vec<Element> = controller
        .spy()
        .links()
        .iter()
        .map(|link| link.element.clone())
        .collect();
    let shared: Shared = Rc::new(RefCell::new(controller));

    bind_scroll(&window, &shared)?;
    bind_resize(&window, &shared)?;
    bind_clicks(&links, &shared)?;
    debug!("scroll spy installed on {} TOC links", links.len());
    Ok(())
}

fn passive() -> AddEventListenerOptions {
    let options = AddEventListenerOptions::new();
    options.set_passive(true);
    options
}

fn listen(
    target: &EventTarget,
    event: &str,
    callback: Closure<dyn FnMut(Event)>,
    options: Option<&AddEventListenerOptions>,
) -> Result<()> {
    let function = callback.as_ref().unchecked_ref();
    match options {
        Some(options) => target
            .add_event_listener_with_callback_and_add_event_listener_options(event, function, options),
        None => target.add_event_listener_with_callback(event, function),
    }
    .map_err(js_error)?;
    callback.forget();
    Ok(())
}

fn bind_scroll(window: &Window, shared: &Shared) -> Result<()> {
    // One frame callback, reused for every scheduled frame.
    let frame: js_sys::Function = {
        let shared = shared.clone();
        Closure::wrap(Box::new(move || {
            if let Ok(mut controller) = shared.try_borrow_mut() {
                controller.on_animation_frame();
            }
        }) as Box<dyn FnMut()>)
        .into_js_value()
        .unchecked_into()
    };

    let shared = shared.clone();
    let frame_window = window.clone();
    let on_scroll = Closure::wrap(Box::new(move |_event: Event| {
        let Ok(mut controller) = shared.try_borrow_mut() else {
            return;
        };
        if controller.on_scroll() && frame_window.request_animation_frame(&frame).is_err() {
            controller.on_animation_frame();
        }
    }) as Box<dyn FnMut(Event)>);

    listen(window, "scroll", on_scroll, Some(&passive()))
}

fn bind_resize(window: &Window, shared: &Shared) -> Result<()> {
    let shared = shared.clone();
    let on_resize = Closure::wrap(Box::new(move |_event: Event| {
        if let Ok(mut controller) = shared.try_borrow_mut() {
            controller.on_resize();
        }
    }) as Box<dyn FnMut(Event)>);

    listen(window, "resize", on_resize, Some(&passive()))
}

fn bind_clicks(links: &[Element], shared: &Shared) -> Result<()> {
    for (index, link) in links.iter().enumerate() {
        let shared = shared.clone();
        let on_click = Closure::wrap(Box::new(move |event: Event| {
            let Ok(mut controller) = shared.try_borrow_mut() else {
                return;
            };
            if let ClickOutcome::Navigate { .. } = controller.on_click(index) {
                event.prevent_default();
            }
        }) as Box<dyn FnMut(Event)>);

        listen(link, "click", on_click, None)?;
    }
    Ok(())
}

fn js_error(value: JsValue) -> Error {
    Error::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
}

/// The live browser document.
#[derive(Debug, Clone)]
pub struct BrowserHost {
    window: Window,
    document: Document,
}

impl BrowserHost {
    pub fn new(window: Window, document: Document) -> Self {
        Self { window, document }
    }
}

impl Host for BrowserHost {
    type Element = Element;

    fn query_one(&self, scope: Option<&Element>, selector: &str) -> Option<Element> {
        let found = match scope {
            Some(scope) => scope.query_selector(selector),
            None => self.document.query_selector(selector),
        };
        found
            .inspect_err(|e| warn!("querySelector({selector:?}) failed: {e:?}"))
            .ok()
            .flatten()
    }

    fn query_all(&self, scope: Option<&Element>, selector: &str) -> Vec<Element> {
        let found = match scope {
            Some(scope) => scope.query_selector_all(selector),
            None => self.document.query_selector_all(selector),
        };
        let Ok(list) = found.inspect_err(|e| warn!("querySelectorAll({selector:?}) failed: {e:?}"))
        else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn element_by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn attribute(&self, element: &Element, name: &str) -> Option<String> {
        element.get_attribute(name)
    }

    fn expand(&mut self, element: &Element) {
        if let Some(details) = element.dyn_ref::<HtmlDetailsElement>() {
            details.set_open(true);
        }
    }

    fn set_class(&mut self, element: &Element, class: &str, on: bool) {
        let classes = element.class_list();
        let result = if on {
            classes.add_1(class)
        } else {
            classes.remove_1(class)
        };
        if let Err(e) = result {
            warn!("classList update failed: {e:?}");
        }
    }

    fn offset_top(&self, element: &Element) -> f64 {
        element
            .dyn_ref::<HtmlElement>()
            .map_or(0.0, |e| e.offset_top() as f64)
    }

    fn bounding_rect(&self, element: &Element) -> Rect {
        let rect = element.get_bounding_client_rect();
        Rect {
            top: rect.top(),
            bottom: rect.bottom(),
            left: rect.left(),
            right: rect.right(),
        }
    }

    fn scroll_y(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn viewport_width(&self) -> f64 {
        self.window
            .inner_width()
            .ok()
            .and_then(|width| width.as_f64())
            .unwrap_or(0.0)
    }

    fn scroll_into_view(&mut self, element: &Element) {
        let options = ScrollIntoViewOptions::new();
        options.set_behavior(ScrollBehavior::Smooth);
        options.set_block(ScrollLogicalPosition::Nearest);
        options.set_inline(ScrollLogicalPosition::Nearest);
        element.scroll_into_view_with_scroll_into_view_options(&options);
    }

    fn scroll_window_to(&mut self, top: f64) {
        let options = ScrollToOptions::new();
        options.set_top(top);
        options.set_behavior(ScrollBehavior::Smooth);
        self.window.scroll_to_with_scroll_to_options(&options);
    }
}
