//! Wires a [`BrowserHost`] to a [`Controller`] for the lifetime of the page.

use crate::host::{BrowserHost, Inbox, SharedInbox};
use app_api::PageHost;
use bus::PageEvent;
use runtime_toc::{Controller, TocConfig};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Event;

struct Runtime {
    host: BrowserHost,
    controller: Controller,
}

impl Runtime {
    fn drain(&mut self, inbox: &SharedInbox) {
        inbox.borrow_mut().begin_drain();
        loop {
            let next = inbox.borrow_mut().events.pop();
            let Some(event) = next else {
                break;
            };
            log::trace!(target: "platform.runtime", "dispatch {}", event.kind());
            if let PageEvent::TimerFired(id) = &event {
                self.host.timer_fired(*id);
            }
            self.controller.on_page_event(&mut self.host, event);
        }
    }
}

/// Start the engine on the current page. The runtime stays alive until the
/// page goes away; `pagehide` shuts it down.
pub fn run(config: TocConfig) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window.document().ok_or_else(|| JsValue::from_str("no document"))?;

    let inbox: SharedInbox = Rc::new(RefCell::new(Inbox::default()));
    let host = BrowserHost::new(window.clone(), document, inbox.clone(), &config.panel.dom_id);
    host.install_panel_clicks()?;
    if host.is_loading() {
        host.listen_dom_ready()?;
    }

    let runtime = Rc::new(RefCell::new(Runtime {
        host,
        controller: Controller::new(config),
    }));

    let pump = {
        let runtime = runtime.clone();
        let inbox = inbox.clone();
        // a failed borrow means a drain is already running and will see the events
        Closure::<dyn FnMut()>::new(move || {
            if let Ok(mut runtime) = runtime.try_borrow_mut() {
                runtime.drain(&inbox);
            }
        })
    };
    inbox.borrow_mut().set_pump(pump.as_ref().unchecked_ref::<js_sys::Function>().clone());
    pump.forget();

    {
        let mut guard = runtime.borrow_mut();
        let Runtime { host, controller } = &mut *guard;
        controller.start(host);
    }

    let on_hide = {
        let runtime = runtime.clone();
        Closure::<dyn FnMut(Event)>::new(move |_| {
            if let Ok(mut guard) = runtime.try_borrow_mut() {
                let Runtime { host, controller } = &mut *guard;
                controller.shutdown(host);
            }
        })
    };
    window.add_event_listener_with_callback("pagehide", on_hide.as_ref().unchecked_ref())?;
    on_hide.forget();

    // anything queued while starting
    runtime.borrow_mut().drain(&inbox);
    Ok(())
}

