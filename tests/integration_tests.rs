//! Integration tests for the analog clock element
//!
//! These drive the element through its full lifecycle with a hand-fired
//! timer service, a fixed clock and an in-process messaging client.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use analog_clock_widget::update::{TickCallback, TimerHandle};
use analog_clock_widget::{
    change_color_payload, ChronoLocaleFormatter, ClockElement, Color, Config, CustomElement,
    ElementContext, ExternalClient, FixedTimeSource, LoopbackClient, ManualTimers, Moment,
    TimerService, CHANGE_COLOR_EVENT, CUSTOM_CLOCK_EVENT,
};
use serde_json::json;

struct Fixture {
    timers: Rc<ManualTimers>,
    clock: Rc<FixedTimeSource>,
    element: ClockElement,
}

fn fixture() -> Fixture {
    fixture_with(Config::default())
}

fn fixture_with(config: Config) -> Fixture {
    let timers = Rc::new(ManualTimers::new());
    let clock = Rc::new(FixedTimeSource::new(Moment::from_hms(9, 5, 7).unwrap()));
    let context = ElementContext::new(timers.clone())
        .with_time_source(clock.clone())
        .with_formatter(Rc::new(ChronoLocaleFormatter::default()));
    let element = ClockElement::new("analog-clock", context, config);
    Fixture {
        timers,
        clock,
        element,
    }
}

fn as_client(loopback: &Rc<LoopbackClient>) -> Rc<dyn ExternalClient> {
    loopback.clone()
}

/// A client with no optional capabilities
struct BareClient;

impl ExternalClient for BareClient {}

fn accent_css(element: &ClockElement) -> String {
    element.view().unwrap().borrow().accent().to_css()
}

#[test]
fn test_connect_renders_and_ticks() {
    let mut f = fixture();
    f.element.connected().unwrap();

    assert!(f.element.is_connected());
    assert!(f.element.is_ticking());
    assert_eq!(f.timers.active_timers(), 1);

    let view = f.element.view().unwrap();
    assert_eq!(view.borrow().readout().time, "09:05:07 AM");
    assert_eq!(view.borrow().readout().date, "Monday, January 6, 2025");

    f.clock.advance(1);
    assert_eq!(f.timers.fire_all(), 1);
    assert_eq!(view.borrow().readout().time, "09:05:08 AM");
    assert_eq!(view.borrow().angles().second_deg, 8.0 * 6.0 - 90.0);
}

#[test]
fn test_disconnect_releases_everything() {
    let loopback = Rc::new(LoopbackClient::new());
    let mut f = fixture();
    f.element.set_client(Some(as_client(&loopback))).unwrap();
    f.element.connected().unwrap();
    assert_eq!(loopback.total_handlers(), 2);

    f.element.disconnected();
    assert!(!f.element.is_connected());
    assert!(!f.element.is_ticking());
    assert!(f.element.view().is_none());
    assert_eq!(f.timers.active_timers(), 0);
    assert_eq!(loopback.total_handlers(), 0);
    assert_eq!(f.timers.fire_all(), 0);
}

/// Manual timers that also keep every callback reachable after cancel,
/// the way a loop may still deliver a firing it already queued
#[derive(Default)]
struct RetainingTimers {
    inner: ManualTimers,
    retained: RefCell<Vec<Rc<RefCell<TickCallback>>>>,
}

impl RetainingTimers {
    fn fire_retained(&self) {
        let retained: Vec<_> = self.retained.borrow().iter().cloned().collect();
        for tick in retained {
            (*tick.borrow_mut())();
        }
    }
}

impl TimerService for RetainingTimers {
    fn start_interval(
        &self,
        period: Duration,
        tick: TickCallback,
    ) -> analog_clock_widget::error::Result<TimerHandle> {
        let tick = Rc::new(RefCell::new(tick));
        self.retained.borrow_mut().push(Rc::clone(&tick));
        self.inner
            .start_interval(period, Box::new(move || (*tick.borrow_mut())()))
    }

    fn cancel(&self, handle: TimerHandle) {
        self.inner.cancel(handle);
    }

    fn active_timers(&self) -> usize {
        self.inner.active_timers()
    }
}

#[test]
fn test_tick_after_disconnect_does_not_render() {
    let timers = Rc::new(RetainingTimers::default());
    let clock = Rc::new(FixedTimeSource::new(Moment::from_hms(9, 5, 7).unwrap()));
    let context = ElementContext::new(timers.clone())
        .with_time_source(clock.clone())
        .with_formatter(Rc::new(ChronoLocaleFormatter::default()));
    let mut element = ClockElement::new("analog-clock", context, Config::default());

    element.connected().unwrap();
    let view = element.view().unwrap();
    timers.fire_retained();
    let renders = view.borrow().render_count();

    element.disconnected();
    assert_eq!(timers.active_timers(), 0);

    // The view is still alive through `view`; only the guard stops the tick
    clock.advance(5);
    timers.fire_retained();
    assert_eq!(view.borrow().render_count(), renders);
    assert_eq!(view.borrow().readout().time, "09:05:07 AM");
}

#[test]
fn test_repeated_mount_cycles_do_not_leak() {
    let loopback = Rc::new(LoopbackClient::new());
    let mut f = fixture();
    f.element.set_client(Some(as_client(&loopback))).unwrap();

    for _ in 0..5 {
        f.element.connected().unwrap();
        assert_eq!(f.timers.active_timers(), 1);
        assert_eq!(loopback.handler_count(CHANGE_COLOR_EVENT), 1);
        assert_eq!(loopback.handler_count(CUSTOM_CLOCK_EVENT), 1);
        f.element.disconnected();
    }

    assert_eq!(f.timers.active_timers(), 0);
    assert_eq!(loopback.total_handlers(), 0);
    // Resources are injected into the boundary once, on first connect
    assert_eq!(f.element.boundary().unwrap().resource_injections(), 1);
}

#[test]
fn test_disconnect_without_connect_is_safe() {
    let mut f = fixture();
    f.element.disconnected();
    f.element.disconnected();
    assert!(!f.element.is_connected());
    assert_eq!(f.timers.active_timers(), 0);
}

#[test]
fn test_double_connect_keeps_one_timer() {
    let mut f = fixture();
    f.element.connected().unwrap();
    f.element.connected().unwrap();
    assert_eq!(f.timers.active_timers(), 1);
}

#[test]
fn test_change_color_updates_accent() {
    let loopback = Rc::new(LoopbackClient::new());
    let mut f = fixture();
    f.element.set_client(Some(as_client(&loopback))).unwrap();
    f.element.connected().unwrap();
    assert_eq!(accent_css(&f.element), "rgb(255, 255, 255)");

    let handled = loopback.emit(
        CHANGE_COLOR_EVENT,
        &json!({ "data": { "color": { "r": 255, "g": 0, "b": 0 } } }),
    );
    assert_eq!(handled, 1);
    assert_eq!(accent_css(&f.element), "rgb(255, 0, 0)");

    // The accent survives timer-driven re-renders
    f.timers.fire_all();
    assert_eq!(accent_css(&f.element), "rgb(255, 0, 0)");
}

#[test]
fn test_malformed_change_color_is_ignored() {
    let loopback = Rc::new(LoopbackClient::new());
    let mut f = fixture();
    f.element.set_client(Some(as_client(&loopback))).unwrap();
    f.element.connected().unwrap();

    loopback.emit(CHANGE_COLOR_EVENT, &change_color_payload(Color::rgb(0, 128, 255)));
    assert_eq!(accent_css(&f.element), "rgb(0, 128, 255)");

    for payload in [
        json!({}),
        json!({ "data": {} }),
        json!({ "data": { "color": { "r": 10, "g": 20 } } }),
        json!({ "data": { "color": { "r": 300, "g": 0, "b": 0 } } }),
        json!({ "data": { "color": { "r": "red", "g": 0, "b": 0 } } }),
        json!(null),
    ] {
        loopback.emit(CHANGE_COLOR_EVENT, &payload);
        assert_eq!(accent_css(&f.element), "rgb(0, 128, 255)", "payload {}", payload);
    }
}

#[test]
fn test_custom_event_changes_nothing() {
    let loopback = Rc::new(LoopbackClient::new());
    let mut f = fixture();
    f.element.set_client(Some(as_client(&loopback))).unwrap();
    f.element.connected().unwrap();

    assert_eq!(loopback.emit(CUSTOM_CLOCK_EVENT, &json!({ "anything": [1, 2, 3] })), 1);
    assert_eq!(accent_css(&f.element), "rgb(255, 255, 255)");
}

#[test]
fn test_remount_starts_from_default_accent() {
    let loopback = Rc::new(LoopbackClient::new());
    let mut f = fixture();
    f.element.set_client(Some(as_client(&loopback))).unwrap();
    f.element.connected().unwrap();
    loopback.emit(CHANGE_COLOR_EVENT, &change_color_payload(Color::rgb(255, 0, 0)));

    f.element.disconnected();
    f.element.connected().unwrap();
    assert_eq!(accent_css(&f.element), "rgb(255, 255, 255)");
}

#[test]
fn test_configured_accent_is_initial_accent() {
    let config = Config {
        accent: "#00ff00".to_string(),
        ..Config::default()
    };
    let mut f = fixture_with(config);
    f.element.connected().unwrap();
    assert_eq!(accent_css(&f.element), "rgb(0, 255, 0)");
}

#[test]
fn test_client_without_callbacks_is_tolerated() {
    let bare: Rc<dyn ExternalClient> = Rc::new(BareClient);
    let mut f = fixture();
    f.element.set_client(Some(bare.clone())).unwrap();
    f.element.connected().unwrap();

    assert!(f.element.is_ticking());
    assert_eq!(f.element.registration_count(), 0);

    f.element.disconnected();
    assert_eq!(f.timers.active_timers(), 0);
}

#[test]
fn test_client_set_before_connect_is_used_at_connect() {
    let loopback = Rc::new(LoopbackClient::new());
    let mut f = fixture();
    f.element.set_client(Some(as_client(&loopback))).unwrap();

    assert!(f.element.client().is_some());
    assert_eq!(loopback.total_handlers(), 0);
    assert!(f.element.view().is_none());

    f.element.connected().unwrap();
    assert_eq!(loopback.total_handlers(), 2);
}

#[test]
fn test_client_reassignment_moves_registrations() {
    let first = Rc::new(LoopbackClient::new());
    let second = Rc::new(LoopbackClient::new());
    let mut f = fixture();
    f.element.set_client(Some(as_client(&first))).unwrap();
    f.element.connected().unwrap();
    let view_before = f.element.view().unwrap();

    f.element.set_client(Some(as_client(&second))).unwrap();
    assert_eq!(first.total_handlers(), 0);
    assert_eq!(second.total_handlers(), 2);

    // Re-rendered in place, not remounted
    let view_after = f.element.view().unwrap();
    assert!(Rc::ptr_eq(&view_before, &view_after));
    assert_eq!(f.timers.active_timers(), 1);
    let seen = view_after.borrow().client().unwrap();
    assert_eq!(Rc::as_ptr(&seen) as *const (), Rc::as_ptr(&second) as *const ());

    // Only the current client drives the accent
    first.emit(CHANGE_COLOR_EVENT, &change_color_payload(Color::rgb(1, 2, 3)));
    assert_eq!(accent_css(&f.element), "rgb(255, 255, 255)");
    second.emit(CHANGE_COLOR_EVENT, &change_color_payload(Color::rgb(4, 5, 6)));
    assert_eq!(accent_css(&f.element), "rgb(4, 5, 6)");

    f.element.set_client(None).unwrap();
    assert_eq!(second.total_handlers(), 0);
    assert!(f.element.view().unwrap().borrow().client().is_none());
}

#[test]
fn test_reassigning_same_client_keeps_registrations() {
    let loopback = Rc::new(LoopbackClient::new());
    let mut f = fixture();
    f.element.set_client(Some(as_client(&loopback))).unwrap();
    f.element.connected().unwrap();
    f.element.set_client(Some(as_client(&loopback))).unwrap();
    assert_eq!(loopback.total_handlers(), 2);
    assert_eq!(f.element.registration_count(), 2);
}

#[test]
fn test_client_dropped_while_mounted() {
    let loopback = Rc::new(LoopbackClient::new());
    let mut f = fixture();
    f.element.set_client(Some(as_client(&loopback))).unwrap();
    f.element.connected().unwrap();

    drop(loopback);
    assert!(f.element.client().is_none());
    f.timers.fire_all();
    f.element.disconnected();
    assert_eq!(f.timers.active_timers(), 0);
}

#[test]
fn test_attributes_update_style_without_remount() {
    let mut f = fixture();
    f.element.connected().unwrap();
    let view_before = f.element.view().unwrap();

    f.element.set_attribute("width", "300px");
    f.element.set_attribute("HEIGHT", "360px");
    assert_eq!(f.element.style().get("width"), Some("300px"));
    assert_eq!(f.element.style().get("height"), Some("360px"));
    assert_eq!(f.element.style().to_css(), "width: 300px; height: 360px");
    assert_eq!(f.element.style().pixel_size(), Some((300, 360)));

    assert!(Rc::ptr_eq(&view_before, &f.element.view().unwrap()));
    assert_eq!(f.timers.active_timers(), 1);

    f.element.remove_attribute("width");
    assert_eq!(f.element.style().get("width"), None);
}

#[test]
fn test_attributes_apply_while_disconnected() {
    let mut f = fixture();
    f.element.set_attribute("width", "120px");
    assert_eq!(f.element.style().get("width"), Some("120px"));

    f.element.set_attribute("title", "ignored");
    assert_eq!(f.element.get_attribute("title"), Some("ignored"));
    assert_eq!(f.element.style().get("title"), None);
}

#[test]
fn test_configured_dimensions_become_attributes() {
    let config = Config {
        width: Some("240px".to_string()),
        height: Some("300px".to_string()),
        ..Config::default()
    };
    let f = fixture_with(config);
    assert_eq!(f.element.get_attribute("width"), Some("240px"));
    assert_eq!(f.element.style().pixel_size(), Some((240, 300)));
}

#[test]
fn test_snapshot_uses_outer_box_size() {
    let mut f = fixture();
    assert!(f.element.snapshot().is_err());

    f.element.set_attribute("width", "240px");
    f.element.set_attribute("height", "300px");
    f.element.connected().unwrap();

    let pixmap = f.element.snapshot().unwrap();
    assert_eq!((pixmap.width(), pixmap.height()), (240, 300));
    assert!(pixmap.pixels().iter().any(|p| p.alpha() > 0));
}

#[test]
fn test_snapshot_falls_back_to_configured_size() {
    let mut f = fixture();
    f.element.connected().unwrap();
    let pixmap = f.element.snapshot().unwrap();
    let size = Config::default().snapshot_size;
    assert_eq!((pixmap.width(), pixmap.height()), (size, size));
}

#[test]
fn test_drop_while_connected_cleans_up() {
    let loopback = Rc::new(LoopbackClient::new());
    let f = fixture();
    let timers = f.timers.clone();
    let mut element = f.element;
    element.set_client(Some(as_client(&loopback))).unwrap();
    element.connected().unwrap();

    drop(element);
    assert_eq!(timers.active_timers(), 0);
    assert_eq!(loopback.total_handlers(), 0);
}
