// Isolated rendering boundary for one element
//
// Each element renders into its own boundary: resources (font, theme)
// are injected into it once and shared by nothing else, and at most one
// view tree is mounted in it at a time.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use tracing::debug;

use super::subscriptions::Subscriptions;
use super::view::{ClockView, ViewProps};
use crate::client::ExternalClient;
use crate::error::Result;
use crate::text::FontManager;
use crate::theme::ClockTheme;
use crate::update::{RefreshScheduler, TimerService};

/// Resources scoped to one boundary
#[derive(Debug, Clone)]
pub struct BoundaryResources {
    pub font: Option<FontManager>,
    pub theme: ClockTheme,
}

/// A mounted view tree with its timer and client registrations
pub struct MountedRoot {
    view: Rc<RefCell<ClockView>>,
    scheduler: RefreshScheduler,
    subscriptions: Subscriptions,
}

impl MountedRoot {
    /// Mount a view, start its refresh timer and subscribe to the client
    pub fn mount(
        props: ViewProps,
        timers: Rc<dyn TimerService>,
        period: Duration,
        client: Option<&Rc<dyn ExternalClient>>,
    ) -> Result<Self> {
        let view = Rc::new(RefCell::new(ClockView::new(props)));

        let mut scheduler = RefreshScheduler::new(timers, period);
        let target = Rc::downgrade(&view);
        scheduler.start(move || {
            if let Some(view) = target.upgrade() {
                view.borrow_mut().refresh();
            }
        })?;

        let subscriptions = match client {
            Some(client) => Subscriptions::subscribe(client, &view),
            None => Subscriptions::default(),
        };

        debug!(period_ms = period.as_millis() as u64, "View mounted");
        Ok(Self {
            view,
            scheduler,
            subscriptions,
        })
    }

    /// Re-render with a (possibly) new client reference
    ///
    /// Registrations move to the new client; the old one is released
    /// symmetrically.
    pub fn update_client(&mut self, client: Option<&Rc<dyn ExternalClient>>) {
        self.view
            .borrow_mut()
            .set_client(client.map(Rc::downgrade));

        if self.subscriptions.is_for(client) {
            return;
        }
        self.subscriptions.clear();
        self.subscriptions = match client {
            Some(client) => Subscriptions::subscribe(client, &self.view),
            None => Subscriptions::default(),
        };
    }

    /// Tear down: stop the timer, drop all registrations
    pub fn unmount(mut self) {
        self.scheduler.stop();
        self.subscriptions.clear();
        debug!(ticks = self.scheduler.tick_count(), "View unmounted");
    }

    pub fn view(&self) -> &Rc<RefCell<ClockView>> {
        &self.view
    }

    pub fn is_ticking(&self) -> bool {
        self.scheduler.is_running()
    }

    pub fn registration_count(&self) -> usize {
        self.subscriptions.len()
    }
}

#[derive(Default)]
pub struct RenderBoundary {
    resources: Option<BoundaryResources>,
    injections: u32,
    root: Option<MountedRoot>,
}

impl RenderBoundary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inject resources unless this boundary already has them
    pub fn inject_resources<F>(&mut self, load: F) -> &BoundaryResources
    where
        F: FnOnce() -> BoundaryResources,
    {
        if self.resources.is_none() {
            self.injections += 1;
            debug!("Injecting boundary resources");
        }
        self.resources.get_or_insert_with(load)
    }

    pub fn resources(&self) -> Option<&BoundaryResources> {
        self.resources.as_ref()
    }

    /// How many times resources were injected; never more than one
    pub fn resource_injections(&self) -> u32 {
        self.injections
    }

    pub fn root(&self) -> Option<&MountedRoot> {
        self.root.as_ref()
    }

    pub fn root_mut(&mut self) -> Option<&mut MountedRoot> {
        self.root.as_mut()
    }

    pub fn set_root(&mut self, root: MountedRoot) {
        if let Some(previous) = self.root.replace(root) {
            previous.unmount();
        }
    }

    /// Release the root handle, if any
    pub fn take_root(&mut self) -> Option<MountedRoot> {
        self.root.take()
    }

    /// Weak handle to the mounted view, for observers
    pub fn view(&self) -> Option<Weak<RefCell<ClockView>>> {
        self.root.as_ref().map(|root| Rc::downgrade(root.view()))
    }
}
