//! Embeddable element contract
//!
//! An element is instantiated by tag name, attached to and detached from
//! its host, carries string attributes (some of which it observes) and an
//! optional external client property.

use std::any::Any;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::client::ExternalClient;
use crate::error::Result;

/// Core trait implemented by embeddable elements
pub trait CustomElement {
    /// Tag name this instance was created under
    fn tag_name(&self) -> &str;

    /// Attributes whose changes are reported to [`attribute_changed`]
    ///
    /// [`attribute_changed`]: CustomElement::attribute_changed
    fn observed_attributes(&self) -> &'static [&'static str] {
        &[]
    }

    /// The element was attached to its host
    fn connected(&mut self) -> Result<()>;

    /// The element was detached from its host
    ///
    /// Must be safe to call when `connected` never ran or failed.
    fn disconnected(&mut self);

    /// An observed attribute changed
    fn attribute_changed(&mut self, name: &str, old: Option<&str>, new: Option<&str>);

    fn is_connected(&self) -> bool;

    /// The external client property
    fn client(&self) -> Option<Rc<dyn ExternalClient>>;

    /// Assign the external client property
    fn set_client(&mut self, client: Option<Rc<dyn ExternalClient>>) -> Result<()>;

    /// Raw attribute storage
    fn attributes(&self) -> &BTreeMap<String, String>;

    fn attributes_mut(&mut self) -> &mut BTreeMap<String, String>;

    /// Access the concrete element
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes()
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Set an attribute, notifying the element if it observes it
    fn set_attribute(&mut self, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        let old = self
            .attributes_mut()
            .insert(name.clone(), value.to_string());
        if self.observed_attributes().contains(&name.as_str()) {
            self.attribute_changed(&name, old.as_deref(), Some(value));
        }
    }

    fn remove_attribute(&mut self, name: &str) {
        let name = name.to_ascii_lowercase();
        let old = self.attributes_mut().remove(&name);
        if old.is_some() && self.observed_attributes().contains(&name.as_str()) {
            self.attribute_changed(&name, old.as_deref(), None);
        }
    }
}

impl<'a> dyn CustomElement + 'a {
    /// Downcast to a concrete element type
    pub fn downcast_ref<T: CustomElement + 'static>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: CustomElement + 'static>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}
