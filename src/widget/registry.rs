//! Element registry for creation by tag name
//!
//! Tags are defined once per process. Defining a tag that already exists
//! is a no-op, so every embedder may call [`define`] unconditionally.

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use tracing::{debug, info};

use super::host::{ClockElement, ElementContext};
use super::traits::CustomElement;
use crate::config::Config;
use crate::error::WidgetError;

/// Type-erased element factory
pub trait DynElementFactory: Send + Sync {
    /// Create an element instance from TOML overrides
    fn create(
        &self,
        tag_name: &str,
        context: &ElementContext,
        config: &toml::Table,
    ) -> Result<Box<dyn CustomElement>>;

    /// Configuration used when no overrides are given
    fn default_config(&self) -> toml::Table;

    fn validate_config(&self, config: &toml::Table) -> Result<()>;
}

pub struct ElementRegistry {
    factories: HashMap<String, Arc<dyn DynElementFactory>>,
}

impl ElementRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Define `tag_name`, returning `false` if it was already defined
    ///
    /// The first definition wins.
    pub fn define<F>(&mut self, tag_name: &str, factory: F) -> crate::error::Result<bool>
    where
        F: DynElementFactory + 'static,
    {
        validate_tag_name(tag_name)?;
        if self.factories.contains_key(tag_name) {
            debug!(tag = tag_name, "Element already defined");
            return Ok(false);
        }
        self.factories
            .insert(tag_name.to_string(), Arc::new(factory));
        info!(tag = tag_name, "Element defined");
        Ok(true)
    }

    pub fn is_defined(&self, tag_name: &str) -> bool {
        self.factories.contains_key(tag_name)
    }

    pub fn tag_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn factory(&self, tag_name: &str) -> Result<&Arc<dyn DynElementFactory>> {
        self.factories
            .get(tag_name)
            .ok_or_else(|| WidgetError::UndefinedElement(tag_name.to_string()))
            .with_context(|| format!("Defined elements: {:?}", self.tag_names()))
    }

    /// Create an element, applying `config` over the factory defaults
    pub fn create(
        &self,
        tag_name: &str,
        context: &ElementContext,
        config: &toml::Table,
    ) -> Result<Box<dyn CustomElement>> {
        let factory = self.factory(tag_name)?;

        factory
            .validate_config(config)
            .with_context(|| format!("Invalid configuration for <{}>", tag_name))?;

        factory
            .create(tag_name, context, config)
            .with_context(|| format!("Failed to create <{}>", tag_name))
    }

    pub fn create_default(
        &self,
        tag_name: &str,
        context: &ElementContext,
    ) -> Result<Box<dyn CustomElement>> {
        let factory = self.factory(tag_name)?;
        let config = factory.default_config();
        factory.create(tag_name, context, &config)
    }
}

impl Default for ElementRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Valid custom tags are lowercase, start with a letter and contain a hyphen
pub fn validate_tag_name(tag_name: &str) -> crate::error::Result<()> {
    let starts_with_letter = tag_name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_lowercase());
    let allowed_chars = tag_name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '.' | '_'));

    if starts_with_letter && allowed_chars && tag_name.contains('-') {
        Ok(())
    } else {
        Err(WidgetError::InvalidTagName(tag_name.to_string()))
    }
}

/// Factory for [`ClockElement`]
///
/// Overrides are merged key by key over `base`.
#[derive(Debug, Clone, Default)]
pub struct ClockElementFactory {
    base: Config,
}

impl ClockElementFactory {
    pub fn new(base: Config) -> Self {
        Self { base }
    }

    fn base_table(&self) -> Result<toml::Table> {
        match toml::Value::try_from(&self.base).context("Failed to serialize base configuration")? {
            toml::Value::Table(table) => Ok(table),
            other => anyhow::bail!("Base configuration is not a table: {}", other.type_str()),
        }
    }

    fn merged(&self, overrides: &toml::Table) -> Result<Config> {
        let mut table = self.base_table()?;
        for (key, value) in overrides {
            table.insert(key.clone(), value.clone());
        }
        let config: Config = toml::Value::Table(table)
            .try_into()
            .context("Invalid clock configuration")?;
        config.validate()?;
        Ok(config)
    }
}

impl DynElementFactory for ClockElementFactory {
    fn create(
        &self,
        tag_name: &str,
        context: &ElementContext,
        config: &toml::Table,
    ) -> Result<Box<dyn CustomElement>> {
        let config = self.merged(config)?;
        debug!(
            tag = tag_name,
            title = %config.title,
            refresh_ms = config.refresh_interval_ms,
            "Creating ClockElement"
        );
        Ok(Box::new(ClockElement::new(tag_name, context.clone(), config)))
    }

    fn default_config(&self) -> toml::Table {
        self.base_table().unwrap_or_default()
    }

    fn validate_config(&self, config: &toml::Table) -> Result<()> {
        self.merged(config).map(|_| ())
    }
}

static REGISTRY: Lazy<RwLock<ElementRegistry>> =
    Lazy::new(|| RwLock::new(ElementRegistry::new()));

fn registry_read() -> RwLockReadGuard<'static, ElementRegistry> {
    REGISTRY.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn registry_write() -> RwLockWriteGuard<'static, ElementRegistry> {
    REGISTRY
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Define a tag in the process-wide registry
pub fn define<F>(tag_name: &str, factory: F) -> crate::error::Result<bool>
where
    F: DynElementFactory + 'static,
{
    registry_write().define(tag_name, factory)
}

pub fn is_defined(tag_name: &str) -> bool {
    registry_read().is_defined(tag_name)
}

/// Create an element from the process-wide registry
pub fn create_element(
    tag_name: &str,
    context: &ElementContext,
    config: &toml::Table,
) -> Result<Box<dyn CustomElement>> {
    registry_read().create(tag_name, context, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::update::ManualTimers;
    use std::rc::Rc;

    fn context() -> ElementContext {
        ElementContext::new(Rc::new(ManualTimers::new()))
    }

    #[test]
    fn test_tag_name_validation() {
        assert!(validate_tag_name("analog-clock").is_ok());
        assert!(validate_tag_name("x-clock.v2_b").is_ok());
        assert!(validate_tag_name("clock").is_err());
        assert!(validate_tag_name("Analog-Clock").is_err());
        assert!(validate_tag_name("1-clock").is_err());
        assert!(validate_tag_name("").is_err());
    }

    #[test]
    fn test_define_is_idempotent() {
        let mut registry = ElementRegistry::new();
        assert!(registry
            .define("analog-clock", ClockElementFactory::default())
            .unwrap());
        assert!(!registry
            .define("analog-clock", ClockElementFactory::default())
            .unwrap());
        assert_eq!(registry.tag_names(), vec!["analog-clock"]);
    }

    #[test]
    fn test_create_with_overrides() {
        let mut registry = ElementRegistry::new();
        registry
            .define("analog-clock", ClockElementFactory::default())
            .unwrap();

        let mut config = toml::Table::new();
        config.insert("width".to_string(), toml::Value::String("300px".to_string()));
        let element = registry.create("analog-clock", &context(), &config).unwrap();
        assert_eq!(element.tag_name(), "analog-clock");
        assert_eq!(element.get_attribute("width"), Some("300px"));
        assert!(!element.is_connected());
    }

    #[test]
    fn test_invalid_overrides_rejected() {
        let mut registry = ElementRegistry::new();
        registry
            .define("analog-clock", ClockElementFactory::default())
            .unwrap();

        let mut config = toml::Table::new();
        config.insert("refresh_interval_ms".to_string(), toml::Value::Integer(1));
        assert!(registry.create("analog-clock", &context(), &config).is_err());
    }

    #[test]
    fn test_undefined_element() {
        let registry = ElementRegistry::new();
        assert!(registry.create_default("no-such-clock", &context()).is_err());
    }

    #[test]
    fn test_global_registry() {
        assert!(define("registry-test-clock", ClockElementFactory::default()).is_ok());
        assert!(is_defined("registry-test-clock"));
        assert!(!define("registry-test-clock", ClockElementFactory::default()).unwrap());
        let element =
            create_element("registry-test-clock", &context(), &toml::Table::new()).unwrap();
        assert_eq!(element.tag_name(), "registry-test-clock");
    }
}
