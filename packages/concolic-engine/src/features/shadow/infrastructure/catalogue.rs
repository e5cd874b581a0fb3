//! Shadow catalogue
//!
//! Registry of shadows keyed by `(owner, name, signature)`. The default
//! catalogue is built once and shared read-only by every run.

use once_cell::sync::Lazy;
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

use super::{boxing, builder, character, math, string};
use crate::errors::{ConcolicError, Result};
use crate::features::shadow::domain::{FunctionKey, ShadowFunction, ShadowKind};

static DEFAULT_CATALOGUE: Lazy<ShadowCatalogue> = Lazy::new(ShadowCatalogue::with_defaults);

#[derive(Debug, Default)]
pub struct ShadowCatalogue {
    shadows: FxHashMap<FunctionKey, ShadowFunction>,
}

impl ShadowCatalogue {
    /// Empty catalogue
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalogue with every built-in shadow (Math, String, boxing,
    /// Character, StringBuilder)
    pub fn with_defaults() -> Self {
        let mut catalogue = Self::new();
        {
            let mut registrar = Registrar {
                catalogue: &mut catalogue,
            };
            math::register(&mut registrar);
            string::register(&mut registrar);
            boxing::register(&mut registrar);
            character::register(&mut registrar);
            builder::register(&mut registrar);
        }
        debug!("Shadow catalogue ready: {} shadows", catalogue.len());
        catalogue
    }

    /// Process-wide default catalogue
    pub fn shared() -> &'static ShadowCatalogue {
        &DEFAULT_CATALOGUE
    }

    /// Register a shadow; one per exact signature
    pub fn register(&mut self, shadow: ShadowFunction) -> Result<()> {
        if self.shadows.contains_key(&shadow.key) {
            return Err(ConcolicError::signature(
                &shadow.key,
                "a shadow is already registered for this signature",
            ));
        }
        self.shadows.insert(shadow.key.clone(), shadow);
        Ok(())
    }

    pub fn lookup(&self, key: &FunctionKey) -> Option<&ShadowFunction> {
        self.shadows.get(key)
    }

    pub fn contains(&self, key: &FunctionKey) -> bool {
        self.shadows.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.shadows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shadows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ShadowFunction> {
        self.shadows.values()
    }
}

/// Table-driven registration used by the family modules
pub(super) struct Registrar<'a> {
    catalogue: &'a mut ShadowCatalogue,
}

impl Registrar<'_> {
    pub(super) fn static_fn(&mut self, owner: &str, name: &str, descriptor: &str, kind: ShadowKind) {
        self.add(owner, name, descriptor, kind, false);
    }

    pub(super) fn method(&mut self, owner: &str, name: &str, descriptor: &str, kind: ShadowKind) {
        self.add(owner, name, descriptor, kind, true);
    }

    fn add(&mut self, owner: &str, name: &str, descriptor: &str, kind: ShadowKind, has_receiver: bool) {
        let registered = FunctionKey::parse(owner, name, descriptor).and_then(|key| {
            self.catalogue
                .register(ShadowFunction::new(key, kind, has_receiver))
        });
        if let Err(e) = registered {
            warn!("Skipping built-in shadow {}.{}{}: {}", owner, name, descriptor, e);
        }
    }
}
