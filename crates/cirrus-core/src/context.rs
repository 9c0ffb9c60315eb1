use std::sync::Arc;

use anyhow::Result;

use crate::config::{GlobalOptions, Settings};
use crate::effects::{Effects, SharedEffects, SystemEffects};

pub struct CommandContext<'a> {
    pub global: &'a GlobalOptions,
    settings: Settings,
    effects: SharedEffects,
}

impl<'a> CommandContext<'a> {
    /// Creates a context backed by the local collaborators.
    ///
    /// # Errors
    /// Returns an error if settings or the environment manifest cannot be loaded.
    pub fn new(global: &'a GlobalOptions) -> Result<Self> {
        let settings = Settings::from_env()?;
        let effects: SharedEffects = Arc::new(SystemEffects::from_settings(&settings)?);
        Ok(Self::with_effects(global, settings, effects))
    }

    #[must_use]
    pub fn with_effects(global: &'a GlobalOptions, settings: Settings, effects: SharedEffects) -> Self {
        Self {
            global,
            settings,
            effects,
        }
    }

    pub fn effects(&self) -> &dyn Effects {
        self.effects.as_ref()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}
