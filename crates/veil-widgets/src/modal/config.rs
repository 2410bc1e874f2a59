#![forbid(unsafe_code)]

//! Modal manager configuration.

use std::time::Duration;

use bitflags::bitflags;

use crate::modal::hooks::{Hook, HookName};

/// Fade duration used when none (or zero) is configured.
pub const DEFAULT_FADE: Duration = Duration::from_millis(300);

/// Plain-data options of a [`ModalManager`](crate::modal::ModalManager).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalOptions {
    /// Extra overlay class applied alongside `active` (empty for none).
    pub active_mode: String,
    pub fade_in: Duration,
    pub fade_out: Duration,
    pub close_on_escape: bool,
    pub close_on_overlay_click: bool,
}

impl Default for ModalOptions {
    fn default() -> Self {
        Self {
            active_mode: String::new(),
            fade_in: DEFAULT_FADE,
            fade_out: DEFAULT_FADE,
            close_on_escape: true,
            close_on_overlay_click: true,
        }
    }
}

impl ModalOptions {
    /// Trim the mode name and replace zero durations with [`DEFAULT_FADE`].
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.active_mode = self.active_mode.trim().to_owned();
        if self.fade_in.is_zero() {
            self.fade_in = DEFAULT_FADE;
        }
        if self.fade_out.is_zero() {
            self.fade_out = DEFAULT_FADE;
        }
        self
    }
}

/// Builder for a modal manager: options plus the four global hooks.
#[derive(Debug, Clone, Default)]
pub struct ModalConfig {
    pub(crate) options: ModalOptions,
    pub(crate) hooks: [Option<Hook>; HookName::COUNT],
}

impl ModalConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from existing options (e.g. loaded from a file).
    #[must_use]
    pub fn from_options(options: ModalOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn active_mode(mut self, mode: impl Into<String>) -> Self {
        self.options.active_mode = mode.into();
        self
    }

    #[must_use]
    pub fn fade_in(mut self, duration: Duration) -> Self {
        self.options.fade_in = duration;
        self
    }

    #[must_use]
    pub fn fade_out(mut self, duration: Duration) -> Self {
        self.options.fade_out = duration;
        self
    }

    #[must_use]
    pub fn close_on_escape(mut self, enabled: bool) -> Self {
        self.options.close_on_escape = enabled;
        self
    }

    #[must_use]
    pub fn close_on_overlay_click(mut self, enabled: bool) -> Self {
        self.options.close_on_overlay_click = enabled;
        self
    }

    /// Set the global hook for `name`.
    #[must_use]
    pub fn hook(mut self, name: HookName, hook: Hook) -> Self {
        self.hooks[name.index()] = Some(hook);
        self
    }

    #[must_use]
    pub fn before_open(self, hook: Hook) -> Self {
        self.hook(HookName::BeforeOpen, hook)
    }

    #[must_use]
    pub fn after_open(self, hook: Hook) -> Self {
        self.hook(HookName::AfterOpen, hook)
    }

    #[must_use]
    pub fn before_close(self, hook: Hook) -> Self {
        self.hook(HookName::BeforeClose, hook)
    }

    #[must_use]
    pub fn after_close(self, hook: Hook) -> Self {
        self.hook(HookName::AfterClose, hook)
    }

    pub fn options(&self) -> &ModalOptions {
        &self.options
    }
}

bitflags! {
    /// Behavior switches of a close sequence.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CloseFlags: u8 {
        /// Leave the overlay active, the scroll lock engaged, and the URL
        /// untouched. Used while swapping one modal for another.
        const KEEP_OVERLAY = 0b01;
        /// Run even while another sequence holds the animation lock.
        const FORCE        = 0b10;
    }
}

/// Arguments of [`ModalManager::close_all_modals`](crate::modal::ModalManager::close_all_modals).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloseOptions {
    /// Modal id left untouched by this close.
    pub except: Option<String>,
    pub flags: CloseFlags,
}

impl CloseOptions {
    /// Plain close of everything; rejected while animating.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Close everything even while animating.
    #[must_use]
    pub fn forced() -> Self {
        Self {
            except: None,
            flags: CloseFlags::FORCE,
        }
    }

    /// Internal swap step: close everything but `keep`, leaving the overlay up.
    #[must_use]
    pub fn swap_to(keep: impl Into<String>) -> Self {
        Self {
            except: Some(keep.into()),
            flags: CloseFlags::KEEP_OVERLAY | CloseFlags::FORCE,
        }
    }

    #[inline]
    pub fn keep_overlay(&self) -> bool {
        self.flags.contains(CloseFlags::KEEP_OVERLAY)
    }

    #[inline]
    pub fn force(&self) -> bool {
        self.flags.contains(CloseFlags::FORCE)
    }
}

#[cfg(feature = "config-file")]
mod file {
    use std::fmt;

    use serde::Deserialize;

    use super::{DEFAULT_FADE, ModalOptions};

    /// Error loading [`ModalOptions`] from a file.
    #[derive(Debug, Clone)]
    pub enum ConfigError {
        /// The TOML could not be parsed into options.
        Parse(String),
    }

    impl fmt::Display for ConfigError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Self::Parse(msg) => write!(f, "invalid modal config: {msg}"),
            }
        }
    }

    impl std::error::Error for ConfigError {}

    #[derive(Deserialize)]
    #[serde(default, deny_unknown_fields)]
    struct RawOptions {
        active_mode: String,
        fade_in_ms: u64,
        fade_out_ms: u64,
        close_on_escape: bool,
        close_on_overlay_click: bool,
    }

    impl Default for RawOptions {
        fn default() -> Self {
            Self {
                active_mode: String::new(),
                fade_in_ms: DEFAULT_FADE.as_millis() as u64,
                fade_out_ms: DEFAULT_FADE.as_millis() as u64,
                close_on_escape: true,
                close_on_overlay_click: true,
            }
        }
    }

    impl ModalOptions {
        /// Parse options from TOML. Missing keys keep their defaults.
        ///
        /// ```toml
        /// active_mode = "dark"
        /// fade_in_ms = 250
        /// close_on_escape = false
        /// ```
        pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
            let raw: RawOptions =
                toml::from_str(input).map_err(|e| ConfigError::Parse(e.to_string()))?;
            Ok(Self {
                active_mode: raw.active_mode,
                fade_in: std::time::Duration::from_millis(raw.fade_in_ms),
                fade_out: std::time::Duration::from_millis(raw.fade_out_ms),
                close_on_escape: raw.close_on_escape,
                close_on_overlay_click: raw.close_on_overlay_click,
            }
            .normalized())
        }
    }
}

#[cfg(feature = "config-file")]
pub use file::ConfigError;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_markup_contract() {
        let opts = ModalOptions::default();
        assert_eq!(opts.active_mode, "");
        assert_eq!(opts.fade_in, Duration::from_millis(300));
        assert_eq!(opts.fade_out, Duration::from_millis(300));
        assert!(opts.close_on_escape);
        assert!(opts.close_on_overlay_click);
    }

    #[test]
    fn normalized_trims_mode_and_replaces_zero_durations() {
        let opts = ModalConfig::new()
            .active_mode("  dark ")
            .fade_in(Duration::ZERO)
            .fade_out(Duration::from_millis(120))
            .options()
            .clone()
            .normalized();
        assert_eq!(opts.active_mode, "dark");
        assert_eq!(opts.fade_in, DEFAULT_FADE);
        assert_eq!(opts.fade_out, Duration::from_millis(120));
    }

    #[test]
    fn builder_sets_global_hooks() {
        let config = ModalConfig::new()
            .before_open(Hook::new(|_| Ok(Default::default())))
            .after_close(Hook::new(|_| Ok(Default::default())));
        assert!(config.hooks[HookName::BeforeOpen.index()].is_some());
        assert!(config.hooks[HookName::AfterOpen.index()].is_none());
        assert!(config.hooks[HookName::AfterClose.index()].is_some());
    }

    #[test]
    fn close_options_presets() {
        assert!(!CloseOptions::all().force());
        assert!(CloseOptions::forced().force());
        assert!(!CloseOptions::forced().keep_overlay());
        let swap = CloseOptions::swap_to("modal_b");
        assert!(swap.force() && swap.keep_overlay());
        assert_eq!(swap.except.as_deref(), Some("modal_b"));
    }

    #[cfg(feature = "config-file")]
    #[test]
    fn loads_options_from_toml() {
        let opts = ModalOptions::from_toml_str(
            r#"
            active_mode = "dark"
            fade_in_ms = 250
            close_on_escape = false
            "#,
        )
        .unwrap();
        assert_eq!(opts.active_mode, "dark");
        assert_eq!(opts.fade_in, Duration::from_millis(250));
        assert_eq!(opts.fade_out, DEFAULT_FADE);
        assert!(!opts.close_on_escape);
        assert!(opts.close_on_overlay_click);

        let err = ModalOptions::from_toml_str("fade_in = 1").unwrap_err();
        assert!(err.to_string().starts_with("invalid modal config"));
    }
}
