//! Tri-state theme: explicit light, explicit dark, or follow the OS.
//!
//! The raw tri-state value persists with the app settings and is re-read
//! at startup; unknown stored values fall back to `Auto`. Resolution is
//! re-evaluated every frame from `update()` - egui is immediate-mode, so
//! an OS scheme change is picked up live while in `Auto` without any
//! listener to register or tear down.

use eframe::egui;
use serde::{Deserialize, Serialize};

/// User-facing theme choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    Dark,
    /// Follow the OS color scheme
    #[default]
    #[serde(other)]
    Auto,
}

/// Concrete scheme after resolving `Auto`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolvedTheme {
    Light,
    Dark,
}

impl ThemeMode {
    /// Resolve against the current OS preference
    pub fn resolved(self) -> ResolvedTheme {
        self.resolved_with(system_theme())
    }

    /// Resolve against an explicit system scheme (pure; used by tests)
    pub fn resolved_with(self, system: ResolvedTheme) -> ResolvedTheme {
        match self {
            ThemeMode::Light => ResolvedTheme::Light,
            ThemeMode::Dark => ResolvedTheme::Dark,
            ThemeMode::Auto => system,
        }
    }

    /// Toolbar cycle order: light -> dark -> auto -> light
    pub fn cycled(self) -> ThemeMode {
        match self {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Auto,
            ThemeMode::Auto => ThemeMode::Light,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ThemeMode::Light => "Light",
            ThemeMode::Dark => "Dark",
            ThemeMode::Auto => "Auto",
        }
    }
}

/// Current OS color scheme; light when detection is unavailable
pub fn system_theme() -> ResolvedTheme {
    match dark_light::detect() {
        Ok(dark_light::Mode::Dark) => ResolvedTheme::Dark,
        _ => ResolvedTheme::Light,
    }
}

/// Apply the resolved theme to the egui context
pub fn apply(mode: ThemeMode, ctx: &egui::Context) {
    match mode.resolved() {
        ResolvedTheme::Dark => ctx.set_visuals(egui::Visuals::dark()),
        ResolvedTheme::Light => ctx.set_visuals(egui::Visuals::light()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_modes_ignore_system() {
        assert_eq!(
            ThemeMode::Light.resolved_with(ResolvedTheme::Dark),
            ResolvedTheme::Light
        );
        assert_eq!(
            ThemeMode::Dark.resolved_with(ResolvedTheme::Light),
            ResolvedTheme::Dark
        );
    }

    #[test]
    fn test_auto_follows_system() {
        assert_eq!(
            ThemeMode::Auto.resolved_with(ResolvedTheme::Dark),
            ResolvedTheme::Dark
        );
        assert_eq!(
            ThemeMode::Auto.resolved_with(ResolvedTheme::Light),
            ResolvedTheme::Light
        );
    }

    #[test]
    fn test_cycle_order() {
        assert_eq!(ThemeMode::Light.cycled(), ThemeMode::Dark);
        assert_eq!(ThemeMode::Dark.cycled(), ThemeMode::Auto);
        assert_eq!(ThemeMode::Auto.cycled(), ThemeMode::Light);
    }

    #[test]
    fn test_serde_round_trip() {
        for mode in [ThemeMode::Light, ThemeMode::Dark, ThemeMode::Auto] {
            let json = serde_json::to_string(&mode).unwrap();
            assert_eq!(serde_json::from_str::<ThemeMode>(&json).unwrap(), mode);
        }
        assert_eq!(serde_json::to_string(&ThemeMode::Auto).unwrap(), "\"auto\"");
    }

    #[test]
    fn test_serde_unknown_value_falls_back_to_auto() {
        let mode: ThemeMode = serde_json::from_str("\"solarized\"").unwrap();
        assert_eq!(mode, ThemeMode::Auto);
    }
}
