//! Responsive layout: breakpoint classification and presentation
//! parameters.
//!
//! The window width classifies into a device class; panel sizes and grid
//! columns are pure functions of that class. Everything is recomputed each
//! frame from the current screen rect (immediate-mode; nothing to
//! unregister on teardown).

/// Ordered breakpoint set (CSS-style, px)
pub mod breakpoints {
    pub const XS: f32 = 0.0;
    pub const SM: f32 = 576.0;
    pub const MD: f32 = 768.0;
    pub const LG: f32 = 992.0;
    pub const XL: f32 = 1200.0;
    pub const XXL: f32 = 1600.0;
}

/// Coarse device classification from window width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    /// width < MD
    Mobile,
    /// MD <= width < XL
    Tablet,
    /// width >= XL
    Desktop,
}

impl DeviceClass {
    pub fn from_width(width: f32) -> Self {
        if width < breakpoints::MD {
            DeviceClass::Mobile
        } else if width < breakpoints::XL {
            DeviceClass::Tablet
        } else {
            DeviceClass::Desktop
        }
    }

    /// Layer-tree sidebar width; mobile takes the full window
    pub fn sidebar_width(self, window_width: f32) -> f32 {
        match self {
            DeviceClass::Mobile => window_width,
            DeviceClass::Tablet => 280.0,
            DeviceClass::Desktop => 320.0,
        }
    }

    /// Toolbar height
    pub fn toolbar_height(self) -> f32 {
        match self {
            DeviceClass::Mobile => 50.0,
            _ => 60.0,
        }
    }

    /// Info panel width; collapsed below desktop
    pub fn panel_width(self) -> f32 {
        match self {
            DeviceClass::Desktop => 280.0,
            _ => 0.0,
        }
    }

    /// Columns for thumbnail grids (group children in the info panel)
    pub fn grid_columns(self) -> usize {
        match self {
            DeviceClass::Mobile => 2,
            DeviceClass::Tablet => 3,
            DeviceClass::Desktop => 4,
        }
    }

    /// Whether the sidebar shows by default at this class
    pub fn sidebar_default_visible(self) -> bool {
        self != DeviceClass::Mobile
    }

    /// Whether the info panel shows by default at this class
    pub fn panel_default_visible(self) -> bool {
        self == DeviceClass::Desktop
    }
}
