//! Named screen-size presets.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// A named viewport size
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Viewport {
    /// Preset name used in test names
    pub name: Cow<'static, str>,
    /// Width in CSS pixels
    pub width: u32,
    /// Height in CSS pixels
    pub height: u32,
}

impl Viewport {
    /// Desktop 1920x1080
    pub const DESKTOP: Self = Self::preset("desktop", 1920, 1080);
    /// Tablet 768x1024
    pub const TABLET: Self = Self::preset("tablet", 768, 1024);
    /// Mobile 500x667
    pub const MOBILE: Self = Self::preset("mobile", 500, 667);

    const fn preset(name: &'static str, width: u32, height: u32) -> Self {
        Self {
            name: Cow::Borrowed(name),
            width,
            height,
        }
    }

    /// Create a custom viewport
    #[must_use]
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: Cow::Owned(name.into()),
            width,
            height,
        }
    }

    /// Check if viewport is in portrait orientation
    #[must_use]
    pub const fn is_portrait(&self) -> bool {
        self.height > self.width
    }

    /// Narrow layouts where modals and menus need scrolling
    #[must_use]
    pub const fn is_constrained(&self) -> bool {
        self.width < 800
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::DESKTOP
    }
}

/// Viewports every multi-language scenario is run against
pub const VIEWPORTS: [Viewport; 3] = [Viewport::DESKTOP, Viewport::TABLET, Viewport::MOBILE];
