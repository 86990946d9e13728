//! Caption preferences as CSS for HTML caption rendering

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use super::preferences::{
    CaptionPreferences, ClosedCaptionColor, ClosedCaptionEdgeEffect, ClosedCaptionOpacity,
    ClosedCaptionSize, ClosedCaptionStyle, Rgb,
};

/// A CSS `rgba()` color
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub fn from_rgb(rgb: Rgb, a: f64) -> Self {
        Self {
            r: rgb.r,
            g: rgb.g,
            b: rgb.b,
            a,
        }
    }

    /// Parse `rgb(r, g, b)` or `rgba(r, g, b, a)`
    pub fn parse(s: &str) -> Option<Self> {
        static PATTERN: OnceLock<Regex> = OnceLock::new();
        let re = PATTERN.get_or_init(|| {
            Regex::new(r"^\s*rgba?\(\s*(\d{1,3})\s*,\s*(\d{1,3})\s*,\s*(\d{1,3})\s*(?:,\s*([0-9]*\.?[0-9]+)\s*)?\)\s*$")
                .expect("valid css color pattern")
        });
        let caps = re.captures(s)?;
        Some(Self {
            r: caps[1].parse().ok()?,
            g: caps[2].parse().ok()?,
            b: caps[3].parse().ok()?,
            a: match caps.get(4) {
                Some(a) => a.as_str().parse().ok()?,
                None => 1.0,
            },
        })
    }

    fn rgb(&self) -> Rgb {
        Rgb::new(self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

/// Font family for a caption style, `None` keeps the current font
pub fn font_family(style: ClosedCaptionStyle) -> Option<&'static str> {
    match style {
        ClosedCaptionStyle::Default => None,
        ClosedCaptionStyle::SmallCapitals => Some("Segoe UI"),
        ClosedCaptionStyle::ProportionalWithSerifs => Some("Cambria"),
        ClosedCaptionStyle::ProportionalWithoutSerifs => Some("Segoe UI"),
        ClosedCaptionStyle::MonospacedWithSerifs => Some("Courier New"),
        ClosedCaptionStyle::MonospacedWithoutSerifs => Some("Consolas"),
        ClosedCaptionStyle::Cursive => Some("Segoe Script"),
        ClosedCaptionStyle::Casual => Some("Segoe Print"),
    }
}

pub fn font_variant(style: ClosedCaptionStyle) -> &'static str {
    match style {
        ClosedCaptionStyle::SmallCapitals => "small-caps",
        _ => "",
    }
}

/// `text-shadow` for an edge effect, `None` keeps the current shadow
pub fn text_shadow(effect: ClosedCaptionEdgeEffect) -> Option<&'static str> {
    match effect {
        ClosedCaptionEdgeEffect::Default => None,
        ClosedCaptionEdgeEffect::None => Some(""),
        ClosedCaptionEdgeEffect::Depressed => Some("-1px -1px 0px black"),
        ClosedCaptionEdgeEffect::DropShadow => Some("2px 2px 1px black"),
        ClosedCaptionEdgeEffect::Raised => Some("1px 1px 0px black"),
        ClosedCaptionEdgeEffect::Uniform => {
            Some("-1px -1px 0 #000, 1px -1px 0 #000, -1px 1px 0 #000, 1px 1px 0 #000")
        }
    }
}

/// Height of an empty caption row for a caption size
pub fn empty_row_height(size: ClosedCaptionSize) -> Option<&'static str> {
    match size {
        ClosedCaptionSize::FiftyPercent => Some("6%"),
        ClosedCaptionSize::OneHundredFiftyPercent => Some("5.1%"),
        ClosedCaptionSize::TwoHundredPercent => Some("5%"),
        ClosedCaptionSize::Default | ClosedCaptionSize::OneHundredPercent => None,
    }
}

/// Combine a preferred color and opacity with the element's current color.
///
/// `Default` color keeps the current RGB, `Default` opacity keeps the current
/// alpha. Returns `None` if the current color cannot be parsed.
pub fn css_color(
    color: ClosedCaptionColor,
    opacity: ClosedCaptionOpacity,
    current: &str,
) -> Option<Rgba> {
    let current = Rgba::parse(current)?;
    let rgb = color.rgb().unwrap_or_else(|| current.rgb());
    let alpha = if opacity.is_default() {
        current.a
    } else {
        opacity.factor()
    };
    Some(Rgba::from_rgb(rgb, alpha))
}

/// Computed style of a rendered caption element
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedStyle {
    pub color: String,
    pub background_color: String,
    pub font_size_px: f64,
}

/// Style overrides for one caption text element
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CueStyle {
    pub background_color: Option<Rgba>,
    pub color: Option<Rgba>,
    pub font_family: Option<&'static str>,
    pub font_variant: Option<&'static str>,
    pub font_size_px: Option<f64>,
    pub text_shadow: Option<&'static str>,
}

impl CueStyle {
    /// Overrides implied by `prefs` for an element currently styled as `current`
    pub fn compute(prefs: &CaptionPreferences, current: &ComputedStyle) -> Self {
        let mut style = CueStyle::default();

        if !prefs.background_color.is_default() || !prefs.background_opacity.is_default() {
            style.background_color = css_color(
                prefs.background_color,
                prefs.background_opacity,
                &current.background_color,
            );
        }

        if !prefs.font_color.is_default() || !prefs.font_opacity.is_default() {
            style.color = css_color(prefs.font_color, prefs.font_opacity, &current.color);
        }

        if !prefs.font_style.is_default() {
            style.font_family = font_family(prefs.font_style);
            style.font_variant = Some(font_variant(prefs.font_style));
        }

        if !prefs.font_size.is_default() {
            style.font_size_px = Some(current.font_size_px * prefs.font_size.factor());
        }

        style.text_shadow = text_shadow(prefs.font_effect);
        style
    }

    pub fn is_empty(&self) -> bool {
        *self == CueStyle::default()
    }

    /// Inline CSS declarations for the overrides
    pub fn to_css(&self) -> String {
        let mut decls = Vec::new();
        if let Some(c) = &self.background_color {
            decls.push(format!("background-color: {}", c));
        }
        if let Some(c) = &self.color {
            decls.push(format!("color: {}", c));
        }
        if let Some(f) = self.font_family {
            decls.push(format!("font-family: {}", f));
        }
        if let Some(v) = self.font_variant {
            if !v.is_empty() {
                decls.push(format!("font-variant: {}", v));
            }
        }
        if let Some(px) = self.font_size_px {
            decls.push(format!("font-size: {}px", px));
        }
        if let Some(s) = self.text_shadow {
            let s = if s.is_empty() { "none" } else { s };
            decls.push(format!("text-shadow: {}", s));
        }
        decls.join("; ")
    }
}

/// Background of a non-empty caption row (the caption window)
pub fn region_background(prefs: &CaptionPreferences, current: &str) -> Option<Rgba> {
    if prefs.region_color.is_default() && prefs.region_opacity.is_default() {
        return None;
    }
    css_color(prefs.region_color, prefs.region_opacity, current)
}
