// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Visual styling for chemical elements.
//!
//! An [`ElementStyles`] registry maps short element codes (`"H"`, `"C"`, `"Na"`)
//! to the display attributes the SVG renderer needs: a circle radius, a flat
//! fill color, and the three color stops of the element's radial gradient.
//! The registry is usually built from the `Elements` table of a molecule
//! store, but [`struct@DEFAULT_STYLES`] provides a small built-in table so a
//! molecule can be rendered without any database at hand.

use std::collections::HashMap;
use std::fmt::Write;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

/// Radius used for element codes with no registered style, in canvas units.
pub const FALLBACK_RADIUS: u32 = 25;

/// Fill color (6 hex digits, no `#`) used for element codes with no
/// registered style.
pub const FALLBACK_COLOR: &str = "000000";

/// Visual attributes of a single element.
///
/// Colors are 6-hex-digit strings without a leading `#`. `color1` doubles as
/// the flat circle fill; all three colors become gradient stops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementStyle {
    /// Display name, e.g. `"Oxygen"`. Also the gradient id in the SVG defs.
    pub name: String,
    pub color1: String,
    pub color2: String,
    pub color3: String,
    /// Circle radius in canvas units.
    pub radius: u32,
}

/// The resolved fill attributes for one atom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fill<'a> {
    pub radius: u32,
    /// 6 hex digits, no leading `#`.
    pub color: &'a str,
}

/// A code-keyed lookup of element styles.
///
/// Lookups are case-sensitive (`"CO"` is cobalt-ish, `"Co"` is not the same
/// key). Unmapped codes resolve to [`FALLBACK_RADIUS`] / [`FALLBACK_COLOR`]
/// rather than an error, so rendering never fails on unknown chemistry.
#[derive(Debug, Clone, Default)]
pub struct ElementStyles {
    styles: HashMap<String, ElementStyle>,
}

impl ElementStyles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, code: impl Into<String>, style: ElementStyle) {
        self.styles.insert(code.into(), style);
    }

    pub fn get(&self, code: &str) -> Option<&ElementStyle> {
        self.styles.get(code)
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ElementStyle)> {
        self.styles.iter().map(|(code, style)| (code.as_str(), style))
    }

    /// Resolve the circle fill for an element code, falling back to the
    /// documented defaults for codes that have no registered style.
    pub fn fill_for(&self, code: &str) -> Fill<'_> {
        match self.styles.get(code) {
            Some(style) => Fill {
                radius: style.radius,
                color: &style.color1,
            },
            None => Fill {
                radius: FALLBACK_RADIUS,
                color: FALLBACK_COLOR,
            },
        }
    }

    /// One `<radialGradient>` block per registered element, id'd by display
    /// name, suitable for splicing into the `<svg>` header.
    ///
    /// Iteration order is sorted by code so the output is deterministic.
    pub fn radial_gradients(&self) -> String {
        let mut codes: Vec<&str> = self.styles.keys().map(String::as_str).collect();
        codes.sort_unstable();

        let mut defs = String::new();
        for code in codes {
            let style = &self.styles[code];
            write!(
                defs,
                "<radialGradient id=\"{}\" cx=\"-50%\" cy=\"-50%\" r=\"220%\" fx=\"20%\" fy=\"20%\">\
                 <stop offset=\"0%\" stop-color=\"#{}\"/>\
                 <stop offset=\"50%\" stop-color=\"#{}\"/>\
                 <stop offset=\"100%\" stop-color=\"#{}\"/>\
                 </radialGradient>",
                style.name, style.color1, style.color2, style.color3
            )
            .unwrap();
        }
        defs
    }
}

impl FromIterator<(String, ElementStyle)> for ElementStyles {
    fn from_iter<I: IntoIterator<Item = (String, ElementStyle)>>(iter: I) -> Self {
        Self {
            styles: iter.into_iter().collect(),
        }
    }
}

fn style(name: &str, c1: &str, c2: &str, c3: &str, radius: u32) -> ElementStyle {
    ElementStyle {
        name: name.to_string(),
        color1: c1.to_string(),
        color2: c2.to_string(),
        color3: c3.to_string(),
        radius,
    }
}

lazy_static! {
    /// Built-in styles for the handful of organic-chemistry workhorses,
    /// so rendering works without a populated store.
    pub static ref DEFAULT_STYLES: ElementStyles = {
        let mut styles = ElementStyles::new();
        styles.insert("H", style("Hydrogen", "FFFFFF", "050505", "020202", 25));
        styles.insert("C", style("Carbon", "808080", "010101", "000000", 40));
        styles.insert("N", style("Nitrogen", "0000FF", "000005", "000002", 40));
        styles.insert("O", style("Oxygen", "FF0000", "050000", "020000", 40));
        styles.insert("S", style("Sulfur", "FFFF30", "050500", "020200", 45));
        styles
    };
}
