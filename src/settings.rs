//! Persisted user preferences.
//!
//! The host owns the actual storage; this is the typed model it loads into
//! and saves from, with the documented defaults filled in for anything
//! missing. The grow layer filter is kept as the raw comma-separated text the
//! user typed and compiled to a regex on demand, so an edit that fails to
//! compile can be rejected while the previous text stays in effect.

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Named preferences with their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Restrict ray casts to the designated ground category.
    pub stop_rays_at_ground: bool,
    /// Rays per source point for bulk ray sprays.
    pub default_scatter_count: usize,
    /// Comma-separated patterns selecting the marker layers grow acts on.
    pub ground_layer_filter: String,
    /// Fallback size range for grown instances whose marker sits on the
    /// ground, in scene length units.
    pub min_growth_size: f64,
    pub max_growth_size: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            stop_rays_at_ground: false,
            default_scatter_count: 32,
            ground_layer_filter: "6113".to_string(),
            min_growth_size: 5.0,
            max_growth_size: 15.0,
        }
    }
}

impl Settings {
    #[must_use]
    pub fn with_stop_rays_at_ground(mut self, stop: bool) -> Self {
        self.stop_rays_at_ground = stop;
        self
    }

    #[must_use]
    pub fn with_scatter_count(mut self, count: usize) -> Self {
        self.default_scatter_count = count;
        self
    }

    #[must_use]
    pub fn with_growth_sizes(mut self, min: f64, max: f64) -> Self {
        self.min_growth_size = min;
        self.max_growth_size = max;
        self
    }

    /// The compiled layer filter. `None` only when the stored text is
    /// malformed, which `update_layer_filter` normally prevents.
    #[must_use]
    pub fn layer_filter(&self) -> Option<Regex> {
        compile_layer_filter(&self.ground_layer_filter)
    }

    /// Replace the layer filter text. A pattern that fails to compile keeps
    /// the previous value and returns `false`.
    pub fn update_layer_filter(&mut self, text: &str) -> bool {
        if compile_layer_filter(text).is_some() {
            self.ground_layer_filter = text.to_string();
            true
        } else {
            false
        }
    }
}

/// Compile a comma-separated pattern list into one alternation regex.
///
/// Items are trimmed and joined as alternatives; a layer matches when the
/// regex is found anywhere in its name. An empty filter therefore matches
/// every layer. Returns `None` for text that does not compile, so callers
/// can keep their previous filter.
#[must_use]
pub fn compile_layer_filter(filter: &str) -> Option<Regex> {
    let joined = filter
        .split(',')
        .map(str::trim)
        .collect::<Vec<_>>()
        .join("|");
    match Regex::new(&joined) {
        Ok(re) => Some(re),
        Err(err) => {
            log::warn!("layer filter {filter:?} does not compile: {err}");
            None
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
