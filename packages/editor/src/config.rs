use crate::errors::EditorError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_TITLE: &str = "double click to edit";

/// Map model settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapModelConfig {
    /// Placeholder titles for new ideas; also select-all triggers on edit
    #[serde(default = "default_titles")]
    pub titles: Vec<String>,

    /// Placeholder titles for intermediate ideas (falls back to `titles`)
    #[serde(default)]
    pub intermediary_titles: Vec<String>,

    /// Session whose commands count as local
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    #[serde(default = "default_scale_up")]
    pub scale_up_factor: f64,

    #[serde(default = "default_scale_down")]
    pub scale_down_factor: f64,

    /// Component name carried by analytic events
    #[serde(default = "default_analytic_component")]
    pub analytic_component: String,

    /// Widest horizontal distance considered when moving up/down without a sibling
    #[serde(default = "default_horizontal_threshold")]
    pub horizontal_selection_threshold: f64,
}

fn default_titles() -> Vec<String> {
    vec![DEFAULT_TITLE.to_string()]
}

fn default_scale_up() -> f64 {
    1.25
}

fn default_scale_down() -> f64 {
    0.8
}

fn default_analytic_component() -> String {
    "mapModel".to_string()
}

fn default_horizontal_threshold() -> f64 {
    300.0
}

impl MapModelConfig {
    pub fn from_json(json: &str) -> Result<Self, EditorError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a JSON file; a missing file yields the defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EditorError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No map model config, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn with_titles(mut self, titles: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.titles = titles.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_intermediary_titles(mut self, titles: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.intermediary_titles = titles.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Titles used for intermediate ideas
    pub fn intermediary_titles(&self) -> &[String] {
        if self.intermediary_titles.is_empty() {
            &self.titles
        } else {
            &self.intermediary_titles
        }
    }

    /// Whether `title` is one of the configured placeholders
    pub fn is_placeholder_title(&self, title: &str) -> bool {
        self.titles.iter().chain(&self.intermediary_titles).any(|t| t == title)
    }
}

impl Default for MapModelConfig {
    fn default() -> Self {
        Self {
            titles: default_titles(),
            intermediary_titles: Vec::new(),
            session_id: None,
            scale_up_factor: default_scale_up(),
            scale_down_factor: default_scale_down(),
            analytic_component: default_analytic_component(),
            horizontal_selection_threshold: default_horizontal_threshold(),
        }
    }
}

/// Source of uniform numbers in `[0, 1)` for picking placeholder titles
pub trait RandomSource {
    fn next_f64(&mut self) -> f64;
}

/// Seedable `RandomSource` backed by `StdRng`
#[derive(Debug, Clone)]
pub struct SeededRandom(StdRng);

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }
}

impl RandomSource for SeededRandom {
    fn next_f64(&mut self) -> f64 {
        self.0.random()
    }
}

/// Pick `titles[floor(len * r)]`
pub fn pick_title(titles: &[String], random: &mut dyn RandomSource) -> Option<String> {
    if titles.is_empty() {
        return None;
    }
    let index = (titles.len() as f64 * random.next_f64()).floor() as usize;
    titles.get(index.min(titles.len() - 1)).cloned()
}
