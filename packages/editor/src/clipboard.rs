//! # Clipboard and Attachments
//!
//! Copy/cut keep one cloned subtree; paste and paste-style read it back.
//! A cut removes its source right away, the clipboard only remembers where
//! the content came from.

use mindmap_content::{Idea, IdeaId};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default)]
pub struct Clipboard {
    content: Option<Idea>,
    cut_source: Option<IdeaId>,
}

impl Clipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn copy(&mut self, idea: Idea) {
        self.content = Some(idea);
        self.cut_source = None;
    }

    pub fn cut(&mut self, idea: Idea, source: IdeaId) {
        self.content = Some(idea);
        self.cut_source = Some(source);
    }

    pub fn content(&self) -> Option<&Idea> {
        self.content.as_ref()
    }

    /// Id the current content was cut from, if it was cut
    pub fn cut_source(&self) -> Option<IdeaId> {
        self.cut_source
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_none()
    }

    /// Style of the clipboard root, if there is content
    pub fn style(&self) -> Option<Map<String, Value>> {
        self.content.as_ref().map(Idea::style)
    }

    pub fn clear(&mut self) {
        self.content = None;
        self.cut_source = None;
    }
}

/// Shallow key union; `incoming` wins on conflicts
pub fn merge_style(existing: &Map<String, Value>, incoming: &Map<String, Value>) -> Map<String, Value> {
    let mut merged = existing.clone();
    for (key, value) in incoming {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

/// Document attached to an idea
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub content_type: String,
    pub content: String,
}

impl Attachment {
    pub fn new(content_type: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            content: content.into(),
        }
    }

    /// Attribute value to store: `false` when there is no content
    pub fn to_attr_value(&self) -> Value {
        if self.content.is_empty() {
            Value::Bool(false)
        } else {
            serde_json::to_value(self).unwrap_or(Value::Bool(false))
        }
    }
}
