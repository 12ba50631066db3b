//! Host boundary
//!
//! The engine only needs to enumerate entities and read/write each one's
//! label and buffer. [`Workspace`] is the in-memory host used by the CLI and
//! the tests; it is also the JSON shape the CLI reads and writes.

use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

pub trait EntityHost {
    type Id: Copy + Eq + Hash + fmt::Debug;

    fn entity_ids(&self) -> Vec<Self::Id>;

    fn label(&self, id: Self::Id) -> Option<String>;
    fn set_label(&mut self, id: Self::Id, label: String);

    fn buffer(&self, id: Self::Id) -> Option<String>;
    fn set_buffer(&mut self, id: Self::Id, buffer: String);

    /// Bypassed/muted entities are skipped by "randomize all".
    fn is_muted(&self, _id: Self::Id) -> bool {
        false
    }

    fn enumerate(&self, predicate: impl Fn(&Self, Self::Id) -> bool) -> Vec<Self::Id>
    where
        Self: Sized,
    {
        self.entity_ids()
            .into_iter()
            .filter(|&id| predicate(self, id))
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub label: String,
    pub buffer: String,
    #[serde(default)]
    pub muted: bool,
}

impl Entity {
    pub fn new(label: impl Into<String>, buffer: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            buffer: buffer.into(),
            muted: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Workspace {
    pub entities: Vec<Entity>,
}

impl Workspace {
    pub fn new(entities: Vec<Entity>) -> Self {
        Self { entities }
    }

    pub fn get(&self, id: usize) -> Option<&Entity> {
        self.entities.get(id)
    }
}

impl EntityHost for Workspace {
    type Id = usize;

    fn entity_ids(&self) -> Vec<usize> {
        (0..self.entities.len()).collect()
    }

    fn label(&self, id: usize) -> Option<String> {
        self.entities.get(id).map(|e| e.label.clone())
    }

    fn set_label(&mut self, id: usize, label: String) {
        if let Some(entity) = self.entities.get_mut(id) {
            entity.label = label;
        }
    }

    fn buffer(&self, id: usize) -> Option<String> {
        self.entities.get(id).map(|e| e.buffer.clone())
    }

    fn set_buffer(&mut self, id: usize, buffer: String) {
        if let Some(entity) = self.entities.get_mut(id) {
            entity.buffer = buffer;
        }
    }

    fn is_muted(&self, id: usize) -> bool {
        self.entities.get(id).is_some_and(|e| e.muted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_json_shape() {
        let json = r#"[{"label": "A /r", "buffer": "x"}, {"label": "B", "buffer": "", "muted": true}]"#;
        let ws: Workspace = serde_json::from_str(json).unwrap();
        assert_eq!(ws.entities.len(), 2);
        assert!(!ws.is_muted(0));
        assert!(ws.is_muted(1));
    }

    #[test]
    fn test_enumerate_filters() {
        let ws = Workspace::new(vec![Entity::new("A", "x"), Entity::new("B", "y")]);
        let ids = ws.enumerate(|host, id| host.label(id).as_deref() == Some("B"));
        assert_eq!(ids, vec![1]);
    }

    #[test]
    fn test_out_of_range_writes_ignored() {
        let mut ws = Workspace::default();
        ws.set_label(3, "x".into());
        assert!(ws.label(3).is_none());
    }
}
