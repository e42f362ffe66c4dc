//! Batch actions and their parameters.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One bulk operation together with its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum BatchAction {
    /// Soft delete (move to trash)
    Delete,
    /// Restore from trash
    Restore,
    /// Move into a folder; `None` moves to the library root
    Move { folder_id: Option<u64> },
    Tag { tags: TagOps },
    AddToAlbum { target: GroupTarget },
    AddToCollection { target: GroupTarget },
    MoveToVault,
    /// Pack into an archive, optionally with a server-side download preset
    Download {
        #[serde(default)]
        preset_id: Option<u64>,
    },
}

impl BatchAction {
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::Delete => ActionKind::Delete,
            Self::Restore => ActionKind::Restore,
            Self::Move { .. } => ActionKind::Move,
            Self::Tag { .. } => ActionKind::Tag,
            Self::AddToAlbum { .. } => ActionKind::AddToAlbum,
            Self::AddToCollection { .. } => ActionKind::AddToCollection,
            Self::MoveToVault => ActionKind::MoveToVault,
            Self::Download { .. } => ActionKind::Download,
        }
    }
}

/// Parameter-free discriminant of a `BatchAction`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Delete,
    Restore,
    Move,
    Tag,
    AddToAlbum,
    AddToCollection,
    MoveToVault,
    Download,
}

impl ActionKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Delete => "Delete",
            Self::Restore => "Restore",
            Self::Move => "Move",
            Self::Tag => "Tag",
            Self::AddToAlbum => "Add to album",
            Self::AddToCollection => "Add to collection",
            Self::MoveToVault => "Move to vault",
            Self::Download => "Download",
        }
    }

    /// Actions that take items out of the current view; batch mode ends after them.
    pub fn is_destructive(self) -> bool {
        matches!(
            self,
            Self::Delete | Self::Restore | Self::Move | Self::MoveToVault
        )
    }

    /// Actions after which the collection must be re-queried.
    pub fn mutates_collection(self) -> bool {
        self != Self::Download
    }

    pub fn requires_confirmation(self) -> bool {
        self == Self::Delete
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Tags to add and remove in one request.
///
/// A tag is never in both lists: adding a tag takes it out of `remove` and
/// vice versa. Tags are trimmed; blanks and duplicates are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagOps {
    pub add: Vec<String>,
    pub remove: Vec<String>,
}

impl TagOps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a tag to add. Returns false if it was blank or already queued.
    pub fn add_tag(&mut self, tag: &str) -> bool {
        Self::queue(tag, &mut self.add, &mut self.remove)
    }

    /// Queues a tag to remove. Returns false if it was blank or already queued.
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        Self::queue(tag, &mut self.remove, &mut self.add)
    }

    /// Builder-style `add_tag`.
    pub fn with_add(mut self, tag: &str) -> Self {
        self.add_tag(tag);
        self
    }

    /// Builder-style `remove_tag`.
    pub fn with_remove(mut self, tag: &str) -> Self {
        self.remove_tag(tag);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.add.is_empty() && self.remove.is_empty()
    }

    fn queue(tag: &str, into: &mut Vec<String>, other: &mut Vec<String>) -> bool {
        let tag = tag.trim();
        if tag.is_empty() || into.iter().any(|t| t == tag) {
            return false;
        }
        other.retain(|t| t != tag);
        into.push(tag.to_string());
        true
    }
}

/// Destination album or collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupTarget {
    Existing(u64),
    New { name: String },
}

impl GroupTarget {
    pub fn new_named(name: impl Into<String>) -> Self {
        Self::New { name: name.into() }
    }

    /// A new group needs a non-blank name.
    pub fn is_valid(&self) -> bool {
        match self {
            Self::Existing(_) => true,
            Self::New { name } => !name.trim().is_empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destructive_kinds() {
        assert!(ActionKind::Delete.is_destructive());
        assert!(ActionKind::MoveToVault.is_destructive());
        assert!(!ActionKind::Tag.is_destructive());
        assert!(!ActionKind::Download.is_destructive());
    }

    #[test]
    fn test_download_does_not_mutate() {
        assert!(!ActionKind::Download.mutates_collection());
        assert!(ActionKind::AddToAlbum.mutates_collection());
    }

    #[test]
    fn test_tag_ops_normalize() {
        let mut ops = TagOps::new();
        assert!(ops.add_tag("  sunset "));
        assert!(!ops.add_tag("sunset"));
        assert!(!ops.add_tag("   "));
        assert_eq!(ops.add, vec!["sunset".to_string()]);
    }

    #[test]
    fn test_tag_moves_between_lists() {
        let mut ops = TagOps::new().with_add("beach");
        ops.remove_tag("beach");
        assert!(ops.add.is_empty());
        assert_eq!(ops.remove, vec!["beach".to_string()]);
    }

    #[test]
    fn test_group_target_validation() {
        assert!(GroupTarget::Existing(3).is_valid());
        assert!(GroupTarget::new_named("Trip").is_valid());
        assert!(!GroupTarget::new_named("  ").is_valid());
    }

    #[test]
    fn test_action_json_shape() {
        let action = BatchAction::Move { folder_id: Some(4) };
        let json = serde_json::to_string(&action).unwrap();
        assert_eq!(json, r#"{"action":"move","folder_id":4}"#);
    }
}
