//! # Change Notifications
//!
//! Every successful command produces one notification describing what ran,
//! with its arguments resolved (generated ids, former parents) so observers
//! never have to look at the tree as it was before the change.

use crate::idea::IdeaId;
use crate::session::SessionId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Commands as they appear in change notifications
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Command {
    UpdateTitle {
        id: IdeaId,
        title: String,
    },

    AddSubIdea {
        parent_id: IdeaId,
        title: String,
        new_id: IdeaId,
    },

    RemoveSubIdea {
        id: IdeaId,
        parent_id: IdeaId,
    },

    InsertIntermediate {
        id: IdeaId,
        title: String,
        new_id: IdeaId,
    },

    UpdateAttr {
        id: IdeaId,
        name: String,
        value: Value,
    },

    AddLink {
        from: IdeaId,
        to: IdeaId,
    },

    RemoveLink {
        from: IdeaId,
        to: IdeaId,
    },

    Paste {
        parent_id: IdeaId,
        new_id: IdeaId,
    },

    MoveRelative {
        id: IdeaId,
        delta: i32,
    },

    Undo,

    Redo,
}

impl Command {
    /// Command name as used in logs and analytics
    pub fn name(&self) -> &'static str {
        match self {
            Command::UpdateTitle { .. } => "updateTitle",
            Command::AddSubIdea { .. } => "addSubIdea",
            Command::RemoveSubIdea { .. } => "removeSubIdea",
            Command::InsertIntermediate { .. } => "insertIntermediate",
            Command::UpdateAttr { .. } => "updateAttr",
            Command::AddLink { .. } => "addLink",
            Command::RemoveLink { .. } => "removeLink",
            Command::Paste { .. } => "paste",
            Command::MoveRelative { .. } => "moveRelative",
            Command::Undo => "undo",
            Command::Redo => "redo",
        }
    }
}

/// A command together with the session it was attributed to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeNotification {
    pub command: Command,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionId>,
}

impl ChangeNotification {
    pub fn new(command: Command, session: Option<&str>) -> Self {
        Self {
            command,
            session: session.map(str::to_string),
        }
    }

    pub fn session(&self) -> Option<&str> {
        self.session.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_serialization() {
        let notification = ChangeNotification::new(
            Command::InsertIntermediate {
                id: 2,
                title: "ttl".to_string(),
                new_id: 3,
            },
            Some("originSession"),
        );

        let json = serde_json::to_value(&notification).unwrap();
        assert_eq!(json["command"]["command"], "insertIntermediate");
        assert_eq!(json["command"]["newId"], 3);

        let back: ChangeNotification = serde_json::from_value(json).unwrap();
        assert_eq!(back, notification);
    }

    #[test]
    fn test_command_names() {
        assert_eq!(Command::Undo.name(), "undo");
        assert_eq!(
            Command::RemoveSubIdea { id: 2, parent_id: 1 }.name(),
            "removeSubIdea"
        );
    }
}
