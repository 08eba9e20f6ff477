//! # Session Attribution
//!
//! Every command is optionally tagged with the session that issued it.
//! A command counts as local to a session when it carries no tag or the
//! same tag.

/// Identifier of an editing session
pub type SessionId = String;

/// Whether a command tagged `origin` should be treated as issued by `local`
pub fn is_local_session(origin: Option<&str>, local: Option<&str>) -> bool {
    match origin {
        None => true,
        Some(origin) => local == Some(origin),
    }
}
