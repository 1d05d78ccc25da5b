//! Fire-and-forget editor side effects.
//!
//! The engine asks an external editor to highlight flagged objects and to
//! stage corrected tags. Failures are logged by the caller and never abort a
//! run.

use thiserror::Error;

use crate::entity::EntityRef;

/// Request sent to the editor sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorCommand {
    /// Object to load or highlight.
    pub object: EntityRef,
    /// Tag to stage on the object.
    pub add_tags: Option<(String, String)>,
    /// Whether the editor should open a new layer.
    pub new_layer: Option<bool>,
    /// Name of the layer to load into.
    pub layer_name: Option<String>,
}

impl EditorCommand {
    /// Highlight `object` without proposing any change.
    ///
    /// # Examples
    /// ```
    /// use toponym_core::{EditorCommand, EntityKind, EntityRef};
    ///
    /// let command = EditorCommand::highlight(EntityRef::new(EntityKind::Way, 3));
    /// assert!(command.add_tags.is_none());
    /// ```
    #[must_use]
    pub const fn highlight(object: EntityRef) -> Self {
        Self {
            object,
            add_tags: None,
            new_layer: None,
            layer_name: None,
        }
    }

    /// Propose `key=value` on `object`, loading into the current layer.
    #[must_use]
    pub fn propose(object: EntityRef, key: &str, value: &str) -> Self {
        Self {
            object,
            add_tags: Some((key.to_owned(), value.to_owned())),
            new_layer: Some(false),
            layer_name: None,
        }
    }

    /// Load the object into the named layer.
    #[must_use]
    pub fn with_layer_name(mut self, name: impl Into<String>) -> Self {
        self.layer_name = Some(name.into());
        self
    }
}

/// Why an editor command was not delivered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SinkError {
    /// The editor could not be reached.
    #[error("editor at {url} is unreachable: {message}")]
    Unreachable {
        /// Requested URL.
        url: String,
        /// Underlying error message.
        message: String,
    },
    /// The editor refused the command.
    #[error("editor at {url} rejected the command with status {status}")]
    Rejected {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },
}

/// Receives editor commands.
pub trait EditorSink: Send + Sync {
    /// Deliver `command`; no response is awaited beyond the status.
    ///
    /// # Errors
    /// Returns [`SinkError`] when the command was not delivered.
    fn submit(&self, command: &EditorCommand) -> Result<(), SinkError>;
}

/// Sink that drops every command.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EditorSink for NullSink {
    fn submit(&self, _command: &EditorCommand) -> Result<(), SinkError> {
        Ok(())
    }
}
