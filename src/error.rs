//! Error types shared by the bridge, the match iterator and the scripting layer

use thiserror::Error;

/// Errors raised while dispatching script calls into the host
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BridgeError {
    /// The descriptor uses parameter types scripts cannot supply
    #[error("Cannot call {0}: not scriptable")]
    NotScriptable(String),

    /// Name matches neither a function nor a property
    #[error("Pane function / readable property / indexed writable property name expected, got '{0}'")]
    NoSuchMember(String),

    /// Read attempted through a property without a getter
    #[error("Attempt to read a write-only property '{0}'")]
    WriteOnly(String),

    /// Write attempted through a property without a setter
    #[error("Cannot assign to a read-only property '{0}'")]
    ReadOnly(String),

    #[error("Cannot assign directly to indexed property '{0}'")]
    IndexedAssignment(String),

    /// Assignment target is not a known property
    #[error("Expected the name of a writable property, got '{0}'")]
    NotWritable(String),

    /// Match object used after exhaustion or corruption
    #[error("Blocked attempt to use invalidated pane match object")]
    InvalidatedObject,

    /// The editor pane was used with no active document
    #[error("Editor pane is not accessible at this time")]
    SurfaceNotAccessible,

    #[error("Internal error: failed to allocate {0} bytes for string result")]
    InternalAllocationFailure(usize),

    /// `send_*` with a message id the catalog does not publish
    #[error("Message number {0} does not match any published function or property")]
    UnknownMessage(i64),

    #[error("Argument {0} does not match any constant")]
    UnknownConstant(i64),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Failure reported by the host itself
    #[error("Host error: {0}")]
    Host(String),
}

pub type BridgeResult<T> = Result<T, BridgeError>;

impl BridgeError {
    /// Convert into a script-level runtime error
    pub fn into_script_error(self) -> Box<rhai::EvalAltResult> {
        rhai::EvalAltResult::ErrorRuntime(self.to_string().into(), rhai::Position::NONE).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_human_readable() {
        assert_eq!(
            BridgeError::InvalidatedObject.to_string(),
            "Blocked attempt to use invalidated pane match object"
        );
        assert_eq!(
            BridgeError::ReadOnly("Length".into()).to_string(),
            "Cannot assign to a read-only property 'Length'"
        );
    }

    #[test]
    fn script_error_carries_message() {
        let err = BridgeError::SurfaceNotAccessible.into_script_error();
        assert!(err.to_string().contains("not accessible"));
    }
}
