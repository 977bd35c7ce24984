//! Error types for the JNI binding

use framebridge_core::{BridgeError, ConfigError, MarshalingError};
use thiserror::Error;

/// Frame bridge JNI errors
#[derive(Debug, Error)]
pub enum AndroidError {
    #[error("JNI error: {0}")]
    Jni(#[from] jni::errors::Error),

    #[error(transparent)]
    Bridge(#[from] BridgeError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

impl From<MarshalingError> for AndroidError {
    fn from(e: MarshalingError) -> Self {
        AndroidError::Bridge(e.into())
    }
}

impl From<AndroidError> for BridgeError {
    fn from(e: AndroidError) -> Self {
        match e {
            AndroidError::Bridge(e) => e,
            // a bare JNI error outside a callback is the runtime failing us
            AndroidError::Jni(e) => MarshalingError::Runtime(e.to_string()).into(),
            other => MarshalingError::Runtime(other.to_string()).into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use framebridge_core::FaultKind;

    #[test]
    fn test_bridge_errors_keep_their_kind() {
        let err: BridgeError = AndroidError::Bridge(BridgeError::callback("thrown")).into();
        assert_eq!(err.kind(), FaultKind::Callback);

        let err: BridgeError = AndroidError::from(MarshalingError::InvalidPointer).into();
        assert_eq!(err.kind(), FaultKind::Marshaling);
    }

    #[test]
    fn test_jni_errors_are_marshaling_faults() {
        let err: BridgeError = AndroidError::Jni(jni::errors::Error::NullPtr("GetJavaVM")).into();
        assert_eq!(err.kind(), FaultKind::Marshaling);

        let err: BridgeError = AndroidError::InvalidParameter("null receiver".into()).into();
        assert_eq!(err.kind(), FaultKind::Marshaling);
        assert!(err.to_string().contains("null receiver"));
    }
}
