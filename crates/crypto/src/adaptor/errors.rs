use thiserror::Error;

/// Errors produced by the adaptor signature scheme.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdaptorError {
    /// The encryption key is not a valid curve point.
    #[error("invalid encryption key: {0}")]
    InvalidEncryptionKey(secp256k1::Error),

    /// The adaptor signature does not match the message and keys it claims.
    #[error("adaptor signature verification failed")]
    AdaptorVerificationFailed,

    /// A serialized adaptor signature has the wrong length.
    #[error("invalid adaptor signature length (expected {expected}, got {got})")]
    InvalidLength { expected: usize, got: usize },

    /// The nonce point of a serialized adaptor signature is not on the curve.
    #[error("invalid adaptor nonce point")]
    InvalidNoncePoint,

    /// The scalar of a serialized adaptor signature is zero or not below the curve order.
    #[error("invalid adaptor scalar")]
    InvalidScalar,

    /// The negation flag byte is neither 0 nor 1, or disagrees with the nonce parity.
    #[error("invalid adaptor negation flag {0:#04x}")]
    InvalidNegationFlag(u8),

    /// The final signature does not share the adaptor signature's nonce.
    #[error("signature nonce does not match adaptor signature")]
    NonceMismatch,

    /// A scalar operation landed on zero or the point at infinity.
    #[error("degenerate scalar arithmetic")]
    Degenerate,
}
