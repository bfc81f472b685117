//! # Keygate Types
//!
//! Rust type definitions for the WebAuthn dictionaries exchanged during client side registration
//! and authentication ceremonies, and the codec used to move binary data across the wire.

mod utils;

pub mod webauthn;

// Re-exports
pub use utils::{
    bytes::{Bytes, NotBase64Encoded},
    encoding,
};
