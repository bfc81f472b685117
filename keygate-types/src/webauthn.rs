//! Implementation of the types defined in [WebAuthn Level 3]
//!
//! Every dictionary comes in up to two forms. The `*Json` types are what relying parties send and
//! receive, with binary members as `base64url` text. Their counterparts without the suffix carry
//! [`Bytes`](crate::Bytes) and are what the platform credential primitives consume.
//!
//! [WebAuthn Level 3]: https://w3c.github.io/webauthn

mod assertion;
mod attestation;
mod common;
mod extensions;

// re-export types
pub use self::{assertion::*, attestation::*, common::*, extensions::*};
