//! Board credential primitives.
//!
//! Salted hashing for passwords and refresh tokens (Argon2id), JWT issuance
//! and decoding for the access/refresh pair, and the cookie attributes each
//! token travels in. Nothing here touches the database or HTTP types.
pub mod cookies;
pub mod password;
pub mod tokens;
