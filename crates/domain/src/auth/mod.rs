//! Authentication domain types

mod types;

pub use types::{
    AuthorizationRequest, TokenErrorResponse, TokenGrant, TokenResponse, token_preview,
};
