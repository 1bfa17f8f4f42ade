//! Business layer for the gist-backed blog, independent of the web framework.
//! - `gist` talks to the remote gist document over HTTP.
//! - `blog` implements post CRUD as whole-blob read-modify-write.
//! - `rate_limit` gates requests per client key.
//! - `auth` issues and verifies the admin access token.

pub mod auth;
pub mod blog;
pub mod errors;
pub mod gist;
pub mod rate_limit;
