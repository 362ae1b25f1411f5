// Route handlers, one module per area of the API.

pub mod auth;
pub mod detect;
pub mod documents;
