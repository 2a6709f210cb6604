//! Route handlers. Each takes the pieces of server state it needs and
//! returns an HTML fragment (or JSON for `/api/state`).

pub mod admin;
pub mod games;
pub mod state;
pub mod teams;
pub mod util;
