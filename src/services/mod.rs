//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own the login state machine and the recipe fetch so route
//! handlers can stay focused on cookies, redirects and HTML.

pub mod auth;
pub mod bootstrap;
pub mod recipes;
pub mod session;
