//! Domain services used by HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own business rules and talk to the store seam so route
//! handlers can stay focused on protocol translation and auth plumbing.

pub mod review;
