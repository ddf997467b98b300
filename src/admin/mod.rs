//! Admin Control Surface.
//!
//! An [`AdminConsole`] is one admin session: a filtered, paginated view over
//! every order plus advance/retreat actions against the same store the tracking
//! views read. Status changes show up in the rows immediately and are then
//! either committed with the store's answer or rolled back.

pub mod console;
pub mod error;

pub use console::{AdminConsole, AdminRow, AdminView, RefreshHandle};
pub use error::AdminError;
