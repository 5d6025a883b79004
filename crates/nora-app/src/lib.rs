//! Stateful application layer for nora.
//!
//! Each component is an explicit object constructed once at startup and
//! handed its collaborators (storage, secret storage, notifier) as `Arc`s.
//! Mutating operations take `&mut self`, so a component processes one
//! user-initiated operation at a time.
//!
//! - [`subjects::SubjectStore`] — the subject collection, persisted whole on
//!   every mutation.
//! - [`session::SessionGate`] — sign-in state and the login PIN entry.
//! - [`settings::PinSettings`] — setting, changing and removing the PIN.
//! - [`otp::OtpBuffer`] — the six-slot digit entry shared by both.
//! - [`toast::ToastSlot`] — a single-slot, auto-expiring notifier.

pub mod error;
pub mod otp;
pub mod session;
pub mod settings;
pub mod subjects;
pub mod toast;

pub use error::{Error, Result};

#[cfg(test)]
mod testing;
