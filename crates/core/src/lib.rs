//! Client-side control surface for the yongent music-downloader backend.
//!
//! The backend runs downloads as background jobs. This crate submits them,
//! follows each job by polling until it finishes, manages the cookie file the
//! backend uses to reach the source site as a signed-in user, and asks the
//! backend's folder picker for a destination.
//!
//! # Components
//!
//! - [`input`] - decides whether user input is a URL or a search query
//! - [`job::JobController`] - submission, polling and cancellation of one job
//! - [`credentials::CredentialManager`] - probe, upload and revoke the cookie file
//! - [`output_location::OutputLocationResolver`] - destination directory via the picker
//! - [`ControlSurface`] - all of the above mounted against one backend
//!
//! All network access goes through the [`Backend`] trait, implemented over
//! HTTP by [`HttpBackend`] and in memory by [`backend::FakeBackend`].

pub mod backend;
pub mod config;
pub mod credentials;
mod error;
pub mod input;
pub mod job;
pub mod output_location;
mod surface;

pub use backend::{Backend, HttpBackend};
pub use config::ClientConfig;
pub use credentials::{CredentialFile, CredentialManager, CredentialView};
pub use error::{Error, GENERIC_SERVER_ERROR, Result};
pub use input::{Input, SearchQuery};
pub use job::{JobController, JobId, JobSnapshot, JobState, SubmitOutcome};
pub use output_location::OutputLocationResolver;
pub use surface::ControlSurface;
pub use yongent_protocol as protocol;
