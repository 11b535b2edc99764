//! Moderation workflow engine for the FindexHub classifieds messaging bot.
//!
//! Users assemble a job posting (employer vacancy or job-seeker profile)
//! through a guided field-by-field dialogue, the finished draft is queued
//! for human moderation, and approved postings are published to the public
//! channel. The messaging transport itself is out of scope; the engine
//! talks to it through the [`workflows::postings::MessengerGateway`] trait.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
