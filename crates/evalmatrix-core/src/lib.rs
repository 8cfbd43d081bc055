//! evalmatrix-core: Evaluation matrix engine, attendance, and backend traits.
//!
//! This crate holds the client-side logic of the training management system:
//! certification grading over a sparse score matrix, attendance sheets, and
//! the session schedule rules. Everything that talks to the remote API sits
//! behind the traits in [`traits`].

pub mod attendance;
pub mod engine;
pub mod error;
pub mod matrix;
pub mod model;
pub mod report;
pub mod schedule;
pub mod statistics;
pub mod traits;

pub use engine::GradingSession;
pub use error::{BackendError, ValidationError};
pub use matrix::EvaluationMatrix;
pub use model::{AdmissionStatus, Competency, MatrixSnapshot, Participant, SaveRecord};
