//! Stepflow turns recorded user interactions into editable, versioned
//! step-by-step guides.
//!
//! The pipeline: raw events flow through the grouper ([`grouping`]), become
//! steps ([`capture`]), land in an immutable-value document ([`document`],
//! [`models`]), and persist as directory bundles with externalized
//! screenshots ([`storage`]) under periodic crash-recovery snapshots
//! ([`recovery`]).

pub mod capture;
pub mod document;
pub mod error;
pub mod grouping;
pub mod models;
pub mod recovery;
pub mod storage;

pub use error::{Error, Result, ValidationError};
