pub mod anchor;
pub mod civil;
pub mod deadline;
pub mod domain;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod severity;
