//! Concurrent execution of planwork plans.
//!
//! [`Executor`] drives a plan to completion: it polls the plan's pure
//! `next` query, admits the returned tasks into the status store, runs each
//! one on its own tokio task with writers from a [`writers::WriterFactory`],
//! and stops once the plan's aggregate state turns terminal.
//!
//! The crate also bundles two ready-made task types ([`tasks::Echo`] and
//! [`tasks::LocalCommand`]) and two writer factories
//! ([`writers::InMemory`] and [`writers::Console`]).

pub mod executor;
pub mod tasks;
pub mod writers;

pub use executor::Executor;
