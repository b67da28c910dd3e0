//! Small cross-cutting helpers: binary state snapshots and filename
//! templating for run artifacts.

pub mod naming;
pub mod persist;
