//! Tests that build tables and run cascades end to end.

pub mod cascade_scenarios;
pub mod table_reuse;
