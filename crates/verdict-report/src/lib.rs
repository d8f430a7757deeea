//! Score aggregation and report assembly.
//!
//! [`score::aggregate`] reduces a finding set into per-file and overall
//! scores with a deterministic, changed-line-weighted policy. The
//! [`report::Analyzer`] ties the pipeline together: parse, filter, run
//! rules, aggregate, and hand back an immutable [`report::AnalysisReport`].

pub mod report;
pub mod score;
