//! CDS Explorer: Browse a CDS Server Through cdsctl
//!
//! A lazily expanded tree over one or more CDS contexts: favorite workflows
//! and projects, project resources, workflow runs and the run graph down to
//! individual steps. All server data comes from invoking `cdsctl` against a
//! cdsrc file; hosts drive the tree through [`tree::ExplorerTree`].

pub mod cli;
pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod model;
pub mod status;
pub mod tree;
