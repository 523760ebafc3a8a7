//! Armflow Core
//!
//! Core library for rendering Azure ARM deployment templates as dependency
//! diagrams: parse `dependsOn` reference expressions, reconstruct the
//! resource dependency forest, and compute a deterministic 2-D layout

pub mod diagram;
pub mod expression;
pub mod forest;
pub mod index;
pub mod layout;
pub mod resolver;
pub mod template;
