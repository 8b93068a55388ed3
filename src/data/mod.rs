//! Design types, their layer geometry and design instances.

pub mod correspondence;
pub mod design;
pub mod design_code;
pub mod registry;
