pub mod component;
pub mod dependency;
pub mod primitives;
pub mod source;

pub use component::Component;
pub use dependency::{Dependency, ProbeOutcome};
pub use primitives::{KernelPrimitives, OverrideEntry, Overrides};
pub use source::{File, FileRole, Format};
