pub mod exon;
pub mod profile;

// re-export for cleaner imports
pub use self::exon::{Exon, Strand};
pub use self::profile::{ExpressionProfile, ProfileRow};
