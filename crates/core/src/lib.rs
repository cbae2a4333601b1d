pub mod material;
pub mod money;

pub use material::{MaterialDraft, MaterialError, DEFAULT_CURRENCY};
pub use money::Won;
