pub mod transcript;

pub use transcript::{QaPair, Transcript};
