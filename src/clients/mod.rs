pub mod openai;
pub mod traits;

pub use openai::OpenAiCompatClient;
pub use traits::{ModelError, VisionModel};
