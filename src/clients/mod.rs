pub mod dashscope_client;
pub mod llm_client;
pub mod openai_client;

pub use dashscope_client::DashScopeClient;
pub use llm_client::{build_backend, generate_with_timeout, GenerationBackend, GenerationRequest};
pub use openai_client::OpenAiCompatibleClient;
