//! Model clients

mod azure;
mod base;
mod openai;

pub use azure::AzureOpenAIClient;
pub use base::HttpClientBase;
pub use openai::OpenAIClient;
