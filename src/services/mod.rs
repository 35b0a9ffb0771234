// Service exports
pub mod chroma;
pub mod embedding;
pub mod llm;
pub mod store;

pub use chroma::{ChromaError, ChromaIndex, ChromaLoader};
pub use embedding::{EmbeddingClient, EmbeddingError};
pub use llm::{BackendError, ChatBackend, ChatMessage, ChatReply, ChatRole, LazyChatBackend, OpenAiChatClient};
pub use store::{CandidateStore, IndexHit, IndexLoader, SimilarityIndex, StoreError};
