use crate::types::ProviderInfo;

pub trait EmbeddingProvider: Send + Sync {
    fn dimension(&self) -> usize;
    fn encode(&self, text: &str) -> anyhow::Result<Vec<f32>>;
    fn encode_many(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.encode(t)).collect()
    }
    fn info(&self) -> ProviderInfo;
}
