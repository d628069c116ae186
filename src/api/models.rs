use serde::Deserialize;

#[derive(Deserialize)]
pub struct AnalyzeRequest {
    /// Missing `url` is validated like an empty one.
    #[serde(default)]
    pub url: String,
}
