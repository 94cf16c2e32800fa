use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ConfigValueRequest {
    pub value: String,
}
