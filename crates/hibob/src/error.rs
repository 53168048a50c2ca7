#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}
