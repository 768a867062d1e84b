use crate::client::DetectionClient;

/// State shared by every screen.
#[derive(Debug, Clone)]
pub struct AppState {
    pub client: DetectionClient,
}

impl AppState {
    pub fn new(client: DetectionClient) -> Self {
        Self { client }
    }
}
