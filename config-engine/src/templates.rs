// Configuration templates for dynamic generation stub
pub struct ConfigTemplate {
    // Implementation will go here
}

impl ConfigTemplate {
    pub fn render(&self, context: &serde_json::Value) -> crate::error::Result<String> {
        Ok("{}".to_string()) // Stub implementation
    }
}