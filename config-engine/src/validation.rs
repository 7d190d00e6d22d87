// Configuration validation and schema enforcement stub
pub trait ConfigValidator {
    fn validate(&self, config: &serde_json::Value) -> crate::error::Result<()>;
}