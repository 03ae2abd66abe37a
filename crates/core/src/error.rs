use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("Validation failed: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display_names_entity_and_id() {
        let id = Uuid::nil();
        let err = CoreError::NotFound {
            entity: "User email",
            id,
        };
        assert_eq!(
            err.to_string(),
            format!("Entity not found: User email with id {id}")
        );
    }

    #[test]
    fn validation_display() {
        let err = CoreError::Validation("missing original_path".into());
        assert_eq!(err.to_string(), "Validation failed: missing original_path");
    }
}
