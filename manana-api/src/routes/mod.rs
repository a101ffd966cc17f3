/// API route handlers
///
/// - `health`: health check endpoint
/// - `auth`: identity endpoints (signup, login, google, refresh)
/// - `tasks`: owner-scoped task CRUD

pub mod auth;
pub mod health;
pub mod tasks;

/// Flattens validator output into the first human-readable message
///
/// Error bodies carry a single message, so the first failed rule wins.
pub(crate) fn first_validation_message(errors: &validator::ValidationErrors) -> String {
    errors
        .field_errors()
        .iter()
        .flat_map(|(_, errs)| errs.iter())
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| "Request validation failed".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Probe {
        #[validate(email(message = "Invalid email format"))]
        email: String,
    }

    #[test]
    fn test_first_validation_message() {
        let probe = Probe {
            email: "nope".to_string(),
        };
        let errors = probe.validate().unwrap_err();
        assert_eq!(first_validation_message(&errors), "Invalid email format");
    }
}
