//! Role landing command.

use detailer_core::{AuthState, Email, Landing, Role, SessionUser, UserId, landing_for};

/// Landing path for an optional role.
pub fn landing_path(role: Option<&str>, default_path: &str) -> String {
    let user = role.and_then(|role| {
        Some(SessionUser {
            id: UserId::parse("cli").ok()?,
            email: Email::parse("cli@localhost.localdomain").ok()?,
            name: "cli".to_string(),
            role: role.parse::<Role>().unwrap_or(Role::Unknown),
            tenant_id: None,
        })
    });

    match landing_for(AuthState::from_user(user.as_ref()), default_path) {
        Landing::Redirect(path) => path,
        Landing::Pending => default_path.to_owned(),
    }
}

/// Log the landing route of `role`.
pub fn show(role: Option<&str>, default_path: &str) {
    let path = landing_path(role, default_path);
    tracing::info!(role = role.unwrap_or("anonymous"), landing = %path, "Landing route");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landing_path() {
        assert_eq!(landing_path(Some("tenant_admin"), "/"), "/admin/dashboard");
        assert_eq!(landing_path(Some("EMPLOYEE"), "/"), "/painel/dashboard");
        assert_eq!(landing_path(Some("client"), "/"), "/agendar/servicos");
        assert_eq!(landing_path(Some("MECHANIC"), "/sobre"), "/sobre");
        assert_eq!(landing_path(None, ""), "/");
    }
}
