use std::env;

#[derive(Debug, Clone, Copy)]
pub struct AuthConfig {
    pub allow_guest_access: bool,
}

impl AuthConfig {
    pub fn from_env() -> Self {
        let allow_guest_access = env::var("ALLOW_GUEST_ACCESS")
            .ok()
            .and_then(|v| {
                let v = v.trim().to_ascii_lowercase();
                match v.as_str() {
                    "1" | "true" | "yes" | "y" | "on" => Some(true),
                    "0" | "false" | "no" | "n" | "off" => Some(false),
                    _ => None,
                }
            })
            .unwrap_or(true);

        Self { allow_guest_access }
    }
}
