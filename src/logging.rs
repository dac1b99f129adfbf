use std::fmt;
use uuid::Uuid;

/// Sanitized wrapper for email addresses that masks the local part
#[derive(Debug, Clone)]
pub struct SanitizedEmail(String);

impl SanitizedEmail {
    pub fn new(email: impl Into<String>) -> Self {
        let email = email.into();
        Self(Self::sanitize(&email))
    }

    fn sanitize(email: &str) -> String {
        match email.split_once('@') {
            Some((local, domain)) => {
                let masked_local = match local.chars().next() {
                    Some(first) if local.chars().count() > 2 => format!("{first}***"),
                    _ => "*".repeat(local.chars().count()),
                };
                format!("{masked_local}@{domain}")
            }
            None => "***@***".to_string(),
        }
    }
}

impl fmt::Display for SanitizedEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sanitized wrapper for RUT numbers that keeps only the last three digits
#[derive(Debug, Clone)]
pub struct SanitizedRut(String);

impl SanitizedRut {
    pub fn new(rut: impl AsRef<str>) -> Self {
        Self(Self::sanitize(rut.as_ref()))
    }

    fn sanitize(rut: &str) -> String {
        let digits: Vec<char> = rut.chars().filter(char::is_ascii_digit).collect();
        if digits.len() <= 3 {
            return "*".repeat(digits.len());
        }
        let visible: String = digits[digits.len() - 3..].iter().collect();
        format!("{}{}", "*".repeat(digits.len() - 3), visible)
    }
}

impl fmt::Display for SanitizedRut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Wrapper for UUIDs that are safe to log
#[derive(Debug, Clone, Copy)]
pub struct LoggableUuid(pub Uuid);

impl fmt::Display for LoggableUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for LoggableUuid {
    fn from(uuid: Uuid) -> Self {
        LoggableUuid(uuid)
    }
}

/// Sanitized wrapper for IP addresses that masks the last octet
#[derive(Debug, Clone)]
pub struct SanitizedIpAddr(String);

impl SanitizedIpAddr {
    pub fn new(ip: impl fmt::Display) -> Self {
        Self(Self::sanitize(&ip.to_string()))
    }

    fn sanitize(ip: &str) -> String {
        if ip.contains(':') {
            match ip.rfind(':') {
                Some(last_colon) => format!("{}:****", &ip[..last_colon]),
                None => "***".to_string(),
            }
        } else if let Some(last_dot) = ip.rfind('.') {
            format!("{}.***", &ip[..last_dot])
        } else {
            "***".to_string()
        }
    }
}

impl fmt::Display for SanitizedIpAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Storefront events worth a structured audit line
#[derive(Debug, Clone, Copy)]
pub enum StoreEvent {
    RegistrationSuccess,
    RegistrationRejected,
    RegistrationConflict,
    LoginSuccess,
    LoginFailure,
    TokenValidationFailure,
    UnauthorizedAccess,
    RateLimitExceeded,
    OrderPlaced,
    ContactReceived,
}

impl StoreEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreEvent::RegistrationSuccess => "registration_success",
            StoreEvent::RegistrationRejected => "registration_rejected",
            StoreEvent::RegistrationConflict => "registration_conflict",
            StoreEvent::LoginSuccess => "login_success",
            StoreEvent::LoginFailure => "login_failure",
            StoreEvent::TokenValidationFailure => "token_validation_failure",
            StoreEvent::UnauthorizedAccess => "unauthorized_access",
            StoreEvent::RateLimitExceeded => "rate_limit_exceeded",
            StoreEvent::OrderPlaced => "order_placed",
            StoreEvent::ContactReceived => "contact_received",
        }
    }

    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            StoreEvent::LoginFailure
                | StoreEvent::TokenValidationFailure
                | StoreEvent::UnauthorizedAccess
                | StoreEvent::RateLimitExceeded
        )
    }
}

impl fmt::Display for StoreEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Log a store event with sanitized context
#[macro_export]
macro_rules! log_store_event {
    ($event:expr, $($field:tt)*) => {
        if $event.is_critical() {
            tracing::warn!(
                store_event = %$event,
                event_type = "store",
                $($field)*
            );
        } else {
            tracing::info!(
                store_event = %$event,
                event_type = "store",
                $($field)*
            );
        }
    };
}
