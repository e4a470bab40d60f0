//! Default values for optional configuration fields

pub fn default_host() -> String {
    "0.0.0.0".to_string()
}

pub fn default_port() -> u16 {
    8080
}

pub fn default_namespace() -> String {
    "default".to_string()
}

pub fn default_log_format() -> String {
    "pretty".to_string()
}
