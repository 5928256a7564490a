//! Default values for configuration fields

pub fn default_properties() -> Vec<String> {
    vec![
        "og:title".to_string(),
        "og:url".to_string(),
        "product:price:amount".to_string(),
    ]
}

pub fn default_user_agent() -> String {
    // Some shops refuse the stock reqwest identity.
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"
        .to_string()
}

pub fn default_fetch_timeout() -> u64 {
    10
}

pub fn default_validate_timeout() -> u64 {
    5
}

pub fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}
