//! Default value functions used by serde for config deserialization.

pub fn default_api_host() -> String {
    "127.0.0.1".to_string()
}

pub fn default_api_port() -> u16 {
    8090
}

pub fn default_transport_provider() -> String {
    "whatsapp".to_string()
}

pub fn default_transport_base_url() -> String {
    "https://graph.facebook.com/v19.0".to_string()
}

pub fn default_generation_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

pub fn default_generation_model() -> String {
    "gpt-4o-mini".to_string()
}

pub fn default_generation_timeout() -> u64 {
    30
}

pub fn default_page_size() -> usize {
    5
}

pub fn default_seen_window() -> u64 {
    300
}

pub fn default_reply_window() -> u64 {
    10
}

pub fn default_intro_delay() -> u64 {
    4
}

pub fn default_queue_capacity() -> usize {
    256
}

pub fn default_sweep_interval() -> u64 {
    60
}
