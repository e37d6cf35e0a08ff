use std::fs;

use serde::Deserialize;

#[derive(Debug, Clone)]
pub struct Settings {
    pub server_bind: String,
    pub ollama_url: String,
    pub ollama_model: String,
    pub ollama_timeout_seconds: u64,
    pub temperature: f32,
    pub num_predict: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:5000".into(),
            ollama_url: "http://localhost:11434/api/generate".into(),
            ollama_model: "granite-code:3b".into(),
            ollama_timeout_seconds: 300,
            temperature: 0.7,
            num_predict: 2048,
        }
    }
}

/// Optional overrides read from `server.toml` in the working directory.
#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    bind_addr: Option<String>,
    ollama_url: Option<String>,
    ollama_model: Option<String>,
    ollama_timeout_seconds: Option<u64>,
    temperature: Option<f32>,
    num_predict: Option<u32>,
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("server.toml") {
        match toml::from_str::<FileSettings>(&raw) {
            Ok(file_cfg) => apply_file(&mut settings, file_cfg),
            Err(error) => {
                tracing::warn!(%error, "ignoring unparseable server.toml");
            }
        }
    }

    apply_env(&mut settings, |name| std::env::var(name).ok());
    settings
}

fn apply_file(settings: &mut Settings, file_cfg: FileSettings) {
    if let Some(v) = file_cfg.bind_addr {
        settings.server_bind = v;
    }
    if let Some(v) = file_cfg.ollama_url {
        settings.ollama_url = v;
    }
    if let Some(v) = file_cfg.ollama_model {
        settings.ollama_model = v;
    }
    if let Some(v) = file_cfg.ollama_timeout_seconds {
        settings.ollama_timeout_seconds = v;
    }
    if let Some(v) = file_cfg.temperature {
        settings.temperature = v;
    }
    if let Some(v) = file_cfg.num_predict {
        settings.num_predict = v;
    }
}

fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(v) = lookup("SERVER_BIND") {
        settings.server_bind = v;
    }
    if let Some(v) = lookup("APP__BIND_ADDR") {
        settings.server_bind = v;
    }

    if let Some(v) = lookup("OLLAMA_URL") {
        settings.ollama_url = v;
    }
    if let Some(v) = lookup("APP__OLLAMA_URL") {
        settings.ollama_url = v;
    }

    if let Some(v) = lookup("OLLAMA_MODEL") {
        settings.ollama_model = v;
    }
    if let Some(v) = lookup("APP__OLLAMA_MODEL") {
        settings.ollama_model = v;
    }

    if let Some(v) = lookup("APP__OLLAMA_TIMEOUT_SECONDS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.ollama_timeout_seconds = parsed;
        }
    }
    if let Some(v) = lookup("APP__TEMPERATURE") {
        if let Ok(parsed) = v.parse::<f32>() {
            settings.temperature = parsed;
        }
    }
    if let Some(v) = lookup("APP__NUM_PREDICT") {
        if let Ok(parsed) = v.parse::<u32>() {
            settings.num_predict = parsed;
        }
    }
}
