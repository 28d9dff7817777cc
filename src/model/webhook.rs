use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Webhook {
    pub id: String,
    #[serde(default)]
    pub description: String,
    pub id_model: String,
    #[serde(rename = "callbackURL")]
    pub callback_url: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Default)]
pub struct WebhookUpdate {
    pub description: Option<String>,
    pub callback_url: Option<String>,
    pub id_model: Option<String>,
    pub active: Option<bool>,
}

impl WebhookUpdate {
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(desc) = &self.description {
            params.push(("description", desc.clone()));
        }
        if let Some(url) = &self.callback_url {
            params.push(("callbackURL", url.clone()));
        }
        if let Some(model) = &self.id_model {
            params.push(("idModel", model.clone()));
        }
        if let Some(active) = self.active {
            params.push(("active", active.to_string()));
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn callback_url_uses_upstream_casing() {
        let json = r#"{"id":"w1","idModel":"b1","callbackURL":"https://hooks.example/x"}"#;
        let hook: Webhook = serde_json::from_str(json).unwrap();
        assert_eq!(hook.callback_url, "https://hooks.example/x");
        assert!(hook.active);
    }
}
