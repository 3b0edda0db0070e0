//! Blocking client for the herd REST endpoints used by the loader.
//!
//! Requests use basic auth and JSON bodies. Calls block until the service
//! answers; no timeout or retry policy is applied here, a failed call is
//! reported to the caller as-is.
use anyhow::{anyhow, Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

const REST_ROOT: &str = "herd-app/rest";

/// Namespace + business object definition name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey {
    pub namespace: String,
    pub name: String,
}

impl ObjectKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub user_id: String,
}

/// The subset of a business object definition the loader reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BusinessObjectDefinition {
    pub namespace: String,
    pub business_object_definition_name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Body of a descriptive information update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptiveInfoUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Operations the controller and actions need from herd.
pub trait HerdApi {
    fn current_user(&self) -> Result<CurrentUser>;

    fn business_object_definition(&self, key: &ObjectKey) -> Result<BusinessObjectDefinition>;

    fn update_descriptive_info(
        &self,
        key: &ObjectKey,
        update: &DescriptiveInfoUpdate,
    ) -> Result<BusinessObjectDefinition>;
}

pub struct HerdClient {
    agent: ureq::Agent,
    base_url: String,
    authorization: String,
}

impl HerdClient {
    pub fn new(base_url: &str, username: &str, password: Option<&str>) -> Self {
        let credentials = format!("{username}:{}", password.unwrap_or_default());
        Self {
            agent: ureq::Agent::new_with_defaults(),
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            authorization: format!("Basic {}", STANDARD.encode(credentials)),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{REST_ROOT}/{path}", self.base_url)
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        let start = Instant::now();
        let mut response = self
            .agent
            .get(&url)
            .header("Authorization", self.authorization.as_str())
            .header("Accept", "application/json")
            .call()
            .with_context(|| format!("GET {url}"))?;
        tracing::debug!(
            elapsed_ms = start.elapsed().as_millis(),
            url = %url,
            "herd GET complete"
        );
        response
            .body_mut()
            .read_json::<T>()
            .with_context(|| format!("decode response from {url}"))
    }

    fn put_json<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.url(path);
        let start = Instant::now();
        let mut response = self
            .agent
            .put(&url)
            .header("Authorization", self.authorization.as_str())
            .header("Accept", "application/json")
            .send_json(body)
            .with_context(|| format!("PUT {url}"))?;
        tracing::debug!(
            elapsed_ms = start.elapsed().as_millis(),
            url = %url,
            "herd PUT complete"
        );
        response
            .body_mut()
            .read_json::<T>()
            .with_context(|| format!("decode response from {url}"))
    }
}

impl HerdApi for HerdClient {
    fn current_user(&self) -> Result<CurrentUser> {
        let user: CurrentUser = self.get_json("currentUser")?;
        if user.user_id.trim().is_empty() {
            return Err(anyhow!("herd returned an empty user id"));
        }
        Ok(user)
    }

    fn business_object_definition(&self, key: &ObjectKey) -> Result<BusinessObjectDefinition> {
        self.get_json(&definition_path(key))
    }

    fn update_descriptive_info(
        &self,
        key: &ObjectKey,
        update: &DescriptiveInfoUpdate,
    ) -> Result<BusinessObjectDefinition> {
        self.put_json(
            &format!("businessObjectDefinitionDescriptiveInformation/{}", key_path(key)),
            update,
        )
    }
}

fn definition_path(key: &ObjectKey) -> String {
    format!("businessObjectDefinitions/{}", key_path(key))
}

fn key_path(key: &ObjectKey) -> String {
    format!(
        "namespaces/{}/businessObjectDefinitionNames/{}",
        encode_segment(&key.namespace),
        encode_segment(&key.name)
    )
}

/// Percent-encode everything outside the RFC 3986 unreserved set.
fn encode_segment(segment: &str) -> String {
    let mut encoded = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                encoded.push(char::from(byte))
            }
            _ => encoded.push_str(&format!("%{byte:02X}")),
        }
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_rest_urls_without_duplicate_slashes() {
        let client = HerdClient::new("https://herd.example.com/", "loader", Some("pw"));
        assert_eq!(
            client.url("currentUser"),
            "https://herd.example.com/herd-app/rest/currentUser"
        );
        let key = ObjectKey::new("SEC", "trades");
        assert_eq!(
            definition_path(&key),
            "businessObjectDefinitions/namespaces/SEC/businessObjectDefinitionNames/trades"
        );
    }

    #[test]
    fn key_segments_are_percent_encoded() {
        let key = ObjectKey::new("SEC", "trades?v=2");
        assert_eq!(
            definition_path(&key),
            "businessObjectDefinitions/namespaces/SEC/businessObjectDefinitionNames/trades%3Fv%3D2"
        );
        let key = ObjectKey::new("risk data", "a%2Fb#frag");
        assert_eq!(
            key_path(&key),
            "namespaces/risk%20data/businessObjectDefinitionNames/a%252Fb%23frag"
        );
        assert_eq!(encode_segment("Trades_v1.2-x~"), "Trades_v1.2-x~");
        assert_eq!(encode_segment("caf\u{e9}"), "caf%C3%A9");
    }

    #[test]
    fn authorization_header_is_basic_base64() {
        let client = HerdClient::new("http://localhost:8080", "loader", Some("pw"));
        assert_eq!(client.authorization, "Basic bG9hZGVyOnB3");
        let client = HerdClient::new("http://localhost:8080", "loader", None);
        assert_eq!(client.authorization, "Basic bG9hZGVyOg==");
    }

    #[test]
    fn definition_json_uses_camel_case() {
        let definition: BusinessObjectDefinition = serde_json::from_str(
            r#"{"namespace":"SEC","businessObjectDefinitionName":"trades","displayName":"Trades","dataProviderName":"X"}"#,
        )
        .expect("parse definition");
        assert_eq!(definition.display_name.as_deref(), Some("Trades"));
        assert_eq!(definition.description, None);

        let update = DescriptiveInfoUpdate {
            display_name: None,
            description: Some("All trades".to_string()),
        };
        let value = serde_json::to_value(&update).expect("serialize update");
        assert_eq!(value, serde_json::json!({"description": "All trades"}));
    }

    #[test]
    fn unreachable_service_reports_url_in_error() {
        let client = HerdClient::new("http://127.0.0.1:1", "loader", None);
        let err = client.current_user().expect_err("nothing listens on port 1");
        assert!(format!("{err:#}").contains("127.0.0.1:1/herd-app/rest/currentUser"));
    }
}
