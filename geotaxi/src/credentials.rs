use crate::error::StartupError;
use reqwest::Url;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
struct Users {
    data: Vec<User>,
}

#[derive(Debug, Deserialize)]
struct User {
    name: String,
    apikey: String,
}

/// Operator name to shared secret, fetched once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialTable(HashMap<String, String>);

impl CredentialTable {
    /// Retrieves `{name: apikey}` from the registry's `users` endpoint.
    pub async fn fetch(api_url: &Url, api_key: &str) -> Result<Self, StartupError> {
        let url = api_url
            .join("users")
            .map_err(|e| StartupError::RegistryUrl {
                url: api_url.to_string(),
                reason: e.to_string(),
            })?;
        let registry_error = |source| StartupError::Registry {
            url: url.to_string(),
            source,
        };

        let users: Users = reqwest::Client::new()
            .get(url.clone())
            .header("X-Version", "2")
            .header("X-Api-Key", api_key)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(registry_error)?
            .json()
            .await
            .map_err(registry_error)?;

        Ok(users
            .data
            .into_iter()
            .map(|user| (user.name, user.apikey))
            .collect())
    }

    /// An operator registered with an empty secret is treated as unknown.
    pub fn secret(&self, operator: &str) -> Option<&str> {
        self.0
            .get(operator)
            .map(String::as_str)
            .filter(|secret| !secret.is_empty())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl FromIterator<(String, String)> for CredentialTable {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
