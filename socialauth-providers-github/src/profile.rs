use serde::Deserialize;
use serde_json::Value;
use socialauth_core::{AuthError, IdentityRecord};

/// The subset of `GET /user` this crate reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GithubUser {
    /// Numeric user id.
    #[serde(default)]
    pub id: Option<Value>,
    /// Login handle.
    #[serde(default)]
    pub login: Option<String>,
    /// Display name. `null` for most accounts.
    #[serde(default)]
    pub name: Option<String>,
    /// Avatar URL.
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// Public email. `null` or empty when the user keeps it private.
    #[serde(default)]
    pub email: Option<String>,
}

impl GithubUser {
    /// Normalize into an [`IdentityRecord`] with no state attached.
    ///
    /// GitHub's private emails would need `GET /user/emails` and the `user:email`
    /// scope; that lookup is not performed, so private emails stay absent.
    pub fn into_identity(self) -> Result<IdentityRecord, AuthError> {
        let provider_user_id = match self.id {
            Some(Value::Number(id)) => id.to_string(),
            Some(Value::String(id)) if !id.is_empty() => id,
            _ => {
                return Err(AuthError::MalformedResponse(
                    "GitHub profile has no id".to_string(),
                ))
            }
        };

        let display_name = filled(self.name)
            .or_else(|| filled(self.login))
            .ok_or_else(|| {
                AuthError::MalformedResponse("GitHub profile has neither name nor login".to_string())
            })?;

        Ok(IdentityRecord {
            provider_user_id,
            display_name,
            portrait_url: filled(self.avatar_url),
            email: filled(self.email),
            state: None,
        })
    }
}

fn filled(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
