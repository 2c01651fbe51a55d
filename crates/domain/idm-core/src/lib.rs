use serde::{Deserialize, Serialize};

pub mod error;
pub mod list;
pub mod verify;

pub use error::{ApiError, ApiErrorKind};
pub use list::{Page, SortColumn, SortDirection};
pub use verify::VerifyState;

pub type DomainId = String;

/// Wire value for the only domain type the service currently supports.
pub const RHEL_IDM: &str = "rhel-idm";

/// A registered identity domain as returned by the idmsvc backend.
///
/// Every field is optional on the wire: provisional records created by a
/// token request only carry `domain_id`, `domain_name` and `domain_type`
/// until the agent-side registration fills in the rest.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Domain {
    #[serde(default)]
    pub domain_id: DomainId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub domain_type: DomainType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_enrollment_enabled: Option<bool>,
    #[serde(rename = "rhel-idm", default, skip_serializing_if = "Option::is_none")]
    pub rhel_idm: Option<DomainIpa>,
}

impl Domain {
    pub fn title_or_empty(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }

    pub fn description_or_empty(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    pub fn auto_join(&self) -> bool {
        self.auto_enrollment_enabled.unwrap_or(false)
    }

    pub fn has_title(&self) -> bool {
        !self.title_or_empty().is_empty()
    }

    pub fn server_count(&self) -> usize {
        self.rhel_idm.as_ref().map_or(0, |d| d.servers.len())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DomainType {
    RhelIdm,
    Unknown(String),
}

impl Default for DomainType {
    fn default() -> Self {
        DomainType::RhelIdm
    }
}

impl From<String> for DomainType {
    fn from(value: String) -> Self {
        if value == RHEL_IDM {
            DomainType::RhelIdm
        } else {
            DomainType::Unknown(value)
        }
    }
}

impl From<DomainType> for String {
    fn from(value: DomainType) -> Self {
        value.as_str().to_string()
    }
}

impl DomainType {
    pub fn as_str(&self) -> &str {
        match self {
            DomainType::RhelIdm => RHEL_IDM,
            DomainType::Unknown(s) => s,
        }
    }

    /// Human readable name used by list and detail views.
    pub fn label(&self) -> String {
        match self {
            DomainType::RhelIdm => "Red Hat IdM".to_string(),
            DomainType::Unknown(s) => format!("{s}: Not supported"),
        }
    }
}

/// Type specific block for `rhel-idm` domains.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DomainIpa {
    #[serde(default)]
    pub realm_name: String,
    #[serde(default)]
    pub realm_domains: Vec<String>,
    #[serde(default)]
    pub ca_certs: Vec<Certificate>,
    #[serde(default)]
    pub servers: Vec<DomainIpaServer>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<Location>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub automount_locations: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Certificate {
    #[serde(default)]
    pub nickname: String,
    #[serde(default)]
    pub issuer: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub serial_number: String,
    #[serde(default)]
    pub not_before: String,
    #[serde(default)]
    pub not_after: String,
    #[serde(default)]
    pub pem: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DomainIpaServer {
    pub fqdn: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_manager_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub ca_server: bool,
    #[serde(default)]
    pub hcc_enrollment_server: bool,
    #[serde(default)]
    pub hcc_update_server: bool,
    #[serde(default)]
    pub pkinit_server: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ipa_version: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Body of the partial update call. Absent fields are left untouched by the
/// backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UpdateDomainUserRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_enrollment_enabled: Option<bool>,
}

impl UpdateDomainUserRequest {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn description(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..Default::default()
        }
    }

    pub fn auto_join(enabled: bool) -> Self {
        Self {
            auto_enrollment_enabled: Some(enabled),
            ..Default::default()
        }
    }

    /// The full set of user editable fields, as sent by the wizard's final
    /// save.
    pub fn from_draft(domain: &Domain) -> Self {
        Self {
            title: domain.title.clone(),
            description: domain.description.clone(),
            auto_enrollment_enabled: domain.auto_enrollment_enabled,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DomainRegTokenRequest {
    pub domain_type: DomainType,
}

/// Registration token issued by `POST /domains/token`. Issuing it also
/// allocates the provisional domain record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DomainRegToken {
    pub domain_token: String,
    pub domain_id: DomainId,
    #[serde(default)]
    pub domain_type: DomainType,
    /// Unix timestamp in seconds.
    #[serde(default)]
    pub expiration: i64,
}

impl DomainRegToken {
    pub fn expires_at(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        chrono::DateTime::from_timestamp(self.expiration, 0)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PaginationMeta {
    pub count: i64,
    #[serde(default)]
    pub offset: i64,
    #[serde(default)]
    pub limit: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PaginationLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ListDomainsResponse {
    #[serde(default)]
    pub data: Vec<Domain>,
    pub meta: PaginationMeta,
    #[serde(default)]
    pub links: PaginationLinks,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provisional_domain_parses_with_sparse_fields() {
        let d: Domain = serde_json::from_str(
            r#"{"domain_id":"abc","domain_name":"My domain","domain_type":"rhel-idm"}"#,
        )
        .unwrap();
        assert_eq!(d.domain_id, "abc");
        assert_eq!(d.domain_type, DomainType::RhelIdm);
        assert!(!d.has_title());
        assert!(!d.auto_join());
        assert_eq!(d.server_count(), 0);
    }

    #[test]
    fn unknown_domain_type_is_preserved() {
        let d: Domain =
            serde_json::from_str(r#"{"domain_id":"x","domain_type":"active-directory"}"#).unwrap();
        assert_eq!(
            d.domain_type,
            DomainType::Unknown("active-directory".into())
        );
        assert_eq!(d.domain_type.label(), "active-directory: Not supported");
        let back = serde_json::to_value(&d).unwrap();
        assert_eq!(back["domain_type"], "active-directory");
    }

    #[test]
    fn rhel_idm_block_uses_hyphenated_key() {
        let d: Domain = serde_json::from_str(
            r#"{
                "domain_id": "abc",
                "title": "t",
                "domain_type": "rhel-idm",
                "auto_enrollment_enabled": true,
                "rhel-idm": {
                    "realm_name": "EXAMPLE.TEST",
                    "realm_domains": ["example.test"],
                    "ca_certs": [],
                    "servers": [{"fqdn": "ipa1.example.test", "ca_server": true}]
                }
            }"#,
        )
        .unwrap();
        assert_eq!(d.server_count(), 1);
        let ipa = d.rhel_idm.as_ref().unwrap();
        assert_eq!(ipa.realm_name, "EXAMPLE.TEST");
        assert!(ipa.servers[0].ca_server);
        assert!(!ipa.servers[0].pkinit_server);
    }

    #[test]
    fn partial_update_omits_absent_fields() {
        let body = serde_json::to_value(UpdateDomainUserRequest::auto_join(false)).unwrap();
        assert_eq!(body, serde_json::json!({"auto_enrollment_enabled": false}));
    }

    #[test]
    fn token_expiration_converts_to_utc() {
        let tok = DomainRegToken {
            domain_token: "tok".into(),
            domain_id: "abc".into(),
            domain_type: DomainType::RhelIdm,
            expiration: 1_700_000_000,
        };
        assert_eq!(tok.expires_at().unwrap().timestamp(), 1_700_000_000);
    }
}
