//! # Resource Key
//!
//! Identity of a ManagedCertificate as carried through reconciliation and
//! the name-mapping store: `namespace/name`.

use crate::crd::ManagedCertificate;
use std::fmt;
use thiserror::Error;

/// Namespace + name identity of a declared certificate
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceKey {
    pub namespace: String,
    pub name: String,
}

/// An object handed to the controller without a namespace/name identity
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected a namespace/name identity but got {0:?}")]
pub struct InvalidKey(pub String);

impl ResourceKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

impl TryFrom<&ManagedCertificate> for ResourceKey {
    type Error = InvalidKey;

    fn try_from(certificate: &ManagedCertificate) -> Result<Self, Self::Error> {
        let namespace = certificate.metadata.namespace.as_deref().unwrap_or_default();
        let name = certificate.metadata.name.as_deref().unwrap_or_default();
        if namespace.is_empty() || name.is_empty() {
            return Err(InvalidKey(format!("{namespace}/{name}")));
        }
        Ok(Self::new(namespace, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crd::ManagedCertificateSpec;

    fn certificate(namespace: Option<&str>, name: Option<&str>) -> ManagedCertificate {
        let mut certificate = ManagedCertificate::new(
            "placeholder",
            ManagedCertificateSpec {
                domains: vec!["a.com".to_string()],
            },
        );
        certificate.metadata.name = name.map(str::to_string);
        certificate.metadata.namespace = namespace.map(str::to_string);
        certificate
    }

    #[test]
    fn test_key_from_resource_metadata() {
        let key = ResourceKey::try_from(&certificate(Some("ns"), Some("example"))).unwrap();
        assert_eq!(key, ResourceKey::new("ns", "example"));
        assert_eq!(key.to_string(), "ns/example");
    }

    #[test]
    fn test_resources_without_identity_are_rejected() {
        assert_eq!(
            ResourceKey::try_from(&certificate(None, Some("example"))),
            Err(InvalidKey("/example".to_string()))
        );
        assert_eq!(
            ResourceKey::try_from(&certificate(Some("ns"), None)),
            Err(InvalidKey("ns/".to_string()))
        );
        assert_eq!(
            ResourceKey::try_from(&certificate(Some(""), Some("example"))),
            Err(InvalidKey("/example".to_string()))
        );
    }
}
