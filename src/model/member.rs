use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Board member as returned by the upstream API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub username: String,
}

/// Locally curated metadata for a member, keyed by the upstream id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberProfile {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct MemberDirectory {
    profiles: HashMap<String, MemberProfile>,
}

impl MemberDirectory {
    pub fn new(profiles: impl IntoIterator<Item = MemberProfile>) -> Self {
        Self {
            profiles: profiles.into_iter().map(|p| (p.id.clone(), p)).collect(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&MemberProfile> {
        self.profiles.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.profiles.contains_key(id)
    }

    pub fn display_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.get(id).map(|p| p.name.as_str()).unwrap_or(id)
    }

    pub fn group_of(&self, id: &str) -> Option<&str> {
        self.get(id).and_then(|p| p.group.as_deref())
    }

    pub fn has_role(&self, id: &str, role: &str) -> bool {
        self.get(id)
            .and_then(|p| p.role.as_deref())
            .is_some_and(|r| r.eq_ignore_ascii_case(role))
    }

    pub fn profiles(&self) -> impl Iterator<Item = &MemberProfile> {
        self.profiles.values()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(id: &str, name: &str, role: Option<&str>, group: Option<&str>) -> MemberProfile {
        MemberProfile {
            id: id.into(),
            name: name.into(),
            role: role.map(String::from),
            group: group.map(String::from),
        }
    }

    #[test]
    fn lookup_by_exact_id() {
        let dir = MemberDirectory::new([
            profile("m1", "An", Some("dev"), Some("Mobile")),
            profile("m2", "Binh", Some("QC"), None),
        ]);
        assert_eq!(dir.display_name("m1"), "An");
        assert_eq!(dir.display_name("unknown"), "unknown");
        assert_eq!(dir.group_of("m1"), Some("Mobile"));
        assert_eq!(dir.group_of("m2"), None);
        assert!(dir.has_role("m2", "qc"));
        assert!(!dir.has_role("m1", "qc"));
        assert_eq!(dir.len(), 2);
    }
}
