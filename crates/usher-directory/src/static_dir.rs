//! Static directory fed from configuration.
//!
//! Serves inline business entries for single-tenant or offline
//! deployments, and doubles as the directory used in tests.

use async_trait::async_trait;
use usher_core::{
    business::Business, error::UsherError, sanitize::normalize_user_id, traits::Directory,
};

/// Directory over a fixed list of businesses.
pub struct StaticDirectory {
    businesses: Vec<Business>,
}

impl StaticDirectory {
    pub fn new(businesses: Vec<Business>) -> Self {
        Self { businesses }
    }
}

#[async_trait]
impl Directory for StaticDirectory {
    async fn list(&self) -> Result<Vec<Business>, UsherError> {
        Ok(self.businesses.clone())
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Business>, UsherError> {
        Ok(self.businesses.iter().find(|b| b.id == id).cloned())
    }

    async fn get_by_phone(&self, phone: &str) -> Result<Option<Business>, UsherError> {
        let wanted = normalize_user_id(phone);
        Ok(self
            .businesses
            .iter()
            .find(|b| normalize_user_id(&b.phone) == wanted)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> StaticDirectory {
        StaticDirectory::new(vec![
            Business {
                id: "biz-1".to_string(),
                name: "Dana's Bakery".to_string(),
                description: String::new(),
                phone: "+97231234567".to_string(),
                hours: None,
                faq: vec![],
                prompt_template: None,
                tenant_id: String::new(),
            },
            Business {
                id: "biz-2".to_string(),
                name: "Haifa Garage".to_string(),
                description: String::new(),
                phone: "+97241112222".to_string(),
                hours: None,
                faq: vec![],
                prompt_template: None,
                tenant_id: String::new(),
            },
        ])
    }

    #[tokio::test]
    async fn list_returns_everything_in_order() {
        let listed = directory().list().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, "biz-1");
        assert_eq!(listed[1].id, "biz-2");
    }

    #[tokio::test]
    async fn lookup_by_id() {
        let dir = directory();
        assert_eq!(
            dir.get_by_id("biz-2").await.unwrap().map(|b| b.name),
            Some("Haifa Garage".to_string())
        );
        assert!(dir.get_by_id("biz-9").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn lookup_by_phone_ignores_prefixes() {
        let dir = directory();
        let found = dir
            .get_by_phone("whatsapp:+97231234567")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, "biz-1");

        assert!(dir.get_by_phone("+15550000000").await.unwrap().is_none());
    }
}
