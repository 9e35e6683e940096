use async_trait::async_trait;

/// Credential hashing lives outside this system; services only see this
/// trait. A production deployment plugs in a bcrypt-style implementation
/// with cost factor 10.
#[async_trait]
pub trait CredentialHasher: Send + Sync {
    async fn hash(
        &self,
        credential: &str,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>>;

    async fn verify(
        &self,
        credential: &str,
        stored_hash: &str,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>>;
}

/// Deterministic stand-in used by tests and local embedding.
pub struct MockCredentialHasher {
    cost: u32,
}

impl MockCredentialHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for MockCredentialHasher {
    fn default() -> Self {
        Self::new(10)
    }
}

#[async_trait]
impl CredentialHasher for MockCredentialHasher {
    async fn hash(
        &self,
        credential: &str,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        // A real implementation would salt and stretch here; the mock only
        // has to be stable under verify().
        tracing::debug!(cost = self.cost, "hashing credential");
        Ok(format!("$mock${}${}", self.cost, credential))
    }

    async fn verify(
        &self,
        credential: &str,
        stored_hash: &str,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        Ok(stored_hash == format!("$mock${}${}", self.cost, credential))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_hash_round_trip() {
        let hasher = MockCredentialHasher::default();
        let hash = hasher.hash("secret123").await.unwrap();
        assert!(hasher.verify("secret123", &hash).await.unwrap());
        assert!(!hasher.verify("secret124", &hash).await.unwrap());
    }
}
