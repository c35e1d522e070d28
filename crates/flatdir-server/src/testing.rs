//! Test doubles shared by the unit tests.

use async_trait::async_trait;
use mockall::mock;
use secrecy::SecretString;
use std::sync::Arc;

use flatdir_core::Result;
use flatdir_store::{Backend, Group, User};

mock! {
    pub Store {}

    #[async_trait]
    impl Backend for Store {
        async fn check_credential(&self, username: &str, password: &SecretString) -> Result<bool>;
        async fn query_users(&self, key: &str, value: &str) -> Result<Option<Vec<Arc<User>>>>;
        async fn query_groups(&self, key: &str, value: &str) -> Result<Option<Vec<Arc<Group>>>>;
        async fn reload(&self) -> Result<()>;
    }
}
