use async_trait::async_trait;

use crate::auth::OidcProvider;
use crate::identity::{AccountLink, NewUser, User};

use super::Result;

/// Repository for users and their provider-account links.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Gets a user by their ID.
    async fn get_user(&self, id: i64) -> Result<Option<User>>;

    /// Gets a user by their email address.
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Gets the account link for a provider identity.
    async fn get_account(
        &self,
        provider: OidcProvider,
        provider_account_id: &str,
    ) -> Result<Option<AccountLink>>;

    /// Starts a unit of work. Writes made through it become visible only
    /// after [`UnitOfWork::commit`]; dropping it discards them.
    async fn begin(&self) -> Result<Box<dyn UnitOfWork>>;
}

/// Transaction-scoped access to the user store.
#[async_trait]
pub trait UnitOfWork: Send {
    /// Gets a user by email, seeing writes made earlier in this unit.
    async fn get_user_by_email(&mut self, email: &str) -> Result<Option<User>>;

    /// Creates a user and returns it with its assigned id.
    ///
    /// Fails with `AlreadyExists` if the email is taken.
    async fn create_user(&mut self, user: &NewUser) -> Result<User>;

    /// Creates the account link, or refreshes the token metadata of the
    /// existing link with the same `(provider, provider_account_id)`.
    ///
    /// Fails with `InvalidData` if the owning user does not exist.
    async fn upsert_account(&mut self, account: &AccountLink) -> Result<AccountLink>;

    /// Makes every write of this unit visible.
    async fn commit(self: Box<Self>) -> Result<()>;
}
