//! Accounts in the users partition.

use archive_core::error::Result;
use archive_core::{Credentials, NewUser, Partition, PersonName, Role, User};

use super::{counted_delete, decode_all, decode_at, first, node_at, with_name};
use crate::backend::{GraphBackend, Statement};
use crate::mutator::ExpectedDeletion;
use crate::provider::{ConnectionProvider, ResourceStore};
use crate::record::RecordShape;
use crate::translate;

const MATCH_BY_ID: &str = "MATCH (u:USER {id: $id}) RETURN u";
const MATCH_BY_EMAIL: &str = "MATCH (u:USER {email: $email}) RETURN u";

/// Stored password hash property.
const PWD: &str = "pwd";

pub struct Users<B> {
    store: ResourceStore<B>,
}

impl<B: GraphBackend> Users<B> {
    pub fn new(provider: &ConnectionProvider<B>) -> Self {
        Self {
            store: provider.store(Partition::Users),
        }
    }

    /// Register a user unless the email is already taken.
    pub async fn create_user(&self, new: NewUser) -> Result<User> {
        let matching = by_email(&new.email);
        let creation = Statement::new(
            "CREATE (u:USER {id: apoc.create.uuid(), email: $email, firstName: $firstName, \
             secondName: $secondName, lastName: $lastName, auth: $auth, pwd: $pwd}) RETURN u",
        )
        .param("email", new.email.as_str())
        .param("auth", new.auth.as_str())
        .param(PWD, new.pwd_hash.as_str());
        let creation = with_name(creation, &new.name).returns(["u"]);

        let created = self.store.create(Some(&matching), &creation, &shape()).await?;
        decode_at(&created.record, 0)
    }

    pub async fn get_users(&self) -> Result<Vec<User>> {
        let found = self
            .store
            .find(&Statement::new("MATCH (u:USER) RETURN u").returns(["u"]))
            .await?;
        decode_all(&found, &shape())
    }

    pub async fn get_user(&self, id: &str) -> Result<User> {
        let records = self.store.get(&by_id(id), &shape()).await?;
        decode_at(&first(records)?, 0)
    }

    pub async fn update_user(
        &self,
        id: &str,
        email: &str,
        name: &PersonName,
        auth: Role,
    ) -> Result<User> {
        let update = Statement::new(
            "MATCH (u:USER {id: $id}) SET u.email = $email, u.firstName = $firstName, \
             u.secondName = $secondName, u.lastName = $lastName, u.auth = $auth RETURN u",
        )
        .param("id", id)
        .param("email", email)
        .param("auth", auth.as_str());
        let update = with_name(update, name).returns(["u"]);

        let updated = self.store.update(&by_id(id), None, &update, &shape()).await?;
        decode_at(&updated.record, 0)
    }

    /// Replace the stored hash. Hashing happens before this call.
    pub async fn update_password(&self, id: &str, pwd_hash: &str) -> Result<()> {
        let update = Statement::new("MATCH (u:USER {id: $id}) SET u.pwd = $pwd RETURN u")
            .param("id", id)
            .param(PWD, pwd_hash)
            .returns(["u"]);
        self.store.update(&by_id(id), None, &update, &shape()).await?;
        Ok(())
    }

    pub async fn delete_user(&self, id: &str) -> Result<()> {
        let deletion = counted_delete("MATCH (u:USER {id: $id})", "u").param("id", id);
        self.store
            .delete(&by_id(id), &deletion, ExpectedDeletion::nodes(1))
            .await
    }

    /// The user registered under `email` with its stored hash, for the
    /// external password checker. `None` when no such user exists.
    pub async fn find_credentials(&self, email: &str) -> Result<Option<Credentials>> {
        let found = self.store.find(&by_email(email)).await?;
        let Some(raw) = found.first() else {
            return Ok(None);
        };
        let record = shape().prepare(raw)?;
        let node = node_at(&record, 0)?;
        let user: User = node
            .decode()
            .map_err(|e| translate::unprepared(e.to_string()))?;
        let pwd_hash = node
            .properties
            .get(PWD)
            .and_then(|v| v.as_str())
            .ok_or_else(|| translate::unprepared("user has no stored password"))?
            .to_string();
        Ok(Some(Credentials { user, pwd_hash }))
    }
}

fn shape() -> RecordShape {
    RecordShape::single("u")
}

fn by_id(id: &str) -> Statement {
    Statement::new(MATCH_BY_ID).param("id", id).returns(["u"])
}

fn by_email(email: &str) -> Statement {
    Statement::new(MATCH_BY_EMAIL).param("email", email).returns(["u"])
}
