use super::types::StoredObject;
use std::ops::Deref;
use surrealdb::{
    engine::any::{connect, Any},
    Error, Surreal,
};

/// Thin wrapper over a SurrealDB connection owned by one engine instance.
///
/// Each session's engine opens its own store rooted at the session's storage
/// directory; there is no shared database between sessions.
#[derive(Clone)]
pub struct SurrealDbClient {
    pub client: Surreal<Any>,
}

const NAMESPACE: &str = "fraga";
const DATABASE: &str = "session";

impl SurrealDbClient {
    /// Open an on-disk store rooted at the given directory.
    ///
    /// Local I/O only: no network contact happens here or in any later
    /// operation against this connection.
    pub async fn new_local(storage_dir: &str) -> Result<Self, Error> {
        let db = connect(format!("surrealkv://{storage_dir}")).await?;

        db.use_ns(NAMESPACE).use_db(DATABASE).await?;

        Ok(SurrealDbClient { client: db })
    }

    /// Store an object in its table, keyed by its own id.
    pub async fn store_item<T>(&self, item: T) -> Result<Option<T>, Error>
    where
        T: StoredObject + Send + Sync + 'static,
    {
        self.client
            .create((T::table_name(), item.get_id()))
            .content(item)
            .await
    }

    pub async fn get_all_stored_items<T>(&self) -> Result<Vec<T>, Error>
    where
        T: for<'de> StoredObject,
    {
        self.client.select(T::table_name()).await
    }

    pub async fn get_item<T>(&self, id: &str) -> Result<Option<T>, Error>
    where
        T: for<'de> StoredObject,
    {
        self.client.select((T::table_name(), id)).await
    }
}

impl Deref for SurrealDbClient {
    type Target = Surreal<Any>;

    fn deref(&self) -> &Self::Target {
        &self.client
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl SurrealDbClient {
    /// Create an in-memory SurrealDB client for testing.
    pub async fn memory(namespace: &str, database: &str) -> Result<Self, Error> {
        let db = connect("mem://").await?;

        db.use_ns(namespace).use_db(database).await?;

        Ok(SurrealDbClient { client: db })
    }
}
