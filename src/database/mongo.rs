use async_trait::async_trait;
use futures::stream::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{FindOptions, IndexOptions, UpdateOptions};
use mongodb::{Collection, IndexModel};
use tracing::{debug, info};

use super::collection::{assign_id, DatabaseError, DocumentCollection, SortOrder, UpdateOutcome};

const DUPLICATE_KEY_CODE: i32 = 11000;

/// `DocumentCollection` backed by a MongoDB collection
pub struct MongoCollection {
    inner: Collection<Document>,
}

impl MongoCollection {
    pub fn new(inner: Collection<Document>) -> Self {
        Self { inner }
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => write_error.code == DUPLICATE_KEY_CODE,
        ErrorKind::Command(command_error) => command_error.code == DUPLICATE_KEY_CODE,
        _ => false,
    }
}

/// Translate driver errors, lifting unique-index violations into `DuplicateKey`
fn map_write_error(err: mongodb::error::Error) -> DatabaseError {
    if is_duplicate_key(&err) {
        DatabaseError::DuplicateKey(err.to_string())
    } else {
        DatabaseError::Mongo(err)
    }
}

#[async_trait]
impl DocumentCollection for MongoCollection {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn insert_one(&self, mut document: Document) -> Result<ObjectId, DatabaseError> {
        let id = assign_id(&mut document)?;
        self.inner.insert_one(document, None).await.map_err(map_write_error)?;
        Ok(id)
    }

    async fn find_one(&self, filter: Document) -> Result<Option<Document>, DatabaseError> {
        Ok(self.inner.find_one(filter, None).await?)
    }

    async fn find(&self, filter: Document, sort: Option<SortOrder>) -> Result<Vec<Document>, DatabaseError> {
        let options = sort.map(|order| {
            let mut keys = Document::new();
            keys.insert(order.field, if order.descending { -1 } else { 1 });
            FindOptions::builder().sort(keys).build()
        });

        let cursor = self.inner.find(filter, options).await?;
        Ok(cursor.try_collect::<Vec<Document>>().await?)
    }

    async fn update_one(
        &self,
        filter: Document,
        set: Document,
        upsert: bool,
    ) -> Result<UpdateOutcome, DatabaseError> {
        let options = UpdateOptions::builder().upsert(upsert).build();
        let result = self
            .inner
            .update_one(filter, doc! { "$set": set }, options)
            .await
            .map_err(map_write_error)?;

        let upserted_id = match result.upserted_id {
            Some(id) => Some(id.as_object_id().ok_or_else(|| {
                DatabaseError::UnexpectedResponse(format!("non-ObjectId upserted id: {}", id))
            })?),
            None => None,
        };

        Ok(UpdateOutcome {
            matched: result.matched_count,
            upserted_id,
        })
    }

    async fn delete_one(&self, filter: Document) -> Result<u64, DatabaseError> {
        let result = self.inner.delete_one(filter, None).await?;
        debug!("{}: deleted {} document(s)", self.name(), result.deleted_count);
        Ok(result.deleted_count)
    }

    async fn ensure_unique(&self, field: &str) -> Result<(), DatabaseError> {
        let mut keys = Document::new();
        keys.insert(field, 1);

        let index = IndexModel::builder()
            .keys(keys)
            .options(IndexOptions::builder().unique(true).build())
            .build();

        let created = self.inner.create_index(index, None).await?;
        info!("Ensured unique index {} on {}", created.index_name, self.name());
        Ok(())
    }
}
