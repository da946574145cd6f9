use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Bson, Document};
use std::cmp::Ordering;
use tokio::sync::RwLock;

use super::collection::{assign_id, DatabaseError, DocumentCollection, SortOrder, UpdateOutcome};

#[derive(Default)]
struct CollectionState {
    documents: Vec<Document>,
    unique_fields: Vec<String>,
}

impl CollectionState {
    /// Check `candidate` against every unique field, ignoring the document at `skip`
    fn check_unique(&self, candidate: &Document, skip: Option<usize>) -> Result<(), DatabaseError> {
        for field in &self.unique_fields {
            // Missing values index as null, the way a unique index treats them
            let value = candidate.get(field).cloned().unwrap_or(Bson::Null);
            let clash = self
                .documents
                .iter()
                .enumerate()
                .filter(|(index, _)| Some(*index) != skip)
                .any(|(_, existing)| existing.get(field).cloned().unwrap_or(Bson::Null) == value);

            if clash {
                return Err(DatabaseError::DuplicateKey(format!("{}: {}", field, value)));
            }
        }
        Ok(())
    }

    fn position(&self, filter: &Document) -> Option<usize> {
        self.documents.iter().position(|document| matches(document, filter))
    }
}

/// Process-local `DocumentCollection` with the same filter, upsert and
/// unique-index semantics as the MongoDB backend. Each call holds the
/// collection lock for its whole duration, so check-and-write is atomic.
pub struct MemoryCollection {
    name: String,
    state: RwLock<CollectionState>,
}

impl MemoryCollection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: RwLock::new(CollectionState::default()),
        }
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.documents.len()
    }
}

fn matches(document: &Document, filter: &Document) -> bool {
    filter.iter().all(|(key, expected)| document.get(key) == Some(expected))
}

fn compare_bson(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => match (a, b) {
            (Bson::DateTime(a), Bson::DateTime(b)) => a.timestamp_millis().cmp(&b.timestamp_millis()),
            (Bson::String(a), Bson::String(b)) => a.cmp(b),
            (Bson::ObjectId(a), Bson::ObjectId(b)) => a.cmp(b),
            (a, b) => match (as_f64(a), as_f64(b)) {
                (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
                _ => Ordering::Equal,
            },
        },
    }
}

fn as_f64(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(n) => Some(*n as f64),
        Bson::Int64(n) => Some(*n as f64),
        Bson::Double(n) => Some(*n),
        _ => None,
    }
}

#[async_trait]
impl DocumentCollection for MemoryCollection {
    fn name(&self) -> &str {
        &self.name
    }

    async fn insert_one(&self, mut document: Document) -> Result<ObjectId, DatabaseError> {
        let id = assign_id(&mut document)?;
        let mut state = self.state.write().await;
        state.check_unique(&document, None)?;
        state.documents.push(document);
        Ok(id)
    }

    async fn find_one(&self, filter: Document) -> Result<Option<Document>, DatabaseError> {
        let state = self.state.read().await;
        Ok(state.position(&filter).map(|index| state.documents[index].clone()))
    }

    async fn find(&self, filter: Document, sort: Option<SortOrder>) -> Result<Vec<Document>, DatabaseError> {
        let state = self.state.read().await;
        let mut found: Vec<Document> = state
            .documents
            .iter()
            .filter(|document| matches(document, &filter))
            .cloned()
            .collect();

        if let Some(order) = sort {
            found.sort_by(|a, b| {
                let ordering = compare_bson(a.get(&order.field), b.get(&order.field));
                if order.descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }

        Ok(found)
    }

    async fn update_one(
        &self,
        filter: Document,
        set: Document,
        upsert: bool,
    ) -> Result<UpdateOutcome, DatabaseError> {
        let mut state = self.state.write().await;

        if let Some(index) = state.position(&filter) {
            let mut updated = state.documents[index].clone();
            for (key, value) in set {
                updated.insert(key, value);
            }
            state.check_unique(&updated, Some(index))?;
            state.documents[index] = updated;
            return Ok(UpdateOutcome { matched: 1, upserted_id: None });
        }

        if !upsert {
            return Ok(UpdateOutcome::default());
        }

        let mut created = filter;
        for (key, value) in set {
            created.insert(key, value);
        }
        let id = assign_id(&mut created)?;
        state.check_unique(&created, None)?;
        state.documents.push(created);

        Ok(UpdateOutcome { matched: 0, upserted_id: Some(id) })
    }

    async fn delete_one(&self, filter: Document) -> Result<u64, DatabaseError> {
        let mut state = self.state.write().await;
        match state.position(&filter) {
            Some(index) => {
                state.documents.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn ensure_unique(&self, field: &str) -> Result<(), DatabaseError> {
        let mut state = self.state.write().await;
        if !state.unique_fields.iter().any(|existing| existing == field) {
            state.unique_fields.push(field.to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{doc, DateTime};

    #[tokio::test]
    async fn insert_assigns_id_and_find_one_matches() {
        let collection = MemoryCollection::new("courses");
        let id = collection.insert_one(doc! { "title": "Algebra" }).await.unwrap();

        let found = collection.find_one(doc! { "_id": id }).await.unwrap().unwrap();
        assert_eq!(found.get_str("title").unwrap(), "Algebra");
        assert!(collection.find_one(doc! { "title": "Physics" }).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unique_field_rejects_duplicates() {
        let collection = MemoryCollection::new("classrooms");
        collection.ensure_unique("classCode").await.unwrap();

        collection.insert_one(doc! { "classCode": "AB12C3" }).await.unwrap();
        let err = collection.insert_one(doc! { "classCode": "AB12C3" }).await.unwrap_err();
        assert!(matches!(err, DatabaseError::DuplicateKey(_)));
        assert_eq!(collection.len().await, 1);
    }

    #[tokio::test]
    async fn update_into_existing_unique_value_is_rejected() {
        let collection = MemoryCollection::new("classrooms");
        collection.ensure_unique("classCode").await.unwrap();
        collection.insert_one(doc! { "classCode": "AAAAAA" }).await.unwrap();
        let second = collection.insert_one(doc! { "classCode": "BBBBBB" }).await.unwrap();

        let err = collection
            .update_one(doc! { "_id": second }, doc! { "classCode": "AAAAAA" }, false)
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::DuplicateKey(_)));

        // Rewriting a document's own value is not a clash
        let outcome = collection
            .update_one(doc! { "_id": second }, doc! { "classCode": "BBBBBB", "section": "A" }, false)
            .await
            .unwrap();
        assert_eq!(outcome.matched, 1);
    }

    #[tokio::test]
    async fn upsert_creates_then_updates() {
        let collection = MemoryCollection::new("users");

        let first = collection
            .update_one(doc! { "uid": "u1" }, doc! { "displayName": "Ada" }, true)
            .await
            .unwrap();
        assert!(first.upserted());

        let second = collection
            .update_one(doc! { "uid": "u1" }, doc! { "displayName": "Grace" }, true)
            .await
            .unwrap();
        assert!(!second.upserted());
        assert_eq!(second.matched, 1);

        let all = collection.find(doc! {}, None).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].get_str("displayName").unwrap(), "Grace");
        assert_eq!(all[0].get_str("uid").unwrap(), "u1");
    }

    #[tokio::test]
    async fn update_without_upsert_reports_no_match() {
        let collection = MemoryCollection::new("courses");
        let outcome = collection
            .update_one(doc! { "_id": ObjectId::new() }, doc! { "title": "x" }, false)
            .await
            .unwrap();
        assert_eq!(outcome, UpdateOutcome::default());
        assert_eq!(collection.len().await, 0);
    }

    #[tokio::test]
    async fn find_sorts_descending() {
        let collection = MemoryCollection::new("notes");
        for (title, millis) in [("old", 1_000), ("new", 3_000), ("mid", 2_000)] {
            collection
                .insert_one(doc! { "title": title, "createdAt": DateTime::from_millis(millis) })
                .await
                .unwrap();
        }

        let sorted = collection
            .find(doc! {}, Some(SortOrder::descending("createdAt")))
            .await
            .unwrap();
        let titles: Vec<&str> = sorted.iter().map(|d| d.get_str("title").unwrap()).collect();
        assert_eq!(titles, vec!["new", "mid", "old"]);
    }

    #[tokio::test]
    async fn delete_removes_one() {
        let collection = MemoryCollection::new("courses");
        let id = collection.insert_one(doc! { "title": "a" }).await.unwrap();
        assert_eq!(collection.delete_one(doc! { "_id": id }).await.unwrap(), 1);
        assert_eq!(collection.delete_one(doc! { "_id": id }).await.unwrap(), 0);
    }
}
