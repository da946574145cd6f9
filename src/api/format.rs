use mongodb::bson::{Bson, Document};
use serde_json::{Map, Number, Value};

/// Convert a stored document into its public wire format.
///
/// ObjectIds render as 24-char hex strings and dates as RFC 3339 strings;
/// everything else maps onto the matching JSON type.
pub fn document_to_json(document: &Document) -> Value {
    let mut obj = Map::new();
    for (key, value) in document {
        obj.insert(key.clone(), bson_to_json(value));
    }
    Value::Object(obj)
}

/// Convert a list of documents to API values
pub fn documents_to_json(documents: &[Document]) -> Vec<Value> {
    documents.iter().map(document_to_json).collect()
}

pub fn bson_to_json(value: &Bson) -> Value {
    match value {
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(dt) => dt
            .try_to_rfc3339_string()
            .map(Value::String)
            .unwrap_or_else(|_| Value::from(dt.timestamp_millis())),
        Bson::String(s) => Value::String(s.clone()),
        Bson::Boolean(b) => Value::Bool(*b),
        Bson::Null | Bson::Undefined => Value::Null,
        Bson::Int32(n) => Value::from(*n),
        Bson::Int64(n) => Value::from(*n),
        Bson::Double(n) => Number::from_f64(*n).map(Value::Number).unwrap_or(Value::Null),
        Bson::Array(items) => Value::Array(items.iter().map(bson_to_json).collect()),
        Bson::Document(doc) => document_to_json(doc),
        other => other.clone().into_relaxed_extjson(),
    }
}

/// Convert an incoming JSON value into BSON for storage.
///
/// Integers that fit in 64 bits are stored as Int64, other numbers as Double.
pub fn json_to_bson(value: &Value) -> Bson {
    match value {
        Value::Null => Bson::Null,
        Value::Bool(b) => Bson::Boolean(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Bson::Int64(i),
            None => n.as_f64().map(Bson::Double).unwrap_or(Bson::Null),
        },
        Value::String(s) => Bson::String(s.clone()),
        Value::Array(items) => Bson::Array(items.iter().map(json_to_bson).collect()),
        Value::Object(obj) => Bson::Document(json_object_to_document(obj)),
    }
}

pub fn json_object_to_document(obj: &Map<String, Value>) -> Document {
    let mut document = Document::new();
    for (key, value) in obj {
        document.insert(key.clone(), json_to_bson(value));
    }
    document
}
