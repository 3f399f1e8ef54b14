//! `serialize_with` helpers for `ObjectId` fields.
//!
//! JSON (a human-readable format) gets the plain 24-char hex string that the
//! API also accepts in request bodies. The BSON serializer the driver uses is
//! not human-readable, so stored documents keep native ObjectIds.

use bson::oid::ObjectId;
use serde::{Serialize, Serializer};

pub fn hex<S: Serializer>(id: &ObjectId, serializer: S) -> Result<S::Ok, S::Error> {
    if serializer.is_human_readable() {
        serializer.serialize_str(&id.to_hex())
    } else {
        id.serialize(serializer)
    }
}

pub fn hex_opt<S: Serializer>(id: &Option<ObjectId>, serializer: S) -> Result<S::Ok, S::Error> {
    match id {
        Some(id) => hex(id, serializer),
        None => serializer.serialize_none(),
    }
}
