/* Arena heap holding objects and sequences */

use crate::errors::{ReflectError, ReflectResult};
use crate::value::{ObjectId, SeqId, Value};
use indexmap::IndexMap;
use mapper_types::NodeId;
use serde_json::{json, Map as JsonMap, Value as JsonValue};
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct ObjectData {
    pub class: NodeId,
    pub class_name: String,
    /* Field slots in declaration order */
    pub fields: IndexMap<String, Value>,
}

/* Heap entry on the snapshot path */
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Handle {
    Object(ObjectId),
    Seq(SeqId),
}

#[derive(Debug, Clone, Default)]
pub struct Heap {
    objects: Vec<ObjectData>,
    sequences: Vec<Vec<Value>>,
}

impl Heap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc_object(&mut self, data: ObjectData) -> ObjectId {
        let id = ObjectId(self.objects.len() as u32);
        self.objects.push(data);
        id
    }

    pub fn alloc_sequence(&mut self, items: Vec<Value>) -> SeqId {
        let id = SeqId(self.sequences.len() as u32);
        self.sequences.push(items);
        id
    }

    pub fn object(&self, id: ObjectId) -> ReflectResult<&ObjectData> {
        self.objects
            .get(id.0 as usize)
            .ok_or_else(|| ReflectError::DanglingHandle(id.to_string()))
    }

    pub fn object_mut(&mut self, id: ObjectId) -> ReflectResult<&mut ObjectData> {
        self.objects
            .get_mut(id.0 as usize)
            .ok_or_else(|| ReflectError::DanglingHandle(id.to_string()))
    }

    pub fn sequence(&self, id: SeqId) -> ReflectResult<&[Value]> {
        self.sequences
            .get(id.0 as usize)
            .map(Vec::as_slice)
            .ok_or_else(|| ReflectError::DanglingHandle(id.to_string()))
    }

    pub fn sequence_mut(&mut self, id: SeqId) -> ReflectResult<&mut Vec<Value>> {
        self.sequences
            .get_mut(id.0 as usize)
            .ok_or_else(|| ReflectError::DanglingHandle(id.to_string()))
    }

    /* JSON rendering of a value, following heap references. Objects and
     * sequences already on the current path are rendered as a back-reference
     * string */
    pub fn snapshot(&self, value: &Value) -> ReflectResult<JsonValue> {
        let mut path = HashSet::new();
        self.snapshot_inner(value, &mut path)
    }

    fn snapshot_inner(&self, value: &Value, path: &mut HashSet<Handle>) -> ReflectResult<JsonValue> {
        Ok(match value {
            Value::Null => JsonValue::Null,
            Value::Bool(v) => json!(v),
            Value::Int8(v) => json!(v),
            Value::Int16(v) => json!(v),
            Value::Int32(v) => json!(v),
            Value::Int64(v) => json!(v),
            Value::Char(v) => json!(v.to_string()),
            Value::Float32(v) => json!(v),
            Value::Float64(v) => json!(v),
            Value::Str(v) => json!(v),
            Value::Seq(id) => {
                if !path.insert(Handle::Seq(*id)) {
                    return Ok(json!(format!("<cycle {}>", id)));
                }
                let items = self
                    .sequence(*id)?
                    .iter()
                    .map(|item| self.snapshot_inner(item, path))
                    .collect::<ReflectResult<Vec<_>>>()?;
                path.remove(&Handle::Seq(*id));
                JsonValue::Array(items)
            }
            Value::Object(id) => {
                if !path.insert(Handle::Object(*id)) {
                    return Ok(json!(format!("<cycle {}>", id)));
                }
                let data = self.object(*id)?;
                let mut fields = JsonMap::new();
                for (name, slot) in &data.fields {
                    fields.insert(name.clone(), self.snapshot_inner(slot, path)?);
                }
                path.remove(&Handle::Object(*id));
                json!({ "class": data.class_name, "fields": fields })
            }
        })
    }
}
