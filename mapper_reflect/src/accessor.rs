use crate::errors::{ReflectError, ReflectResult};
use crate::interpreter::Runtime;
use crate::value::Value;
use mapper_types::{capitalize, NodeId, FIELD_MAPPER_NAME};

/// Calls into the `FieldMapper` nested in one host class.
pub struct FieldMapperClient<'r, 't> {
    runtime: &'r mut Runtime<'t>,
    host: NodeId,
    mapper: NodeId,
}

impl std::fmt::Debug for FieldMapperClient<'_, '_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldMapperClient")
            .field("host", &self.host)
            .field("mapper", &self.mapper)
            .finish_non_exhaustive()
    }
}

impl<'r, 't> FieldMapperClient<'r, 't> {
    /// Finds the accessor type nested in `host`.
    pub fn locate(runtime: &'r mut Runtime<'t>, host: NodeId) -> ReflectResult<Self> {
        let tree = runtime.tree();
        let class = tree.class(host).ok_or(ReflectError::NotAClass(host))?;
        let mapper = tree
            .nested_of(host)
            .find(|(_, nested)| nested.name == FIELD_MAPPER_NAME)
            .map(|(id, _)| id)
            .ok_or_else(|| ReflectError::MissingAccessorType {
                class: class.name.clone(),
            })?;
        Ok(Self {
            runtime,
            host,
            mapper,
        })
    }

    pub fn host(&self) -> NodeId {
        self.host
    }

    pub fn mapper(&self) -> NodeId {
        self.mapper
    }

    pub fn runtime(&mut self) -> &mut Runtime<'t> {
        self.runtime
    }

    /// `FieldMapper.set(instance, field, value)`
    pub fn set(&mut self, instance: &Value, field: &str, value: impl Into<Value>) -> ReflectResult<()> {
        self.call(
            "set",
            vec![instance.clone(), Value::from(field), value.into()],
        )?;
        Ok(())
    }

    /// `FieldMapper.get(instance, field)`
    pub fn get(&mut self, instance: &Value, field: &str) -> ReflectResult<Value> {
        self.call("get", vec![instance.clone(), Value::from(field)])
    }

    /// `FieldMapper.set<Cap>(instance, value)`
    pub fn set_typed(
        &mut self,
        instance: &Value,
        field: &str,
        value: impl Into<Value>,
    ) -> ReflectResult<()> {
        let name = format!("set{}", capitalize(field));
        self.call(&name, vec![instance.clone(), value.into()])?;
        Ok(())
    }

    /// `FieldMapper.get<Cap>(instance)`
    pub fn get_typed(&mut self, instance: &Value, field: &str) -> ReflectResult<Value> {
        let name = format!("get{}", capitalize(field));
        self.call(&name, vec![instance.clone()])
    }

    fn call(&mut self, method: &str, args: Vec<Value>) -> ReflectResult<Value> {
        let id = self.runtime.find_method(self.mapper, method)?;
        self.runtime.invoke(id, None, args)
    }
}
