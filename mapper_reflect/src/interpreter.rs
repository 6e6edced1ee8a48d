/* Evaluator for the method-body IR
 *
 * A Runtime owns the heap and evaluates any method of a program tree against
 * it. Every value crossing a cast or a parameter binding is checked against
 * the declared type with no implicit widening. */

use crate::errors::{ReflectError, ReflectResult};
use crate::heap::{Heap, ObjectData};
use crate::value::{ObjectId, SeqId, Value};
use indexmap::IndexMap;
use mapper_types::{
    Block, CallTarget, Expr, Failure, MethodDecl, NodeId, ProgramTree, SequenceOp, Stmt,
    TypeDescriptor, TypeHierarchy, STRING_TYPE,
};
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use tracing::trace;

pub const MAX_CALL_DEPTH: usize = 256;

/* Outcome of executing a statement */
enum Flow {
    Normal,
    Return(Value),
}

struct Frame {
    this: Option<Value>,
    locals: HashMap<String, Value>,
}

impl Frame {
    fn local(&self, name: &str) -> ReflectResult<Value> {
        self.locals
            .get(name)
            .cloned()
            .ok_or_else(|| ReflectError::MissingLocal {
                name: name.to_string(),
            })
    }
}

pub struct Runtime<'t> {
    tree: &'t ProgramTree,
    hierarchy: TypeHierarchy,
    heap: Heap,
    depth: usize,
}

impl<'t> Runtime<'t> {
    pub fn new(tree: &'t ProgramTree) -> Self {
        Self {
            tree,
            hierarchy: TypeHierarchy::from_tree(tree),
            heap: Heap::new(),
            depth: 0,
        }
    }

    pub fn tree(&self) -> &'t ProgramTree {
        self.tree
    }

    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    /// New object of `class` with every field slot at its default value.
    pub fn instantiate(&mut self, class: NodeId) -> ReflectResult<Value> {
        let decl = self
            .tree
            .class(class)
            .ok_or(ReflectError::NotAClass(class))?;
        let fields: IndexMap<String, Value> = self
            .tree
            .fields_of(class)
            .map(|(_, field)| (field.name.clone(), Value::default_for(&field.ty)))
            .collect();
        let id = self.heap.alloc_object(ObjectData {
            class,
            class_name: decl.name.clone(),
            fields,
        });
        Ok(Value::Object(id))
    }

    pub fn sequence<I, V>(&mut self, items: I) -> Value
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let items = items.into_iter().map(Into::into).collect();
        Value::Seq(self.heap.alloc_sequence(items))
    }

    /// Current elements of a sequence value.
    pub fn sequence_items(&self, value: &Value) -> ReflectResult<Vec<Value>> {
        let id = expect_seq(value)?;
        Ok(self.heap.sequence(id)?.to_vec())
    }

    /// Raw slot read, bypassing accessors.
    pub fn field_value(&self, object: &Value, field: &str) -> ReflectResult<Value> {
        let id = expect_object(object)?;
        let data = self.heap.object(id)?;
        data.fields
            .get(field)
            .cloned()
            .ok_or_else(|| ReflectError::NoSuchField {
                class: data.class_name.clone(),
                field: field.to_string(),
            })
    }

    pub fn snapshot(&self, value: &Value) -> ReflectResult<JsonValue> {
        self.heap.snapshot(value)
    }

    /// First method of `class` named `name`.
    pub fn find_method(&self, class: NodeId, name: &str) -> ReflectResult<NodeId> {
        let decl = self
            .tree
            .class(class)
            .ok_or(ReflectError::NotAClass(class))?;
        self.tree
            .methods_of(class)
            .find(|(_, method)| method.name == name)
            .map(|(id, _)| id)
            .ok_or_else(|| ReflectError::NoSuchMethod {
                class: decl.name.clone(),
                method: name.to_string(),
            })
    }

    /// Calls `method`. Static methods ignore `receiver`; instance methods
    /// require a non-null object.
    pub fn invoke(
        &mut self,
        method: NodeId,
        receiver: Option<Value>,
        args: Vec<Value>,
    ) -> ReflectResult<Value> {
        let tree = self.tree;
        let decl = tree.method(method).ok_or(ReflectError::NotAMethod(method))?;
        if args.len() != decl.params.len() {
            return Err(ReflectError::ArityMismatch {
                method: decl.name.clone(),
                expected: decl.params.len(),
                found: args.len(),
            });
        }
        let body = decl.body.as_ref().ok_or_else(|| ReflectError::AbstractMethod {
            method: decl.name.clone(),
        })?;

        let this = if decl.is_static {
            None
        } else {
            match receiver {
                Some(value @ Value::Object(_)) => Some(value),
                Some(Value::Null) | None => {
                    return Err(ReflectError::NullReceiver {
                        method: decl.name.clone(),
                    })
                }
                Some(other) => {
                    return Err(ReflectError::NotAnObject {
                        found: other.kind_name().to_string(),
                    })
                }
            }
        };

        let mut locals = HashMap::with_capacity(args.len());
        for (param, arg) in decl.params.iter().zip(args) {
            locals.insert(param.name.clone(), self.coerce(arg, &param.ty)?);
        }
        let mut frame = Frame { this, locals };

        if self.depth >= MAX_CALL_DEPTH {
            return Err(ReflectError::CallDepthExceeded {
                limit: MAX_CALL_DEPTH,
            });
        }
        trace!(method = %decl.name, depth = self.depth, "invoke");
        self.depth += 1;
        let flow = self.exec_block(body, &mut frame);
        self.depth -= 1;

        match flow? {
            Flow::Return(value) => Ok(value),
            Flow::Normal => Ok(Value::Null),
        }
    }

    /// Checks `value` against `ty` and returns it unchanged when it fits.
    ///
    /// A primitive accepts only its own kind, a boxed primitive also accepts
    /// null, `string` takes strings, sequence types take any sequence
    /// (element types are not tracked) and class types take objects whose
    /// class is a subtype. Every reference type accepts null.
    pub fn coerce(&self, value: Value, ty: &TypeDescriptor) -> ReflectResult<Value> {
        let fits = match ty {
            TypeDescriptor::Any => true,
            TypeDescriptor::Void => false,
            TypeDescriptor::Primitive(prim) => value.primitive_type() == Some(*prim),
            TypeDescriptor::Boxed(prim) => {
                value.is_null() || value.primitive_type() == Some(*prim)
            }
            TypeDescriptor::Named { name, .. } => match &value {
                Value::Null => true,
                Value::Str(_) => self.hierarchy.is_subtype(STRING_TYPE, name),
                Value::Seq(_) => self.hierarchy.is_sequence(ty),
                Value::Object(id) => {
                    let class = &self.heap.object(*id)?.class_name;
                    self.hierarchy.is_subtype(class, name)
                }
                _ => false,
            },
        };
        if fits {
            Ok(value)
        } else {
            Err(ReflectError::Conversion {
                expected: ty.to_string(),
                found: value.kind_name().to_string(),
            })
        }
    }

    fn exec_block(&mut self, block: &Block, frame: &mut Frame) -> ReflectResult<Flow> {
        for stmt in block {
            if let Flow::Return(value) = self.exec(stmt, frame)? {
                return Ok(Flow::Return(value));
            }
        }
        Ok(Flow::Normal)
    }

    fn exec(&mut self, stmt: &Stmt, frame: &mut Frame) -> ReflectResult<Flow> {
        match stmt {
            Stmt::Expr { expr } => {
                self.eval(expr, frame)?;
                Ok(Flow::Normal)
            }
            Stmt::Return { value } => Ok(Flow::Return(self.eval(value, frame)?)),
            Stmt::If {
                cond,
                then_block,
                else_block,
            } => match self.eval(cond, frame)? {
                Value::Bool(true) => self.exec_block(then_block, frame),
                Value::Bool(false) => self.exec_block(else_block, frame),
                other => Err(ReflectError::Conversion {
                    expected: "bool".to_string(),
                    found: other.kind_name().to_string(),
                }),
            },
            Stmt::Switch {
                scrutinee,
                cases,
                default,
            } => {
                let key = self.eval(scrutinee, frame)?;
                let chosen = match &key {
                    Value::Str(key) => cases.get(key.as_str()).unwrap_or(default),
                    Value::Null => default,
                    other => {
                        return Err(ReflectError::Conversion {
                            expected: STRING_TYPE.to_string(),
                            found: other.kind_name().to_string(),
                        })
                    }
                };
                self.exec_block(chosen, frame)
            }
            Stmt::Let { name, ty, value } => {
                let value = self.eval(value, frame)?;
                let value = self.coerce(value, ty)?;
                frame.locals.insert(name.clone(), value);
                Ok(Flow::Normal)
            }
            Stmt::StoreField {
                object,
                field,
                value,
            } => {
                let target = expect_object(&self.eval(object, frame)?)?;
                let value = self.eval(value, frame)?;
                self.store_field(target, field, value)?;
                Ok(Flow::Normal)
            }
            Stmt::Throw { failure } => match failure {
                Failure::UnknownField { key } => {
                    let key = self.eval(key, frame)?;
                    Err(ReflectError::UnknownField {
                        key: key.to_string(),
                    })
                }
            },
        }
    }

    fn store_field(&mut self, object: ObjectId, field: &str, value: Value) -> ReflectResult<()> {
        let class = self.heap.object(object)?.class;
        let tree = self.tree;
        let declared = tree
            .fields_of(class)
            .find(|(_, decl)| decl.name == field)
            .map(|(_, decl)| &decl.ty);
        let value = match declared {
            Some(ty) => self.coerce(value, ty)?,
            None => {
                return Err(ReflectError::NoSuchField {
                    class: self.heap.object(object)?.class_name.clone(),
                    field: field.to_string(),
                })
            }
        };
        let data = self.heap.object_mut(object)?;
        data.fields.insert(field.to_string(), value);
        Ok(())
    }

    fn eval(&mut self, expr: &Expr, frame: &mut Frame) -> ReflectResult<Value> {
        match expr {
            Expr::Local { name } => frame.local(name),
            Expr::This => frame.this.clone().ok_or_else(|| ReflectError::MissingLocal {
                name: "this".to_string(),
            }),
            Expr::LoadField { object, field } => {
                let object = self.eval(object, frame)?;
                self.field_value(&object, field)
            }
            Expr::Cast { ty, value } => {
                let value = self.eval(value, frame)?;
                self.coerce(value, ty)
            }
            Expr::NotNull { value } => Ok(Value::Bool(!self.eval(value, frame)?.is_null())),
            Expr::Call {
                receiver,
                target,
                args,
            } => {
                let receiver = match receiver {
                    Some(receiver) => Some(self.eval(receiver, frame)?),
                    None => None,
                };
                let args = args
                    .iter()
                    .map(|arg| self.eval(arg, frame))
                    .collect::<ReflectResult<Vec<_>>>()?;
                match target {
                    CallTarget::Member { method } => self.call_member(*method, receiver, args),
                    CallTarget::Sequence { op } => self.call_sequence(*op, receiver, args),
                }
            }
        }
    }

    fn call_member(
        &mut self,
        method: NodeId,
        receiver: Option<Value>,
        args: Vec<Value>,
    ) -> ReflectResult<Value> {
        let decl: &MethodDecl = self
            .tree
            .method(method)
            .ok_or(ReflectError::NotAMethod(method))?;
        if !decl.is_static && matches!(receiver, None | Some(Value::Null)) {
            return Err(ReflectError::NullReceiver {
                method: decl.name.clone(),
            });
        }
        self.invoke(method, receiver, args)
    }

    fn call_sequence(
        &mut self,
        op: SequenceOp,
        receiver: Option<Value>,
        args: Vec<Value>,
    ) -> ReflectResult<Value> {
        let name = match op {
            SequenceOp::Clear => "clear",
            SequenceOp::AppendAll => "append_all",
        };
        let target = match receiver {
            Some(Value::Seq(id)) => id,
            Some(Value::Null) | None => {
                return Err(ReflectError::NullReceiver {
                    method: name.to_string(),
                })
            }
            Some(other) => {
                return Err(ReflectError::NotASequence {
                    found: other.kind_name().to_string(),
                })
            }
        };
        let expected = match op {
            SequenceOp::Clear => 0,
            SequenceOp::AppendAll => 1,
        };
        if args.len() != expected {
            return Err(ReflectError::ArityMismatch {
                method: name.to_string(),
                expected,
                found: args.len(),
            });
        }

        match op {
            SequenceOp::Clear => self.heap.sequence_mut(target)?.clear(),
            SequenceOp::AppendAll => {
                let source = match &args[0] {
                    Value::Seq(id) => *id,
                    Value::Null => {
                        return Err(ReflectError::NullArgument {
                            method: name.to_string(),
                        })
                    }
                    other => {
                        return Err(ReflectError::NotASequence {
                            found: other.kind_name().to_string(),
                        })
                    }
                };
                /* Snapshot first so appending a sequence to itself is well defined */
                let items = self.heap.sequence(source)?.to_vec();
                self.heap.sequence_mut(target)?.extend(items);
            }
        }
        Ok(Value::Null)
    }
}

fn expect_object(value: &Value) -> ReflectResult<ObjectId> {
    value.as_object().ok_or_else(|| ReflectError::NotAnObject {
        found: value.kind_name().to_string(),
    })
}

fn expect_seq(value: &Value) -> ReflectResult<SeqId> {
    value.as_seq().ok_or_else(|| ReflectError::NotASequence {
        found: value.kind_name().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapper_types::{ClassDecl, PrimitiveType};

    fn int32() -> TypeDescriptor {
        TypeDescriptor::Primitive(PrimitiveType::Int32)
    }

    #[test]
    fn conventional_accessors_read_and_write_slots() {
        let mut tree = ProgramTree::new();
        let class = tree.build_class("Point").property("x", int32()).finish();
        let mut runtime = Runtime::new(&tree);
        let point = runtime.instantiate(class).unwrap();

        let setter = runtime.find_method(class, "setX").unwrap();
        let getter = runtime.find_method(class, "getX").unwrap();
        runtime
            .invoke(setter, Some(point.clone()), vec![Value::Int32(5)])
            .unwrap();
        assert_eq!(runtime.invoke(getter, Some(point.clone()), vec![]).unwrap(), Value::Int32(5));
        assert_eq!(runtime.field_value(&point, "x").unwrap(), Value::Int32(5));
    }

    #[test]
    fn binding_is_strict() {
        let mut tree = ProgramTree::new();
        let class = tree.build_class("Point").property("x", int32()).finish();
        let mut runtime = Runtime::new(&tree);
        let point = runtime.instantiate(class).unwrap();
        let setter = runtime.find_method(class, "setX").unwrap();

        let err = runtime
            .invoke(setter, Some(point.clone()), vec![Value::Int64(5)])
            .unwrap_err();
        assert_eq!(
            err,
            ReflectError::Conversion {
                expected: "int32".into(),
                found: "int64".into(),
            }
        );
        assert!(matches!(
            runtime.invoke(setter, Some(point.clone()), vec![Value::Null]),
            Err(ReflectError::Conversion { .. })
        ));
        assert!(matches!(
            runtime.invoke(setter, None, vec![Value::Int32(1)]),
            Err(ReflectError::NullReceiver { .. })
        ));
        assert!(matches!(
            runtime.invoke(setter, Some(point), vec![]),
            Err(ReflectError::ArityMismatch { expected: 1, found: 0, .. })
        ));
    }

    #[test]
    fn class_targets_follow_the_hierarchy() {
        let mut tree = ProgramTree::new();
        let base = tree.add_class(ClassDecl::new("Base"));
        let mut derived = ClassDecl::new("Derived");
        derived.supertypes.push(TypeDescriptor::named("Base"));
        let derived = tree.add_class(derived);
        let mut runtime = Runtime::new(&tree);

        let object = runtime.instantiate(derived).unwrap();
        assert!(runtime.coerce(object.clone(), &TypeDescriptor::named("Base")).is_ok());
        let base_object = runtime.instantiate(base).unwrap();
        assert!(runtime
            .coerce(base_object, &TypeDescriptor::named("Derived"))
            .is_err());
        assert!(runtime.coerce(Value::Null, &TypeDescriptor::named("Derived")).is_ok());
        assert!(runtime.coerce(Value::from("s"), &TypeDescriptor::string()).is_ok());
        assert!(runtime
            .coerce(Value::from("s"), &TypeDescriptor::sequence_of(TypeDescriptor::string()))
            .is_err());
    }

    #[test]
    fn methods_without_bodies_cannot_run() {
        let mut tree = ProgramTree::new();
        let class = tree
            .build_class("Remote")
            .method(mapper_types::MethodDecl::new("ping", TypeDescriptor::Void).into_static())
            .finish();
        let mut runtime = Runtime::new(&tree);
        let ping = runtime.find_method(class, "ping").unwrap();

        assert_eq!(
            runtime.invoke(ping, None, vec![]),
            Err(ReflectError::AbstractMethod {
                method: "ping".into()
            })
        );
        assert!(matches!(
            runtime.find_method(class, "pong"),
            Err(ReflectError::NoSuchMethod { .. })
        ));
    }

    #[test]
    fn snapshots_objects_in_field_order() {
        let mut tree = ProgramTree::new();
        let class = tree
            .build_class("Entity")
            .property("name", TypeDescriptor::string())
            .property("tags", TypeDescriptor::sequence_of(TypeDescriptor::string()))
            .finish();
        let mut runtime = Runtime::new(&tree);
        let entity = runtime.instantiate(class).unwrap();
        let tags = runtime.sequence(["a", "b"]);
        let set_tags = runtime.find_method(class, "setTags").unwrap();
        runtime.invoke(set_tags, Some(entity.clone()), vec![tags]).unwrap();

        let snapshot = runtime.snapshot(&entity).unwrap();
        assert_eq!(
            snapshot.to_string(),
            r#"{"class":"Entity","fields":{"name":null,"tags":["a","b"]}}"#
        );
    }
}
