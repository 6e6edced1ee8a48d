use super::sequence::assign_sequence;
use super::{AccessorSynthesizer, MethodDescriptor, INSTANCE_PARAM, VALUE_PARAM};
use crate::catalog::{FieldDescriptor, FieldType};
use mapper_types::{Expr, Param, Stmt, TypeDescriptor};

impl AccessorSynthesizer<'_> {
    /// `set<Cap>(instance, <field>: T)`
    pub(super) fn typed_set(&self, field: &FieldDescriptor) -> MethodDescriptor {
        let param = value_param_name(field);
        let instance = Expr::local(INSTANCE_PARAM);
        let incoming = Expr::local(param.clone());
        let body = match field.ty {
            FieldType::Scalar(_) => {
                vec![Stmt::expr(Expr::call(instance, field.setter, vec![incoming]))]
            }
            FieldType::Sequence(_) => assign_sequence(&instance, field, incoming),
        };
        MethodDescriptor {
            name: field.setter_name(),
            is_static: true,
            params: vec![
                self.instance_param(),
                Param::new(param, field.declared_type().clone()),
            ],
            return_type: TypeDescriptor::Void,
            body,
        }
    }

    /// `get<Cap>(instance): T`
    pub(super) fn typed_get(&self, field: &FieldDescriptor) -> MethodDescriptor {
        MethodDescriptor {
            name: field.getter_name(),
            is_static: true,
            params: vec![self.instance_param()],
            return_type: field.declared_type().clone(),
            body: vec![Stmt::ret(Expr::call(
                Expr::local(INSTANCE_PARAM),
                field.getter,
                Vec::new(),
            ))],
        }
    }
}

/* Named after the field unless that would shadow the instance parameter */
fn value_param_name(field: &FieldDescriptor) -> String {
    if field.name == INSTANCE_PARAM {
        VALUE_PARAM.to_string()
    } else {
        field.name.clone()
    }
}
