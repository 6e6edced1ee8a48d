use super::sequence::assign_sequence;
use super::{
    AccessorSynthesizer, MethodDescriptor, FIELD_PARAM, INCOMING_LOCAL, INSTANCE_PARAM, VALUE_PARAM,
};
use crate::catalog::{FieldDescriptor, FieldType};
use indexmap::IndexMap;
use mapper_types::{Block, Expr, Failure, Param, Stmt, TypeDescriptor};

impl AccessorSynthesizer<'_> {
    /// `set(instance, field: string, value: any)`
    pub(super) fn dynamic_set(&self) -> MethodDescriptor {
        let body = self.dispatch(set_case);
        MethodDescriptor {
            name: "set".to_string(),
            is_static: true,
            params: vec![
                self.instance_param(),
                Param::new(FIELD_PARAM, TypeDescriptor::string()),
                Param::new(VALUE_PARAM, TypeDescriptor::Any),
            ],
            return_type: TypeDescriptor::Void,
            body,
        }
    }

    /// `get(instance, field: string): any`
    pub(super) fn dynamic_get(&self) -> MethodDescriptor {
        let body = self.dispatch(|field| {
            vec![Stmt::ret(Expr::call(
                Expr::local(INSTANCE_PARAM),
                field.getter,
                Vec::new(),
            ))]
        });
        MethodDescriptor {
            name: "get".to_string(),
            is_static: true,
            params: vec![
                self.instance_param(),
                Param::new(FIELD_PARAM, TypeDescriptor::string()),
            ],
            return_type: TypeDescriptor::Any,
            body,
        }
    }

    /* One case per field in declaration order; field names are unique once
     * cataloged, so the first matching label is the only one */
    fn dispatch(&self, case: impl Fn(&FieldDescriptor) -> Block) -> Block {
        let cases: IndexMap<String, Block> = self
            .fields
            .iter()
            .map(|field| (field.name.clone(), case(field)))
            .collect();
        vec![Stmt::Switch {
            scrutinee: Expr::local(FIELD_PARAM),
            cases,
            default: vec![Stmt::Throw {
                failure: Failure::UnknownField {
                    key: Expr::local(FIELD_PARAM),
                },
            }],
        }]
    }
}

fn set_case(field: &FieldDescriptor) -> Block {
    let instance = Expr::local(INSTANCE_PARAM);
    match &field.ty {
        FieldType::Scalar(declared) => {
            let value = Expr::cast(declared.boxed().erasure(), Expr::local(VALUE_PARAM));
            vec![Stmt::expr(Expr::call(instance, field.setter, vec![value]))]
        }
        FieldType::Sequence(declared) => {
            /* Convert before the null test so a rejected value mutates nothing */
            let local = converted_local(field);
            let erased = declared.erasure();
            let mut block = vec![Stmt::bind(
                local.clone(),
                erased.clone(),
                Expr::cast(erased, Expr::local(VALUE_PARAM)),
            )];
            block.extend(assign_sequence(&instance, field, Expr::local(local)));
            block
        }
    }
}

/* Named after the field unless that would shadow a parameter of `set` */
fn converted_local(field: &FieldDescriptor) -> String {
    if [INSTANCE_PARAM, FIELD_PARAM, VALUE_PARAM].contains(&field.name.as_str()) {
        INCOMING_LOCAL.to_string()
    } else {
        field.name.clone()
    }
}
