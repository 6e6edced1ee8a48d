//! Structured method bodies.
//!
//! Bodies are plain statement sequences over a small expression language.
//! Calls to other members reference their target by [`NodeId`], so a body
//! stays valid for as long as the tree that owns it.

use crate::tree::NodeId;
use crate::types::TypeDescriptor;
use indexmap::IndexMap;
use serde_derive::{Deserialize, Serialize};

pub type Block = Vec<Stmt>;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "stmt", rename_all = "kebab-case")]
pub enum Stmt {
    Expr {
        expr: Expr,
    },
    Return {
        value: Expr,
    },
    If {
        cond: Expr,
        then_block: Block,
        #[serde(default)]
        else_block: Block,
    },
    /// Exact string match of `scrutinee` against the case labels, in label
    /// order. A null scrutinee matches no label.
    Switch {
        scrutinee: Expr,
        cases: IndexMap<String, Block>,
        default: Block,
    },
    /// Binds `value`, checked against `ty`, to a new local of the frame.
    Let {
        name: String,
        ty: TypeDescriptor,
        value: Expr,
    },
    StoreField {
        object: Expr,
        field: String,
        value: Expr,
    },
    Throw {
        failure: Failure,
    },
}

impl Stmt {
    pub fn expr(expr: Expr) -> Self {
        Stmt::Expr { expr }
    }

    pub fn ret(value: Expr) -> Self {
        Stmt::Return { value }
    }

    pub fn bind(name: impl Into<String>, ty: TypeDescriptor, value: Expr) -> Self {
        Stmt::Let {
            name: name.into(),
            ty,
            value,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "expr", rename_all = "kebab-case")]
pub enum Expr {
    Local {
        name: String,
    },
    This,
    LoadField {
        object: Box<Expr>,
        field: String,
    },
    Call {
        #[serde(default)]
        receiver: Option<Box<Expr>>,
        target: CallTarget,
        #[serde(default)]
        args: Vec<Expr>,
    },
    Cast {
        ty: TypeDescriptor,
        value: Box<Expr>,
    },
    NotNull {
        value: Box<Expr>,
    },
}

impl Expr {
    pub fn local(name: impl Into<String>) -> Self {
        Expr::Local { name: name.into() }
    }

    pub fn load_field(object: Expr, field: impl Into<String>) -> Self {
        Expr::LoadField {
            object: Box::new(object),
            field: field.into(),
        }
    }

    /// Call of a resolved member on `receiver`.
    pub fn call(receiver: Expr, method: NodeId, args: Vec<Expr>) -> Self {
        Expr::Call {
            receiver: Some(Box::new(receiver)),
            target: CallTarget::Member { method },
            args,
        }
    }

    pub fn sequence_op(receiver: Expr, op: SequenceOp, args: Vec<Expr>) -> Self {
        Expr::Call {
            receiver: Some(Box::new(receiver)),
            target: CallTarget::Sequence { op },
            args,
        }
    }

    pub fn cast(ty: TypeDescriptor, value: Expr) -> Self {
        Expr::Cast {
            ty,
            value: Box::new(value),
        }
    }

    pub fn not_null(value: Expr) -> Self {
        Expr::NotNull {
            value: Box::new(value),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum CallTarget {
    Member { method: NodeId },
    Sequence { op: SequenceOp },
}

/// Intrinsic operations available on every sequence value.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SequenceOp {
    /// Removes every element; identity is kept.
    Clear,
    /// Appends every element of the single argument, in order.
    AppendAll,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Failure {
    /// Raised by the dynamic API for a key matching no field.
    UnknownField { key: Expr },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switch_body_serializes_in_case_order() {
        let mut cases = IndexMap::new();
        cases.insert("zeta".to_string(), vec![Stmt::ret(Expr::local("z"))]);
        cases.insert("alpha".to_string(), vec![Stmt::ret(Expr::local("a"))]);
        let stmt = Stmt::Switch {
            scrutinee: Expr::local("field"),
            cases,
            default: vec![Stmt::Throw {
                failure: Failure::UnknownField {
                    key: Expr::local("field"),
                },
            }],
        };

        let json = serde_json::to_string(&stmt).expect("serialize");
        assert!(json.find("zeta").unwrap() < json.find("alpha").unwrap());
        let back: Stmt = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, stmt);
    }
}
