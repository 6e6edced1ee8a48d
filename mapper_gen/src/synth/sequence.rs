use crate::catalog::FieldDescriptor;
use mapper_types::{Block, Expr, SequenceOp, Stmt};

/* Shared assignment policy for sequence fields.
 *
 *   if (getter() != null) { getter().clear(); getter().append_all(incoming); }
 *   else                  { setter(incoming); }
 *
 * The null test runs before any mutation and clear always precedes
 * append_all, so an existing sequence keeps its identity. */
pub(super) fn assign_sequence(instance: &Expr, field: &FieldDescriptor, incoming: Expr) -> Block {
    let current = Expr::call(instance.clone(), field.getter, Vec::new());
    vec![Stmt::If {
        cond: Expr::not_null(current.clone()),
        then_block: vec![
            Stmt::expr(Expr::sequence_op(current.clone(), SequenceOp::Clear, Vec::new())),
            Stmt::expr(Expr::sequence_op(
                current,
                SequenceOp::AppendAll,
                vec![incoming.clone()],
            )),
        ],
        else_block: vec![Stmt::expr(Expr::call(
            instance.clone(),
            field.setter,
            vec![incoming],
        ))],
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::FieldType;
    use mapper_types::{CallTarget, NodeId, ProgramTree, TypeDescriptor};

    #[test]
    fn clear_precedes_append_and_setter_is_fallback() {
        let mut tree = ProgramTree::new();
        let class = tree
            .build_class("Bag")
            .property("items", TypeDescriptor::sequence_of(TypeDescriptor::string()))
            .finish();
        let ids: Vec<NodeId> = tree.members(class).map(|(id, _)| id).collect();
        let field = FieldDescriptor {
            name: "items".into(),
            capitalized: "Items".into(),
            ty: FieldType::Sequence(TypeDescriptor::sequence_of(TypeDescriptor::string())),
            field: ids[0],
            getter: ids[1],
            setter: ids[2],
        };

        let block = assign_sequence(&Expr::local("instance"), &field, Expr::local("items"));
        let [Stmt::If { then_block, else_block, .. }] = block.as_slice() else {
            panic!("expected a single if statement");
        };
        let ops: Vec<SequenceOp> = then_block
            .iter()
            .filter_map(|stmt| match stmt {
                Stmt::Expr {
                    expr: Expr::Call {
                        target: CallTarget::Sequence { op },
                        ..
                    },
                } => Some(*op),
                _ => None,
            })
            .collect();
        assert_eq!(ops, vec![SequenceOp::Clear, SequenceOp::AppendAll]);
        assert_eq!(else_block.len(), 1);
    }
}
