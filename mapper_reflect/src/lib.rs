/* Field Mapper Runtime
 *
 * Evaluates method bodies of a program tree on an arena heap, so that the
 * synthesized accessor types can be called with untyped values and their
 * behavior observed. Casts and parameter bindings are checked strictly at
 * every boundary.
 */

pub mod accessor;
pub mod errors;
pub mod heap;
pub mod interpreter;
pub mod value;

pub use accessor::FieldMapperClient;
pub use errors::{ReflectError, ReflectResult};
pub use heap::{Heap, ObjectData};
pub use interpreter::{Runtime, MAX_CALL_DEPTH};
pub use value::{ObjectId, SeqId, Value};
