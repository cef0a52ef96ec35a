//! Backend predicate compilation
//!
//! [`SqlDialect`] renders templates per backend; [`PredicateCompiler`]
//! pairs a template with its encoded parameter.

#[allow(clippy::module_inception)]
mod compiler;
mod dialect;

pub use compiler::{CompiledPredicate, ExtJsonEncoder, LiteralEncoder, PredicateCompiler};
pub use dialect::{Backend, MysqlDialect, PostgresDialect, SqlDialect, SqliteDialect, UnknownBackend};
