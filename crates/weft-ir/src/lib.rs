pub mod codec;
pub mod diag;
pub mod model;

pub mod prelude {
    pub use crate::codec::{decode, encode, CodecError};
    pub use crate::diag::{Diagnostic, Report};
    pub use crate::model::{
        Component, DanglingProvider, DependencyRef, Document, FileUnit, Module, Provider, TypeKey,
    };
    pub use weft_span::SrcLoc;
}
