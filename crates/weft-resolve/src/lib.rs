pub mod options;
pub mod resolved;
pub mod resolver;

pub mod prelude {
    pub use crate::options::ResolveOptions;
    pub use crate::resolved::{ComponentTree, ResolvedBinding, ResolvedComponent};
    pub use crate::resolver::Resolver;
}
