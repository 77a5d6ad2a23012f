pub mod interface;
pub mod linker;

pub mod prelude {
    pub use crate::interface::{ComponentDecl, LinkedInterface, ModuleDecl, ProviderSite};
    pub use crate::linker::{link, LinkOutput};
}
