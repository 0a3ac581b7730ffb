pub mod efficiency;
pub mod plant;
pub mod scenario;
pub mod timeline;

pub use efficiency::*;
pub use plant::*;
pub use scenario::*;
pub use timeline::*;
