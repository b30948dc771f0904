pub mod comment;
pub mod company;
pub mod product;
pub mod suggestion;
pub mod user;

pub use comment::*;
pub use company::*;
pub use product::*;
pub use suggestion::*;
pub use user::*;
