//! Record type definitions

pub mod category;
pub mod equipment;
pub mod request;
pub mod team;
pub mod user;
pub mod work_center;

pub use category::Category;
pub use equipment::Equipment;
pub use request::{Request, RequestType, Stage, Target};
pub use team::Team;
pub use user::{Role, User};
pub use work_center::WorkCenter;
