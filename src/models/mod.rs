pub mod history;
pub mod plant;
pub mod recommendation;
pub mod schedule;
pub mod weather;

pub use history::*;
pub use plant::*;
pub use recommendation::*;
pub use schedule::*;
pub use weather::*;
