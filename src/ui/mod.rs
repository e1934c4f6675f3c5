mod app;
pub use app::*;

mod cleaning;
pub use cleaning::*;

mod logger;
pub use logger::*;

mod menu;
pub use menu::*;

mod results;
pub use results::*;

mod scan;
pub use scan::*;

mod targets;
pub use targets::*;
