pub mod data;
pub mod style;

pub use data::DataPage;
pub use style::StylePage;
