pub mod error;
pub mod filter;
pub mod filter_order;
pub mod filter_where;
pub mod types;

pub use error::FilterError;
pub use filter::Filter;
pub use filter_order::{CompanySort, Sortable, UserSort};
pub use types::{ListParams, SortDirection};
