pub mod browse;
pub mod carousel;
pub mod catalog;
pub mod genre_filter;
pub mod recommendations;
pub mod registration;
pub mod route_gate;
pub mod session;

pub use browse::{BrowseController, BrowseView};
pub use carousel::CarouselScheduler;
pub use catalog::{CatalogFetcher, CategoryState, StatusMessage};
pub use genre_filter::{derive_filtered_items, GenreOptions};
pub use recommendations::Recommendations;
pub use registration::{Registrar, RegistrationForm};
pub use route_gate::{GateState, Navigation, Navigator, Route, RouteGate};
pub use session::SessionStore;
