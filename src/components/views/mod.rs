mod home;
mod map;

pub use home::HomeView;
pub use map::MapView;
