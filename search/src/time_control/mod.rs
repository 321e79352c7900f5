mod controller;

pub use controller::SearchController;
