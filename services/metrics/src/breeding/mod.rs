pub mod service;

pub use service::BreedingService;
