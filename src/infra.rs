pub mod config;
pub mod maven_adapter;
pub mod tags;

pub use maven_adapter::MavenRunner;
pub use tags::RandomTagGenerator;
