pub mod titan;

pub use titan::TitanProvider;
