pub mod claude;
pub mod titan;
pub mod traits;

#[cfg(test)]
pub mod testing;
