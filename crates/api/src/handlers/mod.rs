pub mod bands;
pub mod managers;
pub mod tours;
