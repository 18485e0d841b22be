pub mod lookup;
pub mod subscribe;

pub use lookup::lookup;
pub use subscribe::subscribe;
