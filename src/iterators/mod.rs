//! Strided iteration, grounded on `ndarray`'s raw-pointer element
//! iterators (`iterators/iter.rs`, `iterators/windows.rs`) and its
//! broadcasting `Zip` (`zip/mod.rs`) — generalised here to runtime shapes
//! and dtypes instead of compile-time `Dimension` types.

mod multiiter;
mod niter;
mod windowiter;

pub use multiiter::NMultiIter;
pub use niter::NIter;
pub use windowiter::NWindowIter;
